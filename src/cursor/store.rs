//! Durable per-address cursor store
//!
//! The store is the sole owner of cursor state. The engine holds it
//! behind a single write lock, so durable writes never interleave.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::pointer::TradePointer;
use crate::common::errors::{MirrorError, Result};

/// Per-address high-water-mark plus same-timestamp dedup set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Pointer of the newest fully processed trade
    #[serde(flatten)]
    pub last_pointer: TradePointer,
    /// Hashes of processed trades whose timestamp equals
    /// `last_pointer.timestamp`. Cleared whenever the timestamp
    /// advances, which bounds its size to one second of trades.
    #[serde(default)]
    pub same_ts_seen: HashSet<String>,
}

impl Cursor {
    pub fn new(last_pointer: TradePointer) -> Self {
        Self {
            last_pointer,
            same_ts_seen: HashSet::new(),
        }
    }
}

/// Durable mapping from lowercased address to [`Cursor`].
///
/// Persistence is atomic from the perspective of a concurrent crash:
/// the full mapping is written to a temporary file which then replaces
/// the real one, so a partial write is never read back as valid.
#[derive(Debug)]
pub struct CursorStore {
    path: PathBuf,
    cursors: HashMap<String, Cursor>,
}

impl CursorStore {
    /// Read durable state from `path`. A missing or corrupt file
    /// yields an empty store; load never fails the process.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cursors = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, Cursor>>(&raw) {
                Ok(map) => {
                    debug!("loaded {} cursors from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    warn!("cursor file {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("could not read cursor file {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        Self { path, cursors }
    }

    /// In-memory store for tests and dry runs
    pub fn in_memory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursors: HashMap::new(),
        }
    }

    pub fn get(&self, address: &str) -> Option<&Cursor> {
        self.cursors.get(&address.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Install the bootstrap fallback pointer for an address that has
    /// no stored cursor. A no-op if a cursor already exists, so a
    /// restart never rewinds past persisted state.
    pub fn bootstrap(&mut self, address: &str, fallback: TradePointer) {
        let key = address.to_lowercase();
        if !self.cursors.contains_key(&key) {
            debug!("bootstrap cursor for {} at {}", key, fallback);
            self.cursors.insert(key, Cursor::new(fallback));
        }
    }

    /// Advance the cursor for a fully processed trade.
    ///
    /// Monotonicity guarantee: a pointer that is not strictly greater
    /// than the current one never moves `last_pointer`. At an equal
    /// timestamp the trade's hash is still recorded in the dedup set.
    /// Returns whether any state changed.
    pub fn advance(&mut self, address: &str, pointer: &TradePointer) -> bool {
        let key = address.to_lowercase();
        let Some(cursor) = self.cursors.get_mut(&key) else {
            warn!("advance called for unbootstrapped address {}", key);
            return false;
        };

        let mut changed = false;
        if *pointer > cursor.last_pointer {
            if pointer.timestamp > cursor.last_pointer.timestamp {
                cursor.same_ts_seen.clear();
            }
            cursor.last_pointer = pointer.clone();
            changed = true;
        }
        if pointer.timestamp == cursor.last_pointer.timestamp && !pointer.tx_hash.is_empty() {
            changed |= cursor.same_ts_seen.insert(pointer.tx_hash.clone());
        }
        changed
    }

    /// Durably write the full mapping: serialize to `<path>.tmp`, then
    /// atomically rename over `<path>`.
    pub fn persist(&self) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        let raw = serde_json::to_string_pretty(&self.cursors)
            .map_err(|e| MirrorError::Persistence(e.into()))?;
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
