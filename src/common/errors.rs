//! Error types for the application

use thiserror::Error;

/// Result type alias using our MirrorError
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Main error type for mirror operations
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Transient network/timeout failure reading the trade feed.
    /// The affected address is skipped for the current sweep and
    /// retried on the next one; its cursor is untouched.
    #[error("transient feed error: {0}")]
    TransientFetch(String),

    /// A trade record is missing a required field. The record is
    /// dropped from classification and the sweep continues.
    #[error("malformed trade record: {0}")]
    MalformedRecord(String),

    /// Order submission was rejected or failed. The cursor still
    /// advances: mirroring is best-effort, observation is not.
    #[error("order dispatch error: {0}")]
    Dispatch(String),

    /// Notification delivery failure. Logged only, never blocks
    /// cursor advancement.
    #[error("notification error: {0}")]
    Notification(String),

    /// Cursor file write failure. Surfaced loudly; risks reprocessing
    /// on restart, which classification tolerates.
    #[error("cursor persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Configuration errors (fatal at startup)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unexpected payload from the venue
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for MirrorError {
    fn from(err: reqwest::Error) -> Self {
        MirrorError::TransientFetch(err.to_string())
    }
}

impl From<serde_json::Error> for MirrorError {
    fn from(err: serde_json::Error) -> Self {
        MirrorError::MalformedRecord(err.to_string())
    }
}
