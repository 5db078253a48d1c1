//! Trade-cursor synchronization and mirror dispatch

pub mod classifier;
pub mod sync;
pub mod translator;

pub use classifier::classify;
pub use sync::{SweepSettings, SyncEngine};
pub use translator::{MirrorTranslator, Translation};
