//! Trade pointers and the durable per-address cursor store

pub mod pointer;
pub mod store;

pub use pointer::TradePointer;
pub use store::{Cursor, CursorStore};
