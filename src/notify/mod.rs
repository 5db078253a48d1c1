//! Notification formatting and delivery

pub mod format;
pub mod log;
pub mod telegram;

pub use log::LogNotifier;
pub use telegram::TelegramNotifier;
