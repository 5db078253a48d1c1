//! Polymarket venue integration: Data API feed and CLOB order path

pub mod auth;
pub mod clob;
pub mod data_api;
pub mod messages;

pub use clob::ClobClient;
pub use data_api::DataApiClient;
