//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod system_clock;
pub mod ticker_list_adapter;
pub mod upload_adapter;
#[cfg(feature = "web")]
pub mod web;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
