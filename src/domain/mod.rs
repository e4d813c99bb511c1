//! Core domain types and logic.

pub mod app_config;
pub mod batch;
pub mod calendar;
pub mod error;
pub mod evaluator;
pub mod price_series;
pub mod summary;
pub mod ticker;
