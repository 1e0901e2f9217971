//! Core domain types and logic.

pub mod backtest;
pub mod batch;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod portfolio;
pub mod price_bar;
pub mod signal;
pub mod strategy;
