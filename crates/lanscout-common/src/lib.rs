//! LANScout Common - Shared utilities: logging and configuration
//!
//! This crate provides common functionality used across all LANScout crates.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigBuilder};
pub use logging::init_logging;
