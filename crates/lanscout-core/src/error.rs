//! Error types for LANScout

use thiserror::Error;

/// Result type alias using LANScout Error
pub type Result<T> = std::result::Result<T, Error>;

/// LANScout error types
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    #[error("Invalid sweep range: {0}")]
    InvalidRange(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    // === Inventory Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Device not found: {address}")]
    DeviceNotFound { address: String },

    // === Export Errors ===
    #[error("Export error: {0}")]
    Export(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get an error code for logging/metrics
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidRange(_) => "INVALID_RANGE",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::DeviceNotFound { .. } => "DEVICE_NOT_FOUND",
            Error::Export(_) => "EXPORT_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
