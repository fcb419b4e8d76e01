//! Error taxonomy for the stock drop alert.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for configuration, storage and price lookups.
///
/// Notification problems are not errors; they are reported as
/// [`crate::notify::Delivery`] values.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// Configuration sources could not be read or deserialized.
    #[error("configuration error: {0}")]
    Source(#[from] config::ConfigError),

    /// The persisted high-water file is not a JSON object.
    #[error("malformed high-water file {path:?}: {reason}")]
    Format {
        /// File that failed to parse.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Neither the fast quote nor the history window produced a price.
    #[error("no price data for {ticker}: {reason}")]
    DataUnavailable {
        /// Ticker that could not be priced.
        ticker: String,
        /// Reason for failure.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, TrackerError>;
