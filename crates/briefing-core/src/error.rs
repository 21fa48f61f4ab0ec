//! Error types for briefing-core.
//!
//! Most failures in the widget degrade silently (defaults, loading view), so
//! these types mainly surface at the edges: configuration files, host event
//! decoding, and the CLI harness.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for briefing-core.
#[derive(Error, Debug)]
pub enum BriefingError {
    /// The host integration point is absent at mount time.
    #[error("host bridge is not available")]
    MissingBridge,

    /// An update event did not carry the expected nested metadata.
    #[error("malformed host event: {reason}")]
    MalformedEvent { reason: String },

    /// A timestamp could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BriefingError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            reason: reason.into(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// No home directory to derive the config location from
    #[error("could not determine a configuration directory")]
    NoDataDir,
}

/// Result type alias for BriefingError
pub type Result<T, E = BriefingError> = std::result::Result<T, E>;
