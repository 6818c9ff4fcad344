//! Error types for the settings crate.

use std::io;
use thiserror::Error;

/// Errors that can occur while resolving, loading or saving settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A setting value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// A mode name is not recognised.
    #[error("Unknown {kind} mode: {value}")]
    UnknownMode { kind: &'static str, value: String },

    /// The settings file extension is not supported.
    #[error("Unsupported settings format: {0}")]
    UnsupportedFormat(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Result type alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
