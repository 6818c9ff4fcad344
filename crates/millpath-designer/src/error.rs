//! Error types for the designer crate.

use std::io;
use thiserror::Error;

/// Errors raised while loading, saving or exporting documents.
#[derive(Error, Debug)]
pub enum DesignerError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Document (de)serialization failed.
    #[error("Document format error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Writing the G-code program failed.
    #[error("G-code output error: {0}")]
    Output(#[from] millpath_core::CoreError),
}

/// Result type alias for designer operations.
pub type Result<T> = std::result::Result<T, DesignerError>;
