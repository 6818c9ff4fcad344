//! Error types for the core crate.
//!
//! The toolpath core itself never fails; these errors cover the edges of the
//! system: parsing distances and flushing rendered G-code to a writer.

use std::io;
use thiserror::Error;

/// Errors that can occur in core utilities.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A distance string could not be parsed.
    #[error("Invalid distance: {0:?}")]
    InvalidDistance(String),

    /// A distance used a unit suffix that is not supported.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// I/O error while writing G-code.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
