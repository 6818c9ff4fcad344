//! Error types for the CAM tools crate.
//!
//! The toolpath generators themselves never fail. These errors come from the
//! geometry helpers they lean on, and the generators turn them into skipped
//! geometry plus a comment.

use thiserror::Error;

/// Errors that can occur during CAM tool operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// Invalid parameters were provided to a CAM tool.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A geometry operation failed during toolpath creation.
    #[error("Geometry error: {0}")]
    Geometry(String),
}

/// Result type alias for CAM tool operations.
pub type Result<T> = std::result::Result<T, CamToolError>;
