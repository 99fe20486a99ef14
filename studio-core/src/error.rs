//! Error types for editor operations.

use thiserror::Error;

use crate::ElementId;

/// Result type for editor operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Element not found in scene.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// A list index was outside the valid range.
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the list.
        len: usize,
    },

    /// Invalid element operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// A style value could not be parsed.
    #[error("Invalid style value: {0}")]
    InvalidStyle(String),

    /// A preview script failed.
    #[error("Script error: {0}")]
    Script(String),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
