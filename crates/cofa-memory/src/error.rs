//! Error types for the memory crate.

use thiserror::Error;

/// Errors that can occur in the memory crate.
///
/// Disk and model failures are recovered inside the store and logged; the
/// only error a caller sees is `InvalidData` from `add` when handed empty
/// content or an empty source.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Filesystem read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data or arguments.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
