//! Error types for the local mirror and entity store.

use thiserror::Error;

/// Local storage failures. These are surfaced, not swallowed: a mutation
/// that cannot reach disk violates the durability guarantee and the caller
/// must know.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading or writing a document.
    #[error("local mirror I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A collection could not be serialized for persistence.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No platform data directory could be resolved.
    #[error("no platform data directory available")]
    NoDataDir,
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
