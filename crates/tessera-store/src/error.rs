//! Error types for tessera-store.

/// Errors raised by the chunker, the stores and the vector index.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Invalid chunking or index parameters, detected before any data is processed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A vector does not match the dimension fixed by the first insertion.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Search against an index that holds no vectors.
    #[error("vector index not ready")]
    IndexNotReady,

    /// Document store access past the end.
    #[error("position {position} out of range for store of length {len}")]
    OutOfRange { position: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted index failed structural validation.
    #[error("corrupt index file: {0}")]
    Corrupt(String),

    /// Persisted index digest does not match its contents.
    #[error("index checksum mismatch")]
    Checksum,
}

/// Result type alias using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
