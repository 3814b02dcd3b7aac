//! Error types for tessera-retrieval.

use tessera_store::StoreError;

/// Errors that can occur while building a corpus or answering a query.
///
/// Normal query outcomes (empty query, no matches, suppressed matches) are not
/// errors; see [`QueryOutcome`](crate::QueryOutcome).
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Store, chunker or vector index failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The embedding collaborator failed.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Config file exists but could not be read.
    #[error("failed to read config: {0}")]
    ConfigRead(#[source] std::io::Error),

    /// Config file could not be parsed.
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Ingestion feed could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ingestion feed could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document store and vector index lengths differ.
    #[error("{documents} documents but {vectors} indexed vectors")]
    Misaligned { documents: usize, vectors: usize },
}

impl RetrievalError {
    /// Pipeline stage the error belongs to, for log fields.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Store(StoreError::Configuration(_))
            | Self::Config(_)
            | Self::ConfigRead(_)
            | Self::Toml(_) => "config",
            Self::Store(StoreError::Io(_) | StoreError::Corrupt(_) | StoreError::Checksum) => {
                "persist"
            }
            Self::Store(_) => "search",
            Self::Embedding(_) => "embed",
            Self::Json(_) | Self::Io(_) => "ingest",
            Self::Misaligned { .. } => "assemble",
        }
    }
}

/// Result type alias using `RetrievalError`.
pub type Result<T> = std::result::Result<T, RetrievalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages() {
        assert_eq!(RetrievalError::Store(StoreError::IndexNotReady).stage(), "search");
        assert_eq!(
            RetrievalError::Store(StoreError::Configuration("x".into())).stage(),
            "config"
        );
        assert_eq!(RetrievalError::Store(StoreError::Checksum).stage(), "persist");
        assert_eq!(RetrievalError::Embedding("down".into()).stage(), "embed");
        assert_eq!(
            RetrievalError::ConfigRead(std::io::Error::other("denied")).stage(),
            "config"
        );
        assert_eq!(
            RetrievalError::Io(std::io::Error::other("denied")).stage(),
            "ingest"
        );
        assert_eq!(
            RetrievalError::Misaligned {
                documents: 2,
                vectors: 1
            }
            .stage(),
            "assemble"
        );
    }

    #[test]
    fn store_errors_display_transparently() {
        let err = RetrievalError::from(StoreError::IndexNotReady);
        assert_eq!(err.to_string(), "vector index not ready");
    }
}
