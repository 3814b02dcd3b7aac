//! Boundary to the external embedding model.

use crate::error::Result;

/// Turns text into a fixed-length vector.
///
/// Every call within a session must return the same dimension. Search results
/// are only reproducible if the same text always yields the same vector.
pub trait Embedder: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RetrievalError::Embedding`](crate::RetrievalError::Embedding) if
    /// the model cannot produce a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl<F> Embedder for F
where
    F: Fn(&str) -> Vec<f32> + Send + Sync,
{
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_embedders() {
        let embedder = |text: &str| vec![text.len() as f32, 1.0];
        assert_eq!(embedder.embed("abc").unwrap(), vec![3.0, 1.0]);
    }
}
