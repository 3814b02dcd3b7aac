use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Free-form document metadata. Key order is preserved as inserted.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A retrievable item: the text that was embedded plus the record it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<usize>,
}

impl Document {
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
            chunk_id: None,
        }
    }

    /// String value of a metadata key, if present and a string.
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Append-only, position-addressed document collection.
///
/// Position `i` is the row of the document's embedding in the vector index, so
/// documents are never removed or reordered.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document and return its position.
    pub fn append(
        &mut self,
        text: impl Into<String>,
        metadata: Metadata,
        chunk_id: Option<usize>,
    ) -> usize {
        self.push(Document {
            text: text.into(),
            metadata,
            chunk_id,
        })
    }

    pub fn push(&mut self, document: Document) -> usize {
        self.documents.push(document);
        self.documents.len() - 1
    }

    /// # Errors
    ///
    /// Returns [`StoreError::OutOfRange`] if `position >= len()`.
    pub fn get(&self, position: usize) -> Result<&Document> {
        self.documents.get(position).ok_or(StoreError::OutOfRange {
            position,
            len: self.documents.len(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Document texts in position order, ready for embedding.
    #[must_use]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn meta(source: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("source_name".into(), json!(source));
        m
    }

    #[test]
    fn positions_start_at_zero_and_increase() {
        let mut store = DocumentStore::new();
        assert_eq!(store.append("a", meta("x"), None), 0);
        assert_eq!(store.append("b", meta("x"), Some(1)), 1);
        assert_eq!(store.push(Document::new("c", Metadata::new())), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn get_returns_appended_document() {
        let mut store = DocumentStore::new();
        store.append("first", meta("one.txt"), Some(0));
        store.append("second", meta("two.txt"), None);

        let doc = store.get(1).unwrap();
        assert_eq!(doc.text, "second");
        assert_eq!(doc.meta_str("source_name"), Some("two.txt"));
        assert_eq!(doc.chunk_id, None);
        assert_eq!(store.get(0).unwrap().chunk_id, Some(0));
    }

    #[test]
    fn get_past_end_is_out_of_range() {
        let mut store = DocumentStore::new();
        store.append("only", Metadata::new(), None);
        let err = store.get(1).unwrap_err();
        assert!(matches!(
            err,
            StoreError::OutOfRange {
                position: 1,
                len: 1
            }
        ));
    }

    #[test]
    fn empty_store() {
        let store = DocumentStore::default();
        assert!(store.is_empty());
        assert!(store.get(0).is_err());
    }

    #[test]
    fn texts_follow_insertion_order() {
        let mut store = DocumentStore::new();
        for t in ["x", "y", "z"] {
            store.append(t, Metadata::new(), None);
        }
        assert_eq!(store.texts().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn meta_str_ignores_non_strings() {
        let mut m = Metadata::new();
        m.insert("count".into(), json!(3));
        let mut store = DocumentStore::new();
        store.append("t", m, Some(4));
        let doc = store.get(0).unwrap();
        assert_eq!(doc.meta_str("count"), None);
        assert_eq!(doc.chunk_id, Some(4));
    }
}
