//! In-memory corpus storage for grounded retrieval.
//!
//! Free text is split into overlapping windows by the [`chunker`], every
//! retrievable item lives in the append-only [`document::DocumentStore`], triples
//! are kept as labeled edges in the [`graph::KnowledgeGraph`], and the exact L2
//! [`index::VectorIndex`] holds one embedding per document, row-aligned with the
//! store.

pub mod chunker;
pub mod document;
pub mod error;
pub mod graph;
pub mod index;
mod persist;

pub use chunker::{Chunker, chunk};
pub use document::{Document, DocumentStore, Metadata};
pub use error::{Result, StoreError};
pub use graph::{KnowledgeGraph, Triple};
pub use index::{Neighbor, VectorIndex, relevance};
