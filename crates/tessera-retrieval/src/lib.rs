//! Grounded question answering over a tessera corpus.
//!
//! A [`QueryEngine`] embeds the query, takes the nearest documents from the
//! vector index, drops those below the relevance threshold or not mentioning
//! the query's salient entities, and composes an answer only from what is left.

pub mod config;
pub mod embed;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod salience;
pub mod synthesis;

pub use config::RetrievalConfig;
pub use embed::Embedder;
pub use engine::QueryEngine;
pub use error::{Result, RetrievalError};
pub use filter::{FilterOutcome, RetrievalFilter, VerifiedSegment};
pub use ingest::{Corpus, EntityRecord, Record, load_output_dir};
pub use salience::{EntityExtractor, GazetteerExtractor};
pub use synthesis::{AnswerSynthesizer, QueryOutcome, SegmentFact, SynthesizedAnswer};
