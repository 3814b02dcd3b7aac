use tessera_store::{DocumentStore, KnowledgeGraph, VectorIndex};

use crate::config::RetrievalConfig;
use crate::embed::Embedder;
use crate::error::{Result, RetrievalError};
use crate::filter::RetrievalFilter;
use crate::ingest::Corpus;
use crate::salience::{EntityExtractor, GazetteerExtractor};
use crate::synthesis::{AnswerSynthesizer, QueryOutcome};

/// Built corpus plus everything needed to answer queries against it.
///
/// Immutable once constructed; queries take `&self`.
pub struct QueryEngine<E> {
    documents: DocumentStore,
    graph: KnowledgeGraph,
    index: VectorIndex,
    embedder: E,
    filter: RetrievalFilter,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
    score_threshold: f32,
}

impl<E> std::fmt::Debug for QueryEngine<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("documents", &self.documents.len())
            .field("edges", &self.graph.edge_count())
            .field("top_k", &self.top_k)
            .field("score_threshold", &self.score_threshold)
            .finish_non_exhaustive()
    }
}

impl<E: Embedder> QueryEngine<E> {
    /// Assemble an engine from a corpus and an index built from it.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or `index` is not row-aligned
    /// with the corpus documents.
    pub fn new(
        corpus: Corpus,
        index: VectorIndex,
        embedder: E,
        config: &RetrievalConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (documents, graph) = corpus.into_parts();
        if documents.len() != index.len() {
            return Err(RetrievalError::Misaligned {
                documents: documents.len(),
                vectors: index.len(),
            });
        }

        let extractor = GazetteerExtractor::new(&config.gazetteer)
            .ignore_sentence_initial(config.ignore_sentence_initial);

        Ok(Self {
            documents,
            graph,
            index,
            embedder,
            filter: RetrievalFilter::new(Box::new(extractor)),
            synthesizer: AnswerSynthesizer::from_config(config),
            top_k: config.top_k,
            score_threshold: config.score_threshold,
        })
    }

    /// Embed every corpus document with `embedder`, then assemble.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or embedding fails.
    pub fn build(corpus: Corpus, embedder: E, config: &RetrievalConfig) -> Result<Self> {
        config.validate()?;
        let index = corpus.embed(&embedder)?;
        Self::new(corpus, index, embedder, config)
    }

    /// Replace the default gazetteer extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn EntityExtractor>) -> Self {
        self.filter = RetrievalFilter::new(extractor);
        self
    }

    /// Answer `query` with the configured `top_k` and score threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or search fails.
    pub fn query(&self, query: &str) -> Result<QueryOutcome> {
        self.query_with(query, self.top_k, self.score_threshold)
    }

    /// Answer `query` with explicit retrieval parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or search fails, for example when the
    /// embedder returns a vector of the wrong dimension.
    pub fn query_with(&self, query: &str, top_k: usize, threshold: f32) -> Result<QueryOutcome> {
        if query.trim().is_empty() {
            return Ok(QueryOutcome::EmptyQuery);
        }
        if self.documents.is_empty() {
            tracing::debug!("query against empty corpus");
            return Ok(QueryOutcome::NoInformation);
        }

        let vector = self.embedder.embed(query)?;
        let neighbors = self.index.search(&vector, top_k)?;
        tracing::debug!(top_k, neighbors = neighbors.len(), "vector search done");

        let filtered = self
            .filter
            .apply(query, &neighbors, threshold, &self.documents)?;
        Ok(self.synthesizer.synthesize(&filtered))
    }

    /// Rendered answer text. Errors become a one-line failure message.
    #[must_use]
    pub fn respond(&self, query: &str) -> String {
        match self.query(query) {
            Ok(outcome) => outcome.render(),
            Err(e) => {
                tracing::error!(query, stage = e.stage(), error = %e, "query failed");
                format!("Error: {e}")
            }
        }
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    #[must_use]
    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    #[must_use]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}
