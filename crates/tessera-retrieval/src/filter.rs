//! Relevance thresholding and entity verification of raw neighbors.

use tessera_store::{Document, DocumentStore, Neighbor};

use crate::error::Result;
use crate::salience::EntityExtractor;

/// A neighbor that passed both filter stages, with the document it points at.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedSegment<'a> {
    pub neighbor: Neighbor,
    pub document: &'a Document,
}

/// Result of filtering one query's neighbors.
#[derive(Debug)]
pub enum FilterOutcome<'a> {
    /// The search returned nothing to filter.
    NoCandidates,
    /// Candidates existed but none survived both stages.
    NoVerifiedMatch,
    Verified(Vec<VerifiedSegment<'a>>),
}

/// Two-stage filter: relevance threshold, then entity consistency.
pub struct RetrievalFilter {
    extractor: Box<dyn EntityExtractor>,
}

impl std::fmt::Debug for RetrievalFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalFilter").finish_non_exhaustive()
    }
}

impl RetrievalFilter {
    #[must_use]
    pub fn new(extractor: Box<dyn EntityExtractor>) -> Self {
        Self { extractor }
    }

    /// Filter `neighbors` (nearest first) for `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if a neighbor row has no document in `store`.
    pub fn apply<'a>(
        &self,
        query: &str,
        neighbors: &[Neighbor],
        threshold: f32,
        store: &'a DocumentStore,
    ) -> Result<FilterOutcome<'a>> {
        if neighbors.is_empty() {
            return Ok(FilterOutcome::NoCandidates);
        }

        let relevant = neighbors
            .iter()
            .filter(|n| passes_threshold(n, threshold))
            .map(|&neighbor| -> Result<VerifiedSegment<'a>> {
                Ok(VerifiedSegment {
                    neighbor,
                    document: store.get(neighbor.row)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let kept = relevant.len();

        let entities = self.extractor.extract(query);
        let verified: Vec<VerifiedSegment<'a>> = relevant
            .into_iter()
            .filter(|s| mentions_any(&s.document.text, &entities))
            .collect();

        tracing::debug!(
            candidates = neighbors.len(),
            above_threshold = kept,
            entities = ?entities,
            verified = verified.len(),
            "retrieval filter applied"
        );

        if verified.is_empty() {
            Ok(FilterOutcome::NoVerifiedMatch)
        } else {
            Ok(FilterOutcome::Verified(verified))
        }
    }
}

/// Inclusive: a neighbor exactly at the threshold is kept.
#[must_use]
pub fn passes_threshold(neighbor: &Neighbor, threshold: f32) -> bool {
    neighbor.relevance() >= threshold
}

/// True when `entities` is empty or `text` contains one of them, ignoring case.
#[must_use]
pub fn mentions_any(text: &str, entities: &[String]) -> bool {
    if entities.is_empty() {
        return true;
    }
    let haystack = text.to_lowercase();
    entities
        .iter()
        .any(|e| haystack.contains(&e.to_lowercase()))
}
