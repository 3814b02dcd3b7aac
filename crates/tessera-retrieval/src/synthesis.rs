//! Fact-bounded answer composition from verified segments.
//!
//! Every line of an answer is rendered from a retrieved document: entity
//! records through fixed templates, triples as bare facts, free text as a
//! quoted excerpt. Nothing is generated that the segments do not contain.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;
use tessera_store::{Document, Metadata, Triple, relevance};

use crate::config::RetrievalConfig;
use crate::filter::{FilterOutcome, VerifiedSegment};

pub const EMPTY_QUERY_MESSAGE: &str = "Please provide a query.";

pub const NO_INFORMATION_MESSAGE: &str =
    "I'm sorry, I couldn't find any information related to your request.";

pub const SUPPRESSED_MESSAGE: &str = "NO HIGH-ACCURACY MATCH FOUND.\n\
    I found some distant records, but none specifically matching your criteria \
    (e.g., location/name). To avoid hallucination, I have suppressed those results.";

const CONTENT_MARKER: &str = "| Content: ";
const MISSING: &str = "unknown";

/// Composed answer for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAnswer {
    /// `100 / (1 + mean distance)` over all verified segments, within `[0, 100]`.
    pub accuracy_pct: f32,
    /// Entity facts, deduplicated, first-seen order.
    pub structured_facts: Vec<String>,
    /// Triple facts in encounter order, duplicates kept.
    pub graph_facts: Vec<String>,
    /// Nearest free-text excerpt, truncated.
    pub best_snippet: Option<String>,
    pub sources: BTreeSet<String>,
}

impl SynthesizedAnswer {
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SynthesizedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RETRIEVAL ACCURACY: {:.1}%", self.accuracy_pct)?;
        writeln!(f, "RESPONSE:")?;
        for fact in &self.structured_facts {
            writeln!(f, "✓ {fact}")?;
        }
        for fact in &self.graph_facts {
            writeln!(f, "  • {fact}")?;
        }
        if let Some(snippet) = &self.best_snippet {
            writeln!(f)?;
            writeln!(f, "Reference Documentation:")?;
            writeln!(f, "  > \"{snippet}...\"")?;
        }
        writeln!(f)?;
        let sources: Vec<String> = self.sources.iter().map(|s| format!("[[{s}]]")).collect();
        write!(f, "Source Files: {}", sources.join(", "))
    }
}

/// Normal results of a query. None of these are errors.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The query text was empty or whitespace.
    EmptyQuery,
    /// Nothing was retrieved at all.
    NoInformation,
    /// Matches were found but none passed the threshold and entity checks.
    Suppressed,
    Answer(SynthesizedAnswer),
}

impl QueryOutcome {
    #[must_use]
    pub fn answer(&self) -> Option<&SynthesizedAnswer> {
        match self {
            Self::Answer(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuery => f.write_str(EMPTY_QUERY_MESSAGE),
            Self::NoInformation => f.write_str(NO_INFORMATION_MESSAGE),
            Self::Suppressed => f.write_str(SUPPRESSED_MESSAGE),
            Self::Answer(a) => fmt::Display::fmt(a, f),
        }
    }
}

/// How a segment contributes to the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentFact {
    Structured(String),
    Graph(String),
    Snippet(String),
}

#[derive(Debug, Clone)]
pub struct AnswerSynthesizer {
    snippet_chars: usize,
    fallback_source: String,
    excluded_attributes: Vec<String>,
}

impl Default for AnswerSynthesizer {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

impl AnswerSynthesizer {
    #[must_use]
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            snippet_chars: config.snippet_chars,
            fallback_source: config.fallback_source.clone(),
            excluded_attributes: config.excluded_attributes.clone(),
        }
    }

    /// Turn a filter result into the query outcome.
    #[must_use]
    pub fn synthesize(&self, filtered: &FilterOutcome<'_>) -> QueryOutcome {
        match filtered {
            FilterOutcome::NoCandidates => QueryOutcome::NoInformation,
            FilterOutcome::NoVerifiedMatch => QueryOutcome::Suppressed,
            FilterOutcome::Verified(segments) => match self.compose(segments) {
                Some(answer) => QueryOutcome::Answer(answer),
                None => QueryOutcome::NoInformation,
            },
        }
    }

    /// Compose an answer from segments ordered nearest first. `None` if empty.
    #[must_use]
    pub fn compose(&self, segments: &[VerifiedSegment<'_>]) -> Option<SynthesizedAnswer> {
        if segments.is_empty() {
            return None;
        }

        let mut structured_facts: Vec<String> = Vec::new();
        let mut graph_facts = Vec::new();
        let mut best_snippet = None;
        let mut sources = BTreeSet::new();

        for segment in segments {
            let doc = segment.document;
            sources.insert(self.source_of(doc));

            match self.classify(doc) {
                SegmentFact::Structured(fact) => {
                    if !structured_facts.contains(&fact) {
                        structured_facts.push(fact);
                    }
                }
                SegmentFact::Graph(fact) => graph_facts.push(fact),
                SegmentFact::Snippet(text) => {
                    if best_snippet.is_none() {
                        best_snippet = Some(text.chars().take(self.snippet_chars).collect());
                    }
                }
            }
        }

        #[expect(clippy::cast_precision_loss)]
        let mean_distance = segments
            .iter()
            .map(|s| s.neighbor.distance)
            .sum::<f32>()
            / segments.len() as f32;
        let accuracy_pct = (relevance(mean_distance) * 100.0).clamp(0.0, 100.0);

        Some(SynthesizedAnswer {
            accuracy_pct,
            structured_facts,
            graph_facts,
            best_snippet,
            sources,
        })
    }

    /// Classify a document by metadata shape and render its fact.
    #[must_use]
    pub fn classify(&self, doc: &Document) -> SegmentFact {
        let meta = &doc.metadata;
        if let Some(Value::Object(attrs)) = meta.get("attributes") {
            return SegmentFact::Structured(self.entity_fact(meta, attrs));
        }
        if let Some(triple) = Triple::from_metadata(meta) {
            return SegmentFact::Graph(triple.to_text());
        }
        let text = doc.text.rsplit(CONTENT_MARKER).next().unwrap_or(&doc.text);
        SegmentFact::Snippet(text.to_owned())
    }

    fn entity_fact(&self, meta: &Metadata, attrs: &Metadata) -> String {
        let attr = |key: &str| display_value(attrs.get(key));
        match meta.get("entity_type").and_then(Value::as_str) {
            Some("Employee") => format!(
                "Employee {} ({}) is a {} in {} ({}).",
                attr("full_name"),
                display_value(meta.get("entity_id")),
                attr("designation"),
                attr("department"),
                attr("location"),
            ),
            Some("Client") => format!(
                "Client {} is in {} (Country: {}).",
                attr("client_name"),
                attr("industry"),
                attr("country"),
            ),
            _ => {
                let pairs: Vec<String> = attrs
                    .iter()
                    .filter(|(k, _)| !self.excluded_attributes.iter().any(|x| x == *k))
                    .map(|(k, v)| format!("{k}: {}", display_value(Some(v))))
                    .collect();
                format!(
                    "{}: {}",
                    display_value(meta.get("entity_type")),
                    pairs.join(", ")
                )
            }
        }
    }

    fn source_of(&self, doc: &Document) -> String {
        match doc.metadata.get("source_name") {
            None | Some(Value::Null) => self.fallback_source.clone(),
            value => display_value(value),
        }
    }
}

/// Plain text for a metadata value: strings unquoted, missing or null as `unknown`.
#[must_use]
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING.to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
