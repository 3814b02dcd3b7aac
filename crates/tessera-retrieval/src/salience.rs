//! Salient-entity extraction from query text.

use std::collections::HashSet;

/// Extracts the names a query is specifically about.
///
/// The retrieval filter only keeps segments that mention at least one of them.
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, query: &str) -> Vec<String>;
}

/// Capitalized tokens plus any token found in a gazetteer of known names.
///
/// Sentence-initial words are capitalized too and are picked up as entities
/// ("Who is in Mumbai?" yields `Who` and `Mumbai`) unless
/// `ignore_sentence_initial` is set.
#[derive(Debug, Clone, Default)]
pub struct GazetteerExtractor {
    gazetteer: HashSet<String>,
    ignore_sentence_initial: bool,
}

impl GazetteerExtractor {
    #[must_use]
    pub fn new<I, S>(gazetteer: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            gazetteer: gazetteer
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
            ignore_sentence_initial: false,
        }
    }

    #[must_use]
    pub fn ignore_sentence_initial(mut self, ignore: bool) -> Self {
        self.ignore_sentence_initial = ignore;
        self
    }
}

impl EntityExtractor for GazetteerExtractor {
    fn extract(&self, query: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut sentence_start = true;

        for raw in query.split_whitespace() {
            let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
            let starts_sentence = sentence_start;
            sentence_start = raw.ends_with(['.', '?', '!']);
            if token.is_empty() {
                continue;
            }

            let capitalized = token.chars().next().is_some_and(char::is_uppercase)
                && !(self.ignore_sentence_initial && starts_sentence);
            let known = self.gazetteer.contains(&token.to_lowercase());

            if (capitalized || known) && !found.iter().any(|f| f == token) {
                found.push(token.to_owned());
            }
        }
        found
    }
}
