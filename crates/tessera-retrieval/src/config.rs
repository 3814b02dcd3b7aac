use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_store::Chunker;

use crate::error::{Result, RetrievalError};

fn default_top_k() -> usize {
    5
}

fn default_score_threshold() -> f32 {
    0.5
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_snippet_chars() -> usize {
    300
}

fn default_fallback_source() -> String {
    "Internal Records".into()
}

fn default_gazetteer() -> Vec<String> {
    [
        "chennai",
        "mumbai",
        "bengaluru",
        "pune",
        "noida",
        "hyderabad",
        "gurugram",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_excluded_attributes() -> Vec<String> {
    vec!["ingestion_timestamp".into(), "origin_system".into()]
}

/// Retrieval and synthesis settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Neighbors fetched from the vector index per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum relevance, `1 / (1 + distance)`, a segment must reach. Inclusive.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Characters kept from the best free-text snippet.
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
    /// Source label for segments whose metadata has no `source_name`.
    #[serde(default = "default_fallback_source")]
    pub fallback_source: String,
    /// Known location names, matched case-insensitively against query tokens.
    #[serde(default = "default_gazetteer")]
    pub gazetteer: Vec<String>,
    /// Skip capitalized words that only start a sentence.
    #[serde(default)]
    pub ignore_sentence_initial: bool,
    /// Attributes left out of generic entity facts.
    #[serde(default = "default_excluded_attributes")]
    pub excluded_attributes: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            snippet_chars: default_snippet_chars(),
            fallback_source: default_fallback_source(),
            gazetteer: default_gazetteer(),
            ignore_sentence_initial: false,
            excluded_attributes: default_excluded_attributes(),
        }
    }
}

impl RetrievalConfig {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(RetrievalError::ConfigRead)?;
            toml::from_str::<Self>(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TESSERA_TOP_K") {
            match v.parse::<usize>() {
                Ok(k) => self.top_k = k,
                Err(_) => tracing::warn!("ignoring invalid TESSERA_TOP_K value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("TESSERA_SCORE_THRESHOLD") {
            match v.parse::<f32>() {
                Ok(t) => self.score_threshold = t,
                Err(_) => tracing::warn!("ignoring invalid TESSERA_SCORE_THRESHOLD value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("TESSERA_CHUNK_SIZE") {
            match v.parse::<usize>() {
                Ok(n) => self.chunk_size = n,
                Err(_) => tracing::warn!("ignoring invalid TESSERA_CHUNK_SIZE value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("TESSERA_CHUNK_OVERLAP") {
            match v.parse::<usize>() {
                Ok(n) => self.chunk_overlap = n,
                Err(_) => tracing::warn!("ignoring invalid TESSERA_CHUNK_OVERLAP value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("TESSERA_GAZETTEER") {
            self.gazetteer = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Check every setting before any data is processed.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Config`] naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RetrievalError::Config("top_k must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(RetrievalError::Config(format!(
                "score_threshold must be within [0, 1], got {}",
                self.score_threshold
            )));
        }
        self.chunker()
            .map_err(|e| RetrievalError::Config(e.to_string()))?;
        Ok(())
    }

    /// Chunker for the configured window.
    ///
    /// # Errors
    ///
    /// Returns an error if `chunk_overlap >= chunk_size` or `chunk_size` is zero.
    pub fn chunker(&self) -> Result<Chunker> {
        Ok(Chunker::new(self.chunk_size, self.chunk_overlap)?)
    }
}
