//! Normalized ingestion feed and corpus assembly.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_store::{Chunker, Document, DocumentStore, KnowledgeGraph, Metadata, Triple, VectorIndex};

use crate::embed::Embedder;
use crate::error::{Result, RetrievalError};
use crate::synthesis::display_value;

const UNSTRUCTURED_FILE: &str = "unstructured_ingestion.json";
const TRIPLES_FILE: &str = "knowledge_graph_triples.json";
const NON_ENTITY_FILES: [&str; 5] = [
    TRIPLES_FILE,
    UNSTRUCTURED_FILE,
    "triples_structured.json",
    "triples_unstructured.json",
    "triples_semi_structured.json",
];

/// An attributed entity such as an employee or client row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default)]
    pub attributes: Metadata,
    /// Any other top-level fields, kept in document metadata.
    #[serde(flatten)]
    pub extra: Metadata,
}

impl EntityRecord {
    /// `"Entity: {type} ({id}) | Data: k: v, ..."` over every attribute.
    #[must_use]
    pub fn to_text(&self) -> String {
        let data: Vec<String> = self
            .attributes
            .iter()
            .map(|(k, v)| format!("{k}: {}", display_value(Some(v))))
            .collect();
        format!(
            "Entity: {} ({}) | Data: {}",
            self.entity_type,
            display_value(Some(&self.entity_id)),
            data.join(", ")
        )
    }
}

/// One normalized record of the ingestion feed.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Text { source_name: String, content: String },
    Entity(EntityRecord),
    Triple(Triple),
}

#[derive(Deserialize)]
struct UnstructuredRecord {
    source_name: String,
    attributes: UnstructuredAttributes,
}

#[derive(Deserialize)]
struct UnstructuredAttributes {
    content: String,
}

/// Document store and knowledge graph built from one feed.
#[derive(Debug, Clone)]
pub struct Corpus {
    chunker: Chunker,
    documents: DocumentStore,
    graph: KnowledgeGraph,
}

impl Corpus {
    #[must_use]
    pub fn new(chunker: Chunker) -> Self {
        Self {
            chunker,
            documents: DocumentStore::new(),
            graph: KnowledgeGraph::new(),
        }
    }

    /// Ingest `records` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity record cannot be converted to metadata.
    pub fn build<I>(records: I, chunker: Chunker) -> Result<Self>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut corpus = Self::new(chunker);
        for record in records {
            corpus.add(record)?;
        }
        tracing::info!(
            chunk_size = corpus.chunker.size(),
            chunk_overlap = corpus.chunker.overlap(),
            documents = corpus.documents.len(),
            nodes = corpus.graph.node_count(),
            edges = corpus.graph.edge_count(),
            "corpus built"
        );
        Ok(corpus)
    }

    /// Materialize one record as documents, and as a graph edge for triples.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity record cannot be converted to metadata.
    pub fn add(&mut self, record: Record) -> Result<()> {
        match record {
            Record::Text {
                source_name,
                content,
            } => {
                for (i, chunk) in self.chunker.chunk(&content).into_iter().enumerate() {
                    let mut meta = Metadata::new();
                    meta.insert("source_name".into(), source_name.clone().into());
                    meta.insert("record_kind".into(), "text".into());
                    let text = format!("Source: {source_name} (Part {}) | Content: {chunk}", i + 1);
                    self.documents.append(text, meta, Some(i));
                }
            }
            Record::Entity(entity) => {
                let text = entity.to_text();
                let meta = match serde_json::to_value(&entity)? {
                    Value::Object(map) => map,
                    _ => Metadata::new(),
                };
                self.documents.push(Document::new(text, meta));
            }
            Record::Triple(triple) => {
                self.graph.add_triple(&triple);
                self.documents
                    .push(Document::new(triple.to_text(), triple.to_metadata()));
            }
        }
        Ok(())
    }

    /// Embed every document in position order.
    ///
    /// An empty corpus yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails or the embedder changes dimension.
    pub fn embed<E: Embedder + ?Sized>(&self, embedder: &E) -> Result<VectorIndex> {
        let mut index = VectorIndex::new();
        for (row, text) in self.documents.texts().enumerate() {
            let vector = embedder.embed(text)?;
            index
                .add(&vector)
                .map_err(|e| RetrievalError::Embedding(format!("document {row}: {e}")))?;
        }
        tracing::info!(
            vectors = index.len(),
            dimension = index.dimension().unwrap_or(0),
            "corpus embedded"
        );
        Ok(index)
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
    pub fn into_parts(self) -> (DocumentStore, KnowledgeGraph) {
        (self.documents, self.graph)
    }
}

/// Read a directory of normalized JSON feed files.
///
/// Records come back as free text from `unstructured_ingestion.json`, then
/// entities from every other `*.json` file in file-name order, then triples from
/// `knowledge_graph_triples.json`. Per-extraction triple files are ignored.
///
/// # Errors
///
/// Returns an error if the directory or a feed file cannot be read or parsed.
pub fn load_output_dir(dir: &Path) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    let unstructured = dir.join(UNSTRUCTURED_FILE);
    if unstructured.exists() {
        let rows: Vec<UnstructuredRecord> = read_json(&unstructured)?;
        records.extend(rows.into_iter().map(|r| Record::Text {
            source_name: r.source_name,
            content: r.attributes.content,
        }));
    }

    let mut entity_files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".json") && !NON_ENTITY_FILES.contains(&name) {
            entity_files.push(path);
        }
    }
    entity_files.sort();
    for path in entity_files {
        let rows: Vec<EntityRecord> = read_json(&path)?;
        tracing::debug!(file = %path.display(), records = rows.len(), "entity feed loaded");
        records.extend(rows.into_iter().map(Record::Entity));
    }

    let triples = dir.join(TRIPLES_FILE);
    if triples.exists() {
        let rows: Vec<Triple> = read_json(&triples)?;
        records.extend(rows.into_iter().map(Record::Triple));
    }

    Ok(records)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
