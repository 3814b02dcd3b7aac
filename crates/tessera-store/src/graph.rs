//! Directed multi-graph of subject–relation–object triples.

use std::collections::HashMap;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::document::Metadata;

/// A subject–relation–object fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triple {
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }

    /// `"subject relation object"`, the form embedded for retrieval.
    #[must_use]
    pub fn to_text(&self) -> String {
        format!("{} {} {}", self.subject, self.relation, self.object)
    }

    /// Metadata carried by the document materialized from this triple.
    #[must_use]
    pub fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.insert("subject".into(), self.subject.clone().into());
        meta.insert("relation".into(), self.relation.clone().into());
        meta.insert("object".into(), self.object.clone().into());
        meta
    }

    /// Recover a triple from document metadata that has all three keys as strings.
    #[must_use]
    pub fn from_metadata(meta: &Metadata) -> Option<Self> {
        let field = |key: &str| meta.get(key).and_then(serde_json::Value::as_str);
        Some(Self::new(
            field("subject")?,
            field("relation")?,
            field("object")?,
        ))
    }
}

/// Knowledge graph keyed by entity name.
///
/// Nodes are created on first reference. Parallel edges are kept, including
/// exact duplicates.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, String>,
    nodes: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, subject: &str, relation: &str, object: &str) {
        let from = self.node(subject);
        let to = self.node(object);
        self.graph.add_edge(from, to, relation.to_owned());
    }

    pub fn add_triple(&mut self, triple: &Triple) {
        self.add_edge(&triple.subject, &triple.relation, &triple.object);
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_owned());
        self.nodes.insert(name.to_owned(), idx);
        idx
    }

    /// All edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> Vec<Triple> {
        self.graph
            .edge_references()
            .map(|e| self.triple_of(e.source(), e.weight(), e.target()))
            .collect()
    }

    /// Edges leaving `subject`, in insertion order.
    #[must_use]
    pub fn outgoing(&self, subject: &str) -> Vec<Triple> {
        let Some(&from) = self.nodes.get(subject) else {
            return Vec::new();
        };
        self.graph
            .edge_references()
            .filter(|e| e.source() == from)
            .map(|e| self.triple_of(e.source(), e.weight(), e.target()))
            .collect()
    }

    fn triple_of(&self, from: NodeIndex, relation: &str, to: NodeIndex) -> Triple {
        Triple::new(
            self.graph[from].as_str(),
            relation,
            self.graph[to].as_str(),
        )
    }

    #[must_use]
    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Graphviz DOT source for an external renderer.
    #[must_use]
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}
