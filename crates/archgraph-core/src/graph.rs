//! Architecture Graph Model
//!
//! Nodes are internal modules (repository paths, Go package directories,
//! declared namespaces) and external packages (`"{ecosystem}:{package}"`).
//! Edges carry the number of references between their endpoints.
//!
//! `ArchGraph` stores the graph in a petgraph `StableGraph` with a string-id
//! index map. It is the full graph; see [`crate::reduce`] for the bounded
//! presentation form.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::language::Language;

// ============================================================================
// Node Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A module of the analyzed repository
    Internal,
    /// A package from an ecosystem outside the repository
    External,
}

/// Optional node metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_version: Option<String>,
}

impl NodeMeta {
    pub fn is_empty(&self) -> bool {
        self.language.is_none()
            && self.package_manager.is_none()
            && self.package_name.is_none()
            && self.package_version.is_none()
    }

    /// Fill fields missing here from `other`.
    ///
    /// Conflicting versions keep the lexicographically smallest, so the result
    /// does not depend on merge order.
    pub fn merge(&mut self, other: NodeMeta) {
        if self.language.is_none() {
            self.language = other.language;
        }
        if self.package_manager.is_none() {
            self.package_manager = other.package_manager;
        }
        if self.package_name.is_none() {
            self.package_name = other.package_name;
        }
        self.package_version = match (self.package_version.take(), other.package_version) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}

/// A node in the architecture graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "NodeMeta::is_empty")]
    pub meta: NodeMeta,
}

impl Node {
    /// An internal module node labelled with its id.
    pub fn internal(id: impl Into<String>, language: Option<Language>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            node_type: NodeType::Internal,
            meta: NodeMeta {
                language,
                ..NodeMeta::default()
            },
        }
    }

    /// An external package node labelled with its package name.
    pub fn external(id: impl Into<String>, package: impl Into<String>, meta: NodeMeta) -> Self {
        Self {
            id: id.into(),
            label: package.into(),
            node_type: NodeType::External,
            meta,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.node_type == NodeType::Internal
    }
}

/// A weighted edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Number of references from source to target, at least 1
    pub weight: u32,
}

/// Counts over the full graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub internal_node_count: usize,
    pub external_node_count: usize,
}

// ============================================================================
// ArchGraph
// ============================================================================

/// Full architecture graph backed by petgraph.
///
/// At most one node per id and one edge per ordered pair; repeated
/// references raise the edge weight. Self-loops are refused.
#[derive(Debug, Clone, Default)]
pub struct ArchGraph {
    graph: StableGraph<Node, u32, petgraph::Directed>,

    /// Map from node ID to petgraph NodeIndex for O(1) lookup
    node_index_map: HashMap<String, NodeIndex>,
}

impl ArchGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Node Operations
    // ------------------------------------------------------------------------

    /// Insert `node`, or merge its metadata into the existing node with the
    /// same id. Returns the node's index.
    pub fn upsert_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.node_index_map.get(&node.id) {
            if let Some(existing) = self.graph.node_weight_mut(idx) {
                existing.meta.merge(node.meta);
            }
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index_map.insert(id, idx);
        idx
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.node_index_map
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index_map.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    // ------------------------------------------------------------------------
    // Edge Operations
    // ------------------------------------------------------------------------

    /// Count one reference from `source_id` to `target_id`.
    ///
    /// Returns `None` for self-loops or when either node is missing.
    pub fn add_reference(&mut self, source_id: &str, target_id: &str) -> Option<EdgeIndex> {
        if source_id == target_id {
            return None;
        }
        let source = *self.node_index_map.get(source_id)?;
        let target = *self.node_index_map.get(target_id)?;
        if let Some(edge) = self.graph.find_edge(source, target) {
            if let Some(weight) = self.graph.edge_weight_mut(edge) {
                *weight += 1;
            }
            return Some(edge);
        }
        Some(self.graph.add_edge(source, target, 1))
    }

    /// Weight of the edge between two nodes, if any.
    pub fn edge_weight(&self, source_id: &str, target_id: &str) -> Option<u32> {
        let source = *self.node_index_map.get(source_id)?;
        let target = *self.node_index_map.get(target_id)?;
        let edge = self.graph.find_edge(source, target)?;
        self.graph.edge_weight(edge).copied()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().filter_map(move |edge_ref| {
            let source = self.graph.node_weight(edge_ref.source())?;
            let target = self.graph.node_weight(edge_ref.target())?;
            Some(Edge {
                source: source.id.clone(),
                target: target.id.clone(),
                weight: *edge_ref.weight(),
            })
        })
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Number of distinct edges touching the node, in and out.
    pub fn degree(&self, id: &str) -> usize {
        let Some(&idx) = self.node_index_map.get(id) else {
            return 0;
        };
        self.graph.edges_directed(idx, Direction::Incoming).count()
            + self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Degree of every node, keyed by id.
    pub fn degrees(&self) -> HashMap<&str, usize> {
        self.graph
            .node_indices()
            .filter_map(|idx| {
                let node = self.graph.node_weight(idx)?;
                let degree = self.graph.edges_directed(idx, Direction::Incoming).count()
                    + self.graph.edges_directed(idx, Direction::Outgoing).count();
                Some((node.id.as_str(), degree))
            })
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let internal_node_count = self.iter_nodes().filter(|n| n.is_internal()).count();
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            internal_node_count,
            external_node_count: self.node_count() - internal_node_count,
        }
    }
}
