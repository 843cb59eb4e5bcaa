//! Graph Reducer / Ranker
//!
//! Bounds a full [`ArchGraph`] for presentation. Nodes are ranked by degree
//! within their partition (internal, external) and the top of each partition
//! is kept; edges below the minimum weight or touching a dropped node are
//! removed and the rest capped, heaviest first. Statistics always describe
//! the full graph.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::graph::{ArchGraph, Edge, GraphStats, Node};
use crate::language::LanguageFilter;

/// Minimum nodes kept per partition, whatever the cap.
const MIN_PER_PARTITION: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceOptions {
    pub node_cap: usize,
    pub min_weight: u32,
    pub max_edges: usize,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            node_cap: 200,
            min_weight: 2,
            max_edges: 400,
        }
    }
}

impl ReduceOptions {
    /// Nodes kept from each of the internal and external partitions.
    pub fn per_partition(&self) -> usize {
        (self.node_cap / 2).max(MIN_PER_PARTITION)
    }
}

/// The bounded graph handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedGraph {
    /// Kept internal nodes in rank order, then kept external nodes
    pub nodes: Vec<Node>,
    /// Heaviest first
    pub edges: Vec<Edge>,
    /// Counts over the full graph
    pub stats: GraphStats,
}

impl ReducedGraph {
    /// Restrict the view to one language family.
    ///
    /// Keeps internal nodes of that family and external nodes from its
    /// companion ecosystems, plus the edges between them. Stats are left
    /// describing the full graph.
    pub fn filter_language(mut self, filter: LanguageFilter) -> Self {
        let LanguageFilter::Only(language) = filter else {
            return self;
        };
        let family = language.family();
        let prefixes: Vec<String> = language
            .companion_ecosystems()
            .iter()
            .map(|eco| format!("{}:", eco.as_str()))
            .collect();

        self.nodes.retain(|node| {
            if node.is_internal() {
                node.meta.language.map(|l| l.family()) == Some(family)
            } else {
                prefixes.iter().any(|p| node.id.starts_with(p.as_str()))
            }
        });
        let kept: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let edges = std::mem::take(&mut self.edges)
            .into_iter()
            .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
            .collect();
        self.edges = edges;
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the compact JSON encoding, hex encoded.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_json()?.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Reduce with the default edge cap.
pub fn reduce(graph: &ArchGraph, node_cap: usize, min_weight: u32) -> ReducedGraph {
    reduce_with(
        graph,
        &ReduceOptions {
            node_cap,
            min_weight,
            ..ReduceOptions::default()
        },
    )
}

pub fn reduce_with(graph: &ArchGraph, options: &ReduceOptions) -> ReducedGraph {
    let degrees = graph.degrees();
    let degree_of = |node: &Node| degrees.get(node.id.as_str()).copied().unwrap_or(0);
    let rank = |nodes: &mut Vec<&Node>| {
        nodes.sort_by(|a, b| {
            Reverse(degree_of(a))
                .cmp(&Reverse(degree_of(b)))
                .then_with(|| a.id.cmp(&b.id))
        });
        nodes.truncate(options.per_partition());
    };

    let (mut internal, mut external): (Vec<&Node>, Vec<&Node>) =
        graph.iter_nodes().partition(|n| n.is_internal());
    rank(&mut internal);
    rank(&mut external);

    let nodes: Vec<Node> = internal.into_iter().chain(external).cloned().collect();
    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut edges: Vec<Edge> = graph
        .iter_edges()
        .filter(|e| e.weight >= options.min_weight)
        .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
        .collect();
    edges.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.target.cmp(&b.target))
    });
    edges.truncate(options.max_edges);

    ReducedGraph {
        nodes,
        edges,
        stats: graph.stats(),
    }
}
