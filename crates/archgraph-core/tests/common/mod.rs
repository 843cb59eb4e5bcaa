//! Common test utilities for integration tests.
//!
//! Invariant checks shared by the pipeline and property tests.

#![allow(dead_code)]

use std::collections::HashSet;

use archgraph_core::{ArchGraph, ReducedGraph};

/// Every edge endpoint is a node, weights are positive, no self-loops, ids
/// are unique.
pub fn assert_well_formed(graph: &ReducedGraph) {
    let mut ids = HashSet::new();
    for node in &graph.nodes {
        assert!(ids.insert(node.id.as_str()), "duplicate node id {}", node.id);
    }
    let mut pairs = HashSet::new();
    for edge in &graph.edges {
        assert!(ids.contains(edge.source.as_str()), "dangling source {}", edge.source);
        assert!(ids.contains(edge.target.as_str()), "dangling target {}", edge.target);
        assert_ne!(edge.source, edge.target, "self-loop on {}", edge.source);
        assert!(edge.weight >= 1, "zero weight edge {:?}", edge);
        assert!(
            pairs.insert((edge.source.as_str(), edge.target.as_str())),
            "duplicate edge {:?}",
            edge
        );
    }
}

/// Same checks on the full graph.
pub fn assert_full_graph_well_formed(graph: &ArchGraph) {
    for edge in graph.iter_edges() {
        assert!(graph.contains_node(&edge.source), "dangling source {}", edge.source);
        assert!(graph.contains_node(&edge.target), "dangling target {}", edge.target);
        assert_ne!(edge.source, edge.target);
        assert!(edge.weight >= 1);
    }
}

pub fn node_ids(graph: &ReducedGraph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}

pub fn edge_weight(graph: &ReducedGraph, source: &str, target: &str) -> Option<u32> {
    graph
        .edges
        .iter()
        .find(|e| e.source == source && e.target == target)
        .map(|e| e.weight)
}
