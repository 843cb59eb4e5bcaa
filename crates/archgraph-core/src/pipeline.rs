//! Architecture graph pipeline.
//!
//! Collector → Detectors → Resolver → Builder → Reducer. Every stage is a
//! pure transformation of the previous stage's output; nothing survives the
//! call.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::builder::GraphBuilder;
use crate::collector::{collect, Collection, CollectionError, CollectorConfig, RepoTree};
use crate::detect::{detect, RawReference};
use crate::graph::ArchGraph;
use crate::index::RepoIndex;
use crate::language::LanguageFilter;
use crate::reduce::{reduce_with, ReduceOptions, ReducedGraph};
use crate::resolve::Resolver;

pub const MAX_FILES_LIMIT: usize = 10_000;
pub const MIN_NODE_CAP: usize = 20;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("Invalid option {name}: {message}")]
    InvalidOption { name: &'static str, message: String },
}

impl PipelineError {
    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        PipelineError::InvalidOption {
            name,
            message: message.into(),
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options for one architecture graph computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    /// Hard cap on analyzed source files (1 to 10000)
    pub max_files: usize,
    pub language_filter: LanguageFilter,
    /// Edges lighter than this are not rendered (at least 1)
    pub min_weight: u32,
    /// Rendered node budget, split between internal and external (at least 20)
    pub node_cap: usize,
    pub max_edges: usize,
    pub max_files_per_dir: Option<usize>,
    pub exclude_patterns: Vec<String>,
    pub fetch_concurrency: Option<usize>,
    pub max_file_size_kb: u64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            max_files: 3000,
            language_filter: LanguageFilter::All,
            min_weight: 2,
            node_cap: 200,
            max_edges: 400,
            max_files_per_dir: Some(20),
            exclude_patterns: Vec::new(),
            fetch_concurrency: None,
            max_file_size_kb: 1024,
        }
    }
}

impl GraphOptions {
    /// Reject out-of-range options.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(1..=MAX_FILES_LIMIT).contains(&self.max_files) {
            return Err(PipelineError::invalid(
                "max_files",
                format!("must be between 1 and {}, got {}", MAX_FILES_LIMIT, self.max_files),
            ));
        }
        if self.min_weight < 1 {
            return Err(PipelineError::invalid("min_weight", "must be at least 1"));
        }
        if self.node_cap < MIN_NODE_CAP {
            return Err(PipelineError::invalid(
                "node_cap",
                format!("must be at least {}, got {}", MIN_NODE_CAP, self.node_cap),
            ));
        }
        if self.max_edges == 0 {
            return Err(PipelineError::invalid("max_edges", "must be at least 1"));
        }
        if self.max_files_per_dir == Some(0) {
            return Err(PipelineError::invalid("max_files_per_dir", "must be at least 1"));
        }
        if self.fetch_concurrency == Some(0) {
            return Err(PipelineError::invalid("fetch_concurrency", "must be at least 1"));
        }
        if self.max_file_size_kb == 0 {
            return Err(PipelineError::invalid("max_file_size_kb", "must be at least 1"));
        }
        for pattern in &self.exclude_patterns {
            if let Err(e) = globset::Glob::new(pattern) {
                return Err(PipelineError::invalid("exclude_patterns", e.to_string()));
            }
        }
        Ok(())
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            max_files: self.max_files,
            max_files_per_dir: self.max_files_per_dir,
            exclude_patterns: self.exclude_patterns.clone(),
            max_file_size_bytes: self.max_file_size_kb.saturating_mul(1024),
            fetch_concurrency: self.fetch_concurrency,
            ..CollectorConfig::default()
        }
    }

    pub fn reduce_options(&self) -> ReduceOptions {
        ReduceOptions {
            node_cap: self.node_cap,
            min_weight: self.min_weight,
            max_edges: self.max_edges,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Collect, detect, resolve and accumulate the full graph of `repo`.
pub fn build_full_graph(
    repo: &dyn RepoTree,
    options: &GraphOptions,
) -> Result<ArchGraph, PipelineError> {
    options.validate()?;
    let collection = collect(repo, &options.collector_config())?;
    Ok(graph_from_collection(&collection))
}

fn graph_from_collection(collection: &Collection) -> ArchGraph {
    let index = RepoIndex::build(&collection.files, &collection.manifests);
    let resolver = Resolver::new(&index);

    let references: Vec<Vec<RawReference>> =
        collection.files.par_iter().map(detect).collect();
    let reference_count: usize = references.iter().map(Vec::len).sum();
    info!(
        "Detected {} references in {} files",
        reference_count,
        collection.files.len()
    );

    let mut builder = GraphBuilder::new();
    for file in &collection.files {
        builder.add_file(file);
    }
    for reference in references.iter().flatten() {
        builder.add_reference(reference, &resolver);
    }
    debug!(
        "Resolved {} references, dropped {}",
        builder.resolved_count(),
        builder.dropped_count()
    );

    let graph = builder.finish();
    let stats = graph.stats();
    info!(
        "Built graph: {} nodes ({} internal, {} external), {} edges",
        stats.node_count, stats.internal_node_count, stats.external_node_count, stats.edge_count
    );
    graph
}

/// Compute the reduced architecture graph of `repo`.
pub fn compute_architecture_graph(
    repo: &dyn RepoTree,
    options: &GraphOptions,
) -> Result<ReducedGraph, PipelineError> {
    let graph = build_full_graph(repo, options)?;
    let reduced = reduce_with(&graph, &options.reduce_options())
        .filter_language(options.language_filter);
    info!(
        "Reduced graph to {} nodes and {} edges",
        reduced.nodes.len(),
        reduced.edges.len()
    );
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MemoryTree;

    #[test]
    fn test_default_options_are_valid() {
        assert!(GraphOptions::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_options_rejected() {
        let cases = [
            GraphOptions { max_files: 0, ..Default::default() },
            GraphOptions { max_files: 10_001, ..Default::default() },
            GraphOptions { min_weight: 0, ..Default::default() },
            GraphOptions { node_cap: 19, ..Default::default() },
            GraphOptions { max_edges: 0, ..Default::default() },
            GraphOptions { max_files_per_dir: Some(0), ..Default::default() },
            GraphOptions { exclude_patterns: vec!["src/[".to_string()], ..Default::default() },
        ];
        for options in cases {
            assert!(
                matches!(options.validate(), Err(PipelineError::InvalidOption { .. })),
                "{:?} should be rejected",
                options
            );
        }
    }

    #[test]
    fn test_invalid_option_checked_before_collection() {
        let tree = MemoryTree::new();
        let options = GraphOptions { node_cap: 5, ..Default::default() };
        assert!(matches!(
            compute_architecture_graph(&tree, &options),
            Err(PipelineError::InvalidOption { name: "node_cap", .. })
        ));
    }

    #[test]
    fn test_empty_tree_is_collection_error() {
        let tree = MemoryTree::new().with_file("README.md", "# hi");
        let result = compute_architecture_graph(&tree, &GraphOptions::default());
        assert!(matches!(
            result,
            Err(PipelineError::Collection(CollectionError::NoSupportedSource { .. }))
        ));
    }

    #[test]
    fn test_collector_config_carries_options() {
        let options = GraphOptions {
            max_files: 50,
            max_files_per_dir: None,
            max_file_size_kb: 2,
            exclude_patterns: vec!["**/*.test.ts".to_string()],
            ..Default::default()
        };
        let config = options.collector_config();
        assert_eq!(config.max_files, 50);
        assert_eq!(config.max_files_per_dir, None);
        assert_eq!(config.max_file_size_bytes, 2048);
        assert_eq!(config.exclude_patterns, vec!["**/*.test.ts".to_string()]);
        assert!(config.exclude_dirs.contains("node_modules"));
    }
}
