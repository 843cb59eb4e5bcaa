//! archgraph Core - Architecture graph extraction from source repositories
//!
//! This crate turns a repository tree into a bounded, weighted dependency
//! graph of internal modules and external packages:
//! - File collection over a local checkout or an in-memory tree
//! - Line-oriented import detection for the major language ecosystems
//! - Reference resolution against a repository index and package manifests
//! - Weighted graph accumulation on a petgraph `StableGraph`
//! - Degree-ranked reduction for presentation, with full-graph statistics

/// Declare a lazily compiled regex. Compilation failure yields `None`.
macro_rules! pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: std::sync::LazyLock<Option<regex::Regex>> =
            std::sync::LazyLock::new(|| regex::Regex::new($regex_str).ok());
    };
}

pub mod builder;
pub mod collector;
pub mod detect;
pub mod graph;
pub mod index;
pub mod language;
pub mod manifest;
pub mod pipeline;
pub mod reduce;
pub mod resolve;

// Re-exports for convenience
pub use builder::GraphBuilder;
pub use collector::{
    collect, Collection, CollectionError, CollectorConfig, FetchError, LocalTree, MemoryTree,
    RepoTree, SourceFile,
};
pub use detect::{detect, Detector, RawReference, ReferenceKind};
pub use graph::{ArchGraph, Edge, GraphStats, Node, NodeMeta, NodeType};
pub use index::RepoIndex;
pub use language::{Ecosystem, Language, LanguageFilter};
pub use manifest::{ManifestError, ManifestInfo, ManifestKind};
pub use pipeline::{
    build_full_graph, compute_architecture_graph, GraphOptions, PipelineError,
};
pub use reduce::{reduce, reduce_with, ReduceOptions, ReducedGraph};
pub use resolve::{NodeId, Resolver, Target};
