//! Graph Builder
//!
//! Accumulates resolved references into an [`ArchGraph`]. The builder is the
//! single writer: detection may run in parallel, but references are folded in
//! here one at a time. Accumulation is commutative, so the resulting graph
//! does not depend on the order references arrive in.
//!
//! ## Usage
//!
//! ```ignore
//! use archgraph_core::{GraphBuilder, RepoIndex, Resolver};
//!
//! let index = RepoIndex::build(&files, &manifests);
//! let resolver = Resolver::new(&index);
//! let mut builder = GraphBuilder::new();
//! for reference in &references {
//!     builder.add_reference(reference, &resolver);
//! }
//! let graph = builder.finish();
//! ```

use tracing::debug;

use crate::collector::SourceFile;
use crate::detect::RawReference;
use crate::graph::{ArchGraph, Node, NodeMeta};
use crate::language::Language;
use crate::resolve::{Resolver, Target};

#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ArchGraph,
    resolved: usize,
    dropped: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collected file as an internal node, whether or not it imports
    /// anything.
    pub fn add_file(&mut self, file: &SourceFile) {
        self.add_internal(&file.path, file.language);
    }

    fn add_internal(&mut self, id: &str, language: Language) {
        self.graph.upsert_node(Node::internal(id, Some(language)));
    }

    /// Resolve one reference and count it. Returns whether an edge was
    /// recorded.
    pub fn add_reference(&mut self, reference: &RawReference, resolver: &Resolver<'_>) -> bool {
        let Some(target) = resolver.resolve(reference) else {
            debug!(
                "Dropped reference {:?} in {}:{}",
                reference.raw_token, reference.from_file, reference.line
            );
            self.dropped += 1;
            return false;
        };

        let Some(source_language) = resolver
            .index()
            .language_of(&reference.from_file)
            .or_else(|| Language::from_path(&reference.from_file))
        else {
            self.dropped += 1;
            return false;
        };
        self.add_internal(&reference.from_file, source_language);

        let target_id = target.node_id();
        let node = match target {
            Target::Internal { id, language } => Node::internal(id, Some(language)),
            Target::External {
                ecosystem, package, ..
            } => {
                let meta = NodeMeta {
                    language: Some(ecosystem.language()),
                    package_manager: ecosystem.package_manager().map(String::from),
                    package_version: resolver.package_version(
                        &reference.from_file,
                        ecosystem,
                        &package,
                    ),
                    package_name: Some(package.clone()),
                };
                Node::external(target_id.as_str(), package, meta)
            }
        };
        self.graph.upsert_node(node);

        if self
            .graph
            .add_reference(&reference.from_file, &target_id)
            .is_some()
        {
            self.resolved += 1;
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// References that produced an edge so far.
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// References that resolved to nothing or to their own file.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn finish(self) -> ArchGraph {
        self.graph
    }
}

/// Build the full graph for `files` and their `references`.
pub fn build<'r>(
    files: &[SourceFile],
    references: impl IntoIterator<Item = &'r RawReference>,
    resolver: &Resolver<'_>,
) -> ArchGraph {
    let mut builder = GraphBuilder::new();
    for file in files {
        builder.add_file(file);
    }
    for reference in references {
        builder.add_reference(reference, resolver);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ReferenceKind;
    use crate::index::RepoIndex;
    use crate::manifest;
    use crate::graph::NodeType;

    fn file(path: &str) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            language: Language::from_path(path).unwrap(),
            content: String::new(),
        }
    }

    fn reference(from: &str, token: &str) -> RawReference {
        RawReference {
            from_file: from.to_string(),
            raw_token: token.to_string(),
            kind: ReferenceKind::Import,
            line: 1,
        }
    }

    #[test]
    fn test_python_scenario() {
        let files = vec![file("a.py"), file("b.py"), file("c.py")];
        let index = RepoIndex::build(&files, &[]);
        let resolver = Resolver::new(&index);
        let references = vec![
            reference("a.py", "b"),
            reference("b.py", "c"),
            reference("c.py", "os"),
        ];
        let graph = build(&files, &references, &resolver);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edge_weight("a.py", "b.py"), Some(1));
        assert_eq!(graph.edge_weight("b.py", "c.py"), Some(1));
        assert_eq!(graph.edge_weight("c.py", "stdlib:os"), Some(1));

        let os = graph.get_node("stdlib:os").unwrap();
        assert_eq!(os.node_type, NodeType::External);
        assert_eq!(os.label, "os");
        assert_eq!(os.meta.package_manager, None);
        assert_eq!(os.meta.language, Some(Language::Python));
    }

    #[test]
    fn test_isolated_files_become_nodes() {
        let files = vec![file("main.go"), file("util.go")];
        let index = RepoIndex::build(&files, &[]);
        let graph = build(&files, &[], &Resolver::new(&index));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_external_meta_carries_declared_version() {
        let files = vec![file("src/a.js"), file("src/b.js")];
        let package_json =
            manifest::parse("package.json", r#"{"dependencies": {"lodash": "^4.17.21"}}"#)
                .unwrap();
        let index = RepoIndex::build(&files, &[package_json]);
        let resolver = Resolver::new(&index);
        let references = vec![
            reference("src/a.js", "lodash/fp"),
            reference("src/b.js", "lodash"),
        ];
        let graph = build(&files, &references, &resolver);

        let lodash = graph.get_node("npm:lodash").unwrap();
        assert_eq!(lodash.meta.package_name.as_deref(), Some("lodash"));
        assert_eq!(lodash.meta.package_version.as_deref(), Some("^4.17.21"));
        assert_eq!(lodash.meta.language, Some(Language::JavaScript));
        assert_eq!(graph.edge_weight("src/a.js", "npm:lodash"), Some(1));
        assert_eq!(graph.edge_weight("src/b.js", "npm:lodash"), Some(1));
        assert_eq!(graph.degree("npm:lodash"), 2);
    }

    #[test]
    fn test_dropped_references_counted() {
        let files = vec![file("pkg/models.py")];
        let index = RepoIndex::build(&files, &[]);
        let resolver = Resolver::new(&index);
        let mut builder = GraphBuilder::new();
        assert!(!builder.add_reference(&reference("pkg/models.py", ".models"), &resolver));
        assert!(!builder.add_reference(&reference("pkg/models.py", "...up"), &resolver));
        assert!(builder.add_reference(&reference("pkg/models.py", "json"), &resolver));
        assert_eq!(builder.dropped_count(), 2);
        assert_eq!(builder.resolved_count(), 1);
    }

    #[test]
    fn test_accumulation_is_order_independent() {
        let files = vec![file("a.py"), file("b.py")];
        let index = RepoIndex::build(&files, &[]);
        let resolver = Resolver::new(&index);
        let forward = vec![
            reference("a.py", "b"),
            reference("a.py", "b"),
            reference("b.py", "requests"),
        ];
        let backward: Vec<_> = forward.iter().rev().cloned().collect();

        let left = build(&files, &forward, &resolver);
        let right = build(&files, &backward, &resolver);
        let mut left_edges: Vec<_> = left.iter_edges().collect();
        let mut right_edges: Vec<_> = right.iter_edges().collect();
        left_edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        right_edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        assert_eq!(left_edges, right_edges);
        assert_eq!(left.edge_weight("a.py", "b.py"), Some(2));
    }
}
