//! End-to-end tests for `compute_architecture_graph` over in-memory trees.

mod common;

use archgraph_core::{
    build_full_graph, compute_architecture_graph, GraphOptions, Language, LanguageFilter,
    MemoryTree, NodeType,
};
use common::{assert_well_formed, edge_weight, node_ids};
use pretty_assertions::assert_eq;

fn options(node_cap: usize, min_weight: u32) -> GraphOptions {
    GraphOptions {
        node_cap,
        min_weight,
        ..GraphOptions::default()
    }
}

fn python_triangle() -> MemoryTree {
    MemoryTree::new()
        .with_file("a.py", "import b\n")
        .with_file("b.py", "import os\n")
        .with_file("c.py", "import b\n")
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_python_scenario_full_graph() {
    let graph = build_full_graph(&python_triangle(), &GraphOptions::default()).unwrap();

    let mut ids: Vec<String> = graph.iter_nodes().map(|n| n.id.clone()).collect();
    ids.sort();
    assert_eq!(ids, vec!["a.py", "b.py", "c.py", "stdlib:os"]);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.edge_weight("a.py", "b.py"), Some(1));
    assert_eq!(graph.edge_weight("b.py", "stdlib:os"), Some(1));
    assert_eq!(graph.edge_weight("c.py", "b.py"), Some(1));
}

#[test]
fn test_python_scenario_reduced_equals_full() {
    let reduced = compute_architecture_graph(&python_triangle(), &options(20, 1)).unwrap();
    assert_well_formed(&reduced);

    assert_eq!(node_ids(&reduced), vec!["b.py", "a.py", "c.py", "stdlib:os"]);
    assert_eq!(reduced.edges.len(), 3);
    assert_eq!(edge_weight(&reduced, "a.py", "b.py"), Some(1));
    assert_eq!(edge_weight(&reduced, "b.py", "stdlib:os"), Some(1));
    assert_eq!(edge_weight(&reduced, "c.py", "b.py"), Some(1));

    assert_eq!(reduced.stats.node_count, 4);
    assert_eq!(reduced.stats.edge_count, 3);
    assert_eq!(reduced.stats.internal_node_count, 3);
    assert_eq!(reduced.stats.external_node_count, 1);
}

#[test]
fn test_python_scenario_min_weight_two_drops_all_edges() {
    let reduced = compute_architecture_graph(&python_triangle(), &options(20, 2)).unwrap();
    assert!(reduced.edges.is_empty());
    assert_eq!(reduced.nodes.len(), 4);
    assert_eq!(reduced.stats.edge_count, 3);
}

#[test]
fn test_lodash_deep_and_root_imports_share_one_node() {
    let tree = MemoryTree::new()
        .with_file("src/a.js", "import { map } from 'lodash/fp';\n")
        .with_file("src/b.js", "const _ = require('lodash');\n")
        .with_file(
            "package.json",
            r#"{"name": "demo", "dependencies": {"lodash": "^4.17.21"}}"#,
        );
    let reduced = compute_architecture_graph(&tree, &options(20, 1)).unwrap();
    assert_well_formed(&reduced);

    let lodash: Vec<_> = reduced
        .nodes
        .iter()
        .filter(|n| n.node_type == NodeType::External)
        .collect();
    assert_eq!(lodash.len(), 1);
    assert_eq!(lodash[0].id, "npm:lodash");
    assert_eq!(lodash[0].label, "lodash");
    assert_eq!(lodash[0].meta.package_manager.as_deref(), Some("npm"));
    assert_eq!(lodash[0].meta.package_version.as_deref(), Some("^4.17.21"));

    let incoming: u32 = reduced
        .edges
        .iter()
        .filter(|e| e.target == "npm:lodash")
        .map(|e| e.weight)
        .sum();
    assert_eq!(incoming, 2);
    assert_eq!(edge_weight(&reduced, "src/a.js", "npm:lodash"), Some(1));
    assert_eq!(edge_weight(&reduced, "src/b.js", "npm:lodash"), Some(1));
}

#[test]
fn test_repeated_imports_collapse_into_weight() {
    let tree = MemoryTree::new()
        .with_file(
            "src/app.ts",
            "import { a } from './util';\nimport { b } from './util';\nimport type { C } from './util';\n",
        )
        .with_file("src/util.ts", "export const a = 1;\n");
    let reduced = compute_architecture_graph(&tree, &options(20, 1)).unwrap();
    assert_eq!(reduced.edges.len(), 1);
    assert_eq!(edge_weight(&reduced, "src/app.ts", "src/util.ts"), Some(3));
}

#[test]
fn test_self_import_yields_no_edge() {
    let tree = MemoryTree::new()
        .with_file("src/self.js", "import x from './self';\nimport y from './other';\n")
        .with_file("src/other.js", "export default 1;\n");
    let graph = build_full_graph(&tree, &options(20, 1)).unwrap();
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edge_weight("src/self.js", "src/self.js"), None);
    assert_eq!(graph.edge_weight("src/self.js", "src/other.js"), Some(1));
}

// ============================================================================
// Multi-language repositories
// ============================================================================

fn polyglot() -> MemoryTree {
    MemoryTree::new()
        .with_file("go.mod", "module github.com/acme/shop\n\nrequire github.com/spf13/cobra v1.8.0\n")
        .with_file(
            "cmd/shop/main.go",
            "package main\n\nimport (\n\t\"fmt\"\n\t\"github.com/acme/shop/internal/store\"\n\t\"github.com/spf13/cobra\"\n)\n",
        )
        .with_file("internal/store/store.go", "package store\n\nimport \"database/sql\"\n")
        .with_file("web/src/index.ts", "import React from 'react';\nimport { api } from './api';\n")
        .with_file("web/src/api.ts", "import axios from 'axios';\n")
        .with_file("web/package.json", r#"{"dependencies": {"react": "18.2.0", "axios": "1.6.0"}}"#)
        .with_file("scripts/report.py", "import json\nfrom requests import get\n")
}

#[test]
fn test_polyglot_repository_resolution() {
    let graph = build_full_graph(&polyglot(), &options(20, 1)).unwrap();

    assert_eq!(graph.edge_weight("cmd/shop/main.go", "internal/store"), Some(1));
    assert_eq!(graph.edge_weight("cmd/shop/main.go", "gostd:fmt"), Some(1));
    assert_eq!(
        graph.edge_weight("cmd/shop/main.go", "go:github.com/spf13/cobra"),
        Some(1)
    );
    assert_eq!(graph.edge_weight("internal/store/store.go", "gostd:database"), Some(1));
    assert_eq!(graph.edge_weight("web/src/index.ts", "web/src/api.ts"), Some(1));
    assert_eq!(graph.edge_weight("web/src/index.ts", "npm:react"), Some(1));
    assert_eq!(graph.edge_weight("scripts/report.py", "stdlib:json"), Some(1));
    assert_eq!(graph.edge_weight("scripts/report.py", "pypi:requests"), Some(1));

    let cobra = graph.get_node("go:github.com/spf13/cobra").unwrap();
    assert_eq!(cobra.meta.package_version.as_deref(), Some("v1.8.0"));
    let react = graph.get_node("npm:react").unwrap();
    assert_eq!(react.meta.package_version.as_deref(), Some("18.2.0"));

    let store = graph.get_node("internal/store").unwrap();
    assert_eq!(store.node_type, NodeType::Internal);
    assert_eq!(store.meta.language, Some(Language::Go));
}

#[test]
fn test_language_filter_restricts_view() {
    let options = GraphOptions {
        language_filter: LanguageFilter::Only(Language::TypeScript),
        ..options(20, 1)
    };
    let reduced = compute_architecture_graph(&polyglot(), &options).unwrap();
    assert_well_formed(&reduced);

    let mut ids = node_ids(&reduced);
    ids.sort();
    assert_eq!(ids, vec!["npm:axios", "npm:react", "web/src/api.ts", "web/src/index.ts"]);
    assert_eq!(reduced.edges.len(), 3);
    // stats still describe every language
    assert!(reduced.stats.node_count > 4);
}

#[test]
fn test_exclude_patterns_skip_files() {
    let options = GraphOptions {
        exclude_patterns: vec!["scripts/**".to_string()],
        ..options(20, 1)
    };
    let graph = build_full_graph(&polyglot(), &options).unwrap();
    assert!(!graph.contains_node("scripts/report.py"));
    assert!(!graph.contains_node("pypi:requests"));
}

#[test]
fn test_unreadable_file_is_skipped() {
    let tree = python_triangle().with_unreadable("d.py");
    let reduced = compute_architecture_graph(&tree, &options(20, 1)).unwrap();
    assert!(!node_ids(&reduced).contains(&"d.py"));
    assert_eq!(reduced.stats.node_count, 4);
}
