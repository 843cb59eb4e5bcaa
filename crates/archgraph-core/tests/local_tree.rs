//! Integration tests over checkouts on disk.

mod common;

use std::fs;
use std::path::Path;

use archgraph_core::{
    compute_architecture_graph, CollectionError, GraphOptions, LocalTree, PipelineError,
};
use common::{assert_well_formed, edge_weight, node_ids};
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
}

fn options() -> GraphOptions {
    GraphOptions {
        node_cap: 20,
        min_weight: 1,
        ..GraphOptions::default()
    }
}

#[test]
fn test_local_checkout_end_to_end() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "Cargo.toml", "[package]\nname = \"demo\"\n\n[dependencies]\nserde = \"1.0\"\n");
    write(root, "src/lib.rs", "pub mod config;\nuse serde::Serialize;\n");
    write(root, "src/config.rs", "use crate::Error;\nuse std::path::PathBuf;\n");
    write(root, "target/debug/build.rs", "use ignored::Thing;\n");

    let tree = LocalTree::new(root).unwrap();
    let reduced = compute_architecture_graph(&tree, &options()).unwrap();
    assert_well_formed(&reduced);

    let ids = node_ids(&reduced);
    assert!(!ids.contains(&"target/debug/build.rs"));
    assert_eq!(edge_weight(&reduced, "src/lib.rs", "src/config.rs"), Some(1));
    assert_eq!(edge_weight(&reduced, "src/config.rs", "src/lib.rs"), Some(1));
    assert_eq!(edge_weight(&reduced, "src/lib.rs", "crates:serde"), Some(1));
    assert_eq!(edge_weight(&reduced, "src/config.rs", "rust-std:std"), Some(1));

    let serde = reduced.node("crates:serde").unwrap();
    assert_eq!(serde.meta.package_manager.as_deref(), Some("cargo"));
    assert_eq!(serde.meta.package_version.as_deref(), Some("1.0"));
}

#[test]
fn test_ignore_files_are_honoured() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, ".gitignore", "generated/\n");
    write(root, ".archgraphignore", "legacy/\n");
    write(root, "app/main.py", "import generated.models\nimport legacy.old\n");
    write(root, "generated/models.py", "");
    write(root, "legacy/old.py", "");

    let tree = LocalTree::new(root).unwrap();
    let reduced = compute_architecture_graph(&tree, &options()).unwrap();
    let ids = node_ids(&reduced);
    assert!(ids.contains(&"app/main.py"));
    assert!(!ids.contains(&"generated/models.py"));
    assert!(!ids.contains(&"legacy/old.py"));
    // no longer in the repository index, so the imports look external
    assert!(ids.contains(&"pypi:generated"));
}

#[test]
fn test_repository_without_sources() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "README.md", "# nothing here\n");
    write(temp.path(), "logo.png", "\u{0}PNG");

    let tree = LocalTree::new(temp.path()).unwrap();
    let result = compute_architecture_graph(&tree, &options());
    assert!(matches!(
        result,
        Err(PipelineError::Collection(CollectionError::NoSupportedSource { .. }))
    ));
}

#[test]
fn test_missing_root_rejected() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("does-not-exist");
    assert!(matches!(
        LocalTree::new(&missing),
        Err(CollectionError::RootNotFound(_))
    ));
}
