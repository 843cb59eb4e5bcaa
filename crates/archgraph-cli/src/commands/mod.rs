//! CLI command implementations

pub mod config;
pub mod graph;
pub mod stats;

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use archgraph_config::{ArchConfig, ConfigLoader, ConfigOverrides};
use archgraph_core::{compute_architecture_graph, LocalTree, ReducedGraph};
use regex::Regex;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

use crate::progress::Stage;
use crate::GlobalOptions;

/// `owner/name` as accepted by GitHub.
static REMOTE_TARGET: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/([A-Za-z0-9._-]+?)(?:\.git)?$").ok()
});

const CLONE_BASE_URL: &str = "https://github.com";

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("'{0}' is neither an existing directory nor an owner/name repository")]
    Unrecognized(String),

    #[error("git clone of {url} failed: {message}")]
    Clone { url: String, message: String },
}

/// A repository to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Local(PathBuf),
    Remote { owner: String, name: String },
}

impl Target {
    /// Existing directories win over `owner/name` lookalikes.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let path = Path::new(raw);
        if path.is_dir() {
            return Ok(Target::Local(path.to_path_buf()));
        }
        let captures = REMOTE_TARGET.as_ref().and_then(|re| re.captures(raw));
        match captures {
            Some(c) => Ok(Target::Remote {
                owner: c[1].to_string(),
                name: c[2].to_string(),
            }),
            None => Err(TargetError::Unrecognized(raw.to_string())),
        }
    }

    pub fn clone_url(&self) -> Option<String> {
        match self {
            Target::Local(_) => None,
            Target::Remote { owner, name } => {
                Some(format!("{}/{}/{}.git", CLONE_BASE_URL, owner, name))
            }
        }
    }
}

/// A checkout on disk; remote clones are removed on drop.
pub struct Checkout {
    pub root: PathBuf,
    _clone_dir: Option<TempDir>,
}

impl Checkout {
    pub fn open(target: &Target, quiet: bool) -> Result<Self> {
        match target {
            Target::Local(path) => Ok(Self {
                root: path
                    .canonicalize()
                    .with_context(|| format!("Failed to open {}", path.display()))?,
                _clone_dir: None,
            }),
            Target::Remote { .. } => {
                let url = target.clone_url().unwrap_or_default();
                let dir = TempDir::new().context("Failed to create clone directory")?;
                let root = dir.path().join("repo");

                let stage = Stage::start(format!("Cloning {}", url), quiet);
                let output = Command::new("git")
                    .args(["clone", "--depth", "1", "--quiet", &url])
                    .arg(&root)
                    .output()
                    .context("Failed to run git")?;
                if !output.status.success() {
                    stage.fail(format!("Clone of {} failed", url));
                    return Err(TargetError::Clone {
                        url,
                        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                    }
                    .into());
                }
                stage.done(format!("Cloned {}", url));
                debug!("Cloned {} into {}", url, root.display());

                Ok(Self {
                    root,
                    _clone_dir: Some(dir),
                })
            }
        }
    }
}

/// Graph options shared by `graph` and `stats`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GraphFlags {
    /// Maximum source files analyzed (1-10000)
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Maximum files taken from one directory (0 = unlimited)
    #[arg(long)]
    pub max_files_per_dir: Option<usize>,

    /// Rendered node budget, split between internal and external nodes
    #[arg(long)]
    pub node_cap: Option<usize>,

    /// Lightest edge weight rendered
    #[arg(long)]
    pub min_weight: Option<u32>,

    /// Maximum rendered edges
    #[arg(long)]
    pub max_edges: Option<usize>,

    /// Restrict the view to one language (e.g. python, typescript)
    #[arg(long, short = 'l')]
    pub language: Option<String>,

    /// Glob of paths to skip (repeatable)
    #[arg(long = "exclude", short = 'e')]
    pub exclude: Vec<String>,
}

impl GraphFlags {
    pub fn to_config_overrides(&self, global: &GlobalOptions) -> ConfigOverrides {
        ConfigOverrides {
            max_files: self.max_files,
            max_files_per_dir: self.max_files_per_dir,
            node_cap: self.node_cap,
            min_weight: self.min_weight,
            max_edges: self.max_edges,
            language: self.language.clone(),
            exclude_patterns: self.exclude.clone(),
            log_level: None,
            log_format: global.log_format,
        }
    }
}

/// Load configuration with optional config file override.
pub fn load_config(
    global: &GlobalOptions,
    root: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<ArchConfig> {
    if let Some(ref config_path) = global.config {
        return ConfigLoader::load_file(config_path, overrides)
            .with_context(|| format!("Failed to load config file {}", config_path.display()));
    }

    ConfigLoader::new()
        .load(root, overrides)
        .context("Failed to load configuration")
}

/// Open the target, load its configuration and compute the reduced graph.
pub fn analyze(raw_target: &str, flags: &GraphFlags, global: &GlobalOptions) -> Result<ReducedGraph> {
    let target = Target::parse(raw_target)?;
    let overrides = flags.to_config_overrides(global);

    // Logging needs the configuration, which needs a local checkout's root.
    let local_root = match &target {
        Target::Local(path) => Some(path.as_path()),
        Target::Remote { .. } => None,
    };
    let config = load_config(global, local_root, Some(&overrides))?;
    crate::init_logging(global, &config.logging)?;
    let options = config.graph_options().context("Invalid graph options")?;

    let checkout = Checkout::open(&target, global.quiet)?;
    let tree = LocalTree::new(&checkout.root)
        .with_context(|| format!("Failed to open {}", checkout.root.display()))?;

    let stage = Stage::start("Building architecture graph...", global.quiet);
    let reduced = match compute_architecture_graph(&tree, &options) {
        Ok(reduced) => reduced,
        Err(e) => {
            stage.fail("Analysis failed");
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to analyze {}", checkout.root.display())));
        }
    };
    stage.done(format!(
        "Graph ready: {} of {} nodes, {} of {} edges",
        reduced.nodes.len(),
        reduced.stats.node_count,
        reduced.edges.len(),
        reduced.stats.edge_count
    ));
    info!("Analyzed {}", checkout.root.display());
    Ok(reduced)
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
