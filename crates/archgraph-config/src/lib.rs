//! archgraph Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.archgraph/config.toml`
//! - Local config: `.archgraph/config.toml` (in the analyzed checkout)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: defaults → global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use archgraph_core::pipeline::{MAX_FILES_LIMIT, MIN_NODE_CAP};
use archgraph_core::{GraphOptions, LanguageFilter};
use serde::{Deserialize, Serialize};

/// Root configuration for archgraph.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ArchConfig {
    /// Which files are analyzed
    pub analysis: AnalysisConfig,

    /// How the graph is reduced for output
    pub graph: GraphConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// File selection settings.
///
/// # Example TOML
///
/// ```toml
/// [analysis]
/// max_files = 5000
/// max_files_per_dir = 0      # no per-directory sampling
/// exclude_patterns = ["**/*.test.ts", "docs/**"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Hard cap on analyzed source files
    pub max_files: usize,

    /// Cap on files taken from one directory (0 = unlimited)
    pub max_files_per_dir: usize,

    /// Maximum file size to analyze (in KB)
    pub max_file_size_kb: u64,

    /// File patterns to exclude (glob patterns)
    pub exclude_patterns: Vec<String>,

    /// Fetch parallelism (0 = auto-detect)
    pub parallelism: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_files: 3000,
            max_files_per_dir: 20,
            max_file_size_kb: 1024,
            exclude_patterns: Vec::new(),
            parallelism: 0,
        }
    }
}

/// Reduction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GraphConfig {
    /// Rendered node budget, split between internal and external nodes
    pub node_cap: usize,

    /// Lightest edge weight kept
    pub min_weight: u32,

    /// Maximum rendered edges
    pub max_edges: usize,

    /// `all` or a language name (`python`, `typescript`, ...)
    pub language: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            node_cap: 200,
            min_weight: 2,
            max_edges: 400,
            language: "all".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_files: Option<usize>,
    pub max_files_per_dir: Option<usize>,
    pub node_cap: Option<usize>,
    pub min_weight: Option<u32>,
    pub max_edges: Option<usize>,
    pub language: Option<String>,
    /// Appended to the configured patterns
    pub exclude_patterns: Vec<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl ArchConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(max_files) = overrides.max_files {
            self.analysis.max_files = max_files;
        }

        if let Some(per_dir) = overrides.max_files_per_dir {
            self.analysis.max_files_per_dir = per_dir;
        }

        for pattern in &overrides.exclude_patterns {
            if !self.analysis.exclude_patterns.contains(pattern) {
                self.analysis.exclude_patterns.push(pattern.clone());
            }
        }

        if let Some(node_cap) = overrides.node_cap {
            self.graph.node_cap = node_cap;
        }

        if let Some(min_weight) = overrides.min_weight {
            self.graph.min_weight = min_weight;
        }

        if let Some(max_edges) = overrides.max_edges {
            self.graph.max_edges = max_edges;
        }

        if let Some(ref language) = overrides.language {
            self.graph.language = language.clone();
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }

        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    /// Validate the configuration.
    ///
    /// Checks value ranges and that the language filter names a known
    /// language.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FILES_LIMIT).contains(&self.analysis.max_files) {
            return Err(ConfigError::invalid_value(
                "analysis.max_files",
                format!("must be between 1 and {}", MAX_FILES_LIMIT),
            ));
        }
        if self.analysis.max_file_size_kb == 0 {
            return Err(ConfigError::invalid_value(
                "analysis.max_file_size_kb",
                "must be at least 1",
            ));
        }
        if self.graph.node_cap < MIN_NODE_CAP {
            return Err(ConfigError::invalid_value(
                "graph.node_cap",
                format!("must be at least {}", MIN_NODE_CAP),
            ));
        }
        if self.graph.min_weight == 0 {
            return Err(ConfigError::invalid_value("graph.min_weight", "must be at least 1"));
        }
        if self.graph.max_edges == 0 {
            return Err(ConfigError::invalid_value("graph.max_edges", "must be at least 1"));
        }
        self.language_filter()?;
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }
        Ok(())
    }

    pub fn language_filter(&self) -> Result<LanguageFilter, ConfigError> {
        self.graph
            .language
            .parse()
            .map_err(|e: String| ConfigError::invalid_value("graph.language", e))
    }

    /// Engine options described by this configuration.
    pub fn graph_options(&self) -> Result<GraphOptions, ConfigError> {
        self.validate()?;
        Ok(GraphOptions {
            max_files: self.analysis.max_files,
            language_filter: self.language_filter()?,
            min_weight: self.graph.min_weight,
            node_cap: self.graph.node_cap,
            max_edges: self.graph.max_edges,
            max_files_per_dir: (self.analysis.max_files_per_dir > 0)
                .then_some(self.analysis.max_files_per_dir),
            exclude_patterns: self.analysis.exclude_patterns.clone(),
            fetch_concurrency: (self.analysis.parallelism > 0).then_some(self.analysis.parallelism),
            max_file_size_kb: self.analysis.max_file_size_kb,
        })
    }
}
