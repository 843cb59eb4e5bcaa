//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.archgraph/config.toml`
//! 2. Local config: `.archgraph/config.toml` (in the analyzed checkout)
//! 3. CLI overrides
//!
//! Later sources override earlier ones. A field left at its default in a
//! later file does not override an earlier file.

use crate::error::ConfigError;
use crate::{AnalysisConfig, ArchConfig, ConfigOverrides, GraphConfig, LoggingConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name (under the home directory).
const GLOBAL_CONFIG_DIR: &str = ".archgraph";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".archgraph";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.archgraph`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<ArchConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.archgraph`).
    pub fn new() -> Self {
        Self {
            global_config_dir: dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR)),
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    pub fn local_config_path(&self, root: &Path) -> PathBuf {
        root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a checkout with optional CLI overrides.
    ///
    /// `root` is `None` when the analyzed tree has no local configuration
    /// (a fresh clone, for instance).
    pub fn load(
        &mut self,
        root: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<ArchConfig, ConfigError> {
        let mut config = ArchConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(root) = root {
            if let Some(local_config) = self.load_local(root)? {
                config = merge_configs(config, local_config);
            }
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a single file in place of the global and local configuration.
    pub fn load_file(
        path: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<ArchConfig, ConfigError> {
        let mut config = load_config_file(path)?;
        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<ArchConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;
        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration of a checkout.
    pub fn load_local(&self, root: &Path) -> Result<Option<ArchConfig>, ConfigError> {
        let local_path = self.local_config_path(root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    pub fn save_local(&self, root: &Path, config: &ArchConfig) -> Result<(), ConfigError> {
        save_config_file(&self.local_config_path(root), config)
    }

    /// Create `~/.archgraph/config.toml` with default configuration.
    ///
    /// An existing file is left untouched.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };
        init_config_file(&global_dir.join(CONFIG_FILE_NAME))
    }

    /// Create `.archgraph/config.toml` under `root` with default configuration.
    ///
    /// An existing file is left untouched.
    pub fn init_local(&self, root: &Path) -> Result<PathBuf, ConfigError> {
        init_config_file(&self.local_config_path(root))
    }

    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

fn init_config_file(path: &Path) -> Result<PathBuf, ConfigError> {
    if !path.exists() {
        save_config_file(path, &ArchConfig::default())?;
    }
    Ok(path.to_path_buf())
}

fn load_config_file(path: &Path) -> Result<ArchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

fn save_config_file(path: &Path, config: &ArchConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
fn merge_configs(base: ArchConfig, overlay: ArchConfig) -> ArchConfig {
    ArchConfig {
        analysis: merge_analysis(base.analysis, overlay.analysis),
        graph: merge_graph(base.graph, overlay.graph),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Pick `overlay` unless it still holds the default.
fn pick<T: PartialEq>(base: T, overlay: T, default: T) -> T {
    if overlay != default {
        overlay
    } else {
        base
    }
}

fn merge_analysis(base: AnalysisConfig, overlay: AnalysisConfig) -> AnalysisConfig {
    let defaults = AnalysisConfig::default();
    AnalysisConfig {
        max_files: pick(base.max_files, overlay.max_files, defaults.max_files),
        max_files_per_dir: pick(
            base.max_files_per_dir,
            overlay.max_files_per_dir,
            defaults.max_files_per_dir,
        ),
        max_file_size_kb: pick(
            base.max_file_size_kb,
            overlay.max_file_size_kb,
            defaults.max_file_size_kb,
        ),
        // overlay patterns extend base patterns
        exclude_patterns: {
            let mut patterns = base.exclude_patterns;
            for pattern in overlay.exclude_patterns {
                if !patterns.contains(&pattern) {
                    patterns.push(pattern);
                }
            }
            patterns
        },
        parallelism: pick(base.parallelism, overlay.parallelism, defaults.parallelism),
    }
}

fn merge_graph(base: GraphConfig, overlay: GraphConfig) -> GraphConfig {
    let defaults = GraphConfig::default();
    GraphConfig {
        node_cap: pick(base.node_cap, overlay.node_cap, defaults.node_cap),
        min_weight: pick(base.min_weight, overlay.min_weight, defaults.min_weight),
        max_edges: pick(base.max_edges, overlay.max_edges, defaults.max_edges),
        language: pick(base.language, overlay.language, defaults.language),
    }
}

fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    let defaults = LoggingConfig::default();
    LoggingConfig {
        level: pick(base.level, overlay.level, defaults.level),
        format: pick(base.format, overlay.format, defaults.format),
    }
}
