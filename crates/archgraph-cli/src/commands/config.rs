//! Config command - View and manage configuration
//!
//! - List effective configuration with the source of each value
//! - Get a single value by dotted key
//! - Create default configuration files
//! - Show configuration file paths

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use archgraph_config::{ArchConfig, ConfigLoader};
use clap::Subcommand;
use serde::Serialize;

use super::load_config;
use crate::GlobalOptions;

/// Config management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// List all configuration values with their sources
    List(ListArgs),

    /// Get a specific configuration value
    Get(GetArgs),

    /// Write a default configuration file
    Init(InitArgs),

    /// Show configuration file paths
    Path(PathArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Checkout whose local configuration is read
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Configuration key (e.g., "graph.node_cap")
    key: String,

    /// Checkout whose local configuration is read
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Write ~/.archgraph/config.toml instead of the checkout's file
    #[arg(long)]
    global: bool,

    /// Checkout receiving `.archgraph/config.toml`
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Checkout whose local configuration path is shown
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Configuration value with source information
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigValue {
    pub key: String,
    pub value: serde_json::Value,
    /// default, global, local or file
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigPaths {
    pub global: Option<PathBuf>,
    pub local: PathBuf,
    pub global_exists: bool,
    pub local_exists: bool,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, global: GlobalOptions) -> Result<()> {
    match cmd {
        ConfigCommand::List(args) => execute_list(args, global),
        ConfigCommand::Get(args) => execute_get(args, global),
        ConfigCommand::Init(args) => execute_init(args, global),
        ConfigCommand::Path(args) => execute_path(args),
    }
}

fn execute_list(args: ListArgs, global: GlobalOptions) -> Result<()> {
    let effective = load_config(&global, Some(args.root.as_path()), None)?;
    crate::init_logging(&global, &effective.logging)?;

    let values = match global.config {
        Some(_) => {
            let file = serde_json::to_value(&effective)?;
            let default = serde_json::to_value(ArchConfig::default())?;
            let mut values = Vec::new();
            flatten_config("", &file, &file, &default, &mut values);
            for value in values.iter_mut().filter(|v| v.source == "local") {
                value.source = "file".to_string();
            }
            values
        }
        None => {
            let mut loader = ConfigLoader::new();
            let global_config = loader.load_global()?.unwrap_or_default();
            let local_config = loader.load_local(&args.root)?.unwrap_or_default();
            collect_config_values(&effective, &global_config, &local_config)?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    println!("archgraph Configuration");
    println!("=======================\n");
    let mut section = "";
    for value in &values {
        let (head, key) = value.key.split_once('.').unwrap_or(("", value.key.as_str()));
        if head != section {
            if !section.is_empty() {
                println!();
            }
            println!("[{}]", head);
            section = head;
        }
        let marker = if value.source == "default" {
            String::new()
        } else {
            format!("  ({})", value.source)
        };
        println!("{} = {}{}", key, value.value, marker);
    }
    Ok(())
}

fn execute_get(args: GetArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global, Some(args.root.as_path()), None)?;
    crate::init_logging(&global, &config.logging)?;

    let value = get_config_value(&config, &args.key)
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", args.key))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        match value {
            serde_json::Value::String(s) => println!("{}", s),
            other => println!("{}", other),
        }
    }
    Ok(())
}

fn execute_init(args: InitArgs, global: GlobalOptions) -> Result<()> {
    let loader = ConfigLoader::new();
    let path = if args.global {
        loader.init_global()?
    } else {
        loader
            .init_local(&args.root)
            .with_context(|| format!("Failed to initialize {}", args.root.display()))?
    };
    super::print_info(&format!("Configuration at {}", path.display()), global.quiet);
    Ok(())
}

fn execute_path(args: PathArgs) -> Result<()> {
    let paths = config_paths(&ConfigLoader::new(), &args.root);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    println!("Configuration Paths");
    println!("===================\n");
    let status = |exists: bool| if exists { "exists" } else { "not found" };
    match paths.global {
        Some(ref gp) => println!("Global: {} ({})", gp.display(), status(paths.global_exists)),
        None => println!("Global: not available (no home directory)"),
    }
    println!("Local:  {} ({})", paths.local.display(), status(paths.local_exists));
    Ok(())
}

fn config_paths(loader: &ConfigLoader, root: &Path) -> ConfigPaths {
    let global = loader.global_config_path();
    let local = loader.local_config_path(root);
    ConfigPaths {
        global_exists: global.as_ref().is_some_and(|p| p.exists()),
        local_exists: local.exists(),
        global,
        local,
    }
}

/// Get a configuration value by dotted key path
fn get_config_value(config: &ArchConfig, key: &str) -> Option<serde_json::Value> {
    let json = serde_json::to_value(config).ok()?;
    key.split('.')
        .try_fold(&json, |current, part| current.get(part))
        .cloned()
}

fn collect_config_values(
    effective: &ArchConfig,
    global: &ArchConfig,
    local: &ArchConfig,
) -> Result<Vec<ConfigValue>> {
    let effective = serde_json::to_value(effective)?;
    let global = serde_json::to_value(global)?;
    let local = serde_json::to_value(local)?;
    let default = serde_json::to_value(ArchConfig::default())?;

    let mut values = Vec::new();
    flatten_config("", &effective, &local, &global, &mut values);
    for value in &mut values {
        if value.source == "default" && lookup(&default, &value.key) != Some(&value.value) {
            value.source = "global".to_string();
        }
    }
    Ok(values)
}

fn lookup<'a>(json: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Flatten `effective` into dotted keys; a value equal to the local file's
/// non-default entry is attributed to the local file.
fn flatten_config(
    prefix: &str,
    effective: &serde_json::Value,
    local: &serde_json::Value,
    global: &serde_json::Value,
    values: &mut Vec<ConfigValue>,
) {
    match effective {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                let local_val = local.get(key).unwrap_or(&serde_json::Value::Null);
                let global_val = global.get(key).unwrap_or(&serde_json::Value::Null);
                flatten_config(&new_prefix, value, local_val, global_val, values);
            }
        }
        _ => {
            let source = if effective == local && local != global {
                "local"
            } else {
                "default"
            };
            values.push(ConfigValue {
                key: prefix.to_string(),
                value: effective.clone(),
                source: source.to_string(),
            });
        }
    }
}
