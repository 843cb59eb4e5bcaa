//! archgraph CLI - Architecture graphs of source repositories
//!
//! Collects the source files of a checkout, resolves their imports and prints
//! the reduced dependency graph.
//!
//! # Usage
//!
//! ```bash
//! # Reduced graph of the current directory as JSON
//! archgraph graph .
//!
//! # Shallow-clone a GitHub repository and summarize it
//! archgraph stats tokio-rs/axum --top 15
//!
//! # Only the Python part of a polyglot repository
//! archgraph graph ../monorepo --language python --min-weight 1 --pretty
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use archgraph_config::{LogFormat, LoggingConfig};
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod progress;

/// archgraph - Import graphs of source repositories
#[derive(Parser, Debug)]
#[command(name = "archgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Path to a configuration file (replaces the global and local files)
    #[arg(long, short = 'c', global = true, env = "ARCHGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Log format on stderr (text, json)
    #[arg(long, global = true, env = "ARCHGRAPH_LOG_FORMAT", value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format '{}' (expected text or json)", other)),
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the reduced architecture graph as JSON
    Graph(commands::graph::GraphArgs),

    /// Summarize the architecture graph
    Stats(commands::stats::StatsArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

/// Install the stderr subscriber.
///
/// `--quiet` and `--verbose` win over the configured level.
fn init_logging(global: &GlobalOptions, logging: &LoggingConfig) -> Result<()> {
    let level = if global.quiet {
        Level::ERROR
    } else if global.verbose {
        Level::DEBUG
    } else {
        Level::from_str(&logging.level).unwrap_or(Level::INFO)
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    match global.log_format.unwrap_or(logging.format) {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.json().finish())?;
        }
        LogFormat::Text => {
            tracing::subscriber::set_global_default(builder.with_ansi(true).finish())?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Graph(args) => commands::graph::execute(args, cli.global),
        Commands::Stats(args) => commands::stats::execute(args, cli.global),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_graph_command() {
        let cli = Cli::try_parse_from([
            "archgraph",
            "-q",
            "graph",
            "tokio-rs/axum",
            "--node-cap",
            "40",
            "-e",
            "docs/**",
            "-e",
            "benches/**",
        ])
        .unwrap();
        assert!(cli.global.quiet);
        match cli.command {
            Commands::Graph(args) => {
                assert_eq!(args.target, "tokio-rs/axum");
                assert_eq!(args.flags.node_cap, Some(40));
                assert_eq!(args.flags.exclude.len(), 2);
                assert!(!args.pretty);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_log_format() {
        let cli = Cli::try_parse_from(["archgraph", "--log-format", "JSON", "stats", "."]).unwrap();
        assert_eq!(cli.global.log_format, Some(LogFormat::Json));
        assert!(Cli::try_parse_from(["archgraph", "--log-format", "xml", "stats", "."]).is_err());
    }

    #[test]
    fn test_parse_config_subcommand() {
        let cli = Cli::try_parse_from(["archgraph", "config", "get", "graph.min_weight"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(_)));
        assert!(Cli::try_parse_from(["archgraph", "config"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
