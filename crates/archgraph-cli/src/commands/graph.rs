//! Graph command - print the reduced architecture graph

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{analyze, print_info, GraphFlags};
use crate::GlobalOptions;

/// Arguments for the graph command
#[derive(clap::Args, Debug)]
pub struct GraphArgs {
    /// Directory or GitHub `owner/name` to analyze
    pub target: String,

    #[command(flatten)]
    pub flags: GraphFlags,

    /// Pretty-print the JSON
    #[arg(long)]
    pub pretty: bool,

    /// Write the JSON to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the graph fingerprint to stderr
    #[arg(long)]
    pub fingerprint: bool,
}

/// Execute the graph command
pub fn execute(args: GraphArgs, global: GlobalOptions) -> Result<()> {
    let reduced = analyze(&args.target, &args.flags, &global)?;

    let json = if args.pretty {
        reduced.to_json_pretty()
    } else {
        reduced.to_json()
    }
    .context("Failed to serialize graph")?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_info(&format!("Wrote {}", path.display()), global.quiet);
        }
        None => println!("{}", json),
    }

    if args.fingerprint {
        let fingerprint = reduced.fingerprint().context("Failed to fingerprint graph")?;
        eprintln!("fingerprint: {}", fingerprint);
    }
    Ok(())
}
