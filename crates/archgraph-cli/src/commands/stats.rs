//! Stats command - human-readable summary of the architecture graph

use anyhow::Result;
use archgraph_core::{Node, ReducedGraph};
use serde::Serialize;

use super::{analyze, GraphFlags};
use crate::GlobalOptions;

/// Arguments for the stats command
#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    /// Directory or GitHub `owner/name` to analyze
    pub target: String,

    #[command(flatten)]
    pub flags: GraphFlags,

    /// Number of top-ranked nodes and edges listed
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    stats: &'a archgraph_core::GraphStats,
    rendered_nodes: usize,
    rendered_edges: usize,
    top_internal: Vec<&'a str>,
    top_external: Vec<&'a str>,
    heaviest_edges: Vec<&'a archgraph_core::Edge>,
}

impl<'a> Summary<'a> {
    fn new(graph: &'a ReducedGraph, top: usize) -> Self {
        let ids = |internal: bool| -> Vec<&'a str> {
            graph
                .nodes
                .iter()
                .filter(|n| n.is_internal() == internal)
                .take(top)
                .map(|n| n.id.as_str())
                .collect()
        };
        Self {
            stats: &graph.stats,
            rendered_nodes: graph.nodes.len(),
            rendered_edges: graph.edges.len(),
            top_internal: ids(true),
            top_external: ids(false),
            heaviest_edges: graph.edges.iter().take(top).collect(),
        }
    }
}

/// Execute the stats command
pub fn execute(args: StatsArgs, global: GlobalOptions) -> Result<()> {
    let reduced = analyze(&args.target, &args.flags, &global)?;
    let summary = Summary::new(&reduced, args.top);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Architecture Graph");
    println!("==================");
    println!();
    println!("Nodes: {}", reduced.stats.node_count);
    println!("  Internal: {}", reduced.stats.internal_node_count);
    println!("  External: {}", reduced.stats.external_node_count);
    println!("Edges: {}", reduced.stats.edge_count);
    println!(
        "Rendered: {} nodes, {} edges",
        summary.rendered_nodes, summary.rendered_edges
    );

    print_nodes("Top internal modules", &reduced, true, args.top);
    print_nodes("Top external packages", &reduced, false, args.top);

    if !summary.heaviest_edges.is_empty() {
        println!();
        println!("Heaviest edges:");
        for edge in &summary.heaviest_edges {
            println!("  {:>4}  {} -> {}", edge.weight, edge.source, edge.target);
        }
    }
    Ok(())
}

fn print_nodes(title: &str, graph: &ReducedGraph, internal: bool, top: usize) {
    let nodes: Vec<&Node> = graph
        .nodes
        .iter()
        .filter(|n| n.is_internal() == internal)
        .take(top)
        .collect();
    if nodes.is_empty() {
        return;
    }
    println!();
    println!("{}:", title);
    for node in nodes {
        match (&node.meta.language, &node.meta.package_version) {
            (_, Some(version)) => println!("  {} ({})", node.label, version),
            (Some(language), None) if internal => println!("  {} [{}]", node.id, language),
            _ => println!("  {}", node.label),
        }
    }
}
