//! Stats command - Show dataset statistics

use anyhow::{Context, Result};
use clap::Args;
use graphbridge_core::rdg::RdgStore;

use super::CommandContext;

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Dataset directory name under the dataset root
    name: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the stats command
pub fn execute(args: StatsArgs, ctx: CommandContext) -> Result<()> {
    let dataset_dir = ctx.config.dataset_root(&ctx.repo_root).join(&args.name);

    let stats = RdgStore::open(&dataset_dir)
        .and_then(|store| store.stats())
        .with_context(|| format!("Failed to read dataset '{}'", args.name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Dataset {}", args.name);
    println!("========================\n");
    println!("  Path:           {}", dataset_dir.display());
    println!("  Schema version: {}", stats.schema_version);
    println!("  Nodes:          {}", stats.num_nodes);
    println!("  Edges:          {}", stats.num_edges);

    println!("\n  Node properties:");
    if stats.node_properties.is_empty() {
        println!("    (none)");
    }
    for property in &stats.node_properties {
        println!("    {}: {}", property.name, property.data_type);
    }

    println!("\n  Edge properties:");
    if stats.edge_properties.is_empty() {
        println!("    (none)");
    }
    for property in &stats.edge_properties {
        println!("    {}: {}", property.name, property.data_type);
    }

    Ok(())
}
