//! Verify command - Run translation verification scenarios
//!
//! - `fixture`: forward-translate the 8-node/12-edge fixture, check it against
//!   literal expectations, then round-trip it
//! - `rdg <NAME>`: reverse-translate a stored dataset and reconcile it
//! - `rmat`: generate and clean an R-MAT graph, then reverse-translate and reconcile it

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use graphbridge_config::{ConfigOverrides, GeneratorConfig};
use graphbridge_core::{
    check_round_trip, clean, generate_rmat_with_progress, rdg, to_multigraph,
    to_multigraph_with_ids, to_property_graph, verify_forward, verify_reverse,
    weighted_directed_8_12, weighted_directed_8_12_expectations, AttributedMultigraph,
    CleanOptions, PropertyGraph, ReverseReport, TranslateOptions,
};
use serde::Serialize;
use tracing::info;

use super::{rmat_config, translate_options, CommandContext};
use crate::progress::{
    finish_progress, finish_spinner, finish_spinner_error, progress_bar, set_progress, spinner,
};

/// Verification scenarios
#[derive(Subcommand, Debug)]
pub enum VerifyCommand {
    /// Verify the forward translation of the built-in 8/12 fixture
    Fixture,

    /// Verify the reverse translation of a stored dataset
    Rdg(RdgArgs),

    /// Verify the reverse translation of a freshly generated R-MAT graph
    Rmat(RmatArgs),
}

/// Arguments for `verify rdg`
#[derive(Args, Debug)]
pub struct RdgArgs {
    /// Dataset directory name under the dataset root
    name: String,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for `verify rmat`
#[derive(Args, Debug)]
pub struct RmatArgs {
    /// log2 of the node count
    #[arg(long)]
    scale: Option<u32>,

    /// Edges generated per node
    #[arg(long)]
    edge_factor: Option<u32>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

/// Outcome of a reverse-direction scenario
#[derive(Debug, Serialize)]
struct ReverseSummary {
    source: String,
    num_nodes: usize,
    num_edges: usize,
    present_nodes: usize,
    absent_nodes: usize,
    reconciled_edges: usize,
}

/// Execute the verify command
pub fn execute(cmd: VerifyCommand, mut ctx: CommandContext) -> Result<()> {
    let options = translate_options(&ctx.config);
    let quiet = ctx.quiet();

    match cmd {
        VerifyCommand::Fixture => execute_fixture(&options, quiet),
        VerifyCommand::Rdg(args) => {
            let dataset_root = ctx.config.dataset_root(&ctx.repo_root);
            let pb = spinner(&format!("Loading dataset '{}'...", args.name), quiet);
            let graph = match rdg::load_named(&dataset_root, &args.name) {
                Ok(graph) => {
                    finish_spinner(pb, &format!("Loaded dataset '{}'", args.name));
                    graph
                }
                Err(e) => {
                    finish_spinner_error(pb, &format!("Failed to load '{}'", args.name));
                    return Err(e).with_context(|| {
                        format!(
                            "Failed to load dataset '{}' from {}",
                            args.name,
                            dataset_root.display()
                        )
                    });
                }
            };
            let summary = verify_reverse_scenario(&args.name, &graph, &options, quiet)?;
            print_summary(&summary, args.json)
        }
        VerifyCommand::Rmat(args) => {
            ctx.apply_overrides(&ConfigOverrides {
                scale: args.scale,
                edge_factor: args.edge_factor,
                seed: args.seed,
                ..Default::default()
            })?;
            let generator = &ctx.config.generator;

            let graph = generate_cleaned(generator, quiet)?;
            let source = format!(
                "rmat(scale={}, edge_factor={}, seed={})",
                generator.scale, generator.edge_factor, generator.seed
            );
            let summary = verify_reverse_scenario(&source, &graph, &options, quiet)?;
            print_summary(&summary, args.json)
        }
    }
}

fn execute_fixture(options: &TranslateOptions, quiet: bool) -> Result<()> {
    let original = weighted_directed_8_12();
    let translation =
        to_property_graph(&original, options).context("Forward translation failed")?;

    let mut expected = weighted_directed_8_12_expectations();
    if let Some((ref mut name, _, _)) = expected.edge_values {
        *name = options.edge_property.clone();
    }
    verify_forward(&translation, &expected).context("Forward verification failed")?;

    let back = to_multigraph_with_ids(&translation.graph, &translation.node_ids, options)
        .context("Reverse translation failed")?;
    check_round_trip(&original, &back).context("Round trip failed")?;

    if !quiet {
        println!("Fixture weighted_directed_8_12");
        println!("==============================\n");
        println!("  Nodes:           {}", translation.graph.num_nodes());
        println!("  Edges:           {}", translation.graph.num_edges());
        println!(
            "  Edge properties: {}",
            translation.graph.edge_schema().names().join(", ")
        );
        println!("  Forward checks:  passed");
        println!("  Round trip:      passed");
    }
    Ok(())
}

/// Generate and clean an R-MAT graph with a progress bar
pub fn generate_cleaned(
    generator: &GeneratorConfig,
    quiet: bool,
) -> Result<PropertyGraph> {
    let rmat = rmat_config(generator);
    let pb = progress_bar(rmat.num_edges() as u64, "Generating R-MAT edges", quiet);
    let raw = generate_rmat_with_progress(&rmat, |done| set_progress(&pb, done as u64))
        .context("R-MAT generation failed")?;
    finish_progress(pb);

    let clean_options = CleanOptions {
        remove_isolated_nodes: generator.remove_isolated_nodes,
        ..Default::default()
    };
    let (graph, report) = clean(&raw, &clean_options).context("Cleaning failed")?;
    info!(
        "Removed {} self-loops, {} parallel edges, {} isolated nodes",
        report.self_loops, report.parallel_edges, report.isolated_nodes
    );
    Ok(graph)
}

/// Reverse-translate `graph`, reconcile it, and round-trip the result
fn verify_reverse_scenario(
    source: &str,
    graph: &PropertyGraph,
    options: &TranslateOptions,
    quiet: bool,
) -> Result<ReverseSummary> {
    let pb = spinner("Reverse-translating...", quiet);
    let reversed = to_multigraph(graph, options).context("Reverse translation failed")?;
    let report: ReverseReport = match verify_reverse(graph, &reversed) {
        Ok(report) => {
            finish_spinner(pb, "Reverse translation verified");
            report
        }
        Err(e) => {
            finish_spinner_error(pb, "Reverse verification failed");
            return Err(e).context("Reverse verification failed");
        }
    };

    round_trip(&reversed, options)?;

    Ok(ReverseSummary {
        source: source.to_string(),
        num_nodes: graph.num_nodes(),
        num_edges: graph.num_edges(),
        present_nodes: report.nodes.present,
        absent_nodes: report.nodes.absent,
        reconciled_edges: report.reconciled_edges,
    })
}

/// Multigraph → property graph → multigraph must reproduce `multigraph`
fn round_trip(multigraph: &AttributedMultigraph, options: &TranslateOptions) -> Result<()> {
    let translation =
        to_property_graph(multigraph, options).context("Forward translation failed")?;
    let back = to_multigraph_with_ids(&translation.graph, &translation.node_ids, options)
        .context("Reverse translation failed")?;
    check_round_trip(multigraph, &back).context("Round trip failed")?;
    Ok(())
}

fn print_summary(summary: &ReverseSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("Reverse verification: {}", summary.source);
    println!("========================\n");
    println!("  Nodes:            {}", summary.num_nodes);
    println!("  Edges:            {}", summary.num_edges);
    println!("  Present nodes:    {}", summary.present_nodes);
    println!("  Absent nodes:     {}", summary.absent_nodes);
    println!("  Reconciled edges: {}", summary.reconciled_edges);
    println!("  Round trip:       passed");
    Ok(())
}
