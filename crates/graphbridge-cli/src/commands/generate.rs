//! Generate command - Create RDG datasets

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use graphbridge_config::ConfigOverrides;
use graphbridge_core::datasets::ManifestChecker;
use graphbridge_core::rdg;

use super::verify::generate_cleaned;
use super::{print_info, CommandContext};
use crate::progress::{finish_spinner, spinner};

/// Dataset generators
#[derive(Subcommand, Debug)]
pub enum GenerateCommand {
    /// Generate a cleaned R-MAT graph and store it as a dataset
    Rmat(RmatArgs),
}

/// Arguments for `generate rmat`
#[derive(Args, Debug)]
pub struct RmatArgs {
    /// Dataset directory name under the dataset root
    name: String,

    /// log2 of the node count
    #[arg(long)]
    scale: Option<u32>,

    /// Edges generated per node
    #[arg(long)]
    edge_factor: Option<u32>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Overwrite an existing dataset
    #[arg(long, short = 'f')]
    force: bool,

    /// Regenerate the dataset manifest afterwards
    #[arg(long)]
    update_manifest: bool,
}

/// Execute the generate command
pub fn execute(cmd: GenerateCommand, ctx: CommandContext) -> Result<()> {
    match cmd {
        GenerateCommand::Rmat(args) => execute_rmat(args, ctx),
    }
}

fn execute_rmat(args: RmatArgs, mut ctx: CommandContext) -> Result<()> {
    if args.name.is_empty() || args.name.contains(['/', '\\']) {
        anyhow::bail!("Invalid dataset name '{}'", args.name);
    }

    ctx.apply_overrides(&ConfigOverrides {
        scale: args.scale,
        edge_factor: args.edge_factor,
        seed: args.seed,
        ..Default::default()
    })?;
    let quiet = ctx.quiet();
    let config = &ctx.config;

    let dataset_dir = config.dataset_root(&ctx.repo_root).join(&args.name);
    if dataset_dir.exists() && !args.force {
        anyhow::bail!(
            "Dataset '{}' already exists at {} (use --force to overwrite)",
            args.name,
            dataset_dir.display()
        );
    }

    let graph = generate_cleaned(&config.generator, quiet)?;

    let pb = spinner(&format!("Writing dataset '{}'...", args.name), quiet);
    rdg::save(&dataset_dir, &graph)
        .with_context(|| format!("Failed to write dataset to {}", dataset_dir.display()))?;
    finish_spinner(
        pb,
        &format!(
            "Wrote '{}': {} nodes, {} edges",
            args.name,
            graph.num_nodes(),
            graph.num_edges()
        ),
    );

    if args.update_manifest {
        let checker = ManifestChecker::with_paths(
            &ctx.repo_root,
            &config.datasets.root,
            &config.datasets.manifest,
        );
        checker
            .fix()
            .context("Failed to regenerate dataset manifest")?;
        print_info(
            &format!("Updated {}", checker.manifest_path().display()),
            quiet,
        );
    } else {
        print_info(
            "Run 'graphbridge datasets fix' to register the new dataset",
            quiet,
        );
    }

    Ok(())
}
