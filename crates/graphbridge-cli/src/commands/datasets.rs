//! Datasets command - Keep the test-dataset manifest in sync
//!
//! - `check`: fail if the manifest does not list exactly the dataset directories
//! - `fix`: regenerate the manifest
//! - `list`: show the discovered datasets and their manifest entries

use anyhow::{Context, Result};
use clap::Subcommand;
use graphbridge_core::datasets::{discover_datasets, DatasetError, ManifestChecker};
use serde::Serialize;

use super::{print_info, CommandContext};
use crate::progress::{finish_spinner, finish_spinner_error, spinner};

/// Dataset manifest commands
#[derive(Subcommand, Debug)]
pub enum DatasetsCommand {
    /// Verify the manifest matches the dataset directories
    Check,

    /// Regenerate the manifest from the dataset directories
    Fix,

    /// List discovered datasets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// A discovered dataset as listed by `datasets list`
#[derive(Debug, Serialize)]
struct DatasetEntry {
    name: String,
    var_name: String,
    definition: String,
}

/// Execute the datasets command
pub fn execute(cmd: DatasetsCommand, ctx: CommandContext) -> Result<()> {
    let checker = ManifestChecker::with_paths(
        &ctx.repo_root,
        &ctx.config.datasets.root,
        &ctx.config.datasets.manifest,
    );

    match cmd {
        DatasetsCommand::Check => execute_check(&checker, ctx.quiet()),
        DatasetsCommand::Fix => execute_fix(&checker, ctx.quiet()),
        DatasetsCommand::List { json } => execute_list(&checker, json),
    }
}

fn execute_check(checker: &ManifestChecker, quiet: bool) -> Result<()> {
    let pb = spinner("Checking dataset manifest...", quiet);

    match checker.check() {
        Ok(()) => {
            finish_spinner(
                pb,
                &format!("{} is up to date", checker.manifest_path().display()),
            );
            Ok(())
        }
        Err(DatasetError::OutOfDate {
            path,
            missing,
            unexpected,
        }) => {
            finish_spinner_error(pb, &format!("{} is out of date", path.display()));
            for line in &missing {
                eprintln!("  + {}", line);
            }
            for line in &unexpected {
                eprintln!("  - {}", line);
            }
            anyhow::bail!(
                "Dataset manifest is out of date ({} missing, {} unexpected); run 'graphbridge datasets fix'",
                missing.len(),
                unexpected.len()
            )
        }
        Err(e) => {
            finish_spinner_error(pb, "Dataset manifest check failed");
            Err(e).context("Failed to check dataset manifest")
        }
    }
}

fn execute_fix(checker: &ManifestChecker, quiet: bool) -> Result<()> {
    let changed = checker
        .fix()
        .context("Failed to regenerate dataset manifest")?;

    let state = if changed { "Updated" } else { "Unchanged" };
    print_info(
        &format!("{} {}", state, checker.manifest_path().display()),
        quiet,
    );
    Ok(())
}

fn execute_list(checker: &ManifestChecker, json: bool) -> Result<()> {
    let datasets = discover_datasets(checker.dataset_root())
        .context("Failed to discover datasets")?;
    let entries: Vec<DatasetEntry> = datasets
        .iter()
        .map(|d| DatasetEntry {
            name: d.dir_name().to_string(),
            var_name: d.var_name(),
            definition: d.definition(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Datasets under {}", checker.dataset_root().display());
    println!("========================\n");
    if entries.is_empty() {
        println!("  (none)");
    }
    for entry in &entries {
        println!("  {:<32} {}", entry.name, entry.var_name);
    }
    Ok(())
}
