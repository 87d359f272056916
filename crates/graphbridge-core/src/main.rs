//! check-test-datasets - keep the RDG test-dataset manifest in sync
//!
//! With no arguments, checks that the manifest lists exactly the dataset
//! directories on disk and exits nonzero if it does not. With `--fix`,
//! regenerates the manifest.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use graphbridge_core::datasets::{find_repo_root, ManifestChecker};

/// Check that all RDGs under the test-dataset root are registered in the CMake manifest
#[derive(Parser)]
#[command(name = "check-test-datasets")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Regenerate the manifest instead of checking it
    #[arg(long)]
    fix: bool,

    /// Repository root (default: nearest ancestor containing .git)
    #[arg(long)]
    repo_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let repo_root = match cli.repo_root {
        Some(root) => root,
        None => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            find_repo_root(&cwd)?
        }
    };
    let checker = ManifestChecker::new(&repo_root);

    if cli.fix {
        let changed = checker.fix()?;
        info!(
            "{} {}",
            checker.manifest_path().display(),
            if changed { "regenerated" } else { "already up to date" }
        );
    } else {
        checker.check()?;
    }

    Ok(())
}
