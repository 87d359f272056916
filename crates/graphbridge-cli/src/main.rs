//! GraphBridge CLI - Graph translation verification and test-dataset tooling
//!
//! A command-line interface for verifying multigraph ↔ property graph
//! translations, generating R-MAT datasets, and keeping the test-dataset
//! manifest in sync.
//!
//! # Usage
//!
//! ```bash
//! # Check that every dataset directory is registered in the manifest
//! graphbridge datasets check
//!
//! # Generate a cleaned R-MAT graph and store it as a dataset
//! graphbridge generate rmat rmat10 --scale 10
//!
//! # Reverse-translate a stored dataset and verify it
//! graphbridge verify rdg rmat10
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use graphbridge_config::{ConfigError, ConfigOverrides, IsolatedNodePolicy, LoggingConfig};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod progress;

/// GraphBridge - Graph model translation and verification
#[derive(Parser, Debug)]
#[command(name = "graphbridge")]
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
pub struct GlobalOptions {
    /// Repository root (default: nearest ancestor containing .git)
    #[arg(long, global = true, env = "GRAPHBRIDGE_REPO_ROOT")]
    repo_root: Option<PathBuf>,

    /// Path to configuration file (replaces the repository's local config)
    #[arg(long, short = 'c', global = true, env = "GRAPHBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Dataset root directory, relative to the repository root
    #[arg(long, global = true, env = "GRAPHBRIDGE_DATASET_ROOT")]
    dataset_root: Option<PathBuf>,

    /// Dataset manifest file, relative to the repository root
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Isolated-node policy for reverse translation (drop, keep)
    #[arg(long, global = true, value_parser = parse_isolated_nodes)]
    isolated_nodes: Option<IsolatedNodePolicy>,
}

/// Parse the isolated-node policy from a string
fn parse_isolated_nodes(s: &str) -> Result<IsolatedNodePolicy, String> {
    s.parse().map_err(|e: ConfigError| e.to_string())
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            dataset_root: self.dataset_root.clone(),
            manifest: self.manifest.clone(),
            isolated_nodes: self.isolated_nodes,
            ..Default::default()
        }
    }

    /// Log level: `--quiet` and `--verbose` win over the configured level
    fn log_level(&self, logging: &LoggingConfig) -> Result<Level> {
        if self.quiet {
            return Ok(Level::ERROR);
        }
        if self.verbose {
            return Ok(Level::DEBUG);
        }
        logging
            .level
            .parse()
            .with_context(|| format!("Unknown log level '{}'", logging.level))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check or regenerate the test-dataset manifest
    #[command(subcommand)]
    Datasets(commands::datasets::DatasetsCommand),

    /// Run translation verification scenarios
    #[command(subcommand)]
    Verify(commands::verify::VerifyCommand),

    /// Generate datasets
    #[command(subcommand)]
    Generate(commands::generate::GenerateCommand),

    /// Show node/edge counts and schemas of a dataset
    Stats(commands::stats::StatsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = commands::CommandContext::load(cli.global)?;

    let log_level = ctx.global.log_level(&ctx.config.logging)?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Datasets(cmd) => commands::datasets::execute(cmd, ctx),
        Commands::Verify(cmd) => commands::verify::execute(cmd, ctx),
        Commands::Generate(cmd) => commands::generate::execute(cmd, ctx),
        Commands::Stats(args) => commands::stats::execute(args, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(args: &[&str]) -> GlobalOptions {
        let mut argv = vec!["graphbridge"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["stats", "x"]);
        Cli::parse_from(argv).global
    }

    fn logging(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
        }
    }

    #[test]
    fn test_configured_log_level_applies_without_flags() {
        let level = global(&[]).log_level(&logging("warn")).unwrap();
        assert_eq!(level, Level::WARN);
    }

    #[test]
    fn test_flags_win_over_configured_log_level() {
        assert_eq!(global(&["-q"]).log_level(&logging("trace")).unwrap(), Level::ERROR);
        assert_eq!(global(&["-v"]).log_level(&logging("error")).unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_global_options_become_overrides() {
        let overrides = global(&["--dataset-root", "data", "--isolated-nodes", "keep"])
            .to_config_overrides();
        assert_eq!(overrides.dataset_root, Some(PathBuf::from("data")));
        assert_eq!(overrides.isolated_nodes, Some(IsolatedNodePolicy::Keep));
        assert_eq!(overrides.manifest, None);
        assert_eq!(overrides.scale, None);
    }
}
