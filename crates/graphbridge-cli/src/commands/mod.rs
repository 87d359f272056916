//! CLI command implementations
//!
//! This module contains all GraphBridge CLI command implementations.

pub mod datasets;
pub mod generate;
pub mod stats;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use graphbridge_config::{
    BridgeConfig, ConfigLoader, ConfigOverrides, GeneratorConfig, IsolatedNodePolicy,
};
use graphbridge_core::datasets::find_repo_root;
use graphbridge_core::{IsolatedNodes, RmatConfig, TranslateOptions};
use tracing::debug;

use crate::GlobalOptions;

/// Repository root and merged configuration shared by every command
#[derive(Debug)]
pub struct CommandContext {
    pub global: GlobalOptions,
    pub repo_root: PathBuf,
    pub config: BridgeConfig,
}

impl CommandContext {
    /// Resolve the repository root and load its configuration
    pub fn load(global: GlobalOptions) -> Result<Self> {
        let repo_root = resolve_repo_root(&global)?;
        let config = load_config(&global, &repo_root)?;
        Ok(Self {
            global,
            repo_root,
            config,
        })
    }

    /// Apply command-level overrides on top of the loaded configuration
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        self.config.apply_overrides(overrides);
        self.config.validate().context("Invalid configuration")?;
        Ok(())
    }

    pub fn quiet(&self) -> bool {
        self.global.quiet
    }
}

/// Resolve the repository root from options or the current directory.
///
/// Falls back to the current directory when no ancestor contains `.git`.
fn resolve_repo_root(global: &GlobalOptions) -> Result<PathBuf> {
    if let Some(ref root) = global.repo_root {
        if !root.is_dir() {
            anyhow::bail!("Repository root '{}' is not a directory", root.display());
        }
        return Ok(root.clone());
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    match find_repo_root(&cwd) {
        Ok(root) => Ok(root),
        Err(e) => {
            debug!("{}; using current directory", e);
            Ok(cwd)
        }
    }
}

/// Load configuration (global → local or `--config` → CLI overrides) and validate it.
fn load_config(global: &GlobalOptions, repo_root: &Path) -> Result<BridgeConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(ref config_path) = global.config {
        loader = loader.with_config_file(config_path);
    }

    let overrides = global.to_config_overrides();
    let config = loader
        .load(repo_root, Some(&overrides))
        .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Translator options from the configuration
pub fn translate_options(config: &BridgeConfig) -> TranslateOptions {
    TranslateOptions {
        value_attribute: config.translation.value_attribute.clone(),
        edge_property: config.translation.edge_property.clone(),
        isolated_nodes: match config.translation.isolated_nodes {
            IsolatedNodePolicy::Drop => IsolatedNodes::Drop,
            IsolatedNodePolicy::Keep => IsolatedNodes::Keep,
        },
    }
}

/// R-MAT parameters from the generator configuration
pub fn rmat_config(generator: &GeneratorConfig) -> RmatConfig {
    RmatConfig {
        scale: generator.scale,
        edge_factor: generator.edge_factor,
        a: generator.a,
        b: generator.b,
        c: generator.c,
        seed: generator.seed,
        weight_property: Some(generator.weight_property.clone()),
        max_weight: generator.max_weight,
    }
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
