//! GraphBridge Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.graphbridge/config.toml`
//! - Local config: `.graphbridge/config.toml` (in the repository root)
//! - An explicit config file given on the command line
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local (or explicit) → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for GraphBridge.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Dataset and manifest locations
    pub datasets: DatasetsConfig,

    /// Translator options
    pub translation: TranslationConfig,

    /// R-MAT generator defaults
    pub generator: GeneratorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Dataset and manifest locations.
///
/// Relative paths are resolved against the repository root.
///
/// # Example TOML
///
/// ```toml
/// [datasets]
/// root = "external/test-datasets/rdg_datasets"
/// manifest = "cmake/Modules/TestDatasetsRDGs.cmake"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetsConfig {
    /// Directory whose subdirectories are RDG datasets
    pub root: PathBuf,

    /// Generated CMake manifest
    pub manifest: PathBuf,
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("external/test-datasets/rdg_datasets"),
            manifest: PathBuf::from("cmake/Modules/TestDatasetsRDGs.cmake"),
        }
    }
}

/// What the reverse translator does with nodes that have no edges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IsolatedNodePolicy {
    /// Omit them (nodes are built from the edge list)
    #[default]
    Drop,
    /// Materialize every node
    Keep,
}

impl std::fmt::Display for IsolatedNodePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Keep => write!(f, "keep"),
        }
    }
}

impl std::str::FromStr for IsolatedNodePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "keep" => Ok(Self::Keep),
            _ => Err(ConfigError::ValidationError(format!(
                "Unknown isolated node policy: '{}'. Valid values: drop, keep",
                s
            ))),
        }
    }
}

/// Translator options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Weight attribute on multigraph edges
    pub value_attribute: String,

    /// Property name the weight attribute takes on property graph edges
    pub edge_property: String,

    /// Isolated-node policy of the reverse translation
    pub isolated_nodes: IsolatedNodePolicy,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            value_attribute: "value".to_string(),
            edge_property: "value_from_translator".to_string(),
            isolated_nodes: IsolatedNodePolicy::Drop,
        }
    }
}

/// R-MAT generator defaults.
///
/// # Example TOML
///
/// ```toml
/// [generator]
/// scale = 10
/// edge_factor = 16
/// seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// log2 of the node count
    pub scale: u32,

    /// Edges per node
    pub edge_factor: u32,

    /// Quadrant probabilities; the fourth is `1 - a - b - c`
    pub a: f64,
    pub b: f64,
    pub c: f64,

    pub seed: u64,

    /// Integer edge weight property
    pub weight_property: String,

    /// Upper bound of generated weights
    pub max_weight: i64,

    /// Also drop nodes left without edges after cleaning
    pub remove_isolated_nodes: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            scale: 15,
            edge_factor: 16,
            a: 0.57,
            b: 0.19,
            c: 0.19,
            seed: 0x5eed,
            weight_property: "value".to_string(),
            max_weight: 100,
            remove_isolated_nodes: false,
        }
    }
}

impl GeneratorConfig {
    /// Validate generator parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale == 0 || self.scale > 31 {
            return Err(ConfigError::invalid_value(
                "generator.scale",
                format!("must be between 1 and 31, got {}", self.scale),
            ));
        }
        if self.edge_factor == 0 {
            return Err(ConfigError::invalid_value(
                "generator.edge_factor",
                "must be positive",
            ));
        }
        for (key, p) in [("generator.a", self.a), ("generator.b", self.b), ("generator.c", self.c)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::invalid_value(
                    key,
                    format!("probability must be in [0, 1], got {}", p),
                ));
            }
        }
        if self.a + self.b + self.c > 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "generator.a + generator.b + generator.c must not exceed 1 (got {})",
                self.a + self.b + self.c
            )));
        }
        if self.weight_property.is_empty() {
            return Err(ConfigError::invalid_value(
                "generator.weight_property",
                "must not be empty",
            ));
        }
        if self.max_weight < 1 {
            return Err(ConfigError::invalid_value(
                "generator.max_weight",
                format!("must be at least 1, got {}", self.max_weight),
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
///
/// `--quiet` and `--verbose` take precedence over `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// CLI overrides for configuration values.
///
/// These take precedence over all file-based configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dataset_root: Option<PathBuf>,

    pub manifest: Option<PathBuf>,

    pub isolated_nodes: Option<IsolatedNodePolicy>,

    pub scale: Option<u32>,

    pub edge_factor: Option<u32>,

    pub seed: Option<u64>,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl BridgeConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref root) = overrides.dataset_root {
            self.datasets.root = root.clone();
        }

        if let Some(ref manifest) = overrides.manifest {
            self.datasets.manifest = manifest.clone();
        }

        if let Some(policy) = overrides.isolated_nodes {
            self.translation.isolated_nodes = policy;
        }

        if let Some(scale) = overrides.scale {
            self.generator.scale = scale;
        }

        if let Some(edge_factor) = overrides.edge_factor {
            self.generator.edge_factor = edge_factor;
        }

        if let Some(seed) = overrides.seed {
            self.generator.seed = seed;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.translation.value_attribute.is_empty() {
            return Err(ConfigError::invalid_value(
                "translation.value_attribute",
                "must not be empty",
            ));
        }
        if self.translation.edge_property.is_empty() {
            return Err(ConfigError::invalid_value(
                "translation.edge_property",
                "must not be empty",
            ));
        }
        if self.datasets.manifest.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value(
                "datasets.manifest",
                "must not be empty",
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!(
                    "unknown level '{}', expected one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }
        self.generator.validate()
    }

    /// Get the absolute dataset root for a repository.
    pub fn dataset_root(&self, repo_root: &Path) -> PathBuf {
        resolve(repo_root, &self.datasets.root)
    }

    /// Get the absolute manifest path for a repository.
    pub fn manifest_path(&self, repo_root: &Path) -> PathBuf {
        resolve(repo_root, &self.datasets.manifest)
    }
}

fn resolve(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(
            config.datasets.root,
            PathBuf::from("external/test-datasets/rdg_datasets")
        );
        assert_eq!(config.translation.edge_property, "value_from_translator");
        assert_eq!(config.translation.isolated_nodes, IsolatedNodePolicy::Drop);
        assert_eq!(config.generator.scale, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = BridgeConfig::default();
        let overrides = ConfigOverrides {
            dataset_root: Some(PathBuf::from("/data/rdgs")),
            isolated_nodes: Some(IsolatedNodePolicy::Keep),
            seed: Some(7),
            scale: Some(9),
            ..Default::default()
        };

        config.apply_overrides(&overrides);

        assert_eq!(config.datasets.root, PathBuf::from("/data/rdgs"));
        assert_eq!(config.translation.isolated_nodes, IsolatedNodePolicy::Keep);
        assert_eq!(config.generator.seed, 7);
        assert_eq!(config.generator.scale, 9);
        assert_eq!(config.generator.edge_factor, 16);
        assert_eq!(config.datasets.manifest, DatasetsConfig::default().manifest);
    }

    #[test]
    fn test_path_resolution() {
        let mut config = BridgeConfig::default();
        let repo = PathBuf::from("/home/user/project");

        assert_eq!(
            config.manifest_path(&repo),
            PathBuf::from("/home/user/project/cmake/Modules/TestDatasetsRDGs.cmake")
        );

        config.datasets.root = PathBuf::from("/mnt/datasets");
        assert_eq!(config.dataset_root(&repo), PathBuf::from("/mnt/datasets"));
    }

    #[test]
    fn test_validate_rejects_bad_probabilities() {
        let mut config = BridgeConfig::default();
        config.generator.a = 0.7;
        config.generator.b = 0.3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed 1"));

        config.generator.a = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let mut config = BridgeConfig::default();
        config.translation.edge_property.clear();
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.generator.weight_property.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_log_level() {
        let mut config = BridgeConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_isolated_policy_parse() {
        assert_eq!("keep".parse::<IsolatedNodePolicy>().unwrap(), IsolatedNodePolicy::Keep);
        assert_eq!("Drop".parse::<IsolatedNodePolicy>().unwrap(), IsolatedNodePolicy::Drop);
        assert!("maybe".parse::<IsolatedNodePolicy>().is_err());
        assert_eq!(IsolatedNodePolicy::Keep.to_string(), "keep");
    }

    #[test]
    fn test_toml_serialization() {
        let config = BridgeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: BridgeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml() {
        let parsed: BridgeConfig = toml::from_str(
            r#"
            [translation]
            isolated_nodes = "keep"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.translation.isolated_nodes, IsolatedNodePolicy::Keep);
        assert_eq!(parsed.translation.value_attribute, "value");
        assert_eq!(parsed.generator, GeneratorConfig::default());
    }
}
