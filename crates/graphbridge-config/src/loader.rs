//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.graphbridge/config.toml`
//! 2. Local config: `.graphbridge/config.toml` (in the repository root),
//!    or an explicit file set with [`ConfigLoader::with_config_file`]
//! 3. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{
    BridgeConfig, ConfigOverrides, DatasetsConfig, GeneratorConfig, LoggingConfig,
    TranslationConfig,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".graphbridge";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".graphbridge";

/// Configuration loader with inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.graphbridge`)
    global_config_dir: Option<PathBuf>,

    /// Explicit config file used instead of the local one
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.graphbridge`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            config_file: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            config_file: None,
        }
    }

    /// Use `path` in place of the repository's local config file.
    ///
    /// Unlike the local file, an explicit file must exist.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a repository.
    pub fn local_config_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a repository with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &self,
        repo_root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<BridgeConfig, ConfigError> {
        let mut config = BridgeConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = self.load_local(repo_root)? {
            config = merge_configs(config, local_config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&self) -> Result<Option<BridgeConfig>, ConfigError> {
        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        load_config_file(&global_path).map(Some)
    }

    /// Load only the local (or explicit) configuration for a repository.
    pub fn load_local(&self, repo_root: &Path) -> Result<Option<BridgeConfig>, ConfigError> {
        if let Some(ref path) = self.config_file {
            if !path.exists() {
                return Err(ConfigError::missing_file(path));
            }
            debug!("Loading config from {:?}", path);
            return load_config_file(path).map(Some);
        }

        let local_path = self.local_config_path(repo_root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Take `overlay` unless it still holds the default, in which case keep `base`.
fn overlay_or<T: PartialEq>(base: T, overlay: T, default: &T) -> T {
    if overlay != *default {
        overlay
    } else {
        base
    }
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// This performs a field-by-field merge, allowing partial configs.
fn merge_configs(base: BridgeConfig, overlay: BridgeConfig) -> BridgeConfig {
    BridgeConfig {
        datasets: merge_datasets(base.datasets, overlay.datasets),
        translation: merge_translation(base.translation, overlay.translation),
        generator: merge_generator(base.generator, overlay.generator),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

fn merge_datasets(base: DatasetsConfig, overlay: DatasetsConfig) -> DatasetsConfig {
    let default = DatasetsConfig::default();
    DatasetsConfig {
        root: overlay_or(base.root, overlay.root, &default.root),
        manifest: overlay_or(base.manifest, overlay.manifest, &default.manifest),
    }
}

fn merge_translation(base: TranslationConfig, overlay: TranslationConfig) -> TranslationConfig {
    let default = TranslationConfig::default();
    TranslationConfig {
        value_attribute: overlay_or(
            base.value_attribute,
            overlay.value_attribute,
            &default.value_attribute,
        ),
        edge_property: overlay_or(base.edge_property, overlay.edge_property, &default.edge_property),
        isolated_nodes: overlay_or(
            base.isolated_nodes,
            overlay.isolated_nodes,
            &default.isolated_nodes,
        ),
    }
}

fn merge_generator(base: GeneratorConfig, overlay: GeneratorConfig) -> GeneratorConfig {
    let default = GeneratorConfig::default();
    GeneratorConfig {
        scale: overlay_or(base.scale, overlay.scale, &default.scale),
        edge_factor: overlay_or(base.edge_factor, overlay.edge_factor, &default.edge_factor),
        a: overlay_or(base.a, overlay.a, &default.a),
        b: overlay_or(base.b, overlay.b, &default.b),
        c: overlay_or(base.c, overlay.c, &default.c),
        seed: overlay_or(base.seed, overlay.seed, &default.seed),
        weight_property: overlay_or(
            base.weight_property,
            overlay.weight_property,
            &default.weight_property,
        ),
        max_weight: overlay_or(base.max_weight, overlay.max_weight, &default.max_weight),
        remove_isolated_nodes: base.remove_isolated_nodes || overlay.remove_isolated_nodes,
    }
}

fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    let default = LoggingConfig::default();
    LoggingConfig {
        level: overlay_or(base.level, overlay.level, &default.level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IsolatedNodePolicy;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_config(content: &str, dir: &Path) -> PathBuf {
        let config_dir = dir.join(".graphbridge");
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_load_local_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        create_test_config(
            r#"
            [datasets]
            root = "data/rdgs"

            [generator]
            scale = 10
            "#,
            temp.path(),
        );

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.datasets.root, PathBuf::from("data/rdgs"));
        assert_eq!(config.generator.scale, 10);
        assert_eq!(config.generator.edge_factor, 16);
    }

    #[test]
    fn test_local_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            r#"
            [logging]
            level = "debug"

            [generator]
            seed = 1
            scale = 12
            "#,
        )
        .unwrap();

        create_test_config(
            r#"
            [generator]
            seed = 2
            "#,
            temp.path(),
        );

        let loader = ConfigLoader::with_global_dir(&global_dir);
        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.generator.seed, 2);
        assert_eq!(config.generator.scale, 12);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides_all() {
        let temp = TempDir::new().unwrap();

        create_test_config(
            r#"
            [translation]
            isolated_nodes = "keep"
            "#,
            temp.path(),
        );

        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let overrides = ConfigOverrides {
            isolated_nodes: Some(IsolatedNodePolicy::Drop),
            seed: Some(99),
            ..Default::default()
        };

        let config = loader.load(temp.path(), Some(&overrides)).unwrap();

        assert_eq!(config.translation.isolated_nodes, IsolatedNodePolicy::Drop);
        assert_eq!(config.generator.seed, 99);
    }

    #[test]
    fn test_explicit_config_file_replaces_local() {
        let temp = TempDir::new().unwrap();
        create_test_config("[generator]\nscale = 9\n", temp.path());
        let explicit = temp.path().join("ci.toml");
        std::fs::write(&explicit, "[generator]\nedge_factor = 4\n").unwrap();

        let loader =
            ConfigLoader::with_global_dir(temp.path().join("global")).with_config_file(&explicit);
        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.generator.edge_factor, 4);
        assert_eq!(config.generator.scale, 15);
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"))
            .with_config_file(temp.path().join("absent.toml"));

        let err = loader.load(temp.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = create_test_config("[generator\nscale = ", temp.path());
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let err = loader.load(temp.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_generator_merge_keeps_base_for_defaults() {
        let base = GeneratorConfig {
            a: 0.45,
            max_weight: 10,
            ..Default::default()
        };
        let overlay = GeneratorConfig {
            b: 0.25,
            ..Default::default()
        };

        let merged = merge_generator(base, overlay);

        assert_eq!(merged.a, 0.45);
        assert_eq!(merged.b, 0.25);
        assert_eq!(merged.max_weight, 10);
    }
}
