//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path(), |key| std::env::var(key).ok())
    }

    /// Load from an explicit root file with an explicit environment
    pub fn load_from<F>(root: &Path, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_defaults();

        if root.exists() {
            config = Self::load_file(root)?;
        } else {
            tracing::debug!("No config file at {}, using defaults", root.display());
        }

        Ok(Self::apply_env_overrides(config, env))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the root configuration file and the merged result
    pub fn validate() -> Result<()> {
        let config = Self::load().context("Failed to load merged configuration")?;
        Self::check(&config)
    }

    /// Reject values that would make discovery or rendering meaningless
    pub fn check(config: &Config) -> Result<()> {
        if config.default_namespace.trim().is_empty() {
            return Err(anyhow::anyhow!("defaultNamespace must not be empty"));
        }
        if config.discovery.owner_chain_depth == 0 {
            return Err(anyhow::anyhow!("discovery.ownerChainDepth must be at least 1"));
        }
        if config.table.max_column_width < 2 {
            return Err(anyhow::anyhow!("table.maxColumnWidth must be at least 2"));
        }
        let fields = crate::table::reconciled_object_fields();
        let sortable = crate::table::column_index(&fields, &config.table.default_sort)
            .is_some_and(|i| fields[i].is_sortable());
        if !sortable {
            return Err(anyhow::anyhow!(
                "table.defaultSort '{}' is not a sortable column",
                config.table.default_sort
            ));
        }
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        Config::default()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides<F>(mut config: Config, env: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(namespace) = env("FLUXGRAPH_DEFAULT_NAMESPACE") {
            config.default_namespace = namespace;
        }

        if let Some(levels) = env("FLUXGRAPH_MAX_LEVELS") {
            match levels.parse::<usize>() {
                Ok(val) => config.discovery.max_levels = val,
                Err(_) => tracing::warn!("Ignoring invalid FLUXGRAPH_MAX_LEVELS: {}", levels),
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config =
            ConfigLoader::load_from(&tmp.path().join("config.yaml"), env_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_file_then_env_layering() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(
            &path,
            "defaultNamespace: apps\ndiscovery:\n  maxLevels: 4\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from(&path, env_from(&[])).unwrap();
        assert_eq!(config.default_namespace, "apps");
        assert_eq!(config.discovery.max_levels, 4);

        let env = env_from(&[
            ("FLUXGRAPH_DEFAULT_NAMESPACE", "infra"),
            ("FLUXGRAPH_MAX_LEVELS", "2"),
        ]);
        let config = ConfigLoader::load_from(&path, env).unwrap();
        assert_eq!(config.default_namespace, "infra");
        assert_eq!(config.discovery.max_levels, 2);
    }

    #[test]
    fn test_invalid_env_override_is_ignored() {
        let config = ConfigLoader::apply_env_overrides(
            Config::default(),
            env_from(&[("FLUXGRAPH_MAX_LEVELS", "lots")]),
        );
        assert_eq!(config.discovery.max_levels, 10);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "discovery: [not, a, map]\n").unwrap();
        assert!(ConfigLoader::load_from(&path, env_from(&[])).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.table.reverse = true;

        ConfigLoader::save(&config, &path).unwrap();
        assert_eq!(ConfigLoader::load_file(&path).unwrap(), config);
    }

    #[test]
    fn test_check_rejects_unknown_sort_column() {
        let mut config = Config::default();
        assert!(ConfigLoader::check(&config).is_ok());
        config.table.default_sort = "Status".to_string();
        assert!(ConfigLoader::check(&config).is_ok());
        config.table.default_sort = "message".to_string();
        assert!(ConfigLoader::check(&config).is_err());
        config.table.default_sort = "age".to_string();
        assert!(ConfigLoader::check(&config).is_err());
    }
}
