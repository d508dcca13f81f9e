//! Configuration system for fluxgraph
//!
//! A single YAML file layered over built-in defaults, with environment
//! overrides on top. Keys use dot notation (`discovery.maxLevels`).

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, DiscoveryConfig, TableConfig};

/// Keys accepted by [`get_config_value`] and [`set_config_value`]
pub const CONFIG_KEYS: &[&str] = &[
    "defaultNamespace",
    "discovery.maxLevels",
    "discovery.ownerChainDepth",
    "table.defaultSort",
    "table.reverse",
    "table.maxColumnWidth",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "discovery.maxLevels" => Ok(config.discovery.max_levels.to_string()),
        "discovery.ownerChainDepth" => Ok(config.discovery.owner_chain_depth.to_string()),
        "table.defaultSort" => Ok(config.table.default_sort.clone()),
        "table.reverse" => Ok(config.table.reverse.to_string()),
        "table.maxColumnWidth" => Ok(config.table.max_column_width.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "discovery.maxLevels" => {
            config.discovery.max_levels = value
                .parse()
                .context("discovery.maxLevels must be a number")?;
        }
        "discovery.ownerChainDepth" => {
            config.discovery.owner_chain_depth = value
                .parse()
                .context("discovery.ownerChainDepth must be a number")?;
        }
        "table.defaultSort" => {
            config.table.default_sort = value.to_string();
        }
        "table.reverse" => {
            config.table.reverse = value
                .parse()
                .context("table.reverse must be 'true' or 'false'")?;
        }
        "table.maxColumnWidth" => {
            config.table.max_column_width = value
                .parse()
                .context("table.maxColumnWidth must be a number")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
