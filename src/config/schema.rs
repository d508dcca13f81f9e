//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace used when an automation is given without `-n`
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Discovery limits
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Table output
    #[serde(default)]
    pub table: TableConfig,
}

/// Discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfig {
    /// Child levels queried below the directly applied objects
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,

    /// Owners followed when attributing a child object to an automation
    #[serde(default = "default_owner_chain_depth")]
    pub owner_chain_depth: usize,
}

/// Table configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Column label sorted on by default
    #[serde(default = "default_sort")]
    pub default_sort: String,

    /// Sort descending by default
    #[serde(default)]
    pub reverse: bool,

    #[serde(default = "default_max_column_width")]
    pub max_column_width: usize,
}

fn default_namespace() -> String {
    "flux-system".to_string()
}

fn default_max_levels() -> usize {
    crate::graph::DEFAULT_MAX_LEVELS
}

fn default_owner_chain_depth() -> usize {
    crate::kube::DEFAULT_OWNER_CHAIN_DEPTH
}

fn default_sort() -> String {
    "name".to_string()
}

fn default_max_column_width() -> usize {
    crate::table::DEFAULT_MAX_COLUMN_WIDTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            discovery: DiscoveryConfig::default(),
            table: TableConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_levels: default_max_levels(),
            owner_chain_depth: default_owner_chain_depth(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_sort: default_sort(),
            reverse: false,
            max_column_width: default_max_column_width(),
        }
    }
}
