//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and the cluster-facing
//! implementations of discovery: object listing, status summaries and
//! declared-kind inventories.

pub mod helm;
pub mod inventory;
pub mod objects;
pub mod status;

pub use objects::{DEFAULT_OWNER_CHAIN_DEPTH, KubeObjectsClient, child_kinds};

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Without a context, uses the default loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let config = match context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("Failed to load kubeconfig context {}", context))?
        }
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    tracing::debug!("Connecting to {}", config.cluster_url);
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Get the current Kubernetes context name
pub fn get_context() -> Result<String> {
    let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;
    Ok(kubeconfig
        .current_context
        .unwrap_or_else(|| "default".to_string()))
}
