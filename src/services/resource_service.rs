//! Resource service for Kubernetes operations
//!
//! Ties the cluster-facing pieces together: resolves the declared kinds of an
//! automation and runs discovery against the live API.

use crate::graph::{Discovery, DiscoveryError, GraphBuilder};
use crate::kube::{KubeObjectsClient, inventory};
use crate::models::{AutomationRef, GroupVersionKind};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Limits applied to each discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub max_levels: usize,
    pub owner_chain_depth: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            max_levels: crate::graph::DEFAULT_MAX_LEVELS,
            owner_chain_depth: crate::kube::DEFAULT_OWNER_CHAIN_DEPTH,
        }
    }
}

/// Service for discovering the objects reconciled by an automation
///
/// Cheap to clone; clones share the underlying client.
#[derive(Clone)]
pub struct ResourceService {
    client: kube::Client,
    builder: Arc<GraphBuilder<KubeObjectsClient>>,
}

impl ResourceService {
    pub fn new(client: kube::Client, settings: DiscoverySettings) -> Self {
        let objects = KubeObjectsClient::new(client.clone())
            .with_owner_chain_depth(settings.owner_chain_depth);
        let builder = GraphBuilder::new(objects).with_max_levels(settings.max_levels);
        Self {
            client,
            builder: Arc::new(builder),
        }
    }

    /// Declared kinds for a discovery
    ///
    /// Explicit kinds are used as given; otherwise they are read from the
    /// automation's inventory or Helm storage.
    pub async fn resolve_kinds(
        &self,
        automation: &AutomationRef,
        explicit: &[GroupVersionKind],
    ) -> Result<Vec<GroupVersionKind>> {
        if !explicit.is_empty() {
            return Ok(explicit.to_vec());
        }
        inventory::declared_kinds(&self.client, automation)
            .await
            .with_context(|| format!("Failed to read declared kinds of {}", automation))
    }

    /// Discover every object reconciled by the automation
    pub async fn discover(
        &self,
        automation: &AutomationRef,
        kinds: &[GroupVersionKind],
    ) -> Result<Discovery, DiscoveryError> {
        self.builder.discover(automation, kinds).await
    }
}
