//! Declared kinds of an automation
//!
//! A Kustomization records every applied object in `status.inventory.entries`.
//! A HelmRelease keeps its rendered manifest in Helm's storage Secret, see
//! [`crate::kube::helm`].

use crate::models::{AutomationKind, AutomationRef, GroupVersionKind};
use kube::Api;
use kube::core::{ApiResource, DynamicObject};
use serde_json::Value;

/// Errors raised while deriving declared kinds
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("{0} not found")]
    NotFound(AutomationRef),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to decode Helm release: {0}")]
    Decode(String),

    #[error("Malformed {field}: {message}")]
    Malformed { field: String, message: String },
}

/// A single object recorded in an inventory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InventoryEntry {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub group: String,
    pub version: String,
}

impl InventoryEntry {
    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::new(&self.group, &self.version, &self.kind)
    }
}

/// Extract the entries of `status.inventory.entries`
///
/// Entries that cannot be parsed are logged and skipped.
pub fn extract_inventory(obj: &Value) -> Vec<InventoryEntry> {
    let Some(entries) = obj
        .get("status")
        .and_then(|s| s.get("inventory"))
        .and_then(|i| i.get("entries"))
        .and_then(|e| e.as_array())
    else {
        tracing::debug!("No inventory field found in resource status");
        return Vec::new();
    };

    tracing::debug!("Found status.inventory.entries with {} items", entries.len());
    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let parsed = parse_inventory_entry(entry);
            if parsed.is_none() {
                tracing::warn!("Failed to parse inventory entry {}: {:?}", idx, entry);
            }
            parsed
        })
        .collect()
}

/// Distinct types in the inventory of a Kustomization, in order of first appearance
pub fn declared_kinds_from_kustomization(obj: &Value) -> Vec<GroupVersionKind> {
    let mut kinds: Vec<GroupVersionKind> = Vec::new();
    for gvk in extract_inventory(obj).iter().map(InventoryEntry::gvk) {
        if !kinds.contains(&gvk) {
            kinds.push(gvk);
        }
    }
    kinds
}

fn parse_inventory_entry(entry: &Value) -> Option<InventoryEntry> {
    let id = entry.get("id").and_then(|i| i.as_str())?;
    let version = entry.get("v").and_then(|v| v.as_str()).unwrap_or("v1");
    parse_id_field(id, version)
}

/// Parse an inventory id
///
/// - cluster-scoped, core group: `_<name>__<Kind>`
/// - namespaced, core group: `<namespace>_<name>__<Kind>`
/// - with a group: `<namespace>_<name>_<group>_<Kind>` (namespace empty when cluster-scoped)
///
/// `__` only appears when the group is empty.
fn parse_id_field(id: &str, version: &str) -> Option<InventoryEntry> {
    let entry = |namespace: &str, name: String, group: &str, kind: &str| InventoryEntry {
        kind: kind.to_string(),
        name,
        namespace: namespace.to_string(),
        group: group.to_string(),
        version: version.to_string(),
    };

    if let Some((before_kind, kind)) = id.rsplit_once("__") {
        if kind.is_empty() {
            tracing::warn!("Invalid __ format: {}", id);
            return None;
        }
        let (namespace, name) = before_kind.split_once('_')?;
        if name.is_empty() {
            return None;
        }
        return Some(entry(namespace, name.to_string(), "", kind));
    }

    let parts: Vec<&str> = id.split('_').collect();
    if parts.len() >= 4 {
        let kind = parts[parts.len() - 1];
        let group = parts[parts.len() - 2];
        let name = parts[1..parts.len() - 2].join("_");
        return Some(entry(parts[0], name, group, kind));
    }

    tracing::warn!("Failed to parse inventory ID format: {}", id);
    None
}

/// Fetch an automation object as untyped JSON
pub async fn fetch_automation(
    client: &kube::Client,
    automation: &AutomationRef,
) -> Result<Value, InventoryError> {
    let kind = automation.kind;
    let gvk =
        kube::core::GroupVersionKind::gvk(kind.api_group(), kind.api_version(), kind.as_str());
    let api_resource = ApiResource::from_gvk_with_plural(&gvk, kind.plural());
    let api: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), &automation.namespace, &api_resource);

    let obj = api
        .get_opt(&automation.name)
        .await?
        .ok_or_else(|| InventoryError::NotFound(automation.clone()))?;
    serde_json::to_value(&obj).map_err(|e| InventoryError::Malformed {
        field: "object".to_string(),
        message: e.to_string(),
    })
}

/// Declared kinds of an automation, read from the live cluster
pub async fn declared_kinds(
    client: &kube::Client,
    automation: &AutomationRef,
) -> Result<Vec<GroupVersionKind>, InventoryError> {
    let obj = fetch_automation(client, automation).await?;
    let kinds = match automation.kind {
        AutomationKind::Kustomization => declared_kinds_from_kustomization(&obj),
        AutomationKind::HelmRelease => {
            crate::kube::helm::declared_kinds_from_helm_storage(client, &obj, &automation.namespace)
                .await?
        }
    };
    tracing::debug!("{} declares {} kinds", automation, kinds.len());
    Ok(kinds)
}
