//! Declared kinds of a HelmRelease, read from Helm's release storage
//!
//! Helm stores each release revision in a Secret named
//! `sh.helm.release.v1.<release>.v<revision>`. The `release` key holds the
//! release record as base64 of (usually gzipped) JSON, whose `manifest` field
//! is the multi-document YAML that was applied.

use crate::kube::inventory::InventoryError;
use crate::models::GroupVersionKind;
use base64::Engine;
use k8s_openapi::api::core::v1::Secret;
use kube::Api;
use serde_json::Value;
use std::io::Read;

const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Location of a release revision in Helm storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmStorageRef {
    pub namespace: String,
    pub release: String,
    pub revision: i64,
}

impl HelmStorageRef {
    pub fn secret_name(&self) -> String {
        format!("sh.helm.release.v1.{}.v{}", self.release, self.revision)
    }
}

/// Work out where the latest revision of a HelmRelease is stored
///
/// Returns `None` when nothing has been installed yet. Newer releases record
/// the latest revision in `status.history[0]`; older ones only carry
/// `status.lastReleaseRevision`.
pub fn storage_ref(helmrelease: &Value, helmrelease_namespace: &str) -> Option<HelmStorageRef> {
    let spec = helmrelease.get("spec");
    let status = helmrelease.get("status");
    let spec_str = |key: &str| {
        spec.and_then(|s| s.get(key))
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
    };

    let storage_namespace = status
        .and_then(|s| s.get("storageNamespace"))
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .or_else(|| spec_str("storageNamespace"))
        .unwrap_or(helmrelease_namespace)
        .to_string();

    if let Some(latest) = status
        .and_then(|s| s.get("history"))
        .and_then(|h| h.as_array())
        .and_then(|h| h.first())
    {
        let release = latest.get("name").and_then(|n| n.as_str());
        let revision = latest.get("version").and_then(|v| v.as_i64());
        if let (Some(release), Some(revision)) = (release, revision) {
            return Some(HelmStorageRef {
                namespace: storage_namespace,
                release: release.to_string(),
                revision,
            });
        }
    }

    let revision = status
        .and_then(|s| s.get("lastReleaseRevision"))
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    if revision < 1 {
        return None;
    }

    let name = helmrelease
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default();
    let release = match (spec_str("releaseName"), spec_str("targetNamespace")) {
        (Some(release_name), _) => release_name.to_string(),
        (None, Some(target)) => format!("{}-{}", target, name),
        (None, None) => name.to_string(),
    };

    Some(HelmStorageRef {
        namespace: storage_namespace,
        release,
        revision,
    })
}

/// Decode the `release` value of a Helm storage Secret into its manifest
pub fn decode_release_manifest(release: &[u8]) -> Result<String, InventoryError> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(release)
        .map_err(|e| InventoryError::Decode(format!("base64: {}", e)))?;

    let json = if decoded.starts_with(&GZIP_MAGIC) {
        let mut decoder = flate2::read::GzDecoder::new(&decoded[..]);
        let mut buf = Vec::new();
        decoder
            .read_to_end(&mut buf)
            .map_err(|e| InventoryError::Decode(format!("gzip: {}", e)))?;
        buf
    } else {
        decoded
    };

    let record: Value = serde_json::from_slice(&json)
        .map_err(|e| InventoryError::Decode(format!("release JSON: {}", e)))?;
    record
        .get("manifest")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .ok_or_else(|| InventoryError::Malformed {
            field: "release".to_string(),
            message: "missing manifest".to_string(),
        })
}

/// Distinct object types in a multi-document manifest, unique by `apiVersion` and kind
pub fn kinds_from_manifest(manifest: &str) -> Vec<GroupVersionKind> {
    let mut kinds: Vec<GroupVersionKind> = Vec::new();

    for doc in manifest.split("---\n") {
        let doc = doc.trim();
        if doc.is_empty() {
            continue;
        }
        let resource: Value = match serde_yaml::from_str(doc) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Failed to parse YAML document: {}", e);
                continue;
            }
        };
        let (Some(api_version), Some(kind)) = (
            resource.get("apiVersion").and_then(|v| v.as_str()),
            resource.get("kind").and_then(|k| k.as_str()),
        ) else {
            // Comment-only documents from templates that rendered nothing
            continue;
        };

        let gvk = GroupVersionKind::from_api_version(api_version, kind);
        if !kinds.contains(&gvk) {
            kinds.push(gvk);
        }
    }

    kinds
}

/// Declared kinds of a HelmRelease from the latest stored release revision
pub async fn declared_kinds_from_helm_storage(
    client: &kube::Client,
    helmrelease: &Value,
    helmrelease_namespace: &str,
) -> Result<Vec<GroupVersionKind>, InventoryError> {
    if helmrelease
        .get("spec")
        .and_then(|s| s.get("kubeConfig"))
        .is_some()
    {
        tracing::debug!("Skipping HelmRelease with kubeConfig (remote cluster)");
        return Ok(Vec::new());
    }

    let Some(storage) = storage_ref(helmrelease, helmrelease_namespace) else {
        tracing::debug!("HelmRelease has no installed revision");
        return Ok(Vec::new());
    };

    let secret_name = storage.secret_name();
    tracing::debug!(
        "Reading Helm storage Secret {}/{}",
        storage.namespace,
        secret_name
    );

    let secrets: Api<Secret> = Api::namespaced(client.clone(), &storage.namespace);
    let secret = secrets.get(&secret_name).await?;
    let release = secret
        .data
        .as_ref()
        .and_then(|data| data.get("release"))
        .ok_or_else(|| InventoryError::Malformed {
            field: format!("Secret {}", secret_name),
            message: "missing 'release' key".to_string(),
        })?;

    let manifest = decode_release_manifest(&release.0)?;
    Ok(kinds_from_manifest(&manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_storage_ref_from_history() {
        let hr = json!({
            "metadata": {"name": "podinfo"},
            "status": {
                "storageNamespace": "apps",
                "history": [{"name": "podinfo", "version": 4, "namespace": "apps"}]
            }
        });
        let storage = storage_ref(&hr, "flux-system").unwrap();
        assert_eq!(storage.namespace, "apps");
        assert_eq!(storage.secret_name(), "sh.helm.release.v1.podinfo.v4");
    }

    #[test]
    fn test_storage_ref_release_name_rules() {
        let hr = json!({
            "metadata": {"name": "podinfo"},
            "spec": {"targetNamespace": "apps"},
            "status": {"lastReleaseRevision": 2}
        });
        let storage = storage_ref(&hr, "flux-system").unwrap();
        assert_eq!(storage.release, "apps-podinfo");
        assert_eq!(storage.namespace, "flux-system");

        let hr = json!({
            "metadata": {"name": "podinfo"},
            "spec": {
                "releaseName": "custom",
                "targetNamespace": "apps",
                "storageNamespace": "helm"
            },
            "status": {"lastReleaseRevision": 1}
        });
        let storage = storage_ref(&hr, "flux-system").unwrap();
        assert_eq!(storage.release, "custom");
        assert_eq!(storage.namespace, "helm");
    }

    #[test]
    fn test_storage_ref_not_installed() {
        let hr = json!({"metadata": {"name": "podinfo"}, "status": {"lastReleaseRevision": 0}});
        assert!(storage_ref(&hr, "flux-system").is_none());
        assert!(storage_ref(&json!({}), "flux-system").is_none());
    }

    #[test]
    fn test_kinds_from_manifest() {
        let manifest = "---\n# Source: chart/templates/empty.yaml\n---\napiVersion: v1\nkind: Service\nmetadata:\n  name: a\n---\napiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: a\n---\napiVersion: v1\nkind: Service\nmetadata:\n  name: b\n";
        let kinds = kinds_from_manifest(manifest);
        assert_eq!(
            kinds,
            vec![
                GroupVersionKind::new("", "v1", "Service"),
                GroupVersionKind::new("apps", "v1", "Deployment"),
            ]
        );
    }
}
