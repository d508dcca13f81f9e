//! Kubernetes-backed implementation of the objects queries
//!
//! Objects applied directly by an automation carry the controller's
//! ownership labels (`kustomize.toolkit.fluxcd.io/name`, ...). Objects created
//! indirectly (ReplicaSets, Pods) do not, so they are attributed by walking up
//! their owner references until a labelled object is found.

use crate::client::{ClientResult, ObjectsClient};
use crate::kube::status::to_discovered;
use crate::models::{AutomationRef, DiscoveredObject, GroupVersionKind};
use async_trait::async_trait;
use futures::future::try_join_all;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Api;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject};
use std::collections::HashMap;

/// Default number of owners followed when attributing an object to an automation
pub const DEFAULT_OWNER_CHAIN_DEPTH: usize = 5;

/// Kinds created by the built-in controllers, keyed by the owning kind
const OWNED_KINDS: &[(&str, &[(&str, &str, &str)])] = &[
    ("Deployment", &[("apps", "v1", "ReplicaSet")]),
    ("ReplicaSet", &[("", "v1", "Pod")]),
    ("StatefulSet", &[("", "v1", "Pod")]),
    ("DaemonSet", &[("", "v1", "Pod")]),
    ("CronJob", &[("batch", "v1", "Job")]),
    ("Job", &[("", "v1", "Pod")]),
];

/// Kinds whose objects are created by controllers for an owner of `kind`
pub fn child_kinds(kind: &str) -> Vec<GroupVersionKind> {
    OWNED_KINDS
        .iter()
        .find(|(owner, _)| *owner == kind)
        .map(|(_, children)| {
            children
                .iter()
                .map(|(group, version, kind)| GroupVersionKind::new(group, version, kind))
                .collect()
        })
        .unwrap_or_default()
}

/// Answers objects queries against the Kubernetes API
pub struct KubeObjectsClient {
    client: kube::Client,
    owner_chain_depth: usize,
}

impl KubeObjectsClient {
    pub fn new(client: kube::Client) -> Self {
        Self {
            client,
            owner_chain_depth: DEFAULT_OWNER_CHAIN_DEPTH,
        }
    }

    pub fn with_owner_chain_depth(mut self, depth: usize) -> Self {
        self.owner_chain_depth = depth;
        self
    }

    async fn list_kind(
        &self,
        gvk: &GroupVersionKind,
        params: &ListParams,
    ) -> ClientResult<Vec<DynamicObject>> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &api_resource(gvk));
        let list = api.list(params).await?;
        tracing::debug!("Listed {} {} objects", list.items.len(), gvk.kind);
        Ok(list.items)
    }
}

/// Fetches the object an owner reference points at
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    async fn get_owner(
        &self,
        namespace: &str,
        owner: &OwnerReference,
    ) -> ClientResult<Option<DynamicObject>>;
}

#[async_trait]
impl OwnerLookup for KubeObjectsClient {
    async fn get_owner(
        &self,
        namespace: &str,
        owner: &OwnerReference,
    ) -> ClientResult<Option<DynamicObject>> {
        let gvk = GroupVersionKind::from_api_version(&owner.api_version, &owner.kind);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &api_resource(&gvk));
        Ok(api.get_opt(&owner.name).await?)
    }
}

/// Attributes controller-created objects to an automation through their owners
///
/// The memo caches the answer for every owner visited, so siblings sharing an
/// owner chain cost one walk.
pub struct Attribution<'a, L> {
    lookup: &'a L,
    automation: &'a AutomationRef,
    max_depth: usize,
    memo: HashMap<String, bool>,
}

impl<'a, L: OwnerLookup> Attribution<'a, L> {
    pub fn new(lookup: &'a L, automation: &'a AutomationRef, max_depth: usize) -> Self {
        Self {
            lookup,
            automation,
            max_depth,
            memo: HashMap::new(),
        }
    }

    /// Candidates of kind `child` owned by a `parent_kind` whose chain reaches
    /// the automation
    pub async fn children_of(
        &mut self,
        parent_kind: &str,
        child: &GroupVersionKind,
        candidates: Vec<DynamicObject>,
    ) -> Vec<DiscoveredObject> {
        let mut found = Vec::new();
        for obj in candidates {
            let namespace = obj.metadata.namespace.clone().unwrap_or_default();
            let owners = obj.metadata.owner_references.iter().flatten();
            for owner in owners.filter(|o| o.kind == parent_kind) {
                if self.is_attributed(owner, &namespace).await {
                    found.push(to_discovered(&obj, child));
                    break;
                }
            }
        }
        found
    }

    /// Whether the owner chain starting at `owner` reaches an object labelled
    /// by the automation
    pub async fn is_attributed(&mut self, owner: &OwnerReference, namespace: &str) -> bool {
        let mut visited: Vec<String> = Vec::new();
        let mut current = owner.clone();
        let mut depth = 0;

        // Iterative walk, bounded by max_depth
        let attributed = loop {
            if let Some(&known) = self.memo.get(&current.uid) {
                break known;
            }
            visited.push(current.uid.clone());

            if depth >= self.max_depth {
                tracing::debug!(
                    "Owner chain of {}/{} exceeded depth {}",
                    current.kind,
                    current.name,
                    self.max_depth
                );
                break false;
            }
            depth += 1;

            let owner_obj = match self.lookup.get_owner(namespace, &current).await {
                Ok(Some(obj)) => obj,
                Ok(None) => break false,
                Err(e) => {
                    tracing::warn!(
                        "Failed to fetch owner {}/{}: {}",
                        current.kind,
                        current.name,
                        e
                    );
                    break false;
                }
            };

            // A recreated owner with the same name is a different object
            if owner_obj.metadata.uid.as_deref() != Some(current.uid.as_str()) {
                tracing::warn!(
                    "Owner UID mismatch for {}/{}: expected {}, got {:?}",
                    current.kind,
                    current.name,
                    current.uid,
                    owner_obj.metadata.uid
                );
                break false;
            }

            if self
                .automation
                .owns_labels(owner_obj.metadata.labels.iter().flatten())
            {
                break true;
            }

            match controller_ref(&owner_obj) {
                Some(next) => current = next,
                None => break false,
            }
        };

        for uid in visited {
            self.memo.insert(uid, attributed);
        }
        attributed
    }
}

#[async_trait]
impl ObjectsClient for KubeObjectsClient {
    async fn get_reconciled_objects(
        &self,
        automation: &AutomationRef,
        kinds: &[GroupVersionKind],
    ) -> ClientResult<Vec<DiscoveredObject>> {
        let mut unique: Vec<&GroupVersionKind> = Vec::new();
        for gvk in kinds {
            if !unique.contains(&gvk) {
                unique.push(gvk);
            }
        }

        let params = ListParams::default().labels(&automation.label_selector());
        let lists = try_join_all(unique.iter().map(|gvk| self.list_kind(gvk, &params))).await?;

        let objects: Vec<DiscoveredObject> = unique
            .iter()
            .zip(lists)
            .flat_map(|(gvk, items)| {
                items
                    .into_iter()
                    .map(|obj| to_discovered(&obj, gvk))
                    .collect::<Vec<_>>()
            })
            .collect();

        tracing::debug!(
            "Found {} objects applied by {} across {} kinds",
            objects.len(),
            automation,
            unique.len()
        );
        Ok(objects)
    }

    async fn get_child_objects(
        &self,
        automation: &AutomationRef,
        parent: &GroupVersionKind,
    ) -> ClientResult<Vec<DiscoveredObject>> {
        let children = child_kinds(&parent.kind);
        if children.is_empty() {
            tracing::debug!("{} has no controller-created children", parent.kind);
            return Ok(Vec::new());
        }

        let mut attribution = Attribution::new(self, automation, self.owner_chain_depth);
        let mut found = Vec::new();

        for child in &children {
            let candidates = self.list_kind(child, &ListParams::default()).await?;
            found.extend(
                attribution
                    .children_of(&parent.kind, child, candidates)
                    .await,
            );
        }

        tracing::debug!(
            "Found {} children of {} for {}",
            found.len(),
            parent.kind,
            automation
        );
        Ok(found)
    }
}

fn api_resource(gvk: &GroupVersionKind) -> ApiResource {
    ApiResource::from_gvk(&kube::core::GroupVersionKind::gvk(
        &gvk.group,
        &gvk.version,
        &gvk.kind,
    ))
}

/// The managing controller's owner reference, or the first owner when none is marked
fn controller_ref(obj: &DynamicObject) -> Option<OwnerReference> {
    let refs = obj.metadata.owner_references.as_ref()?;
    refs.iter()
        .find(|r| r.controller == Some(true))
        .or_else(|| refs.first())
        .cloned()
}
