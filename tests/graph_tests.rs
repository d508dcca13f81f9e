//! Graph discovery tests
//!
//! Drives the breadth-first discovery with a scripted client that answers
//! child queries per parent kind and records every call it receives.

use async_trait::async_trait;
use fluxgraph::client::{ClientError, ClientResult, ObjectsClient};
use fluxgraph::graph::{DiscoveryError, GraphBuilder};
use fluxgraph::models::{AutomationKind, AutomationRef, DiscoveredObject, GroupVersionKind};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers queries from fixed scripts
#[derive(Default)]
struct ScriptedClient {
    roots: Vec<DiscoveredObject>,
    root_error: Option<String>,
    children: HashMap<String, Vec<DiscoveredObject>>,
    failing: HashMap<String, String>,
    /// Parent kinds whose every answer is a fresh object of the mapped kind
    generators: HashMap<String, GroupVersionKind>,
    counter: AtomicUsize,
    child_calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn with_roots(roots: Vec<DiscoveredObject>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    fn children(mut self, parent: &str, objects: Vec<DiscoveredObject>) -> Self {
        self.children.insert(parent.to_string(), objects);
        self
    }

    fn failing(mut self, parent: &str, message: &str) -> Self {
        self.failing.insert(parent.to_string(), message.to_string());
        self
    }

    fn generate(mut self, parent: &str, child: GroupVersionKind) -> Self {
        self.generators.insert(parent.to_string(), child);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.child_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectsClient for ScriptedClient {
    async fn get_reconciled_objects(
        &self,
        _automation: &AutomationRef,
        _kinds: &[GroupVersionKind],
    ) -> ClientResult<Vec<DiscoveredObject>> {
        match &self.root_error {
            Some(message) => Err(ClientError::Status {
                code: 500,
                message: message.clone(),
            }),
            None => Ok(self.roots.clone()),
        }
    }

    async fn get_child_objects(
        &self,
        _automation: &AutomationRef,
        parent: &GroupVersionKind,
    ) -> ClientResult<Vec<DiscoveredObject>> {
        self.child_calls.lock().unwrap().push(parent.kind.clone());

        if let Some(message) = self.failing.get(&parent.kind) {
            return Err(ClientError::Status {
                code: 503,
                message: message.clone(),
            });
        }
        if let Some(child) = self.generators.get(&parent.kind) {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            let name = format!("generated-{}", n);
            return Ok(vec![object(child.clone(), &name, &format!("uid-{}", name))]);
        }
        Ok(self.children.get(&parent.kind).cloned().unwrap_or_default())
    }
}

fn object(gvk: GroupVersionKind, name: &str, uid: &str) -> DiscoveredObject {
    DiscoveredObject {
        group_version_kind: gvk,
        name: name.to_string(),
        namespace: "default".to_string(),
        uid: uid.to_string(),
        status: "Current".to_string(),
        conditions: Vec::new(),
    }
}

fn deployment() -> GroupVersionKind {
    GroupVersionKind::new("apps", "v1", "Deployment")
}

fn replica_set() -> GroupVersionKind {
    GroupVersionKind::new("apps", "v1", "ReplicaSet")
}

fn pod() -> GroupVersionKind {
    GroupVersionKind::new("", "v1", "Pod")
}

fn automation() -> AutomationRef {
    AutomationRef::new(AutomationKind::Kustomization, "flux-system", "apps")
}

#[tokio::test]
async fn test_deployment_replicaset_pod_chain() {
    let client = ScriptedClient::with_roots(vec![object(deployment(), "stringly", "uid-deploy")])
        .children(
            "Deployment",
            vec![object(replica_set(), "stringly-7d9b7454c7", "uid-rs")],
        )
        .children(
            "ReplicaSet",
            vec![object(pod(), "stringly-7d9b7454c7-mvz75", "uid-pod")],
        );
    let builder = GraphBuilder::new(client);

    let discovery = builder.discover(&automation(), &[deployment()]).await.unwrap();

    assert_eq!(discovery.len(), 3);
    assert_eq!(discovery.find_kind("Deployment").unwrap().name, "stringly");
    assert_eq!(
        discovery.find_kind("ReplicaSet").unwrap().name,
        "stringly-7d9b7454c7"
    );
    assert_eq!(
        discovery.find_kind("Pod").unwrap().name,
        "stringly-7d9b7454c7-mvz75"
    );
    assert_eq!(discovery.kinds(), vec!["Deployment", "ReplicaSet", "Pod"]);
    assert!(discovery.warnings.is_empty());
    assert!(!discovery.truncated);
    assert_eq!(builder.client().calls(), vec!["Deployment", "ReplicaSet", "Pod"]);
}

#[tokio::test]
async fn test_empty_roots_skip_child_queries() {
    let builder = GraphBuilder::new(ScriptedClient::default());

    let discovery = builder.discover(&automation(), &[deployment()]).await.unwrap();

    assert!(discovery.is_empty());
    assert_eq!(discovery.levels, 0);
    assert!(builder.client().calls().is_empty());
}

#[tokio::test]
async fn test_one_child_query_per_distinct_root_kind() {
    let service = GroupVersionKind::new("", "v1", "Service");
    let config_map = GroupVersionKind::new("", "v1", "ConfigMap");
    let client = ScriptedClient::with_roots(vec![
        object(deployment(), "web", "uid-1"),
        object(deployment(), "worker", "uid-2"),
        object(service.clone(), "web", "uid-3"),
        object(config_map, "settings", "uid-4"),
        object(service, "worker", "uid-5"),
    ]);
    let builder = GraphBuilder::new(client);

    let discovery = builder.discover(&automation(), &[]).await.unwrap();

    assert_eq!(discovery.len(), 5);
    assert_eq!(discovery.levels, 1);
    assert_eq!(
        builder.client().calls(),
        vec!["Deployment", "Service", "ConfigMap"]
    );
}

#[tokio::test]
async fn test_kinds_deduplicated_across_api_versions() {
    let legacy = GroupVersionKind::new("extensions", "v1beta1", "Deployment");
    let client = ScriptedClient::with_roots(vec![
        object(deployment(), "web", "uid-1"),
        object(legacy, "old-web", "uid-2"),
    ]);
    let builder = GraphBuilder::new(client);

    builder.discover(&automation(), &[]).await.unwrap();

    assert_eq!(builder.client().calls(), vec!["Deployment"]);
}

#[tokio::test]
async fn test_duplicate_uid_is_not_added_or_expanded() {
    // The child reuses the root's uid under a different kind
    let client = ScriptedClient::with_roots(vec![object(deployment(), "web", "uid-1")])
        .children("Deployment", vec![object(replica_set(), "web-abc", "uid-1")]);
    let builder = GraphBuilder::new(client);

    let discovery = builder.discover(&automation(), &[]).await.unwrap();

    assert_eq!(discovery.len(), 1);
    assert!(discovery.find_kind("ReplicaSet").is_none());
    assert_eq!(builder.client().calls(), vec!["Deployment"]);
}

#[tokio::test]
async fn test_objects_without_uid_are_kept_apart() {
    let client = ScriptedClient::with_roots(vec![
        object(deployment(), "web", ""),
        object(deployment(), "worker", ""),
        object(deployment(), "web", ""),
    ]);
    let builder = GraphBuilder::new(client);

    let discovery = builder.discover(&automation(), &[]).await.unwrap();

    let names: Vec<&str> = discovery.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["web", "worker"]);
}

#[tokio::test]
async fn test_cyclic_ownership_terminates() {
    // Each answer is a brand new object, so only kind dedupe stops the cycle
    let client = ScriptedClient::with_roots(vec![object(deployment(), "web", "uid-1")])
        .generate("Deployment", replica_set())
        .generate("ReplicaSet", deployment());
    let builder = GraphBuilder::new(client);

    let discovery = builder.discover(&automation(), &[]).await.unwrap();

    assert_eq!(builder.client().calls(), vec!["Deployment", "ReplicaSet"]);
    assert_eq!(discovery.len(), 3);
    assert_eq!(discovery.levels, 2);
    assert!(!discovery.truncated);
}

#[tokio::test]
async fn test_level_cap_truncates_discovery() {
    let kind = |n: usize| GroupVersionKind::new("example.com", "v1", &format!("Kind{}", n));
    let mut client = ScriptedClient::with_roots(vec![object(kind(0), "root", "uid-root")]);
    for n in 0..20 {
        client = client.generate(&format!("Kind{}", n), kind(n + 1));
    }
    let builder = GraphBuilder::new(client);

    let discovery = builder.discover(&automation(), &[]).await.unwrap();

    assert_eq!(builder.max_levels(), 10);
    assert_eq!(discovery.levels, 10);
    assert!(discovery.truncated);
    assert_eq!(builder.client().calls().len(), 10);
    assert_eq!(discovery.len(), 11);
}

#[tokio::test]
async fn test_custom_level_cap() {
    let client = ScriptedClient::with_roots(vec![object(deployment(), "web", "uid-1")])
        .children("Deployment", vec![object(replica_set(), "web-abc", "uid-2")])
        .children("ReplicaSet", vec![object(pod(), "web-abc-xyz", "uid-3")]);
    let builder = GraphBuilder::new(client).with_max_levels(1);

    let discovery = builder.discover(&automation(), &[]).await.unwrap();

    assert_eq!(discovery.len(), 2);
    assert!(discovery.truncated);
    assert!(discovery.find_kind("Pod").is_none());
}

#[tokio::test]
async fn test_root_failure_is_fatal() {
    let client = ScriptedClient {
        root_error: Some("etcd unavailable".to_string()),
        ..Default::default()
    };
    let builder = GraphBuilder::new(client);

    let err = builder.discover(&automation(), &[deployment()]).await.unwrap_err();

    match &err {
        DiscoveryError::RootFetch { automation: a, .. } => assert_eq!(a, &automation()),
    }
    assert!(err.to_string().contains("Kustomization/flux-system/apps"));
    assert!(builder.client().calls().is_empty());
}

#[tokio::test]
async fn test_child_failure_keeps_siblings() {
    let stateful_set = GroupVersionKind::new("apps", "v1", "StatefulSet");
    let client = ScriptedClient::with_roots(vec![
        object(deployment(), "web", "uid-1"),
        object(stateful_set, "db", "uid-2"),
    ])
    .failing("Deployment", "forbidden")
    .children("StatefulSet", vec![object(pod(), "db-0", "uid-3")]);
    let builder = GraphBuilder::new(client);

    let discovery = builder.discover(&automation(), &[]).await.unwrap();

    assert_eq!(discovery.len(), 3);
    assert_eq!(discovery.find_kind("Pod").unwrap().name, "db-0");
    assert_eq!(discovery.warnings.len(), 1);
    assert_eq!(discovery.warnings[0].kind, deployment());
    assert_eq!(discovery.warnings[0].level, 1);
    assert!(discovery.warnings[0].message.contains("forbidden"));
}
