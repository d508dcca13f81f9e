//! Conversion of raw cluster objects into discovered objects
//!
//! Summarizes object health into a single status string following the
//! kstatus vocabulary (`Current`, `InProgress`, `Failed`), using replica
//! counts for workloads, pod phase for pods and the `Ready` condition for
//! everything else.

use crate::models::{Condition, DiscoveredObject, GroupVersionKind};
use kube::core::DynamicObject;
use serde_json::Value;

pub const STATUS_CURRENT: &str = "Current";
pub const STATUS_IN_PROGRESS: &str = "InProgress";
pub const STATUS_FAILED: &str = "Failed";
pub const STATUS_UNKNOWN: &str = "Unknown";

/// Build a discovered object from a listed object of a known type
///
/// List responses omit `apiVersion`/`kind` on items, so the type comes from the query.
pub fn to_discovered(obj: &DynamicObject, gvk: &GroupVersionKind) -> DiscoveredObject {
    DiscoveredObject {
        group_version_kind: gvk.clone(),
        name: obj.metadata.name.clone().unwrap_or_default(),
        namespace: obj.metadata.namespace.clone().unwrap_or_default(),
        uid: obj.metadata.uid.clone().unwrap_or_default(),
        status: summarize_status(&gvk.kind, &obj.data).to_string(),
        conditions: extract_conditions(&obj.data),
    }
}

/// Extract `status.conditions` from an object body
pub fn extract_conditions(data: &Value) -> Vec<Condition> {
    data.get("status")
        .and_then(|s| s.get("conditions"))
        .and_then(|c| c.as_array())
        .map(|conditions| conditions.iter().map(parse_condition).collect())
        .unwrap_or_default()
}

fn parse_condition(c: &Value) -> Condition {
    let field = |name: &str| {
        c.get(name)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };
    let timestamp = ["lastTransitionTime", "lastUpdateTime", "lastProbeTime"]
        .iter()
        .map(|name| field(*name))
        .find(|ts| !ts.is_empty())
        .unwrap_or_default();

    Condition {
        type_: field("type"),
        status: field("status"),
        reason: field("reason"),
        message: field("message"),
        timestamp,
    }
}

/// Summarize an object's health
pub fn summarize_status(kind: &str, data: &Value) -> &'static str {
    let status = data.get("status");
    let int_at = |v: Option<&Value>, key: &str| v.and_then(|v| v.get(key)).and_then(|n| n.as_i64());

    match kind {
        "Deployment" | "StatefulSet" | "ReplicaSet" => {
            let desired = int_at(data.get("spec"), "replicas").unwrap_or(1);
            let ready = int_at(status, "readyReplicas").unwrap_or(0);
            if ready >= desired {
                STATUS_CURRENT
            } else {
                STATUS_IN_PROGRESS
            }
        }
        "DaemonSet" => {
            let desired = int_at(status, "desiredNumberScheduled").unwrap_or(0);
            let ready = int_at(status, "numberReady").unwrap_or(0);
            if ready == desired {
                STATUS_CURRENT
            } else {
                STATUS_IN_PROGRESS
            }
        }
        "Job" => {
            if int_at(status, "succeeded").unwrap_or(0) > 0 {
                STATUS_CURRENT
            } else if int_at(status, "failed").unwrap_or(0) > 0 {
                STATUS_FAILED
            } else {
                STATUS_IN_PROGRESS
            }
        }
        "Pod" => match status.and_then(|s| s.get("phase")).and_then(|p| p.as_str()) {
            Some("Succeeded") => STATUS_CURRENT,
            Some("Failed") => STATUS_FAILED,
            Some("Unknown") => STATUS_UNKNOWN,
            Some("Running") => match ready_condition(data) {
                Some(("True", _)) => STATUS_CURRENT,
                _ => STATUS_IN_PROGRESS,
            },
            _ => STATUS_IN_PROGRESS,
        },
        _ => match ready_condition(data) {
            Some(("True", _)) => STATUS_CURRENT,
            Some(("False", reason)) if reason.starts_with("Progressing") => STATUS_IN_PROGRESS,
            Some(("False", _)) => STATUS_FAILED,
            Some(("Unknown", _)) => STATUS_IN_PROGRESS,
            Some(_) => STATUS_UNKNOWN,
            // No Ready condition (ConfigMaps, Services, ...): current once applied
            None => STATUS_CURRENT,
        },
    }
}

/// Status and reason of the `Ready` condition
fn ready_condition(data: &Value) -> Option<(&str, &str)> {
    let condition = data
        .get("status")?
        .get("conditions")?
        .as_array()?
        .iter()
        .find(|c| c.get("type").and_then(|t| t.as_str()) == Some("Ready"))?;
    let status = condition.get("status").and_then(|s| s.as_str()).unwrap_or("");
    let reason = condition.get("reason").and_then(|r| r.as_str()).unwrap_or("");
    Some((status, reason))
}
