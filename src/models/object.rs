//! Discovered cluster objects and their status conditions

use super::gvk::GroupVersionKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status condition carried through unchanged from the cluster object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Condition {
    fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// A live cluster object attributed to an automation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredObject {
    #[serde(default)]
    pub group_version_kind: GroupVersionKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl DiscoveredObject {
    pub fn kind(&self) -> &str {
        &self.group_version_kind.kind
    }

    /// Identity used to deduplicate discovery results
    ///
    /// The cluster-assigned uid; objects without one fall back to
    /// `kind/namespace/name` so they are not collapsed together.
    pub fn identity(&self) -> String {
        if self.uid.is_empty() {
            format!("{}/{}/{}", self.kind(), self.namespace, self.name)
        } else {
            self.uid.clone()
        }
    }

    /// The most recent condition by timestamp, or the first one if none have a
    /// parseable timestamp
    pub fn latest_condition(&self) -> Option<&Condition> {
        let mut latest: Option<(&Condition, DateTime<Utc>)> = None;
        for condition in &self.conditions {
            if let Some(ts) = condition.parsed_timestamp() {
                match latest {
                    Some((_, best)) if best >= ts => {}
                    _ => latest = Some((condition, ts)),
                }
            }
        }
        latest
            .map(|(condition, _)| condition)
            .or_else(|| self.conditions.first())
    }

    pub fn latest_message(&self) -> &str {
        self.latest_condition()
            .map(|c| c.message.as_str())
            .unwrap_or("")
    }
}
