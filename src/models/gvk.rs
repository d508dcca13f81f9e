//! GroupVersionKind identifier for Kubernetes resource types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies a Kubernetes resource type
///
/// Structural equality compares all three parts. Discovery deduplicates query
/// targets by [`GroupVersionKind::kind`] only, see [`GroupVersionKind::same_kind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Build from a manifest `apiVersion` ("apps/v1" or "v1") and a kind
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }

    /// The `apiVersion` string for this type ("apps/v1", or "v1" for the core group)
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Whether two identifiers name the same kind, ignoring group and version
    pub fn same_kind(&self, other: &GroupVersionKind) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.kind)
    }
}

/// Parses `group/version/Kind`, or `version/Kind` for the core group
impl FromStr for GroupVersionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        let gvk = match parts.as_slice() {
            [group, version, kind] => Self::new(group, version, kind),
            [version, kind] => Self::new("", version, kind),
            _ => return Err(format!("Invalid GroupVersionKind: {}", s)),
        };
        if gvk.version.is_empty() || gvk.kind.is_empty() {
            return Err(format!("Invalid GroupVersionKind: {}", s));
        }
        Ok(gvk)
    }
}

/// Distinct kinds in order of first appearance, compared by `kind` only
pub fn unique_kinds<'a, I>(gvks: I) -> Vec<GroupVersionKind>
where
    I: IntoIterator<Item = &'a GroupVersionKind>,
{
    let mut unique: Vec<GroupVersionKind> = Vec::new();
    for gvk in gvks {
        if !unique.iter().any(|seen| seen.same_kind(gvk)) {
            unique.push(gvk.clone());
        }
    }
    unique
}
