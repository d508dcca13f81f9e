//! Automation kinds and references
//!
//! An automation is a Flux resource that reconciles a source into cluster
//! objects. Centralizes the kind names, ownership labels and API coordinates
//! so they are not hardcoded throughout the codebase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumeration of the Flux automation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutomationKind {
    // Kustomize Controller
    Kustomization,
    // Helm Controller
    HelmRelease,
}

impl AutomationKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationKind::Kustomization => "Kustomization",
            AutomationKind::HelmRelease => "HelmRelease",
        }
    }

    pub fn api_group(&self) -> &'static str {
        match self {
            AutomationKind::Kustomization => "kustomize.toolkit.fluxcd.io",
            AutomationKind::HelmRelease => "helm.toolkit.fluxcd.io",
        }
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            AutomationKind::Kustomization => "v1",
            AutomationKind::HelmRelease => "v2",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            AutomationKind::Kustomization => "kustomizations",
            AutomationKind::HelmRelease => "helmreleases",
        }
    }

    /// Label set by the controller on every object it applies, naming the automation
    pub fn name_label(&self) -> String {
        format!("{}/name", self.api_group())
    }

    /// Label set by the controller on every object it applies, naming the automation's namespace
    pub fn namespace_label(&self) -> String {
        format!("{}/namespace", self.api_group())
    }

    /// Try to parse a string (case-insensitive, short names allowed)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "kustomization" | "ks" | "kustomizations" | "kustomizationautomation" => {
                Some(AutomationKind::Kustomization)
            }
            "helmrelease" | "hr" | "helmreleases" | "helmreleaseautomation" => {
                Some(AutomationKind::HelmRelease)
            }
            _ => None,
        }
    }
}

impl fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AutomationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_case_insensitive(s)
            .ok_or_else(|| format!("Unknown automation kind: {}", s))
    }
}

/// Identifies the Kustomization or HelmRelease whose objects are being discovered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AutomationRef {
    pub name: String,
    pub namespace: String,
    pub kind: AutomationKind,
}

impl AutomationRef {
    pub fn new(kind: AutomationKind, namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            kind,
        }
    }

    /// Label selector matching the objects this automation applied directly
    pub fn label_selector(&self) -> String {
        format!(
            "{}={},{}={}",
            self.kind.name_label(),
            self.name,
            self.kind.namespace_label(),
            self.namespace
        )
    }

    /// Whether a label set marks an object as applied by this automation
    pub fn owns_labels<'a, I>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let name_label = self.kind.name_label();
        let namespace_label = self.kind.namespace_label();
        let (mut name_matches, mut namespace_matches) = (false, false);
        for (key, value) in labels {
            if *key == name_label && *value == self.name {
                name_matches = true;
            }
            if *key == namespace_label && *value == self.namespace {
                namespace_matches = true;
            }
        }
        name_matches && namespace_matches
    }
}

impl fmt::Display for AutomationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}
