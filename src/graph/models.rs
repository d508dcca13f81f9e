//! Data structures for discovery results

use crate::client::ClientError;
use crate::models::{AutomationRef, DiscoveredObject, GroupVersionKind};
use std::fmt;

/// Flat snapshot of the objects an automation produced
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Roots first, then each level in the order its parent kind was queried
    pub objects: Vec<DiscoveredObject>,
    /// Child queries that failed; their kinds contributed no objects
    pub warnings: Vec<ChildFetchWarning>,
    /// Number of child levels that were queried
    pub levels: usize,
    /// The level cap stopped discovery while unexplored kinds remained
    pub truncated: bool,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// First discovered object of the given kind
    pub fn find_kind(&self, kind: &str) -> Option<&DiscoveredObject> {
        self.objects.iter().find(|o| o.kind() == kind)
    }

    /// Distinct kinds present in the result, in discovery order
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for obj in &self.objects {
            if !kinds.contains(&obj.kind()) {
                kinds.push(obj.kind());
            }
        }
        kinds
    }
}

/// A child query that failed without aborting the rest of the discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFetchWarning {
    /// Parent kind whose children could not be fetched
    pub kind: GroupVersionKind,
    /// Child level (1-based) the query belonged to
    pub level: usize,
    pub message: String,
}

impl fmt::Display for ChildFetchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to fetch children of {} (level {}): {}",
            self.kind.kind, self.level, self.message
        )
    }
}

/// Discovery failures that leave no trustworthy result
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch reconciled objects for {automation}: {source}")]
    RootFetch {
        automation: AutomationRef,
        #[source]
        source: ClientError,
    },
}
