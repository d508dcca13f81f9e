//! Breadth-first discovery of an automation's reconciled objects
//!
//! Each level issues one child query per unexplored kind, concurrently, and
//! waits for all of them before computing the next frontier: the kinds to ask
//! about next are only known once the current level's objects are in.

use super::models::{ChildFetchWarning, Discovery, DiscoveryError};
use crate::client::ObjectsClient;
use crate::models::{AutomationRef, DiscoveredObject, GroupVersionKind, unique_kinds};
use futures::future::join_all;
use std::collections::HashSet;

/// Upper bound on child levels for a single discovery
pub const DEFAULT_MAX_LEVELS: usize = 10;

/// Discovers the full set of objects produced by an automation
pub struct GraphBuilder<C> {
    client: C,
    max_levels: usize,
}

impl<C: ObjectsClient> GraphBuilder<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }

    /// Cap the number of child levels queried after the roots
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Discover every object the automation produced, directly or through owners
    ///
    /// Fails only when the root query fails. A failed child query counts as an
    /// empty answer for that kind and is reported in [`Discovery::warnings`].
    pub async fn discover(
        &self,
        automation: &AutomationRef,
        declared_kinds: &[GroupVersionKind],
    ) -> Result<Discovery, DiscoveryError> {
        tracing::debug!(
            "Discovering objects for {} ({} declared kinds)",
            automation,
            declared_kinds.len()
        );

        let roots = self
            .client
            .get_reconciled_objects(automation, declared_kinds)
            .await
            .map_err(|source| DiscoveryError::RootFetch {
                automation: automation.clone(),
                source,
            })?;

        let mut discovery = Discovery::default();
        if roots.is_empty() {
            tracing::debug!("No reconciled objects found for {}", automation);
            return Ok(discovery);
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut explored: HashSet<String> = HashSet::new();

        merge_new(&mut discovery.objects, &mut seen, roots);
        let mut frontier = next_frontier(&discovery.objects, &explored);

        while !frontier.is_empty() {
            if discovery.levels >= self.max_levels {
                tracing::warn!(
                    "Stopped discovery for {} after {} levels with {} unexplored kinds",
                    automation,
                    discovery.levels,
                    frontier.len()
                );
                discovery.truncated = true;
                break;
            }

            discovery.levels += 1;
            let level = discovery.levels;
            for gvk in &frontier {
                explored.insert(gvk.kind.clone());
            }

            tracing::debug!(
                "Level {}: querying children of {:?}",
                level,
                frontier.iter().map(|g| g.kind.as_str()).collect::<Vec<_>>()
            );

            let results = join_all(
                frontier
                    .iter()
                    .map(|gvk| self.client.get_child_objects(automation, gvk)),
            )
            .await;

            let level_start = discovery.objects.len();
            for (gvk, result) in frontier.iter().zip(results) {
                match result {
                    Ok(objects) => {
                        let added = merge_new(&mut discovery.objects, &mut seen, objects);
                        tracing::debug!("Children of {}: {} new objects", gvk.kind, added);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to fetch children of {} for {}: {}",
                            gvk.kind,
                            automation,
                            e
                        );
                        discovery.warnings.push(ChildFetchWarning {
                            kind: gvk.clone(),
                            level,
                            message: e.to_string(),
                        });
                    }
                }
            }

            frontier = next_frontier(&discovery.objects[level_start..], &explored);
        }

        tracing::debug!(
            "Discovered {} objects for {} in {} levels",
            discovery.objects.len(),
            automation,
            discovery.levels
        );

        Ok(discovery)
    }
}

/// Append objects not seen before, returning how many were added
fn merge_new(
    acc: &mut Vec<DiscoveredObject>,
    seen: &mut HashSet<String>,
    objects: Vec<DiscoveredObject>,
) -> usize {
    let before = acc.len();
    for obj in objects {
        if seen.insert(obj.identity()) {
            acc.push(obj);
        }
    }
    acc.len() - before
}

/// Distinct kinds among newly added objects that have not been queried yet
fn next_frontier(
    added: &[DiscoveredObject],
    explored: &HashSet<String>,
) -> Vec<GroupVersionKind> {
    unique_kinds(
        added
            .iter()
            .map(|o| &o.group_version_kind)
            .filter(|gvk| !explored.contains(&gvk.kind)),
    )
}
