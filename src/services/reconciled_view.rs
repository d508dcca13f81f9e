//! Caller-side state for a reconciled objects display
//!
//! Discoveries may complete out of order when the selection changes or a
//! refresh overlaps a slow one. Each discovery is started with a ticket and
//! only the most recently issued ticket may update the view.

use crate::graph::{ChildFetchWarning, Discovery, DiscoveryError};
use crate::models::{AutomationRef, DiscoveredObject, GroupVersionKind};

/// Handle for one in-flight discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTicket {
    generation: u64,
    automation: AutomationRef,
}

impl DiscoveryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn automation(&self) -> &AutomationRef {
        &self.automation
    }
}

/// Displayed result of the latest discovery for one automation
#[derive(Debug, Default)]
pub struct ReconciledView {
    generation: u64,
    automation: Option<AutomationRef>,
    kinds: Vec<GroupVersionKind>,
    objects: Vec<DiscoveredObject>,
    warnings: Vec<ChildFetchWarning>,
    error: Option<String>,
    loading: bool,
}

impl ReconciledView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a discovery, superseding any that is still in flight
    ///
    /// A different automation or set of declared kinds clears what is displayed.
    pub fn begin(
        &mut self,
        automation: &AutomationRef,
        kinds: &[GroupVersionKind],
    ) -> DiscoveryTicket {
        if self.automation.as_ref() != Some(automation) || self.kinds != kinds {
            tracing::debug!("Resetting reconciled view for {}", automation);
            self.objects.clear();
            self.warnings.clear();
            self.error = None;
            self.automation = Some(automation.clone());
            self.kinds = kinds.to_vec();
        }

        self.generation += 1;
        self.loading = true;
        DiscoveryTicket {
            generation: self.generation,
            automation: automation.clone(),
        }
    }

    /// Start a periodic refresh unless the same selection is still loading
    ///
    /// Unlike [`begin`](Self::begin), a refresh never supersedes a running
    /// discovery, so a cluster slower than the refresh period still gets
    /// every result displayed.
    pub fn refresh(
        &mut self,
        automation: &AutomationRef,
        kinds: &[GroupVersionKind],
    ) -> Option<DiscoveryTicket> {
        if self.loading && self.automation.as_ref() == Some(automation) && self.kinds == kinds {
            tracing::debug!(
                "Skipping refresh of {}: discovery {} still running",
                automation,
                self.generation
            );
            return None;
        }
        Some(self.begin(automation, kinds))
    }

    /// Apply a finished discovery
    ///
    /// Returns false when the ticket was superseded and the outcome discarded.
    pub fn complete(
        &mut self,
        ticket: &DiscoveryTicket,
        outcome: Result<Discovery, DiscoveryError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!(
                "Discarding superseded discovery {} for {} (current: {})",
                ticket.generation,
                ticket.automation,
                self.generation
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(discovery) => {
                tracing::debug!(
                    "Discovery {} produced {} objects",
                    ticket.generation,
                    discovery.len()
                );
                self.objects = discovery.objects;
                self.warnings = discovery.warnings;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Discovery {} failed: {}", ticket.generation, e);
                self.objects.clear();
                self.warnings.clear();
                self.error = Some(e.to_string());
            }
        }
        true
    }

    pub fn is_current(&self, ticket: &DiscoveryTicket) -> bool {
        ticket.generation == self.generation && self.automation.as_ref() == Some(&ticket.automation)
    }

    pub fn automation(&self) -> Option<&AutomationRef> {
        self.automation.as_ref()
    }

    pub fn objects(&self) -> &[DiscoveredObject] {
        &self.objects
    }

    pub fn warnings(&self) -> &[ChildFetchWarning] {
        &self.warnings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
