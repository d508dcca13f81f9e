//! Backend operations consumed by the graph builder
//!
//! The graph builder only needs two read-only queries. They are expressed as a
//! trait so the builder can be driven by the Kubernetes API in production and by
//! scripted fakes in tests.

use crate::models::{AutomationRef, DiscoveredObject, GroupVersionKind};
use async_trait::async_trait;

/// Errors returned by an [`ObjectsClient`]
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Request failed with status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Read-only queries for the objects an automation produced
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectsClient: Send + Sync {
    /// Objects of the declared kinds that the automation applied directly
    async fn get_reconciled_objects(
        &self,
        automation: &AutomationRef,
        kinds: &[GroupVersionKind],
    ) -> ClientResult<Vec<DiscoveredObject>>;

    /// Objects whose owner chain leads to an object of `parent` kind under the automation
    async fn get_child_objects(
        &self,
        automation: &AutomationRef,
        parent: &GroupVersionKind,
    ) -> ClientResult<Vec<DiscoveredObject>>;
}

#[async_trait]
impl<C: ObjectsClient + ?Sized> ObjectsClient for std::sync::Arc<C> {
    async fn get_reconciled_objects(
        &self,
        automation: &AutomationRef,
        kinds: &[GroupVersionKind],
    ) -> ClientResult<Vec<DiscoveredObject>> {
        (**self).get_reconciled_objects(automation, kinds).await
    }

    async fn get_child_objects(
        &self,
        automation: &AutomationRef,
        parent: &GroupVersionKind,
    ) -> ClientResult<Vec<DiscoveredObject>> {
        (**self).get_child_objects(automation, parent).await
    }
}
