//! Reconciled object graph discovery
//!
//! Walks down from an automation to every object it produced, including the
//! ones created indirectly (Deployment -> ReplicaSet -> Pod). The backend only
//! answers "children of kind K under this automation", so discovery is driven
//! here as a level-by-level breadth-first search over kinds.

mod builder;
mod models;

pub use builder::{DEFAULT_MAX_LEVELS, GraphBuilder};
pub use models::{ChildFetchWarning, Discovery, DiscoveryError};
