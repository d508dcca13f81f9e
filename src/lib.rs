//! fluxgraph library
//!
//! Discovers every Kubernetes object produced by a Flux automation (a
//! Kustomization or HelmRelease) and presents the result as a sortable table.
//! It can be used both as a binary and as a library for testing.

pub mod cli;
pub mod client;
pub mod config;
pub mod graph;
pub mod kube;
pub mod models;
pub mod services;
pub mod table;

// Re-export commonly used types for convenience
pub use client::{ClientError, ClientResult, ObjectsClient};
pub use graph::{ChildFetchWarning, Discovery, DiscoveryError, GraphBuilder};
pub use models::{AutomationKind, AutomationRef, DiscoveredObject, GroupVersionKind};
