//! Service layer for business logic
//!
//! Sits between the command handlers and the Kubernetes API. Results of
//! concurrent discoveries are reconciled through [`ReconciledView`].

pub mod reconciled_view;
pub mod resource_service;

pub use reconciled_view::{DiscoveryTicket, ReconciledView};
pub use resource_service::{DiscoverySettings, ResourceService};
