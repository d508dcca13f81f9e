//! Model layer
//!
//! Structure:
//! - `automation.rs` - Automation kinds (Kustomization, HelmRelease) and references
//! - `gvk.rs` - GroupVersionKind identifiers
//! - `object.rs` - Discovered cluster objects and conditions

pub mod automation;
pub mod gvk;
pub mod object;

pub use automation::{AutomationKind, AutomationRef};
pub use gvk::{GroupVersionKind, unique_kinds};
pub use object::{Condition, DiscoveredObject};
