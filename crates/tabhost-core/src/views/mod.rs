//! View registry
//!
//! Logical view records (identity, owning server, kind, title) and the
//! primary view of each server. Creating or removing a view raises a
//! [`crate::events::HostSignal`] which the tab orchestrator reacts to.

mod manager;
mod registry;

pub use manager::ViewManager;
pub use registry::ViewRegistry;

#[cfg(test)]
pub use registry::MockViewRegistry;
