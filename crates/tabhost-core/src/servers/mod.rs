//! Server registry
//!
//! This module handles:
//! - The set of configured servers and their display order
//! - Which server is current
//! - Login state per server
//! - Persisting user-added servers through [`crate::storage::Storage`]

mod manager;
mod registry;

pub use manager::ServerManager;
pub use registry::ServerRegistry;

#[cfg(test)]
pub use registry::MockServerRegistry;
