//! Read-side view of the server registry used by the tab orchestrator

use crate::types::{Server, ServerId};

/// Lookup interface onto the configured servers
#[cfg_attr(test, mockall::automock)]
pub trait ServerRegistry: Send + Sync {
    /// Get a server by id
    fn get_server(&self, id: &ServerId) -> Option<Server>;

    /// Id of the server whose tabs are currently displayed
    fn current_server_id(&self) -> Option<ServerId>;
}
