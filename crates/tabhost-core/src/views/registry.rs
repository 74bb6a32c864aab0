//! Interface the tab orchestrator uses to reach the view registry

use crate::types::{Server, ServerId, View, ViewId, ViewKind};

/// Lookup and lifecycle operations on view records
#[cfg_attr(test, mockall::automock)]
pub trait ViewRegistry: Send + Sync {
    /// Get a view by id
    fn get_view(&self, id: &ViewId) -> Option<View>;

    /// The view that stays enabled while its server is logged out
    fn primary_view(&self, server_id: &ServerId) -> Option<View>;

    /// Whether the view is its server's primary view
    fn is_primary_view(&self, id: &ViewId) -> bool;

    /// Create a view for a server and announce it
    fn create_view(&self, server: &Server, kind: ViewKind) -> View;

    /// Remove a view and announce it; unknown ids are ignored
    fn remove_view(&self, id: &ViewId);
}
