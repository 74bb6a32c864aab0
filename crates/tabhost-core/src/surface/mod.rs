//! Rendering surfaces
//!
//! One surface exists per tab-kind view. The [`SurfaceManager`] trait is the
//! seam the tab orchestrator talks to; [`SurfaceTable`] is the headless
//! implementation used by the shell and by tests.

mod table;

pub use table::{SurfaceSnapshot, SurfaceTable};

use crate::events::SignalSender;
use crate::types::{Bounds, View, ViewId};
use serde::{Deserialize, Serialize};

/// Load status of a surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceStatus {
    /// Navigation in flight
    Loading,
    /// Page committed, waiting for the web app to report it is ready
    WaitingForApp,
    /// Web app initialized; the loading screen can go
    Ready,
    /// Loading failed; the window shows its error page instead
    Errored(String),
}

impl SurfaceStatus {
    pub fn is_errored(&self) -> bool {
        matches!(self, Self::Errored(_))
    }

    pub fn needs_loading_screen(&self) -> bool {
        !matches!(self, Self::Ready | Self::Errored(_))
    }
}

/// Owner of the renderable surfaces, keyed by view id
#[cfg_attr(test, mockall::automock)]
pub trait SurfaceManager: Send + Sync {
    /// Create and start loading the surface for a view. Load completion and
    /// failure are reported on `signals`.
    fn create_surface(&self, view: &View, loading_url: &str, signals: SignalSender);

    fn has_surface(&self, id: &ViewId) -> bool;

    /// Destroy a surface; unknown ids are ignored
    fn remove_surface(&self, id: &ViewId);

    fn focus(&self, id: &ViewId);

    fn set_bounds(&self, id: &ViewId, bounds: Bounds);

    /// Reload at `url`, or at the loading URL when `None`
    fn reload(&self, id: &ViewId, url: Option<String>);

    /// Open the find-in-page bar
    fn open_find(&self, id: &ViewId);

    fn is_errored(&self, id: &ViewId) -> bool;

    fn needs_loading_screen(&self, id: &ViewId) -> bool;

    /// URL of the committed page, if any has loaded
    fn current_url(&self, id: &ViewId) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(SurfaceStatus::Loading.needs_loading_screen());
        assert!(SurfaceStatus::WaitingForApp.needs_loading_screen());
        assert!(!SurfaceStatus::Ready.needs_loading_screen());

        let failed = SurfaceStatus::Errored("ERR_CONNECTION_REFUSED".to_string());
        assert!(failed.is_errored());
        assert!(!failed.needs_loading_screen());
    }
}
