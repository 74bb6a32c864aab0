//! Headless surface manager
//!
//! Keeps surface state in memory and lets the embedder drive load progress
//! explicitly through [`SurfaceTable::commit_load`], [`SurfaceTable::finish_load`]
//! and [`SurfaceTable::fail_load`].

use super::{SurfaceManager, SurfaceStatus};
use crate::events::{raise, HostSignal, SignalSender};
use crate::types::{Bounds, ServerId, View, ViewId};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

struct Surface {
    server_id: ServerId,
    loading_url: String,
    current_url: Option<String>,
    status: SurfaceStatus,
    bounds: Bounds,
    find_requests: u32,
    reloads: u32,
    signals: SignalSender,
}

/// Read-only copy of a surface's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
    pub view_id: ViewId,
    pub server_id: ServerId,
    pub current_url: Option<String>,
    pub status: SurfaceStatus,
    pub bounds: Bounds,
    pub find_requests: u32,
    pub reloads: u32,
}

/// In-memory [`SurfaceManager`]
#[derive(Default)]
pub struct SurfaceTable {
    surfaces: RwLock<HashMap<ViewId, Surface>>,
    focused: RwLock<Option<ViewId>>,
}

impl SurfaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, id: &ViewId) -> Option<SurfaceSnapshot> {
        self.surfaces.read().get(id).map(|s| SurfaceSnapshot {
            view_id: id.clone(),
            server_id: s.server_id.clone(),
            current_url: s.current_url.clone(),
            status: s.status.clone(),
            bounds: s.bounds,
            find_requests: s.find_requests,
            reloads: s.reloads,
        })
    }

    pub fn len(&self) -> usize {
        self.surfaces.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.read().is_empty()
    }

    /// Surface that last received focus
    pub fn focused(&self) -> Option<ViewId> {
        self.focused.read().clone()
    }

    /// The page committed; the web app has not reported ready yet
    pub fn commit_load(&self, id: &ViewId) -> bool {
        let mut surfaces = self.surfaces.write();
        let Some(surface) = surfaces.get_mut(id) else {
            warn!("commit_load: surface {} not found", id);
            return false;
        };

        debug!("finished loading {}", surface.loading_url);
        surface.current_url = Some(surface.loading_url.clone());
        surface.status = SurfaceStatus::WaitingForApp;
        true
    }

    /// The web app is initialized; raises `load-finished`
    pub fn finish_load(&self, id: &ViewId) -> bool {
        let signals = {
            let mut surfaces = self.surfaces.write();
            let Some(surface) = surfaces.get_mut(id) else {
                warn!("finish_load: surface {} not found", id);
                return false;
            };

            if surface.current_url.is_none() {
                surface.current_url = Some(surface.loading_url.clone());
            }
            surface.status = SurfaceStatus::Ready;
            surface.signals.clone()
        };

        raise(&signals, HostSignal::LoadFinished { view_id: id.clone() });
        true
    }

    /// Loading failed for good; raises `load-failed`
    pub fn fail_load(&self, id: &ViewId, error: &str) -> bool {
        let signals = {
            let mut surfaces = self.surfaces.write();
            let Some(surface) = surfaces.get_mut(id) else {
                warn!("fail_load: surface {} not found", id);
                return false;
            };

            info!("Couldn't establish a connection with {}: {}", surface.loading_url, error);
            surface.status = SurfaceStatus::Errored(error.to_string());
            surface.signals.clone()
        };

        raise(
            &signals,
            HostSignal::LoadFailed {
                view_id: id.clone(),
                error: error.to_string(),
            },
        );
        true
    }
}

impl SurfaceManager for SurfaceTable {
    fn create_surface(&self, view: &View, loading_url: &str, signals: SignalSender) {
        debug!("createView {} loading {}", view.id, loading_url);

        self.surfaces.write().insert(
            view.id.clone(),
            Surface {
                server_id: view.server_id.clone(),
                loading_url: loading_url.to_string(),
                current_url: None,
                status: SurfaceStatus::Loading,
                bounds: Bounds::default(),
                find_requests: 0,
                reloads: 0,
                signals,
            },
        );
    }

    fn has_surface(&self, id: &ViewId) -> bool {
        self.surfaces.read().contains_key(id)
    }

    fn remove_surface(&self, id: &ViewId) {
        if self.surfaces.write().remove(id).is_some() {
            debug!("removeView {}", id);
        }

        let mut focused = self.focused.write();
        if focused.as_ref() == Some(id) {
            *focused = None;
        }
    }

    fn focus(&self, id: &ViewId) {
        if self.has_surface(id) {
            *self.focused.write() = Some(id.clone());
        }
    }

    fn set_bounds(&self, id: &ViewId, bounds: Bounds) {
        if let Some(surface) = self.surfaces.write().get_mut(id) {
            surface.bounds = bounds;
        }
    }

    fn reload(&self, id: &ViewId, url: Option<String>) {
        let mut surfaces = self.surfaces.write();
        let Some(surface) = surfaces.get_mut(id) else {
            return;
        };

        if let Some(url) = url {
            surface.loading_url = url;
        }
        // A load already in flight is left alone
        if surface.status != SurfaceStatus::Loading {
            surface.status = SurfaceStatus::Loading;
        }
        surface.reloads += 1;
    }

    fn open_find(&self, id: &ViewId) {
        if let Some(surface) = self.surfaces.write().get_mut(id) {
            surface.find_requests += 1;
        }
    }

    fn is_errored(&self, id: &ViewId) -> bool {
        self.surfaces
            .read()
            .get(id)
            .map(|s| s.status.is_errored())
            .unwrap_or(false)
    }

    fn needs_loading_screen(&self, id: &ViewId) -> bool {
        self.surfaces
            .read()
            .get(id)
            .map(|s| s.status.needs_loading_screen())
            .unwrap_or(false)
    }

    fn current_url(&self, id: &ViewId) -> Option<String> {
        self.surfaces.read().get(id).and_then(|s| s.current_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::signal_channel;
    use crate::types::ViewKind;

    fn view() -> View {
        View::new(ServerId::new("s1"), "Server", ViewKind::Tab)
    }

    #[test]
    fn test_new_surface_needs_loading_screen() {
        let (tx, _rx) = signal_channel();
        let table = SurfaceTable::new();
        let view = view();

        table.create_surface(&view, "https://chat.example.com", tx);

        assert!(table.has_surface(&view.id));
        assert!(table.needs_loading_screen(&view.id));
        assert!(!table.is_errored(&view.id));
        assert!(table.current_url(&view.id).is_none());
    }

    #[test]
    fn test_load_lifecycle_raises_signals() {
        let (tx, mut rx) = signal_channel();
        let table = SurfaceTable::new();
        let view = view();
        table.create_surface(&view, "https://chat.example.com", tx);

        assert!(table.commit_load(&view.id));
        assert_eq!(table.snapshot(&view.id).unwrap().status, SurfaceStatus::WaitingForApp);
        assert!(table.needs_loading_screen(&view.id));

        assert!(table.finish_load(&view.id));
        assert!(!table.needs_loading_screen(&view.id));
        assert_eq!(table.current_url(&view.id).as_deref(), Some("https://chat.example.com"));
        assert_eq!(
            rx.try_recv().unwrap(),
            HostSignal::LoadFinished { view_id: view.id.clone() }
        );

        assert!(table.fail_load(&view.id, "ERR_NAME_NOT_RESOLVED"));
        assert!(table.is_errored(&view.id));
        assert!(matches!(rx.try_recv().unwrap(), HostSignal::LoadFailed { .. }));
    }

    #[test]
    fn test_reload_resets_status() {
        let (tx, _rx) = signal_channel();
        let table = SurfaceTable::new();
        let view = view();
        table.create_surface(&view, "https://chat.example.com", tx);
        table.fail_load(&view.id, "ERR_TIMED_OUT");

        table.reload(&view.id, Some("https://chat.example.com/team".to_string()));

        let snapshot = table.snapshot(&view.id).unwrap();
        assert_eq!(snapshot.status, SurfaceStatus::Loading);
        assert_eq!(snapshot.reloads, 1);
    }

    #[test]
    fn test_remove_clears_focus() {
        let (tx, _rx) = signal_channel();
        let table = SurfaceTable::new();
        let view = view();
        table.create_surface(&view, "https://chat.example.com", tx);
        table.focus(&view.id);
        assert_eq!(table.focused(), Some(view.id.clone()));

        table.remove_surface(&view.id);

        assert!(table.is_empty());
        assert!(table.focused().is_none());
        assert!(!table.finish_load(&view.id));
    }
}
