//! In-memory view registry

use super::ViewRegistry;
use crate::error::{Error, Result, ViewError};
use crate::events::{raise, HostSignal, SignalSender};
use crate::types::{Server, ServerId, View, ViewId, ViewKind};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct ViewState {
    views: IndexMap<ViewId, View>,
    primary: HashMap<ServerId, ViewId>,
}

/// Owns every view record and the primary view per server
pub struct ViewManager {
    state: RwLock<ViewState>,
    signals: SignalSender,
}

impl ViewManager {
    pub fn new(signals: SignalSender) -> Self {
        Self {
            state: RwLock::new(ViewState::default()),
            signals,
        }
    }

    /// Views owned by a server, in creation order
    pub fn views_for_server(&self, server_id: &ServerId) -> Vec<View> {
        self.state
            .read()
            .views
            .values()
            .filter(|v| &v.server_id == server_id)
            .cloned()
            .collect()
    }

    /// Change a view's title and announce the update
    pub fn update_view_title(&self, id: &ViewId, title: &str) -> Result<()> {
        {
            let mut state = self.state.write();
            let view = state
                .views
                .get_mut(id)
                .ok_or_else(|| Error::View(ViewError::NotFound(id.to_string())))?;
            if view.title == title {
                return Ok(());
            }
            view.title = title.to_string();
        }

        debug!("updateViewTitle {} {:?}", id, title);
        raise(&self.signals, HostSignal::ViewUpdated { view_id: id.clone() });
        Ok(())
    }

    /// Open the initial tab for a newly added server
    pub fn handle_server_added(&self, server: &Server) -> View {
        debug!("handleServerWasAdded {}", server.id);
        self.create_view(server, ViewKind::Tab)
    }

    /// Drop every view belonging to a removed server
    pub fn handle_server_removed(&self, server_id: &ServerId) {
        debug!("handleServerWasRemoved {}", server_id);
        for view in self.views_for_server(server_id) {
            self.remove_view(&view.id);
        }
        self.state.write().primary.remove(server_id);
    }
}

impl ViewRegistry for ViewManager {
    fn get_view(&self, id: &ViewId) -> Option<View> {
        self.state.read().views.get(id).cloned()
    }

    fn primary_view(&self, server_id: &ServerId) -> Option<View> {
        let state = self.state.read();
        state
            .primary
            .get(server_id)
            .and_then(|id| state.views.get(id))
            .cloned()
    }

    fn is_primary_view(&self, id: &ViewId) -> bool {
        let state = self.state.read();
        state
            .views
            .get(id)
            .map(|v| state.primary.get(&v.server_id) == Some(id))
            .unwrap_or(false)
    }

    fn create_view(&self, server: &Server, kind: ViewKind) -> View {
        debug!("createView {} {:?}", server.id, kind);

        let view = View::new(server.id.clone(), &server.name, kind);
        {
            let mut state = self.state.write();
            state.views.insert(view.id.clone(), view.clone());
            if kind == ViewKind::Tab && !state.primary.contains_key(&server.id) {
                state.primary.insert(server.id.clone(), view.id.clone());
            }
        }

        raise(&self.signals, HostSignal::ViewCreated { view_id: view.id.clone() });
        view
    }

    fn remove_view(&self, id: &ViewId) {
        debug!("removeView {}", id);

        let removed = {
            let mut state = self.state.write();
            let Some(view) = state.views.shift_remove(id) else {
                return;
            };

            if state.primary.get(&view.server_id) == Some(id) {
                let successor = state
                    .views
                    .values()
                    .find(|v| v.server_id == view.server_id && v.is_tab())
                    .map(|v| v.id.clone());
                match successor {
                    Some(next) => {
                        state.primary.insert(view.server_id.clone(), next);
                    }
                    None => {
                        state.primary.remove(&view.server_id);
                    }
                }
            }
            view
        };

        raise(
            &self.signals,
            HostSignal::ViewRemoved {
                view_id: removed.id,
                server_id: removed.server_id,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::signal_channel;
    use pretty_assertions::assert_eq;

    fn server(id: &str) -> Server {
        Server::with_id(id, id.to_uppercase(), format!("https://{}.example.com", id))
    }

    #[test]
    fn test_first_tab_becomes_primary() {
        let (tx, mut rx) = signal_channel();
        let manager = ViewManager::new(tx);
        let srv = server("a");

        let first = manager.create_view(&srv, ViewKind::Tab);
        let second = manager.create_view(&srv, ViewKind::Tab);

        assert!(manager.is_primary_view(&first.id));
        assert!(!manager.is_primary_view(&second.id));
        assert_eq!(manager.primary_view(&srv.id).unwrap().id, first.id);
        assert_eq!(first.title, "A");

        assert_eq!(
            rx.try_recv().unwrap(),
            HostSignal::ViewCreated { view_id: first.id }
        );
    }

    #[test]
    fn test_window_views_are_never_primary() {
        let (tx, _rx) = signal_channel();
        let manager = ViewManager::new(tx);
        let srv = server("a");

        let popout = manager.create_view(&srv, ViewKind::Window);
        assert!(!manager.is_primary_view(&popout.id));
        assert!(manager.primary_view(&srv.id).is_none());
    }

    #[test]
    fn test_removing_primary_promotes_next_tab() {
        let (tx, mut rx) = signal_channel();
        let manager = ViewManager::new(tx);
        let srv = server("a");
        let first = manager.create_view(&srv, ViewKind::Tab);
        let second = manager.create_view(&srv, ViewKind::Tab);
        while rx.try_recv().is_ok() {}

        manager.remove_view(&first.id);

        assert!(manager.get_view(&first.id).is_none());
        assert!(manager.is_primary_view(&second.id));
        assert_eq!(
            rx.try_recv().unwrap(),
            HostSignal::ViewRemoved {
                view_id: first.id,
                server_id: srv.id,
            }
        );
    }

    #[test]
    fn test_remove_unknown_view_is_silent() {
        let (tx, mut rx) = signal_channel();
        let manager = ViewManager::new(tx);

        manager.remove_view(&ViewId::new("ghost"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_update_title_only_signals_on_change() {
        let (tx, mut rx) = signal_channel();
        let manager = ViewManager::new(tx);
        let view = manager.create_view(&server("a"), ViewKind::Tab);
        while rx.try_recv().is_ok() {}

        manager.update_view_title(&view.id, "Town Square").unwrap();
        manager.update_view_title(&view.id, "Town Square").unwrap();

        assert_eq!(manager.get_view(&view.id).unwrap().title, "Town Square");
        assert_eq!(
            rx.try_recv().unwrap(),
            HostSignal::ViewUpdated { view_id: view.id }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_server_removal_drops_its_views() {
        let (tx, _rx) = signal_channel();
        let manager = ViewManager::new(tx);
        let a = server("a");
        let b = server("b");
        manager.handle_server_added(&a);
        manager.create_view(&a, ViewKind::Tab);
        let kept = manager.handle_server_added(&b);

        manager.handle_server_removed(&a.id);

        assert!(manager.views_for_server(&a.id).is_empty());
        assert!(manager.primary_view(&a.id).is_none());
        assert_eq!(manager.views_for_server(&b.id), vec![kept]);
    }
}
