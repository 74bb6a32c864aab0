//! Per-server tab order, active tab selection and window compositing

use crate::events::{EventBus, HostSignal, RendererMessage, SignalSender, TabEvent};
use crate::overlay::{LoadingScreen, ModalCoordinator};
use crate::servers::ServerRegistry;
use crate::surface::SurfaceManager;
use crate::types::{Bounds, ServerId, TabInfo, View, ViewId, ViewKind, DEFAULT_TAB_BAR_HEIGHT};
use crate::views::ViewRegistry;
use crate::window::WindowHost;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Components the orchestrator consults and drives
#[derive(Clone)]
pub struct Collaborators {
    pub servers: Arc<dyn ServerRegistry>,
    pub views: Arc<dyn ViewRegistry>,
    pub surfaces: Arc<dyn SurfaceManager>,
    pub loading_screen: Arc<dyn LoadingScreen>,
    pub modals: Arc<dyn ModalCoordinator>,
}

/// Owner of tab ordering and active selection.
///
/// The orchestrator keeps two maps keyed by server id: the ordered tabs of
/// each server and the active tab of each server. The active tab of the
/// current server is the only surface attached to the host window.
///
/// Every handler re-validates the ids it receives, so late or duplicated
/// signals are tolerated. Nothing on this type returns an error; problems are
/// logged and the operation is abandoned.
pub struct TabOrchestrator {
    tab_order: IndexMap<ServerId, Vec<ViewId>>,
    active_tabs: IndexMap<ServerId, ViewId>,
    /// Surface currently attached to the window
    visible: Option<ViewId>,

    window: Option<Arc<dyn WindowHost>>,
    servers: Arc<dyn ServerRegistry>,
    views: Arc<dyn ViewRegistry>,
    surfaces: Arc<dyn SurfaceManager>,
    loading_screen: Arc<dyn LoadingScreen>,
    modals: Arc<dyn ModalCoordinator>,

    /// Handed to every new surface for its load signals
    signals: SignalSender,
    events: EventBus,
    tab_bar_height: u32,
}

impl TabOrchestrator {
    pub fn new(collaborators: Collaborators, signals: SignalSender, events: EventBus) -> Self {
        Self {
            tab_order: IndexMap::new(),
            active_tabs: IndexMap::new(),
            visible: None,
            window: None,
            servers: collaborators.servers,
            views: collaborators.views,
            surfaces: collaborators.surfaces,
            loading_screen: collaborators.loading_screen,
            modals: collaborators.modals,
            signals,
            events,
            tab_bar_height: DEFAULT_TAB_BAR_HEIGHT,
        }
    }

    pub fn with_tab_bar_height(mut self, height: u32) -> Self {
        self.tab_bar_height = height;
        self
    }

    /// Attach the orchestrator to the main window
    pub fn set_window(&mut self, window: Arc<dyn WindowHost>) {
        self.window = Some(window);
    }

    /// Forget the main window after it has been destroyed
    pub fn clear_window(&mut self) {
        self.window = None;
        self.visible = None;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Tabs of a server in display order.
    ///
    /// Ids that no longer resolve to a view are skipped. While the server is
    /// logged out, every tab but its primary view is disabled.
    pub fn ordered_tabs_for_server(&self, server_id: &ServerId) -> Vec<TabInfo> {
        let Some(order) = self.tab_order.get(server_id) else {
            return Vec::new();
        };

        let logged_in = self
            .servers
            .get_server(server_id)
            .map(|s| s.is_logged_in)
            .unwrap_or(false);
        let active = self.active_tabs.get(server_id);

        order
            .iter()
            .filter_map(|id| self.views.get_view(id))
            .enumerate()
            .map(|(order, view)| TabInfo {
                is_active: active == Some(&view.id),
                is_disabled: !logged_in && !self.views.is_primary_view(&view.id),
                order,
                id: view.id,
                server_id: view.server_id,
                title: view.title,
            })
            .collect()
    }

    /// Raw tab order of a server, including ids that may have gone stale
    pub fn tab_order(&self, server_id: &ServerId) -> &[ViewId] {
        self.tab_order
            .get(server_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn active_tab_id(&self, server_id: &ServerId) -> Option<&ViewId> {
        self.active_tabs.get(server_id)
    }

    /// Surface attached to the window, if any
    pub fn visible_surface(&self) -> Option<&ViewId> {
        self.visible.as_ref()
    }

    pub fn current_tab_for_server(&self, server_id: &ServerId) -> Option<View> {
        self.active_tabs
            .get(server_id)
            .and_then(|id| self.views.get_view(id))
    }

    pub fn current_active_tab(&self) -> Option<View> {
        let server_id = self.servers.current_server_id()?;
        self.current_tab_for_server(&server_id)
    }

    /// Id of the active tab of the current server when its surface exists
    pub fn current_active_tab_surface(&self) -> Option<ViewId> {
        let server_id = self.servers.current_server_id()?;
        self.active_tabs
            .get(&server_id)
            .filter(|id| self.surfaces.has_surface(id))
            .cloned()
    }

    /// Whether `view_id` is the active tab of the *current* server.
    ///
    /// A view that is active for a background server reports `false`.
    pub fn is_active_tab(&self, view_id: &ViewId) -> bool {
        self.servers
            .current_server_id()
            .and_then(|server_id| self.active_tabs.get(&server_id))
            .map(|active| active == view_id)
            .unwrap_or(false)
    }

    /// Server whose tab order contains `view_id`, falling back to the view record
    fn owner_of(&self, view_id: &ViewId) -> Option<ServerId> {
        self.tab_order
            .iter()
            .find(|(_, order)| order.contains(view_id))
            .map(|(server_id, _)| server_id.clone())
            .or_else(|| self.views.get_view(view_id).map(|v| v.server_id))
    }

    fn is_current_server(&self, server_id: &ServerId) -> bool {
        self.servers.current_server_id().as_ref() == Some(server_id)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn switch_to_tab(&mut self, view_id: &ViewId) {
        if self.is_active_tab(view_id) {
            debug!("switch_to_tab: {} is already active", view_id);
            return;
        }
        self.set_active_tab(view_id);
    }

    /// Replace a server's tab order wholesale
    pub fn update_tab_order(&mut self, server_id: ServerId, view_ids: Vec<ViewId>) {
        debug!("update_tab_order {} {:?}", server_id, view_ids);
        self.tab_order.insert(server_id.clone(), view_ids.clone());
        self.events
            .emit(TabEvent::TabOrderUpdated { server_id, view_ids });
    }

    pub fn focus_current_tab(&self) {
        if self.modals.is_modal_displayed() {
            self.modals.focus_current_modal();
            return;
        }
        if let Some(id) = self.current_active_tab_surface() {
            self.surfaces.focus(&id);
        }
    }

    pub fn switch_to_next_tab(&mut self) {
        self.cycle_tab(1);
    }

    pub fn switch_to_previous_tab(&mut self) {
        self.cycle_tab(-1);
    }

    fn cycle_tab(&mut self, step: isize) {
        let Some(server_id) = self.servers.current_server_id() else {
            return;
        };
        let Some(active) = self.active_tabs.get(&server_id) else {
            return;
        };
        let order = self.tab_order(&server_id);
        let Some(index) = order.iter().position(|id| id == active) else {
            debug!("cycle_tab: active tab {} is not in the order", active);
            return;
        };

        let len = order.len() as isize;
        let next = order[(index as isize + step).rem_euclid(len) as usize].clone();
        self.switch_to_tab(&next);
    }

    /// Detach the visible surface, if any, from the window
    pub fn remove_current_visible_tab(&mut self) {
        let Some(window) = self.window.clone() else {
            warn!("remove_current_visible_tab: no main window");
            return;
        };
        if let Some(visible) = self.visible.take() {
            debug!("detaching {}", visible);
            window.remove_child_view(&visible);
        }
    }

    pub fn send_to_find(&self) {
        if let Some(id) = self.current_active_tab_surface() {
            self.surfaces.open_find(&id);
        }
    }

    /// Reload the active surface at the URL it is currently showing
    pub fn reload_current_tab(&self) {
        let Some(id) = self.current_active_tab_surface() else {
            return;
        };
        self.loading_screen.show();
        self.surfaces.reload(&id, self.surfaces.current_url(&id));
    }

    // ========================================================================
    // Compositing
    // ========================================================================

    fn surface_bounds(&self, window: &dyn WindowHost) -> Bounds {
        let content = window.content_bounds();
        Bounds::below_tab_bar(content.width, content.height, self.tab_bar_height)
    }

    /// Make `view_id` the active tab of its server and show it
    fn set_active_tab(&mut self, view_id: &ViewId) {
        let Some(window) = self.window.clone() else {
            warn!("set_active_tab: no main window");
            return;
        };
        if !self.surfaces.has_surface(view_id) {
            warn!("set_active_tab: no surface for {}", view_id);
            return;
        }
        let Some(server_id) = self.owner_of(view_id) else {
            warn!("set_active_tab: no server owns {}", view_id);
            return;
        };

        debug!("set_active_tab {} {}", server_id, view_id);
        window.send_to_renderer(RendererMessage::SetActiveView {
            server_id: server_id.clone(),
            view_id: view_id.clone(),
        });
        self.active_tabs.insert(server_id.clone(), view_id.clone());
        self.events.emit(TabEvent::ActiveTabChanged {
            server_id,
            view_id: view_id.clone(),
        });

        if self.surfaces.is_errored(view_id) {
            self.remove_current_visible_tab();
            self.loading_screen.fade();
            return;
        }

        // Detach before attaching so the window never holds two surfaces
        if self.visible.as_ref() != Some(view_id) {
            self.remove_current_visible_tab();
        }
        window.add_child_view(view_id);
        self.surfaces
            .set_bounds(view_id, self.surface_bounds(window.as_ref()));
        self.visible = Some(view_id.clone());

        if self.surfaces.needs_loading_screen(view_id) {
            self.loading_screen.show();
        }
    }

    // ========================================================================
    // Signal handlers
    // ========================================================================

    pub fn handle_signal(&mut self, signal: HostSignal) {
        match signal {
            HostSignal::WindowResized { bounds } => self.handle_window_resized(bounds),
            HostSignal::WindowFocused => self.focus_current_tab(),
            HostSignal::ViewCreated { view_id } => self.handle_view_created(&view_id),
            HostSignal::ViewRemoved { view_id, .. } => self.handle_view_removed(&view_id),
            HostSignal::ViewUpdated { view_id } => self.handle_view_updated(&view_id),
            HostSignal::ServerSwitched { server_id } => self.handle_server_switched(&server_id),
            HostSignal::ServerLoggedInChanged {
                server_id,
                logged_in,
            } => self.handle_server_logged_in_changed(&server_id, logged_in),
            HostSignal::LoadFinished { view_id } => self.finish_loading(&view_id),
            HostSignal::LoadFailed { view_id, error } => self.fail_loading(&view_id, &error),
            HostSignal::ServerAdded { .. } | HostSignal::ServerRemoved { .. } => {
                debug!("handle_signal: {:?} belongs to the view registry", signal);
            }
        }
    }

    pub fn handle_view_created(&mut self, view_id: &ViewId) {
        let Some(view) = self.views.get_view(view_id) else {
            debug!("handle_view_created: {} no longer exists", view_id);
            return;
        };
        if !view.is_tab() {
            return;
        }
        if self.tab_order(&view.server_id).contains(view_id) {
            debug!("handle_view_created: {} is already tracked", view_id);
            return;
        }
        let Some(server) = self.servers.get_server(&view.server_id) else {
            warn!("handle_view_created: server {} not found", view.server_id);
            return;
        };

        info!("Adding tab {} for {}", view_id, server.name);
        self.surfaces
            .create_surface(&view, &view.loading_url(&server.url), self.signals.clone());

        let mut order = self.tab_order(&server.id).to_vec();
        if order.is_empty() {
            if self.is_current_server(&server.id) {
                self.set_active_tab(view_id);
            }
            // Compositing can abort; the first tab is active regardless
            if self.active_tabs.get(&server.id) != Some(view_id) {
                self.active_tabs.insert(server.id.clone(), view_id.clone());
            }
        }

        order.push(view_id.clone());
        self.update_tab_order(server.id.clone(), order);
        self.events.emit(TabEvent::TabAdded {
            server_id: server.id,
            view_id: view_id.clone(),
        });
    }

    /// Forget a removed view. When it was its server's active tab the
    /// previous tab takes over, else the tab that moved into its slot.
    pub fn handle_view_removed(&mut self, view_id: &ViewId) {
        let Some((server_id, index)) = self.tab_order.iter().find_map(|(server_id, order)| {
            order
                .iter()
                .position(|id| id == view_id)
                .map(|index| (server_id.clone(), index))
        }) else {
            debug!("handle_view_removed: {} is not tracked", view_id);
            return;
        };

        info!("Removing tab {} from {}", view_id, server_id);
        if self.visible.as_ref() == Some(view_id) {
            self.remove_current_visible_tab();
        }
        self.surfaces.remove_surface(view_id);

        let mut order = self.tab_order(&server_id).to_vec();
        order.remove(index);
        self.update_tab_order(server_id.clone(), order.clone());
        if order.is_empty() {
            self.tab_order.shift_remove(&server_id);
        }
        self.events.emit(TabEvent::TabRemoved {
            server_id: server_id.clone(),
            view_id: view_id.clone(),
        });

        if self.active_tabs.get(&server_id) != Some(view_id) {
            return;
        }

        let successor = index
            .checked_sub(1)
            .and_then(|i| order.get(i))
            .or_else(|| order.get(index))
            .cloned();
        let Some(next) = successor else {
            self.active_tabs.shift_remove(&server_id);
            return;
        };

        if self.is_current_server(&server_id) {
            self.set_active_tab(&next);
        }
        if self.active_tabs.get(&server_id) != Some(&next) {
            self.active_tabs.insert(server_id.clone(), next.clone());
            self.events.emit(TabEvent::ActiveTabChanged {
                server_id,
                view_id: next,
            });
        }
    }

    pub fn handle_view_updated(&self, view_id: &ViewId) {
        let Some(view) = self.views.get_view(view_id) else {
            return;
        };
        if !view.is_tab() {
            return;
        }
        let Some(window) = &self.window else {
            return;
        };
        window.send_to_renderer(RendererMessage::UpdateTabTitle {
            view_id: view.id,
            title: view.title,
        });
    }

    pub fn handle_window_resized(&self, bounds: Bounds) {
        let Some(id) = self.current_active_tab_surface() else {
            return;
        };
        if self.surfaces.current_url(&id).is_none() {
            return;
        }
        debug!("handle_window_resized {}x{}", bounds.width, bounds.height);
        self.surfaces.set_bounds(
            &id,
            Bounds::below_tab_bar(bounds.width, bounds.height, self.tab_bar_height),
        );
    }

    /// Show the active tab of the newly current server.
    ///
    /// Composites even when the tab already counts as active, since the
    /// window still shows the previous server's surface.
    pub fn handle_server_switched(&mut self, server_id: &ServerId) {
        debug!("handle_server_switched {}", server_id);
        match self.current_tab_for_server(server_id) {
            Some(view) => self.set_active_tab(&view.id),
            None => self.remove_current_visible_tab(),
        }
    }

    /// On logout only the primary view stays; every other tab is closed
    pub fn handle_server_logged_in_changed(&mut self, server_id: &ServerId, logged_in: bool) {
        if logged_in {
            return;
        }
        let Some(primary) = self.views.primary_view(server_id) else {
            return;
        };

        info!("Server {} logged out, keeping only {}", server_id, primary.id);
        if self.is_current_server(server_id) {
            self.switch_to_tab(&primary.id);
        } else {
            self.active_tabs.insert(server_id.clone(), primary.id.clone());
        }

        let others: Vec<ViewId> = self
            .tab_order(server_id)
            .iter()
            .filter(|id| **id != primary.id)
            .cloned()
            .collect();
        for id in others {
            self.views.remove_view(&id);
            self.handle_view_removed(&id);
        }
    }

    pub fn finish_loading(&self, view_id: &ViewId) {
        if !self.is_active_tab(view_id) {
            debug!("finish_loading: {} is not active, ignoring", view_id);
            return;
        }
        self.loading_screen.fade();
    }

    pub fn fail_loading(&mut self, view_id: &ViewId, error: &str) {
        if !self.is_active_tab(view_id) {
            debug!("fail_loading: {} is not active, ignoring", view_id);
            return;
        }
        warn!("Active tab {} failed to load: {}", view_id, error);
        if self.visible.as_ref() == Some(view_id) {
            self.remove_current_visible_tab();
        }
        self.loading_screen.fade();
    }

    // ========================================================================
    // Presentation-layer entry points
    // ========================================================================

    /// Open a new tab for a server and switch to it
    pub fn create_new_tab(&mut self, server_id: &ServerId) -> Option<ViewId> {
        let Some(server) = self.servers.get_server(server_id) else {
            warn!("create_new_tab: server {} not found", server_id);
            return None;
        };

        let view = self.views.create_view(&server, ViewKind::Tab);
        self.handle_view_created(&view.id);
        self.switch_to_tab(&view.id);
        Some(view.id)
    }

    /// Close a tab; an active tab first hands over to its neighbour
    pub fn close_tab(&mut self, view_id: &ViewId) {
        if self.is_active_tab(view_id) {
            if let Some(server_id) = self.owner_of(view_id) {
                let order = self.tab_order(&server_id);
                let neighbour = order.iter().position(|id| id == view_id).and_then(|index| {
                    index
                        .checked_sub(1)
                        .and_then(|i| order.get(i))
                        .or_else(|| order.get(index + 1))
                        .cloned()
                });
                if let Some(neighbour) = neighbour {
                    self.switch_to_tab(&neighbour);
                }
            }
        }

        self.views.remove_view(view_id);
        self.handle_view_removed(view_id);
    }
}
