//! Event types flowing in and out of the tab orchestrator
//!
//! - [`HostSignal`] - upstream signals from the window, registries and surfaces
//! - [`TabEvent`] - events the orchestrator republishes for other subsystems
//! - [`RendererMessage`] - messages pushed to the presentation layer
//!
//! Signals travel over an unbounded `mpsc` channel so registries can raise
//! them from synchronous code. Outbound events go through a `broadcast` bus
//! so any number of subscribers can observe them.

use crate::types::{Bounds, ServerId, ViewId};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::trace;

/// Upstream signal consumed by the orchestrator runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum HostSignal {
    WindowResized { bounds: Bounds },
    WindowFocused,
    ViewCreated { view_id: ViewId },
    ViewRemoved { view_id: ViewId, server_id: ServerId },
    ViewUpdated { view_id: ViewId },
    ServerAdded { server_id: ServerId, set_as_current: bool },
    ServerRemoved { server_id: ServerId },
    ServerSwitched { server_id: ServerId },
    ServerLoggedInChanged { server_id: ServerId, logged_in: bool },
    LoadFinished { view_id: ViewId },
    LoadFailed { view_id: ViewId, error: String },
}

/// Sending half used by registries and surfaces to raise signals
pub type SignalSender = mpsc::UnboundedSender<HostSignal>;

/// Receiving half drained by the orchestrator runtime
pub type SignalReceiver = mpsc::UnboundedReceiver<HostSignal>;

/// Create a connected signal channel
pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    mpsc::unbounded_channel()
}

/// Raise a signal, tolerating a runtime that has already shut down
pub fn raise(tx: &SignalSender, signal: HostSignal) {
    if let Err(e) = tx.send(signal) {
        trace!("Dropping signal, runtime is gone: {:?}", e.0);
    }
}

/// Event republished by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum TabEvent {
    TabAdded { server_id: ServerId, view_id: ViewId },
    TabRemoved { server_id: ServerId, view_id: ViewId },
    TabOrderUpdated { server_id: ServerId, view_ids: Vec<ViewId> },
    ActiveTabChanged { server_id: ServerId, view_id: ViewId },
}

/// Message delivered to the presentation layer through the window host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum RendererMessage {
    SetActiveView { server_id: ServerId, view_id: ViewId },
    UpdateTabTitle { view_id: ViewId, title: String },
    ToggleLoadingScreen { visible: bool },
}

/// Broadcast bus for [`TabEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TabEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is not an error
    pub fn emit(&self, event: TabEvent) {
        trace!("emit {:?}", event);
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_delivers_to_every_subscriber() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let event = TabEvent::TabAdded {
            server_id: ServerId::new("s1"),
            view_id: ViewId::new("v1"),
        };
        bus.emit(event.clone());

        assert_eq!(first.try_recv().unwrap(), event);
        assert_eq!(second.try_recv().unwrap(), event);
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.emit(TabEvent::TabRemoved {
            server_id: ServerId::new("s1"),
            view_id: ViewId::new("v1"),
        });
    }

    #[test]
    fn test_raise_after_receiver_dropped() {
        let (tx, rx) = signal_channel();
        drop(rx);
        raise(&tx, HostSignal::WindowFocused);
    }

    #[test]
    fn test_tab_event_wire_format() {
        let event = TabEvent::ActiveTabChanged {
            server_id: ServerId::new("s1"),
            view_id: ViewId::new("v2"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "active-tab-changed");
        assert_eq!(json["serverId"], "s1");
        assert_eq!(json["viewId"], "v2");
    }
}
