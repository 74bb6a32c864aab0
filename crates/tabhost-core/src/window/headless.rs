//! Window host without a native window behind it

use super::WindowHost;
use crate::events::RendererMessage;
use crate::types::{Bounds, ViewId};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct WindowState {
    children: Vec<ViewId>,
    /// Most children ever attached at once
    peak_children: usize,
    attach_count: usize,
    focus_count: usize,
}

/// [`WindowHost`] that records composition and forwards renderer messages
pub struct HeadlessWindow {
    bounds: RwLock<Bounds>,
    state: Mutex<WindowState>,
    messages: Mutex<Vec<RendererMessage>>,
    renderer: Option<mpsc::UnboundedSender<RendererMessage>>,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bounds: RwLock::new(Bounds::new(0, 0, width, height)),
            state: Mutex::new(WindowState::default()),
            messages: Mutex::new(Vec::new()),
            renderer: None,
        }
    }

    /// Forward every renderer message to a channel as well
    pub fn with_renderer(mut self, tx: mpsc::UnboundedSender<RendererMessage>) -> Self {
        self.renderer = Some(tx);
        self
    }

    /// Resize the content area; returns the new bounds
    pub fn resize(&self, width: u32, height: u32) -> Bounds {
        let bounds = Bounds::new(0, 0, width, height);
        *self.bounds.write() = bounds;
        bounds
    }

    /// Surfaces currently attached, in attach order
    pub fn children(&self) -> Vec<ViewId> {
        self.state.lock().children.clone()
    }

    pub fn peak_children(&self) -> usize {
        self.state.lock().peak_children
    }

    pub fn attach_count(&self) -> usize {
        self.state.lock().attach_count
    }

    pub fn focus_count(&self) -> usize {
        self.state.lock().focus_count
    }

    /// Messages sent to the renderer so far
    pub fn messages(&self) -> Vec<RendererMessage> {
        self.messages.lock().clone()
    }

    pub fn take_messages(&self) -> Vec<RendererMessage> {
        std::mem::take(&mut *self.messages.lock())
    }
}

impl WindowHost for HeadlessWindow {
    fn add_child_view(&self, id: &ViewId) {
        let mut state = self.state.lock();
        if state.children.contains(id) {
            debug!("add_child_view: {} already attached", id);
            return;
        }
        state.children.push(id.clone());
        state.attach_count += 1;
        state.peak_children = state.peak_children.max(state.children.len());
        if state.children.len() > 1 {
            warn!("{} surfaces attached to the window", state.children.len());
        }
    }

    fn remove_child_view(&self, id: &ViewId) {
        self.state.lock().children.retain(|child| child != id);
    }

    fn content_bounds(&self) -> Bounds {
        *self.bounds.read()
    }

    fn send_to_renderer(&self, message: RendererMessage) {
        if let Some(tx) = &self.renderer {
            let _ = tx.send(message.clone());
        }
        self.messages.lock().push(message);
    }

    fn focus(&self) {
        self.state.lock().focus_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServerId;

    #[test]
    fn test_attach_and_detach() {
        let window = HeadlessWindow::new(800, 600);
        let v1 = ViewId::new("v1");

        window.add_child_view(&v1);
        window.add_child_view(&v1);
        assert_eq!(window.children(), vec![v1.clone()]);
        assert_eq!(window.attach_count(), 1);

        window.remove_child_view(&v1);
        window.remove_child_view(&v1);
        assert!(window.children().is_empty());
        assert_eq!(window.peak_children(), 1);
    }

    #[test]
    fn test_renderer_messages_are_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let window = HeadlessWindow::new(800, 600).with_renderer(tx);

        let message = RendererMessage::SetActiveView {
            server_id: ServerId::new("s1"),
            view_id: ViewId::new("v1"),
        };
        window.send_to_renderer(message.clone());

        assert_eq!(rx.try_recv().unwrap(), message);
        assert_eq!(window.take_messages(), vec![message]);
        assert!(window.messages().is_empty());
    }

    #[test]
    fn test_resize_updates_content_bounds() {
        let window = HeadlessWindow::new(800, 600);
        window.resize(1024, 768);
        assert_eq!(window.content_bounds(), Bounds::new(0, 0, 1024, 768));
    }
}
