//! Stack of modal dialogs

use super::ModalCoordinator;
use parking_lot::Mutex;
use tracing::debug;

/// A modal dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub key: String,
    pub title: String,
}

#[derive(Debug, Default)]
struct ModalState {
    stack: Vec<Modal>,
    focused: Option<String>,
}

/// Modals in display order; the last one is on top
#[derive(Debug, Default)]
pub struct ModalStack {
    state: Mutex<ModalState>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a modal unless one with the same key is already open
    pub fn add_modal(&self, key: impl Into<String>, title: impl Into<String>) -> bool {
        let key = key.into();
        let mut state = self.state.lock();
        if state.stack.iter().any(|m| m.key == key) {
            return false;
        }
        debug!("addModal {}", key);
        state.stack.push(Modal {
            key,
            title: title.into(),
        });
        true
    }

    pub fn close_modal(&self, key: &str) -> Option<Modal> {
        let mut state = self.state.lock();
        let index = state.stack.iter().position(|m| m.key == key)?;
        if state.focused.as_deref() == Some(key) {
            state.focused = None;
        }
        Some(state.stack.remove(index))
    }

    pub fn current(&self) -> Option<Modal> {
        self.state.lock().stack.last().cloned()
    }

    /// Key of the modal that last received focus
    pub fn focused(&self) -> Option<String> {
        self.state.lock().focused.clone()
    }
}

impl ModalCoordinator for ModalStack {
    fn is_modal_displayed(&self) -> bool {
        !self.state.lock().stack.is_empty()
    }

    fn focus_current_modal(&self) {
        let mut state = self.state.lock();
        state.focused = state.stack.last().map(|m| m.key.clone());
    }
}
