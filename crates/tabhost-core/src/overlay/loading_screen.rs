//! Loading screen state machine

use super::LoadingScreen;
use crate::events::RendererMessage;
use crate::window::WindowHost;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Visibility state of the loading screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingScreenState {
    Visible,
    /// Fade-out animation running
    Fading,
    Hidden,
}

/// Loading screen driven through renderer messages
pub struct LoadingScreenOverlay {
    state: Mutex<LoadingScreenState>,
    window: Option<Arc<dyn WindowHost>>,
}

impl LoadingScreenOverlay {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoadingScreenState::Hidden),
            window: None,
        }
    }

    /// Toggle visibility in the renderer of this window
    pub fn with_window(mut self, window: Arc<dyn WindowHost>) -> Self {
        self.window = Some(window);
        self
    }

    pub fn state(&self) -> LoadingScreenState {
        *self.state.lock()
    }

    /// The renderer finished the fade-out animation
    pub fn animation_finished(&self) {
        debug!("handleLoadingScreenAnimationFinished");
        *self.state.lock() = LoadingScreenState::Hidden;
    }

    fn toggle(&self, visible: bool) {
        if let Some(window) = &self.window {
            window.send_to_renderer(RendererMessage::ToggleLoadingScreen { visible });
        }
    }
}

impl Default for LoadingScreenOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingScreen for LoadingScreenOverlay {
    fn show(&self) {
        *self.state.lock() = LoadingScreenState::Visible;
        self.toggle(true);
    }

    fn fade(&self) {
        {
            let mut state = self.state.lock();
            if *state != LoadingScreenState::Visible {
                return;
            }
            *state = LoadingScreenState::Fading;
        }
        self.toggle(false);
    }

    fn is_visible(&self) -> bool {
        self.state() != LoadingScreenState::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::HeadlessWindow;

    #[test]
    fn test_show_fade_hide() {
        let screen = LoadingScreenOverlay::new();
        assert_eq!(screen.state(), LoadingScreenState::Hidden);

        screen.show();
        assert_eq!(screen.state(), LoadingScreenState::Visible);

        screen.fade();
        assert_eq!(screen.state(), LoadingScreenState::Fading);
        assert!(screen.is_visible());

        screen.animation_finished();
        assert!(!screen.is_visible());
    }

    #[test]
    fn test_fade_while_hidden_is_noop() {
        let window = Arc::new(HeadlessWindow::new(800, 600));
        let screen = LoadingScreenOverlay::new().with_window(window.clone());

        screen.fade();

        assert_eq!(screen.state(), LoadingScreenState::Hidden);
        assert!(window.messages().is_empty());
    }

    #[test]
    fn test_toggles_reach_renderer() {
        let window = Arc::new(HeadlessWindow::new(800, 600));
        let screen = LoadingScreenOverlay::new().with_window(window.clone());

        screen.show();
        screen.fade();
        screen.fade();

        assert_eq!(
            window.messages(),
            vec![
                RendererMessage::ToggleLoadingScreen { visible: true },
                RendererMessage::ToggleLoadingScreen { visible: false },
            ]
        );
    }
}
