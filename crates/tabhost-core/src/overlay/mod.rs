//! Transient overlays drawn above the visible surface
//!
//! - [`LoadingScreen`] - covers a surface until its web app is ready
//! - [`ModalCoordinator`] - dialogs that take focus away from tabs

mod loading_screen;
mod modal;

pub use loading_screen::{LoadingScreenOverlay, LoadingScreenState};
pub use modal::{Modal, ModalStack};

/// Loading screen shown over the window while a surface loads
#[cfg_attr(test, mockall::automock)]
pub trait LoadingScreen: Send + Sync {
    fn show(&self);

    /// Start fading out; only has an effect while visible
    fn fade(&self);

    fn is_visible(&self) -> bool;
}

/// Modal dialogs stacked over the main window
#[cfg_attr(test, mockall::automock)]
pub trait ModalCoordinator: Send + Sync {
    fn is_modal_displayed(&self) -> bool;

    fn focus_current_modal(&self);
}
