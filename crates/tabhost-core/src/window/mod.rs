//! The host window
//!
//! The window composites at most one visible surface below its tab bar and
//! carries messages to the presentation layer.

mod headless;

pub use headless::HeadlessWindow;

use crate::events::RendererMessage;
use crate::types::{Bounds, ViewId};

/// The single native window hosting the visible surface
#[cfg_attr(test, mockall::automock)]
pub trait WindowHost: Send + Sync {
    /// Attach a surface as a child of the window's content view
    fn add_child_view(&self, id: &ViewId);

    /// Detach a surface; detaching a surface that is not attached is a no-op
    fn remove_child_view(&self, id: &ViewId);

    /// Size of the window's content area
    fn content_bounds(&self) -> Bounds;

    /// Deliver a message to the presentation layer
    fn send_to_renderer(&self, message: RendererMessage);

    /// Bring the window itself to the front and focus it
    fn focus(&self);
}
