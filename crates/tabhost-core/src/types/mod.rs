//! Core type definitions for Tabhost
//!
//! This module contains the shared types used across the application:
//! identifiers, server and view records, and window geometry.

mod id_types;
mod server_types;
mod view_types;

pub use id_types::*;
pub use server_types::*;
pub use view_types::*;

use serde::{Deserialize, Serialize};

/// Height of the tab bar drawn above the visible surface
pub const DEFAULT_TAB_BAR_HEIGHT: u32 = 38;

/// Rectangle in window content coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Area left for a surface once the tab bar is carved off the top
    pub fn below_tab_bar(width: u32, height: u32, tab_bar_height: u32) -> Self {
        Self {
            x: 0,
            y: tab_bar_height as i32,
            width,
            height: height.saturating_sub(tab_bar_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_below_tab_bar() {
        let bounds = Bounds::below_tab_bar(800, 600, DEFAULT_TAB_BAR_HEIGHT);
        assert_eq!(bounds, Bounds::new(0, 38, 800, 562));
    }

    #[test]
    fn test_bounds_below_tab_bar_never_underflows() {
        let bounds = Bounds::below_tab_bar(800, 20, DEFAULT_TAB_BAR_HEIGHT);
        assert_eq!(bounds.height, 0);
    }
}
