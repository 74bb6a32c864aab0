//! View records and the tab projection handed to the presentation layer

use super::{ServerId, ViewId};
use serde::{Deserialize, Serialize};

/// Kind of a view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Hosted in the main window's tab bar
    Tab,
    /// Popped out into its own window
    Window,
}

/// A logical (server, tab) pairing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: ViewId,
    pub server_id: ServerId,
    pub kind: ViewKind,
    pub title: String,
    /// Path below the server URL to load first, if any
    pub initial_path: Option<String>,
}

impl View {
    /// Create a view titled after its server
    pub fn new(server_id: ServerId, server_name: impl Into<String>, kind: ViewKind) -> Self {
        Self {
            id: ViewId::generate(),
            server_id,
            kind,
            title: server_name.into(),
            initial_path: None,
        }
    }

    pub fn with_initial_path(mut self, path: impl Into<String>) -> Self {
        self.initial_path = Some(path.into());
        self
    }

    pub fn is_tab(&self) -> bool {
        self.kind == ViewKind::Tab
    }

    /// URL the surface should load for this view
    pub fn loading_url(&self, server_url: &str) -> String {
        match self.initial_path.as_deref() {
            None | Some("") => server_url.to_string(),
            Some(path) => format!(
                "{}/{}",
                server_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
        }
    }
}

/// Tab projection returned by ordered-tab queries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: ViewId,
    pub server_id: ServerId,
    pub title: String,
    pub is_active: bool,
    pub order: usize,
    pub is_disabled: bool,
}
