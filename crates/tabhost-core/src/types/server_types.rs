//! Server configuration and state types

use super::ServerId;
use serde::{Deserialize, Serialize};

/// A configured remote session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub url: String,
    /// Predefined servers come from configuration and are never persisted
    pub is_predefined: bool,
    pub is_logged_in: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Server {
    /// Create a new user-added server with a fresh id
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_id(ServerId::generate(), name, url)
    }

    pub fn with_id(id: impl Into<ServerId>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            is_predefined: false,
            is_logged_in: false,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn predefined(mut self) -> Self {
        self.is_predefined = true;
        self
    }
}

/// Server definition as it appears in configuration files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub name: String,
    pub url: String,
}

/// Minimal URL check: scheme plus a non-empty host part
pub fn is_valid_server_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(rest) => rest
            .split('/')
            .next()
            .map(|host| !host.is_empty())
            .unwrap_or(false),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_server_is_logged_out() {
        let server = Server::new("Community", "https://community.example.com");
        assert!(!server.is_logged_in);
        assert!(!server.is_predefined);
        assert_eq!(server.name, "Community");
    }

    #[test]
    fn test_server_url_validation() {
        assert!(is_valid_server_url("https://chat.example.com"));
        assert!(is_valid_server_url("http://localhost:8065/team"));
        assert!(!is_valid_server_url("chat.example.com"));
        assert!(!is_valid_server_url("https://"));
        assert!(!is_valid_server_url("ftp://files.example.com"));
    }
}
