//! Shell configuration stored as JSON under the user's config directory

use crate::error::{ConfigError, Error, Result};
use crate::types::{ServerConfig, DEFAULT_TAB_BAR_HEIGHT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "tabhost";
const CONFIG_FILE: &str = "config.json";

/// Startup configuration for the shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    /// Height of the tab bar above the visible surface
    pub tab_bar_height: u32,
    pub window_width: u32,
    pub window_height: u32,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Where the database lives; the platform data directory when unset
    pub data_dir: Option<PathBuf>,
    /// Servers shipped with the installation, shown before user servers
    pub predefined_servers: Vec<ServerConfig>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            tab_bar_height: DEFAULT_TAB_BAR_HEIGHT,
            window_width: 1000,
            window_height: 700,
            log_filter: "info".to_string(),
            data_dir: None,
            predefined_servers: Vec::new(),
        }
    }
}

impl ShellConfig {
    /// `<config_dir>/tabhost/config.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or(Error::Config(ConfigError::NoConfigDir))
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_height <= self.tab_bar_height {
            return Err(Error::Config(ConfigError::Invalid(format!(
                "window height {} leaves no room below a {}px tab bar",
                self.window_height, self.tab_bar_height
            ))));
        }
        Ok(())
    }

    /// Directory for the database
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ShellConfig::load(dir.path().join("config.json")).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.tab_bar_height, 38);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = ShellConfig {
            log_filter: "tabhost_core=debug".to_string(),
            data_dir: Some(dir.path().join("data")),
            predefined_servers: vec![ServerConfig {
                name: "Community".to_string(),
                url: "https://community.example.com".to_string(),
            }],
            ..ShellConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = ShellConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.data_dir(), dir.path().join("data"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"windowWidth": 1440}"#).unwrap();

        let config = ShellConfig::load(&path).unwrap();
        assert_eq!(config.window_width, 1440);
        assert_eq!(config.window_height, 700);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_rejects_window_smaller_than_tab_bar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"windowHeight": 30}"#).unwrap();

        assert!(matches!(
            ShellConfig::load(&path),
            Err(Error::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(ShellConfig::load(&path), Err(Error::Json(_))));
    }
}
