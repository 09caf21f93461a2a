use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::session::DEFAULT_USER_ID;

fn default_base_url() -> String {
    "https://reqres.in".to_string()
}

fn default_delay_secs() -> u32 {
    5
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// Optional color overrides, each a `#RRGGBB` or `#RGB` string
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Scheme and host of the users API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value passed as the `delay` query parameter
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u32,

    /// ID pre-filled in the input at startup
    #[serde(default = "default_user_id")]
    pub default_user_id: String,

    /// Desktop notification when a lookup finishes
    #[serde(default)]
    pub notifications: bool,

    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            delay_secs: default_delay_secs(),
            default_user_id: default_user_id(),
            notifications: false,
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("userfetch");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Leave a broken file alone so the user can fix it
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content)?;
        config.base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if config.base_url.is_empty() {
            config.base_url = default_base_url();
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            base_url: "http://localhost:8080".to_string(),
            delay_secs: 0,
            default_user_id: "7".to_string(),
            notifications: true,
            theme: ThemeConfig {
                accent: Some("#FFC107".to_string()),
                ..ThemeConfig::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::parse(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = AppConfig::parse("notifications = true\n").unwrap();
        assert_eq!(config.base_url, "https://reqres.in");
        assert_eq!(config.delay_secs, 5);
        assert_eq!(config.default_user_id, "1");
        assert!(config.notifications);
        assert_eq!(config.theme, ThemeConfig::default());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let config = AppConfig::parse("base_url = \" https://example.com/ \"\n").unwrap();
        assert_eq!(config.base_url, "https://example.com");

        let config = AppConfig::parse("base_url = \"\"\n").unwrap();
        assert_eq!(config.base_url, "https://reqres.in");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(AppConfig::parse("delay_secs = \"soon\"\n").is_err());
    }
}
