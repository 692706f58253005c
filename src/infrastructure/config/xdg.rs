//! TOML config file in the XDG config directory

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Directory name under the user config directory
const APP_DIR: &str = "voicecore";

const FILE_NAME: &str = "config.toml";

/// Config store at `$XDG_CONFIG_HOME/voicecore/config.toml`
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR);

        Self {
            path: config_dir.join(FILE_NAME),
        }
    }

    /// Store backed by an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn to_toml(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.exists() {
            debug!(path = %self.path.display(), "no config file");
            return Ok(AppConfig::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::parse_toml(&content)
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = Self::to_toml(config)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }
        self.save(&AppConfig::defaults()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::Template;

    #[test]
    fn default_path_is_under_app_dir() {
        let path = XdgConfigStore::new().path();
        assert!(path.to_string_lossy().contains("voicecore"));
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn parses_flat_keys() {
        let content = r#"
api_url = "https://voice.example.com"
template = "quick_note"
duration = "45s"
"#;
        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://voice.example.com"));
        assert_eq!(config.template.as_deref(), Some("quick_note"));
        assert_eq!(config.duration.as_deref(), Some("45s"));
        assert!(config.templates.is_none());
    }

    #[test]
    fn parses_template_tables() {
        let content = r#"
[[templates]]
id = "standup"
label = "Daily Standup"

[[templates]]
id = "idea"
label = "Idea"
"#;
        let config = XdgConfigStore::parse_toml(content).unwrap();
        let templates = config.templates.unwrap();
        assert_eq!(templates[0], Template::new("standup", "Daily Standup"));
        assert_eq!(templates.len(), 2);
    }

    #[test]
    fn rejects_malformed_file() {
        let err = XdgConfigStore::parse_toml("api_url = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[tokio::test]
    async fn save_then_load_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("nested").join("config.toml"));
        assert!(store.load().await.unwrap().api_url.is_none());

        store.init().await.unwrap();
        assert!(matches!(store.init().await, Err(ConfigError::AlreadyExists(_))));

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.api_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(loaded.duration.as_deref(), Some("30s"));
    }
}
