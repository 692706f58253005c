//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;
use crate::domain::template::{Template, TemplateCatalog, TemplateId};

/// Backend origin used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub template: Option<String>,
    pub duration: Option<String>,
    pub templates: Option<Vec<Template>>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            template: None,
            duration: Some(Duration::default_duration().to_string()),
            templates: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            template: other.template.or(self.template),
            duration: other.duration.or(self.duration),
            templates: other.templates.or(self.templates),
        }
    }

    /// Backend origin, without trailing slashes
    pub fn api_url_or_default(&self) -> String {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Template catalog, configured or built-in
    pub fn catalog(&self) -> TemplateCatalog {
        match &self.templates {
            Some(entries) => TemplateCatalog::from_entries(entries.clone()),
            None => TemplateCatalog::builtin(),
        }
    }

    /// Selected template if it exists in the catalog, else the catalog default
    pub fn template_or_default(&self, catalog: &TemplateCatalog) -> TemplateId {
        self.template
            .as_deref()
            .and_then(|id| catalog.resolve(id).ok())
            .unwrap_or_else(|| catalog.default_template().id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.api_url.as_deref(), Some(DEFAULT_API_URL));
        assert!(config.template.is_none());
        assert_eq!(config.duration.as_deref(), Some("30s"));
        assert!(config.templates.is_none());
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.api_url.is_none());
        assert!(config.template.is_none());
        assert!(config.duration.is_none());
        assert!(config.templates.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            api_url: Some("http://base:8000".to_string()),
            template: Some("tagebuch".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            api_url: Some("https://api.example.com".to_string()),
            template: None,
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(merged.template.as_deref(), Some("tagebuch"));
    }

    #[test]
    fn api_url_falls_back_and_trims() {
        assert_eq!(AppConfig::empty().api_url_or_default(), DEFAULT_API_URL);

        let config = AppConfig {
            api_url: Some("https://api.example.com//".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_url_or_default(), "https://api.example.com");

        let blank = AppConfig {
            api_url: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.api_url_or_default(), DEFAULT_API_URL);
    }

    #[test]
    fn template_or_default_uses_catalog() {
        let catalog = TemplateCatalog::builtin();
        let config = AppConfig {
            template: Some("restaurant_review".to_string()),
            ..Default::default()
        };
        assert_eq!(config.template_or_default(&catalog).as_str(), "restaurant_review");

        let unknown = AppConfig {
            template: Some("sonnet".to_string()),
            ..Default::default()
        };
        assert_eq!(unknown.template_or_default(&catalog).as_str(), "tagebuch");
    }

    #[test]
    fn configured_templates_replace_catalog() {
        let config = AppConfig {
            templates: Some(vec![Template::new("standup", "Standup")]),
            ..Default::default()
        };
        let catalog = config.catalog();
        assert_eq!(catalog.ids(), vec!["standup"]);
        assert_eq!(config.template_or_default(&catalog).as_str(), "standup");
    }
}
