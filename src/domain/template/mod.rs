//! Content templates a recording can be tagged with

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidTemplateError;

/// Identifier of a content template, passed to the backend unmodified
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog entry: id plus display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub label: String,
}

impl Template {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: TemplateId::new(id),
            label: label.to_string(),
        }
    }
}

/// Fixed, ordered list of templates. Never empty; the first entry is the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// The templates the backend ships with
    pub fn builtin() -> Self {
        Self {
            templates: vec![
                Template::new("tagebuch", "Tagebuch"),
                Template::new("quick_note", "Quick Note"),
                Template::new("restaurant_review", "Restaurant Review"),
            ],
        }
    }

    /// Build a catalog from configured entries; falls back to the built-in
    /// list when none are given. Later duplicates of an id are dropped.
    pub fn from_entries(entries: Vec<Template>) -> Self {
        let mut templates: Vec<Template> = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.id.as_str().trim().is_empty() {
                continue;
            }
            if !templates.iter().any(|t| t.id == entry.id) {
                templates.push(entry);
            }
        }

        if templates.is_empty() {
            Self::builtin()
        } else {
            Self { templates }
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn default_template(&self) -> &Template {
        &self.templates[0]
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Resolve an id against the catalog
    pub fn resolve(&self, id: &str) -> Result<TemplateId, InvalidTemplateError> {
        let trimmed = id.trim();
        self.get(trimmed)
            .map(|t| t.id.clone())
            .ok_or_else(|| InvalidTemplateError {
                input: id.to_string(),
                available: self.ids().join(", "),
            })
    }

    pub fn ids(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.id.as_str()).collect()
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
