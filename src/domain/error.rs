//! Domain error types

use thiserror::Error;

/// Error when parsing a recording duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected <number>s, <number>m, or <number>m<number>s (e.g., 15s, 1m, 1m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a template id is not in the catalog
#[derive(Debug, Clone, Error)]
#[error("Unknown template: \"{input}\". Available templates: {available}")]
pub struct InvalidTemplateError {
    pub input: String,
    pub available: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
