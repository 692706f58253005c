//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => {
            presenter.output(&store.path().to_string_lossy());
            Ok(())
        }
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let mut config = store.load().await?;
    validate_config_value(&config, key, value)?;

    let value = value.trim().to_string();
    match key {
        "api_url" => config.api_url = Some(value.clone()),
        "template" => config.template = Some(value.clone()),
        "duration" => config.duration = Some(value.clone()),
        _ => unreachable!(),
    }

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    presenter.output(config_value(&config, key).unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, config_value(&config, key).unwrap_or(NOT_SET));
    }

    let templates = match &config.templates {
        Some(entries) => entries
            .iter()
            .map(|t| t.id.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        None => "(built-in)".to_string(),
    };
    presenter.key_value("templates", &templates);
    Ok(())
}

fn config_value<'a>(config: &'a AppConfig, key: &str) -> Option<&'a str> {
    match key {
        "api_url" => config.api_url.as_deref(),
        "template" => config.template.as_deref(),
        "duration" => config.duration.as_deref(),
        _ => None,
    }
}

/// Validate a value against the file's current catalog
fn validate_config_value(config: &AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };
    let value = value.trim();

    match key {
        "api_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(format!(
                    "Invalid URL '{}'. Must start with http:// or https://",
                    value
                )));
            }
        }
        "template" => {
            config
                .catalog()
                .resolve(value)
                .map_err(|e| invalid(e.to_string()))?;
        }
        "duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        _ => {}
    }
    Ok(())
}
