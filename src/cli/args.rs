//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// VoiceCore - record voice memos and hand them to the processing backend
#[derive(Parser, Debug)]
#[command(name = "voicecore")]
#[command(version)]
#[command(about = "Record voice memos and upload them for template-based processing")]
#[command(long_about = None)]
pub struct Cli {
    /// Record for a fixed time, upload, print the result and exit (e.g., 30s, 1m, 1m30s).
    /// Without a value the configured duration is used.
    #[arg(short = 'd', long, value_name = "TIME", num_args = 0..=1)]
    pub duration: Option<Option<String>>,

    /// Template the recording is processed with
    #[arg(short = 't', long, value_name = "ID")]
    pub template: Option<String>,

    /// Backend origin
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List available templates
    Templates,
    /// Check that the backend is reachable
    Health,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Keys accepted by `config set/get`
pub const VALID_CONFIG_KEYS: &[&str] = &["api_url", "template", "duration"];

pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
