//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! the interactive input reader and the application runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod input;
pub mod logging;
pub mod presenter;
pub mod signals;

pub use app::{
    load_merged_config, run_health, run_interactive, run_timed, SessionOptions, EXIT_ERROR,
    EXIT_SUCCESS, EXIT_USAGE_ERROR,
};
pub use args::{Cli, Commands, ConfigAction};
pub use presenter::Presenter;
