//! VoiceCore CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voicecore::cli::{
    app::{list_templates, load_merged_config, run_health, run_interactive, run_timed},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    logging,
    presenter::Presenter,
    SessionOptions, EXIT_ERROR, EXIT_USAGE_ERROR,
};
use voicecore::domain::config::AppConfig;
use voicecore::domain::recording::Duration;
use voicecore::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let presenter = Presenter::new();

    let command = match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        other => other,
    };

    let cli_config = AppConfig {
        api_url: cli.api_url.clone(),
        template: None,
        duration: cli.duration.clone().flatten(),
        templates: None,
    };
    let config = load_merged_config(cli_config).await;
    let catalog = config.catalog();

    let template = match cli.template.as_deref() {
        Some(id) => match catalog.resolve(id) {
            Ok(id) => id,
            Err(e) => {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => {
            if let Some(id) = config.template.as_deref() {
                if !catalog.contains(id.trim()) {
                    presenter.warn(&format!(
                        "Configured template '{}' is not available, using '{}'",
                        id,
                        catalog.default_template().id
                    ));
                }
            }
            config.template_or_default(&catalog)
        }
    };

    let options = SessionOptions {
        api_url: config.api_url_or_default(),
        catalog,
        template,
    };

    match command {
        Some(Commands::Templates) => list_templates(&options.catalog, &options.template),
        Some(Commands::Health) => run_health(&options.api_url).await,
        Some(Commands::Config { .. }) => ExitCode::SUCCESS,
        None if cli.duration.is_some() => {
            let raw = config.duration.as_deref().unwrap_or_default();
            match raw.parse::<Duration>() {
                Ok(duration) => run_timed(options, duration).await,
                Err(e) => {
                    presenter.error(&e.to_string());
                    ExitCode::from(EXIT_USAGE_ERROR)
                }
            }
        }
        None => run_interactive(options).await,
    }
}
