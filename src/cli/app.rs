//! Application runners for interactive, timed and utility modes

use std::env;
use std::process::ExitCode;

use std::io::BufRead;
use std::thread;

use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::application::{RecordingSessionController, SessionCommand};
use crate::domain::config::AppConfig;
use crate::domain::recording::Duration;
use crate::domain::session::{SessionSnapshot, SessionState};
use crate::domain::template::{TemplateCatalog, TemplateId};
use crate::infrastructure::{CpalCaptureDevice, HttpUploadTransport, XdgConfigStore};

use super::input::{parse_line, InputAction};
use super::presenter::Presenter;
use super::signals::{forward_shutdown_signals, shutdown_requested};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the backend origin
pub const API_URL_ENV: &str = "VOICECORE_API_URL";

/// Settings resolved from merged config and CLI flags
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub api_url: String,
    pub catalog: TemplateCatalog,
    pub template: TemplateId,
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            Presenter::new().warn(&format!("Ignoring config file: {}", e));
            AppConfig::empty()
        }
    };

    let env_config = AppConfig {
        api_url: env::var(API_URL_ENV).ok().filter(|s| !s.trim().is_empty()),
        ..Default::default()
    };

    // defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Interactive session driven by stdin
pub async fn run_interactive(options: SessionOptions) -> ExitCode {
    let presenter = Presenter::new();
    let mut controller = RecordingSessionController::new(
        CpalCaptureDevice::new(),
        HttpUploadTransport::new(&options.api_url),
        options.template.clone(),
    );

    let (commands_tx, commands_rx) = mpsc::channel(16);
    let (rejected_tx, mut rejected_rx) = mpsc::unbounded_channel();

    if let Err(e) = forward_shutdown_signals(commands_tx.clone()) {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.info(&format!("Backend: {}", options.api_url));
    presenter.interactive_help();
    presenter.session_status(&controller.snapshot());

    tokio::spawn(print_updates(controller.subscribe()));
    tokio::spawn(async move {
        while let Some(rejection) = rejected_rx.recv().await {
            Presenter::new().warn(&format!("Ignored: {}", rejection));
        }
    });
    let status = controller.subscribe();
    let catalog = options.catalog.clone();
    // Blocking stdin reads stay off the runtime so quitting never waits on input
    if let Err(e) = thread::Builder::new()
        .name("voicecore-input".into())
        .spawn(move || read_commands(commands_tx, status, catalog))
    {
        presenter.error(&format!("Failed to read input: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    controller.run(commands_rx, rejected_tx).await;
    debug!(state = %controller.state(), "session ended");
    ExitCode::from(EXIT_SUCCESS)
}

async fn print_updates(mut updates: watch::Receiver<SessionSnapshot>) {
    let presenter = Presenter::new();
    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        presenter.session_status(&snapshot);
    }
}

fn read_commands(
    commands: mpsc::Sender<SessionCommand>,
    status: watch::Receiver<SessionSnapshot>,
    catalog: TemplateCatalog,
) {
    let presenter = Presenter::new();

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                presenter.error(&format!("Failed to read input: {}", e));
                break;
            }
        };

        match parse_line(&line, &catalog) {
            InputAction::Session(command) => {
                if commands.blocking_send(command).is_err() {
                    return;
                }
            }
            InputAction::Status => presenter.session_status(&status.borrow()),
            InputAction::Help => presenter.interactive_help(),
            InputAction::InvalidTemplate(message) => presenter.error(&message),
            InputAction::Unknown(input) => {
                presenter.warn(&format!("Unknown command: {}", input));
                presenter.interactive_help();
            }
        }
    }

    let _ = commands.blocking_send(SessionCommand::Quit);
}

/// Record for a fixed time, upload, and print the result
pub async fn run_timed(options: SessionOptions, duration: Duration) -> ExitCode {
    let mut presenter = Presenter::new();
    let mut controller = RecordingSessionController::new(
        CpalCaptureDevice::new(),
        HttpUploadTransport::new(&options.api_url),
        options.template.clone(),
    );

    if let Err(e) = controller.request_start().await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    if controller.state() == SessionState::Error {
        presenter.error(controller.error_message().unwrap_or("Recording failed"));
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.start_spinner(&format!(
        "Recording for {} [{}]... (Ctrl+C to cancel)",
        duration,
        controller.template()
    ));

    tokio::select! {
        _ = tokio::time::sleep(duration.as_std()) => {}
        Ok(()) = shutdown_requested() => {
            controller.shutdown().await;
            presenter.spinner_fail("Recording cancelled");
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if let Err(e) = controller.request_stop() {
        presenter.spinner_fail(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.update_spinner("Uploading...");

    match controller.settle().await {
        SessionState::Done => {
            presenter.spinner_success("Done!");
            if let Some(result) = controller.result() {
                presenter.upload_result(result);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        _ => {
            presenter.spinner_fail(controller.error_message().unwrap_or("Upload failed"));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Query the backend health endpoint
pub async fn run_health(api_url: &str) -> ExitCode {
    let mut presenter = Presenter::new();
    let transport = HttpUploadTransport::new(api_url);

    presenter.start_spinner(&format!("Checking {}...", transport.health_url()));
    match transport.health().await {
        Ok(health) if health.is_ok() => {
            presenter.spinner_success(&format!("Backend at {} is healthy", transport.base_url()));
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(health) => {
            presenter.spinner_fail(&format!("Backend reported status: {}", health.status));
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Print the template catalog
pub fn list_templates(catalog: &TemplateCatalog, selected: &TemplateId) -> ExitCode {
    Presenter::new().templates(catalog, selected);
    ExitCode::from(EXIT_SUCCESS)
}
