//! Signal handling for the interactive session

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::info;

use crate::application::SessionCommand;

/// Forward SIGINT and SIGTERM to the session as `Quit`
pub fn forward_shutdown_signals(commands: mpsc::Sender<SessionCommand>) -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT"),
            _ = sigterm.recv() => info!("received SIGTERM"),
        }
        let _ = commands.send(SessionCommand::Quit).await;
    });

    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM
pub async fn shutdown_requested() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
    Ok(())
}
