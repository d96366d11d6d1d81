use anyhow::{Context, Result};
use clap::Parser;
use jailftpd::config::Config;
use jailftpd::core_auth::helper::hash_password;
use jailftpd::core_cli::Cli;
use jailftpd::core_log::logger::init_logging;
use jailftpd::server::{Server, ServerExit};
use log::{error, info};
use std::path::Path;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    if let Some(password) = &args.hash_password {
        println!("{}", hash_password(password).context("Failed to hash password")?);
        return Ok(());
    }

    let mut config = load_config(&args.config)?;
    if args.test_config {
        println!("Configuration {} is valid", args.config.display());
        return Ok(());
    }

    // Log files come from the first configuration; a reload keeps them
    init_logging(&config.server, args.verbose).context("Failed to initialize logging")?;

    loop {
        let server = Arc::new(Server::new(config));
        let listener = server.bind().await.context("Failed to start server")?;

        let signals = tokio::spawn(watch_signals(Arc::clone(&server), args.config.clone()));
        let exit = server.serve(listener).await;
        let reloaded = signals.await.context("Signal task failed")??;

        match (exit, reloaded) {
            (ServerExit::Reload, Some(next)) => {
                info!("Restarting with the reloaded configuration");
                config = next;
            }
            _ => break,
        }
    }

    info!("Exiting");
    Ok(())
}

/// Routes process signals to the server until it stops.
///
/// Returns the new configuration when the server stopped for a reload.
async fn watch_signals(server: Arc<Server>, config_path: std::path::PathBuf) -> Result<Option<Config>> {
    let mut hangup = signal(SignalKind::hangup())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                info!("SIGHUP received, reloading {}", config_path.display());
                match server.reload(&config_path).await {
                    Ok(config) => return Ok(Some(config)),
                    Err(e) => error!("Reload failed: {}", e),
                }
            }
            _ = interrupt.recv() => break,
            _ = terminate.recv() => break,
            _ = quit.recv() => break,
        }
    }

    info!("Termination signal received");
    server.shutdown().await;
    Ok(None)
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_from_file(path)
        .with_context(|| format!("Failed to load configuration file: {}", path.display()))
}
