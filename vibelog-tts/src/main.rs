#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::path::Path;

use anyhow::Context;
use args::{Args, DEFAULT_CONFIG_PATH};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use vibelog_config::Config;
use vibelog_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let (config, config_source) = load_config(args.config.as_deref())?;

    // Initialize telemetry
    let _telemetry_guard = vibelog_telemetry::init(config.telemetry.as_ref(), &args.log_filter)?;

    tracing::info!(config = %config_source, "starting vibelog-tts");

    // Build server
    let mut server = Server::new(&config).context("failed to build server")?;
    if let Some(listen) = args.listen {
        server = server.with_listen_address(listen);
    }

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    // Run server
    server.serve(shutdown).await?;

    tracing::info!("vibelog-tts stopped");
    Ok(())
}

/// Load the named config file, or the default one if it exists
///
/// Only a missing file at the default path falls back to built-in defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<(Config, String)> {
    if let Some(path) = path {
        return Ok((Config::load(path)?, path.display().to_string()));
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        Ok((Config::load(default_path)?, DEFAULT_CONFIG_PATH.to_string()))
    } else {
        Ok((Config::default(), "built-in defaults".to_string()))
    }
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
