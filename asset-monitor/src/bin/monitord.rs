//! Asset monitor daemon.
//!
//! Loads the configuration, then runs the evaluation loop and the API
//! server until SIGINT or SIGTERM.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use asset_monitor::api::{self, SharedState};
use asset_monitor::config::MonitorConfig;
use asset_monitor::monitor::{self, DebounceController, Monitor};
use asset_monitor::tracing::{self, prelude::*};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// `ASSET_MONITOR_CONFIG`, else the first argument, else `config.yaml`.
fn config_path() -> PathBuf {
    env::var_os("ASSET_MONITOR_CONFIG")
        .map(PathBuf::from)
        .or_else(|| env::args_os().nth(1).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing::init();

    let path = config_path();
    let config = match MonitorConfig::load(&path) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!(event = "config_error", path = %path.display(), error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    info!(event = "config_loaded", path = %path.display(), "Configuration loaded");

    let monitor = Monitor::new(DebounceController::from_config(Arc::clone(&config)));
    let running = CancellationToken::new();

    let api_task = config.api.enabled.then(|| {
        let state = SharedState::new(monitor.subscribe(), config.alerts_file.clone());
        tokio::spawn(api::serve(config.api.listen, state, running.clone()))
    });

    tokio::spawn(shutdown_on_signal(running.clone()));

    monitor.run(running.clone()).await;

    // The loop only returns once cancelled; make sure the API follows.
    running.cancel();
    if let Some(task) = api_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(event = "api_error", error = %e, "API server stopped with an error"),
            Err(e) => warn!(event = "api_error", error = %e, "API server task failed"),
        }
    }

    Ok(())
}

async fn shutdown_on_signal(running: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!(event = "signal_setup_failed", error = %e, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    monitor::request_shutdown(&running);
}
