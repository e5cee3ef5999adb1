//! The evaluation loop.
//!
//! One cycle at a time: evaluate, update the debounce state, publish a
//! status snapshot, then sleep for the poll interval. Shutdown is only
//! observed between cycles, so an alert write is never interrupted.

mod controller;

pub use controller::{DebounceController, Evaluation};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api_client::types::MonitorStatus;
use crate::config::MonitorConfig;
use crate::tracing::prelude::*;

/// Owns one asset's debounce state and drives its controller.
///
/// Monitors share nothing, so several may run side by side.
pub struct Monitor {
    controller: DebounceController,
    config: Arc<MonitorConfig>,
    last_alert_at: Option<f64>,
    status_tx: watch::Sender<MonitorStatus>,
}

impl Monitor {
    pub fn new(controller: DebounceController) -> Self {
        let config = Arc::clone(controller.config());
        let status = MonitorStatus::new(&config, controller.now());
        let (status_tx, _) = watch::channel(status);

        Self {
            controller,
            config,
            last_alert_at: None,
            status_tx,
        }
    }

    /// Receiver for the status snapshot published after every cycle.
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status_tx.subscribe()
    }

    /// Time of the last accepted alert, if any.
    pub fn last_alert_at(&self) -> Option<f64> {
        self.last_alert_at
    }

    /// Run cycles until `cancellation` fires.
    pub async fn run(mut self, cancellation: CancellationToken) {
        info!(
            event = "monitor_startup",
            read_interval_seconds = self.config.read_interval_seconds,
            debounce_seconds = self.config.debounce_seconds,
            alerts_enabled = self.config.alerts_enabled,
            alerts_file = %self.config.alerts_file.display(),
            "Starting asset monitor"
        );

        let interval = self.config.read_interval();
        while !cancellation.is_cancelled() {
            self.cycle();

            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        let status = self.status_tx.borrow().clone();
        info!(
            event = "monitor_shutdown",
            cycles = status.cycles,
            alerts_triggered = status.alerts_triggered,
            "Received shutdown signal, asset monitor stopped"
        );
    }

    /// Run a single cycle. Failures are logged and contained.
    pub fn cycle(&mut self) {
        if !self.config.alerts_enabled {
            info!(event = "alerts_disabled", "Alerts are disabled by configuration");
            self.status_tx.send_modify(|s| s.cycles += 1);
            return;
        }

        let last_alert_at = self.last_alert_at;
        let controller = &mut self.controller;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            controller.evaluate_once(last_alert_at)
        }));

        match outcome {
            Ok(Ok(evaluation)) => {
                if let Some(alert) = evaluation.alert() {
                    self.last_alert_at = Some(alert.triggered_at);
                }
                let last_alert_at = self.last_alert_at;
                self.status_tx.send_modify(|s| {
                    s.record(&evaluation);
                    s.last_alert_at = last_alert_at;
                });
            }
            Ok(Err(e)) => {
                warn!(
                    event = "unexpected_error",
                    kind = e.kind(),
                    error = %e,
                    "Unexpected error in monitor loop"
                );
                self.status_tx.send_modify(MonitorStatus::record_error);
            }
            Err(payload) => {
                warn!(
                    event = "unexpected_error",
                    kind = "panic",
                    error = %panic_message(payload.as_ref()),
                    "Unexpected error in monitor loop"
                );
                self.status_tx.send_modify(MonitorStatus::record_error);
            }
        }
    }
}

/// Stop the loop after the cycle in flight, if any, completes.
pub fn request_shutdown(cancellation: &CancellationToken) {
    info!(event = "shutdown_requested", "Shutdown requested, finishing current cycle");
    cancellation.cancel();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
