//! API data transfer objects.
//!
//! These types define the API contract shared between the server and
//! clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::MonitorConfig;
use crate::monitor::Evaluation;
use crate::types::{Reading, Thresholds};

/// Snapshot of the evaluation loop, refreshed after every cycle.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct MonitorStatus {
    /// Seconds since the Unix epoch at which the monitor was created.
    pub started_at: f64,
    pub alerts_enabled: bool,
    pub read_interval_seconds: u64,
    pub debounce_seconds: u64,
    pub thresholds: Thresholds,
    pub cycles: u64,
    pub alerts_triggered: u64,
    pub alerts_suppressed: u64,
    pub invalid_readings: u64,
    /// Cycles abandoned because of an error.
    pub errors: u64,
    pub last_reading: Option<Reading>,
    pub last_alert_at: Option<f64>,
}

impl MonitorStatus {
    pub fn new(config: &MonitorConfig, started_at: f64) -> Self {
        Self {
            started_at,
            alerts_enabled: config.alerts_enabled,
            read_interval_seconds: config.read_interval_seconds,
            debounce_seconds: config.debounce_seconds,
            thresholds: config.thresholds,
            cycles: 0,
            alerts_triggered: 0,
            alerts_suppressed: 0,
            invalid_readings: 0,
            errors: 0,
            last_reading: None,
            last_alert_at: None,
        }
    }

    pub fn record(&mut self, evaluation: &Evaluation) {
        self.cycles += 1;
        match evaluation {
            Evaluation::Normal(_) => {}
            // Keep the last valid reading; non-finite fields do not encode as JSON.
            Evaluation::InvalidReading { .. } => {
                self.invalid_readings += 1;
                return;
            }
            Evaluation::Suppressed { .. } => self.alerts_suppressed += 1,
            Evaluation::Triggered(_) => self.alerts_triggered += 1,
        }
        self.last_reading = Some(evaluation.reading());
    }

    pub fn record_error(&mut self) {
        self.cycles += 1;
        self.errors += 1;
    }
}
