use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::debounce::{self, DebounceDecision};
use crate::error::CycleError;
use crate::evaluator;
use crate::sink::{AlertSink, FileSink};
use crate::source::{self, NoiseSource, ReadingSource, SimulatedSource, UniformNoise};
use crate::tracing::prelude::*;
use crate::types::{Alert, Metric, Reading};

/// What one evaluation did with its reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Every metric at or below its threshold.
    Normal(Reading),

    /// A field was missing or not a number. Treated as no alarm.
    InvalidReading { reading: Reading, field: Metric },

    /// Alarm dropped because the last alert is too recent.
    Suppressed { reading: Reading, elapsed_secs: f64 },

    /// Alarm accepted and persisted.
    Triggered(Alert),
}

impl Evaluation {
    pub fn reading(&self) -> Reading {
        match self {
            Evaluation::Normal(reading)
            | Evaluation::InvalidReading { reading, .. }
            | Evaluation::Suppressed { reading, .. } => *reading,
            Evaluation::Triggered(alert) => alert.reading,
        }
    }

    pub fn alert(&self) -> Option<&Alert> {
        match self {
            Evaluation::Triggered(alert) => Some(alert),
            _ => None,
        }
    }

    pub fn into_alert(self) -> Option<Alert> {
        match self {
            Evaluation::Triggered(alert) => Some(alert),
            _ => None,
        }
    }
}

/// Turns readings into rate-limited alerts.
///
/// Holds no debounce state of its own: the time of the last accepted alert
/// is passed into every [`evaluate_once`](Self::evaluate_once) call, so the
/// outcome depends only on that argument, the reading, and the clock.
pub struct DebounceController {
    config: Arc<MonitorConfig>,
    source: Box<dyn ReadingSource>,
    noise: Box<dyn NoiseSource>,
    sink: Box<dyn AlertSink>,
    clock: Box<dyn Clock>,
}

impl DebounceController {
    pub fn new(
        config: Arc<MonitorConfig>,
        source: Box<dyn ReadingSource>,
        noise: Box<dyn NoiseSource>,
        sink: Box<dyn AlertSink>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            config,
            source,
            noise,
            sink,
            clock,
        }
    }

    /// Production wiring: simulated source, uniform jitter, file sink and
    /// the system clock.
    pub fn from_config(config: Arc<MonitorConfig>) -> Self {
        let (source, noise) = match config.simulation.seed {
            Some(seed) => (
                SimulatedSource::seeded(seed),
                UniformNoise::seeded(seed.wrapping_add(1)),
            ),
            None => (SimulatedSource::new(), UniformNoise::new()),
        };
        let sink = FileSink::new(config.alerts_file.clone());

        Self::new(
            config,
            Box::new(source),
            Box::new(noise),
            Box::new(sink),
            Box::new(SystemClock),
        )
    }

    pub fn config(&self) -> &Arc<MonitorConfig> {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Read, jitter, evaluate, debounce, and persist once.
    ///
    /// Emits exactly one log event describing the outcome. Errors are
    /// returned without logging; the loop reports them.
    pub fn evaluate_once(&mut self, last_alert_at: Option<f64>) -> Result<Evaluation, CycleError> {
        let raw = self.source.read()?;
        let reading = source::perturb(
            raw,
            self.config.simulation.jitter_magnitude,
            self.noise.as_mut(),
        )?;

        if let Some(field) = reading.invalid_field() {
            warn!(
                event = "sensor_reading_invalid",
                field = %field,
                temperature_celsius = reading.temperature_celsius,
                pressure_bar = reading.pressure_bar,
                vibration_mm_s = reading.vibration_mm_s,
                "Reading has a missing or non-numeric field, treating as no alarm"
            );
            return Ok(Evaluation::InvalidReading { reading, field });
        }

        if !evaluator::should_alert(&reading, &self.config.thresholds) {
            info!(
                event = "sensor_reading_ok",
                temperature_celsius = reading.temperature_celsius,
                pressure_bar = reading.pressure_bar,
                vibration_mm_s = reading.vibration_mm_s,
                "Reading within thresholds"
            );
            return Ok(Evaluation::Normal(reading));
        }

        let breaches = metric_list(&evaluator::breaches(&reading, &self.config.thresholds));
        let now = self.clock.now();

        match debounce::decide(last_alert_at, now, self.config.debounce_window()) {
            DebounceDecision::Suppress { elapsed_secs } => {
                warn!(
                    event = "alert_debounced",
                    breaches = %breaches,
                    elapsed_secs,
                    debounce_seconds = self.config.debounce_seconds,
                    temperature_celsius = reading.temperature_celsius,
                    pressure_bar = reading.pressure_bar,
                    vibration_mm_s = reading.vibration_mm_s,
                    "Alert suppressed due to debounce interval"
                );
                Ok(Evaluation::Suppressed {
                    reading,
                    elapsed_secs,
                })
            }
            DebounceDecision::Accept => {
                let alert = Alert::new(reading, now);
                self.sink.append(&alert)?;
                warn!(
                    event = "alert_triggered",
                    breaches = %breaches,
                    triggered_at = alert.triggered_at,
                    temperature_celsius = reading.temperature_celsius,
                    pressure_bar = reading.pressure_bar,
                    vibration_mm_s = reading.vibration_mm_s,
                    "{}",
                    alert.message
                );
                Ok(Evaluation::Triggered(alert))
            }
        }
    }
}

fn metric_list(metrics: &[Metric]) -> String {
    metrics
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
