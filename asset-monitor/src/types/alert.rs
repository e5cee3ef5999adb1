use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Reading;

/// An accepted alarm. Written once to the sink and never changed.
///
/// Serializes to the sink record layout:
/// `{"message": ..., "reading": {...}, "triggered_at": <epoch seconds>}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct Alert {
    pub message: String,
    pub reading: Reading,
    /// Seconds since the Unix epoch, fractional.
    pub triggered_at: f64,
}

impl Alert {
    pub fn new(reading: Reading, triggered_at: f64) -> Self {
        Self {
            message: format_message(&reading),
            reading,
            triggered_at,
        }
    }
}

fn format_message(reading: &Reading) -> String {
    format!(
        "ALERT: temp={:.2}C, pressure={:.2}bar, vibration={:.2}mm/s",
        reading.temperature_celsius, reading.pressure_bar, reading.vibration_mm_s
    )
}
