use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use utoipa::ToSchema;

/// One measured quantity of the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    TemperatureCelsius,
    PressureBar,
    VibrationMmS,
}

/// A single sample of the asset. Fields that are not finite numbers are
/// treated as missing.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct Reading {
    pub temperature_celsius: f64,
    pub pressure_bar: f64,
    pub vibration_mm_s: f64,
}

impl Reading {
    pub fn new(temperature_celsius: f64, pressure_bar: f64, vibration_mm_s: f64) -> Self {
        Self {
            temperature_celsius,
            pressure_bar,
            vibration_mm_s,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TemperatureCelsius => self.temperature_celsius,
            Metric::PressureBar => self.pressure_bar,
            Metric::VibrationMmS => self.vibration_mm_s,
        }
    }

    /// First field that is not a well-formed number, if any.
    pub fn invalid_field(&self) -> Option<Metric> {
        use strum::IntoEnumIterator;

        Metric::iter().find(|&metric| !self.value(metric).is_finite())
    }
}

/// Alarm ceilings, one per metric. Loaded once, shared read-only.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct Thresholds {
    pub temperature_celsius: f64,
    pub pressure_bar: f64,
    pub vibration_mm_s: f64,
}

impl Thresholds {
    pub fn limit(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TemperatureCelsius => self.temperature_celsius,
            Metric::PressureBar => self.pressure_bar,
            Metric::VibrationMmS => self.vibration_mm_s,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature_celsius: 90.0,
            pressure_bar: 120.0,
            vibration_mm_s: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_metrics_like_their_fields() {
        assert_eq!(Metric::TemperatureCelsius.to_string(), "temperature_celsius");
        assert_eq!(Metric::PressureBar.to_string(), "pressure_bar");
        assert_eq!(Metric::VibrationMmS.to_string(), "vibration_mm_s");
    }

    #[test]
    fn should_report_no_invalid_field_for_finite_reading() {
        assert_eq!(Reading::new(70.0, 100.0, 2.0).invalid_field(), None);
    }

    #[test]
    fn should_report_first_non_finite_field() {
        let reading = Reading::new(70.0, f64::NAN, f64::INFINITY);
        assert_eq!(reading.invalid_field(), Some(Metric::PressureBar));
    }
}
