//! Threshold evaluation.
//!
//! The comparison is strictly greater-than: a value equal to its threshold
//! is not an alarm.

use strum::IntoEnumIterator;

use crate::types::{Metric, Reading, Thresholds};

/// True when any metric exceeds its threshold. A reading with a missing or
/// non-finite field is never alarming; reporting it is the caller's job.
pub fn should_alert(reading: &Reading, thresholds: &Thresholds) -> bool {
    if reading.invalid_field().is_some() {
        return false;
    }

    !breaches(reading, thresholds).is_empty()
}

/// Metrics whose value exceeds the threshold, in declaration order.
pub fn breaches(reading: &Reading, thresholds: &Thresholds) -> Vec<Metric> {
    Metric::iter()
        .filter(|&metric| reading.value(metric) > thresholds.limit(metric))
        .collect()
}
