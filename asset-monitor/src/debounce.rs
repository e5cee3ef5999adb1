//! Rate limiting of accepted alerts.
//!
//! At most one alert is accepted per debounce window. The only state is the
//! time of the last accepted alert, which the caller owns and passes in.
//!
//! # Decision
//!
//! ```text
//!  last = None                        ──► Accept
//!  last = Some(t), now - t <  window  ──► Suppress
//!  last = Some(t), now - t >= window  ──► Accept
//! ```
//!
//! The boundary belongs to the accept side: an alarm arriving exactly one
//! window after the previous alert is accepted.

use std::time::Duration;

/// Result of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceDecision {
    /// No alert within the window. Record and persist a new one.
    Accept,

    /// An alert was accepted `elapsed_secs` ago, less than the window.
    /// The alarm is dropped, not queued.
    Suppress { elapsed_secs: f64 },
}

/// Decide whether an alarm at `now` may produce an alert.
///
/// Times are fractional seconds on the same clock.
pub fn decide(last_alert_at: Option<f64>, now: f64, window: Duration) -> DebounceDecision {
    let Some(last) = last_alert_at else {
        return DebounceDecision::Accept;
    };

    let elapsed_secs = now - last;
    if elapsed_secs < window.as_secs_f64() {
        DebounceDecision::Suppress { elapsed_secs }
    } else {
        DebounceDecision::Accept
    }
}
