//! Wall-clock capability used to stamp alerts and measure debounce windows.

use std::sync::Arc;

use parking_lot::Mutex;
use time::OffsetDateTime;

/// Source of the current time as fractional seconds since the Unix epoch.
pub trait Clock: Send {
    fn now(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<f64>>);

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    pub fn advance(&self, seconds: f64) {
        *self.0.lock() += seconds;
    }

    pub fn set(&self, now: f64) {
        *self.0.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.0.lock()
    }
}
