mod alert;
mod reading;

pub use alert::Alert;
pub use reading::{Metric, Reading, Thresholds};
