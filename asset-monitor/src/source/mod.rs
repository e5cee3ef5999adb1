//! Reading acquisition.
//!
//! Both the reading itself and the noise applied to it are injectable
//! capabilities, so tests can substitute deterministic doubles.

mod fixed;
mod simulated;

pub use fixed::FixedSource;
pub use simulated::{NoNoise, SimulatedSource, UniformNoise};

use crate::error::{InvalidArgument, SourceError};
use crate::types::Reading;

/// Produces a fresh reading of the asset on demand.
pub trait ReadingSource: Send {
    fn read(&mut self) -> Result<Reading, SourceError>;
}

/// Produces additive noise offsets.
pub trait NoiseSource: Send {
    /// An offset in `[-magnitude, magnitude]`. Callers guarantee
    /// `magnitude` is finite and non-negative.
    fn offset(&mut self, magnitude: f64) -> f64;
}

/// Apply jitter of at most `magnitude` to the temperature. Pressure and
/// vibration are returned unchanged.
///
/// A negative or non-finite magnitude is a caller bug and is rejected, not
/// clamped.
pub fn perturb(
    reading: Reading,
    magnitude: f64,
    noise: &mut dyn NoiseSource,
) -> Result<Reading, InvalidArgument> {
    if !magnitude.is_finite() || magnitude < 0.0 {
        return Err(InvalidArgument(format!(
            "jitter magnitude must be finite and non-negative, got {magnitude}"
        )));
    }

    Ok(Reading {
        temperature_celsius: reading.temperature_celsius + noise.offset(magnitude),
        ..reading
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    /// Always returns the bound itself.
    struct MaxNoise;

    impl NoiseSource for MaxNoise {
        fn offset(&mut self, magnitude: f64) -> f64 {
            magnitude
        }
    }

    #[test]
    fn perturb_only_touches_temperature() {
        let reading = Reading::new(70.0, 100.0, 2.0);

        let perturbed = perturb(reading, 1.5, &mut MaxNoise).unwrap();

        assert_eq!(perturbed, Reading::new(71.5, 100.0, 2.0));
    }

    #[test]
    fn zero_magnitude_leaves_reading_unchanged() {
        let reading = Reading::new(70.0, 100.0, 2.0);
        let mut noise = UniformNoise::seeded(7);

        assert_eq!(perturb(reading, 0.0, &mut noise).unwrap(), reading);
    }

    #[test_case(-0.1; "negative")]
    #[test_case(-1e-12; "tiny_negative")]
    #[test_case(f64::NAN; "nan")]
    #[test_case(f64::INFINITY; "infinite")]
    fn invalid_magnitude_is_rejected(magnitude: f64) {
        let reading = Reading::new(100.0, 120.0, 5.0);

        let result = perturb(reading, magnitude, &mut MaxNoise);

        assert!(matches!(result, Err(InvalidArgument(_))));
    }

    #[test]
    fn uniform_jitter_stays_within_bounds() {
        let reading = Reading::new(70.0, 100.0, 2.0);
        let mut noise = UniformNoise::seeded(42);

        for _ in 0..1000 {
            let perturbed = perturb(reading, 1.0, &mut noise).unwrap();
            assert!((69.0..=71.0).contains(&perturbed.temperature_celsius));
            assert_eq!(perturbed.pressure_bar, 100.0);
            assert_eq!(perturbed.vibration_mm_s, 2.0);
        }
    }
}
