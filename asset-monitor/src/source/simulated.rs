use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{NoiseSource, ReadingSource};
use crate::error::SourceError;
use crate::types::Reading;

/// Stand-in for field I/O: draws each metric uniformly around a nominal
/// operating point. Ranges reach past the default thresholds so alarms
/// occur regularly.
#[derive(Debug)]
pub struct SimulatedSource {
    rng: StdRng,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingSource for SimulatedSource {
    fn read(&mut self) -> Result<Reading, SourceError> {
        Ok(Reading {
            temperature_celsius: 70.0 + self.rng.random_range(-5.0..=25.0),
            pressure_bar: 100.0 + self.rng.random_range(-10.0..=30.0),
            vibration_mm_s: 2.0 + self.rng.random_range(-1.0..=6.0),
        })
    }
}

/// Uniform noise in `[-magnitude, magnitude]`.
#[derive(Debug)]
pub struct UniformNoise {
    rng: StdRng,
}

impl UniformNoise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSource for UniformNoise {
    fn offset(&mut self, magnitude: f64) -> f64 {
        self.rng.random_range(-magnitude..=magnitude)
    }
}

/// Noise source that never perturbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn offset(&mut self, _magnitude: f64) -> f64 {
        0.0
    }
}
