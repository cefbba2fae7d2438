use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Sensor configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub seed: u64,
    pub bias: f64,           // m, constant altimeter offset
    pub range_fraction: f64, // 3-sigma accuracy as a fraction of altitude
    pub noise_floor: f64,    // m, 3-sigma instrument floor
    /// Low-pass time constant for the measured altitude, s. `None` disables.
    pub filter_tau: Option<f64>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        // Apollo landing radar: 1.5% of range + 1.52 m (3-sigma)
        Self {
            seed: 42,
            bias: 0.0,
            range_fraction: 0.015,
            noise_floor: 1.52,
            filter_tau: None,
        }
    }
}

impl SensorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::Invalid { field, reason });
        if !self.bias.is_finite() {
            return invalid("sensor.bias", format!("must be finite, got {}", self.bias));
        }
        if !(self.range_fraction >= 0.0 && self.range_fraction.is_finite()) {
            return invalid("sensor.range_fraction", format!("must be >= 0, got {}", self.range_fraction));
        }
        if !(self.noise_floor >= 0.0 && self.noise_floor.is_finite()) {
            return invalid("sensor.noise_floor", format!("must be >= 0, got {}", self.noise_floor));
        }
        match self.filter_tau {
            Some(tau) if !(tau > 0.0 && tau.is_finite()) => {
                invalid("sensor.filter_tau", format!("must be positive, got {tau}"))
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Radar altimeter
// ---------------------------------------------------------------------------

/// Radar altimeter with a constant bias and altitude-proportional noise.
#[derive(Debug, Clone)]
pub struct Altimeter {
    pub bias: f64,
    pub range_fraction: f64,
    pub noise_floor: f64,
    rng: ChaCha8Rng,
}

impl Altimeter {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            bias: config.bias,
            range_fraction: config.range_fraction,
            noise_floor: config.noise_floor,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// 1-sigma noise at a given true altitude.
    pub fn sigma(&self, z_true: f64) -> f64 {
        (self.range_fraction * z_true.max(0.0) + self.noise_floor) / 3.0
    }

    /// One measurement; draws exactly one noise sample.
    pub fn measure(&mut self, z_true: f64) -> f64 {
        let n: f64 = self.rng.sample(StandardNormal);
        z_true + self.bias + self.sigma(z_true) * n
    }
}

// ---------------------------------------------------------------------------
// First-order low-pass filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LowPassFilter {
    pub alpha: f64,
    state: Option<f64>,
}

impl LowPassFilter {
    /// alpha = dt / (tau + dt)
    pub fn new(dt: f64, tau: f64) -> Self {
        Self { alpha: dt / (tau + dt), state: None }
    }

    /// The first sample initializes the filter.
    pub fn filter(&mut self, x: f64) -> f64 {
        let y = match self.state {
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
            None => x,
        };
        self.state = Some(y);
        y
    }
}
