use serde::{Deserialize, Serialize};

use super::gravity::G_UNIVERSAL;

// ---------------------------------------------------------------------------
// Central body constants
// ---------------------------------------------------------------------------

pub const MOON_MASS: f64 = 7.347_673_09e22; // kg
pub const MOON_RADIUS: f64 = 1_737e3; // mean radius, m

/// Gravitating body the lander descends onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Body {
    pub mu: f64,     // m^3/s^2
    pub radius: f64, // m
}

impl Body {
    pub fn moon() -> Self {
        Self {
            mu: G_UNIVERSAL * MOON_MASS,
            radius: MOON_RADIUS,
        }
    }

    /// Surface gravity, m/s^2.
    pub fn surface_gravity(&self) -> f64 {
        self.mu / (self.radius * self.radius)
    }

    pub fn altitude(&self, r: f64) -> f64 {
        r - self.radius
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::moon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lunar_surface_gravity() {
        let g = Body::moon().surface_gravity();
        assert!((g - 1.625).abs() < 0.01, "lunar g should be ~1.62, got {}", g);
    }
}
