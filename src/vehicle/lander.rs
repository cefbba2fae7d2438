use serde::{Deserialize, Serialize};

use crate::gnc::limiter::ThrottleEnvelope;

// ---------------------------------------------------------------------------
// Lander definition (descent stage of a single-engine lander)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lander {
    pub name: String,
    pub wet_mass: f64,      // kg, at powered-descent initiation
    pub dry_mass: f64,      // kg, m_empty: no thrust below this
    pub isp: f64,           // s
    pub max_thrust: f64,    // N
    pub max_slew_rate: f64, // rad/s, pitch rate limit
    pub throttle: ThrottleEnvelope,
}

impl Lander {
    /// Propellant mass flow at a given thrust: mdot = T / (Isp * g0)
    pub fn mass_flow(&self, thrust: f64, g0: f64) -> f64 {
        thrust / (self.isp * g0)
    }

    pub fn propellant_mass(&self) -> f64 {
        self.wet_mass - self.dry_mass
    }

    /// True once the tanks are dry; the engine can no longer produce thrust.
    pub fn is_depleted(&self, mass: f64) -> bool {
        mass <= self.dry_mass
    }

    /// Tsiolkovsky delta-v between two masses.
    pub fn delta_v(&self, m0: f64, mf: f64, g0: f64) -> f64 {
        self.isp * g0 * (m0 / mf).ln()
    }

    /// Burn time at full thrust until depletion.
    pub fn full_thrust_burn_time(&self, g0: f64) -> f64 {
        if self.max_thrust > 0.0 {
            self.propellant_mass() / self.mass_flow(self.max_thrust, g0)
        } else {
            0.0
        }
    }
}

impl Default for Lander {
    fn default() -> Self {
        presets::apollo_lm()
    }
}

// ---------------------------------------------------------------------------
// Lander builder
// ---------------------------------------------------------------------------

pub struct LanderBuilder {
    name: String,
    wet_mass: f64,
    dry_mass: f64,
    isp: f64,
    max_thrust: f64,
    max_slew_rate: f64,
    throttle: ThrottleEnvelope,
}

impl LanderBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let lm = presets::apollo_lm();
        Self {
            name: name.into(),
            wet_mass: lm.wet_mass,
            dry_mass: lm.dry_mass,
            isp: lm.isp,
            max_thrust: lm.max_thrust,
            max_slew_rate: lm.max_slew_rate,
            throttle: lm.throttle,
        }
    }

    pub fn wet_mass(mut self, v: f64) -> Self { self.wet_mass = v; self }
    pub fn dry_mass(mut self, v: f64) -> Self { self.dry_mass = v; self }
    pub fn isp(mut self, v: f64) -> Self { self.isp = v; self }
    pub fn max_thrust(mut self, v: f64) -> Self { self.max_thrust = v; self }
    pub fn max_slew_rate(mut self, v: f64) -> Self { self.max_slew_rate = v; self }
    pub fn throttle(mut self, v: ThrottleEnvelope) -> Self { self.throttle = v; self }

    pub fn build(self) -> Lander {
        Lander {
            name: self.name,
            wet_mass: self.wet_mass,
            dry_mass: self.dry_mass,
            isp: self.isp,
            max_thrust: self.max_thrust,
            max_slew_rate: self.max_slew_rate,
            throttle: self.throttle,
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Apollo Lunar Module descent stage (DPS engine).
    pub fn apollo_lm() -> Lander {
        Lander {
            name: "Apollo LM".into(),
            wet_mass: 15_240.0,
            dry_mass: 4_280.0,
            isp: 311.0,
            max_thrust: 45_000.0,
            max_slew_rate: 10.0_f64.to_radians(),
            throttle: ThrottleEnvelope::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::G_EARTH;

    #[test]
    fn lm_mass_flow_at_full_thrust() {
        let lm = presets::apollo_lm();
        let mdot = lm.mass_flow(lm.max_thrust, G_EARTH);
        assert!((mdot - 14.75).abs() < 0.01, "got {}", mdot);
    }

    #[test]
    fn lm_full_thrust_burn_time() {
        let lm = presets::apollo_lm();
        let t = lm.full_thrust_burn_time(G_EARTH);
        assert!((t - lm.propellant_mass() / 14.75).abs() < 1.0, "got {}", t);
        let dead = LanderBuilder::new("Dead").max_thrust(0.0).build();
        assert_eq!(dead.full_thrust_burn_time(G_EARTH), 0.0);
    }

    #[test]
    fn depletion_threshold_is_inclusive() {
        let lm = presets::apollo_lm();
        assert!(lm.is_depleted(lm.dry_mass));
        assert!(!lm.is_depleted(lm.dry_mass + 1e-6));
    }

    #[test]
    fn builder_overrides_preset() {
        let lander = LanderBuilder::new("Test").max_thrust(10_000.0).dry_mass(500.0).build();
        assert_eq!(lander.max_thrust, 10_000.0);
        assert_eq!(lander.dry_mass, 500.0);
        assert_eq!(lander.isp, 311.0);
    }
}
