use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Configuration};
use crate::dynamics::state::PolarState;
use crate::dynamics::to_lvlh;
use crate::gnc::guidance::DescentTarget;
use crate::physics::circular_rate;

// ---------------------------------------------------------------------------
// Scenario: initial conditions + boundary target
// ---------------------------------------------------------------------------

/// Vehicle state at ignition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    pub altitude: f64,       // m
    pub vertical_speed: f64, // m/s
    pub theta_deg: f64,      // deg, angular position
    /// rad/s. `None` starts on a circular orbit at the initial radius.
    pub angular_rate: Option<f64>,
    /// kg. `None` starts fully fuelled.
    pub mass: Option<f64>,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            altitude: 14_878.0, // ~50 000 ft, powered descent initiation
            vertical_speed: -1.22,
            theta_deg: 40.0,
            angular_rate: None,
            mass: None,
        }
    }
}

/// End-of-phase conditions. Horizontal position is a travel distance
/// from the ignition point, not an absolute downrange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConditions {
    pub altitude: f64,         // m
    pub vertical_speed: f64,   // m/s
    pub travel: f64,           // m
    pub horizontal_speed: f64, // m/s
    pub time: f64,             // s, total horizon
}

impl Default for TargetConditions {
    fn default() -> Self {
        // Apollo high gate
        Self {
            altitude: 2_346.96,
            vertical_speed: -44.2,
            travel: 400_000.0,
            horizontal_speed: 44.2,
            time: 500.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub initial: InitialConditions,
    pub target: TargetConditions,
}

impl Scenario {
    /// True polar state at ignition.
    pub fn initial_state(&self, env: &Configuration) -> PolarState {
        let r = env.body.radius + self.initial.altitude;
        PolarState {
            r,
            dr: self.initial.vertical_speed,
            theta: self.initial.theta_deg.to_radians(),
            dtheta: self.initial.angular_rate.unwrap_or_else(|| circular_rate(&env.body, r)),
            m: self.initial.mass.unwrap_or(env.lander.wet_mass),
        }
    }

    /// Absolute LVLH target, fixed once from the ignition state.
    pub fn descent_target(&self, env: &Configuration) -> DescentTarget {
        let x0 = to_lvlh(&self.initial_state(env), &env.body).x;
        DescentTarget {
            altitude: self.target.altitude,
            vertical_speed: self.target.vertical_speed,
            downrange: x0 + self.target.travel,
            horizontal_speed: self.target.horizontal_speed,
            time: self.target.time,
        }
    }

    pub fn validate(&self, env: &Configuration) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::Invalid { field, reason });
        let ic = &self.initial;
        if !(ic.altitude.is_finite() && ic.altitude > 0.0) {
            return invalid("scenario.initial.altitude", format!("must be above the surface, got {}", ic.altitude));
        }
        if !(ic.vertical_speed.is_finite() && ic.theta_deg.is_finite()) {
            return invalid("scenario.initial", "velocity and angle must be finite".into());
        }
        if let Some(rate) = ic.angular_rate {
            if !rate.is_finite() {
                return invalid("scenario.initial.angular_rate", format!("must be finite, got {rate}"));
            }
        }
        if let Some(m) = ic.mass {
            let lander = &env.lander;
            if !(m.is_finite() && m >= lander.dry_mass && m <= lander.wet_mass) {
                return invalid(
                    "scenario.initial.mass",
                    format!("must be in [{}, {}] kg, got {m}", lander.dry_mass, lander.wet_mass),
                );
            }
        }

        let t = &self.target;
        if !(t.time.is_finite() && t.time > 0.0) {
            return invalid("scenario.target.time", format!("must be positive, got {}", t.time));
        }
        let fields = [t.altitude, t.vertical_speed, t.travel, t.horizontal_speed];
        if fields.iter().any(|v| !v.is_finite()) {
            return invalid("scenario.target", "boundary conditions must be finite".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Preset scenarios
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Apollo braking phase: ignition near 15 km to high gate at ~2.3 km.
    pub fn apollo_braking() -> Scenario {
        Scenario {
            name: "Apollo braking phase".into(),
            ..Scenario::default()
        }
    }
}
