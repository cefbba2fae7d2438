use serde::{Deserialize, Serialize};

use crate::dynamics::ControlCommand;
use crate::vehicle::Lander;

// ---------------------------------------------------------------------------
// Throttle envelope
// ---------------------------------------------------------------------------

/// Throttle hardware envelope of a deep-throttling engine that cannot run
/// reliably between `upper_percent` and 100%, nor below `floor_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleEnvelope {
    pub floor_percent: f64,
    pub upper_percent: f64,
}

impl Default for ThrottleEnvelope {
    fn default() -> Self {
        Self { floor_percent: 10.0, upper_percent: 65.0 }
    }
}

impl ThrottleEnvelope {
    /// Map a required thrust onto a thrust the engine can deliver.
    ///
    /// - throttle >= upper: full thrust
    /// - floor <= throttle < upper: pass through
    /// - throttle < floor: clamp up to the floor
    ///
    /// NaN passes through unchanged.
    pub fn limit(&self, thrust_cmd: f64, max_thrust: f64) -> f64 {
        if thrust_cmd.is_nan() {
            return thrust_cmd;
        }
        let throttle = thrust_cmd / max_thrust;
        if throttle >= self.upper_percent / 100.0 {
            max_thrust
        } else if throttle >= self.floor_percent / 100.0 {
            thrust_cmd
        } else {
            max_thrust * self.floor_percent / 100.0
        }
    }
}

// ---------------------------------------------------------------------------
// Slew-rate limiter
// ---------------------------------------------------------------------------

/// Owns the actuated pitch across ticks and moves it toward the command
/// by at most `max_rate * dt` per tick.
#[derive(Debug, Clone)]
pub struct SlewLimiter {
    pub max_rate: f64, // rad/s
    alpha: Option<f64>,
}

impl SlewLimiter {
    pub fn new(max_rate: f64, initial: f64) -> Self {
        Self { max_rate, alpha: Some(initial) }
    }

    /// Snaps to the first command it sees, then rate-limits.
    pub fn unprimed(max_rate: f64) -> Self {
        Self { max_rate, alpha: None }
    }

    pub fn update(&mut self, alpha_cmd: f64, dt: f64) -> f64 {
        let next = match self.alpha {
            Some(prev) => {
                let dalpha = alpha_cmd - prev;
                let step = self.max_rate * dt;
                if dalpha.abs() > step {
                    prev + step.copysign(dalpha)
                } else {
                    alpha_cmd
                }
            }
            None => alpha_cmd,
        };
        self.alpha = Some(next);
        next
    }

    /// Overwrite the held angle (propellant guard).
    pub fn force(&mut self, alpha: f64) {
        self.alpha = Some(alpha);
    }

    pub fn current(&self) -> Option<f64> {
        self.alpha
    }
}

// ---------------------------------------------------------------------------
// Propellant guard
// ---------------------------------------------------------------------------

/// Final override: a dry vehicle gets zero thrust and zero pitch no matter
/// what the limiters produced. Returns true when it fired.
pub fn propellant_guard(cmd: &mut ControlCommand, mass: f64, lander: &Lander) -> bool {
    if lander.is_depleted(mass) {
        cmd.cut_off();
        true
    } else {
        false
    }
}
