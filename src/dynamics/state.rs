use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use crate::error::GncError;

/// Integrator state vector, ordered `[r, dr, theta, dtheta, m]`.
pub type StateVector = SVector<f64, 5>;

// ---------------------------------------------------------------------------
// True vehicle state, inertial polar frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarState {
    pub r: f64,      // m, distance from body center
    pub dr: f64,     // m/s, radial velocity
    pub theta: f64,  // rad, angular position
    pub dtheta: f64, // rad/s, angular velocity
    pub m: f64,      // kg
}

impl PolarState {
    pub fn to_vector(&self) -> StateVector {
        StateVector::new(self.r, self.dr, self.theta, self.dtheta, self.m)
    }

    pub fn from_vector(v: &StateVector) -> Self {
        Self { r: v[0], dr: v[1], theta: v[2], dtheta: v[3], m: v[4] }
    }

    /// Advance state by a derivative scaled by dt (used inside the RK stages).
    pub fn apply(&self, d: &Deriv, dt: f64) -> PolarState {
        PolarState::from_vector(&(self.to_vector() + d.to_vector() * dt))
    }

    /// Horizontal (tangential) velocity, m/s.
    pub fn horizontal_speed(&self) -> f64 {
        self.r * self.dtheta
    }

    pub fn speed(&self) -> f64 {
        self.dr.hypot(self.horizontal_speed())
    }

    /// Reject states that would poison the integration with NaN/inf.
    pub fn validate(&self) -> Result<(), GncError> {
        let fields = [
            ("r", self.r),
            ("dr", self.dr),
            ("theta", self.theta),
            ("dtheta", self.dtheta),
            ("m", self.m),
        ];
        if let Some(&(what, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(GncError::invariant(what, value));
        }
        if self.r <= 0.0 {
            return Err(GncError::invariant("r", self.r));
        }
        if self.m <= 0.0 {
            return Err(GncError::invariant("m", self.m));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Local-vertical / local-horizontal state (derived by navigation)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LvlhState {
    pub z: f64,  // m, altitude above the surface
    pub dz: f64, // m/s, vertical velocity (up positive)
    pub x: f64,  // m, downrange
    pub dx: f64, // m/s, downrange velocity
    pub m: f64,  // kg
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Deriv {
    pub dr: f64,
    pub ddr: f64,
    pub dtheta: f64,
    pub ddtheta: f64,
    pub dm: f64, // mass flow (negative while burning)
}

impl Deriv {
    pub fn to_vector(&self) -> StateVector {
        StateVector::new(self.dr, self.ddr, self.dtheta, self.ddtheta, self.dm)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// What the engine actually does over one integration interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Actuation {
    pub thrust: f64, // N
    pub pitch: f64,  // rad from local vertical, positive toward +theta
}

/// Raw and hardware-feasible command produced each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub thrust_cmd: f64, // N, required by the control law
    pub pitch_cmd: f64,  // rad, required by the control law
    pub thrust: f64,     // N, after throttle limiting / propellant guard
    pub pitch: f64,      // rad, after slew limiting / propellant guard
}

impl ControlCommand {
    pub fn actuation(&self) -> Actuation {
        Actuation { thrust: self.thrust, pitch: self.pitch }
    }

    /// Force the engine off and the attitude to vertical.
    pub fn cut_off(&mut self) {
        self.thrust = 0.0;
        self.pitch = 0.0;
    }
}
