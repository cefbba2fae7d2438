//! Polar ↔ LVLH conversion. Downrange is the arc length at the vehicle's
//! current radius: x = r * theta, dx = r * dtheta.

use super::state::{LvlhState, PolarState};
use crate::physics::Body;

/// Polar → LVLH projection.
pub fn to_lvlh(state: &PolarState, body: &Body) -> LvlhState {
    LvlhState {
        z: state.r - body.radius,
        dz: state.dr,
        x: state.r * state.theta,
        dx: state.r * state.dtheta,
        m: state.m,
    }
}

/// Angular rate implied by an LVLH state.
pub fn angular_rate(lvlh: &LvlhState, body: &Body) -> f64 {
    lvlh.dx / (body.radius + lvlh.z)
}
