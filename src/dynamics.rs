pub mod frames;
pub mod state;

use crate::config::Configuration;
use crate::physics::gravity::gravity_accel;
use state::{Actuation, Deriv, PolarState};

pub use frames::{angular_rate, to_lvlh};
pub use state::{ControlCommand, LvlhState, StateVector};

// ---------------------------------------------------------------------------
// Equations of motion (planar, polar coordinates)
// ---------------------------------------------------------------------------

/// Compute state derivatives for a given state and engine actuation.
///
/// Forces modeled:
///   1. Gravity: inverse-square, toward the body center
///   2. Thrust: magnitude `T`, pitched `alpha` from local vertical
///   3. Centrifugal / Coriolis terms of the rotating polar frame
///
/// Thrust is silently zeroed once the vehicle is at or below its empty mass.
pub fn derivatives(state: &PolarState, act: &Actuation, env: &Configuration) -> Deriv {
    let lander = &env.lander;
    let thrust = if lander.is_depleted(state.m) {
        0.0
    } else {
        act.thrust.max(0.0)
    };
    let a_thrust = thrust / state.m;

    let ddr = a_thrust * act.pitch.cos() - gravity_accel(&env.body, state.r)
        + state.r * state.dtheta * state.dtheta;
    let ddtheta = (a_thrust * act.pitch.sin() - 2.0 * state.dr * state.dtheta) / state.r;

    Deriv {
        dr: state.dr,
        ddr,
        dtheta: state.dtheta,
        ddtheta,
        dm: -lander.mass_flow(thrust, env.g_surface),
    }
}

/// Specific orbital energy, J/kg.
pub fn specific_energy(state: &PolarState, env: &Configuration) -> f64 {
    0.5 * (state.dr * state.dr + state.horizontal_speed().powi(2)) - env.body.mu / state.r
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::circular_rate;

    fn hover_state(env: &Configuration) -> PolarState {
        PolarState {
            r: env.body.radius + 1_000.0,
            dr: 0.0,
            theta: 0.0,
            dtheta: 0.0,
            m: 10_000.0,
        }
    }

    #[test]
    fn circular_orbit_has_no_radial_accel() {
        let env = Configuration::default();
        let r = env.body.radius + 14_878.0;
        let s = PolarState { r, dr: 0.0, theta: 0.0, dtheta: circular_rate(&env.body, r), m: 15_000.0 };
        let d = derivatives(&s, &Actuation::default(), &env);
        assert!(d.ddr.abs() < 1e-9, "got {}", d.ddr);
        assert!(d.ddtheta.abs() < 1e-15);
        assert_eq!(d.dm, 0.0);
    }

    #[test]
    fn vertical_thrust_balances_gravity() {
        let env = Configuration::default();
        let s = hover_state(&env);
        let g = gravity_accel(&env.body, s.r);
        let act = Actuation { thrust: s.m * g, pitch: 0.0 };
        let d = derivatives(&s, &act, &env);
        assert!(d.ddr.abs() < 1e-9);
        assert!(d.dm < 0.0);
    }

    #[test]
    fn positive_pitch_accelerates_downrange() {
        let env = Configuration::default();
        let s = hover_state(&env);
        let act = Actuation { thrust: 20_000.0, pitch: 0.5 };
        let d = derivatives(&s, &act, &env);
        assert!(d.ddtheta > 0.0);
    }

    #[test]
    fn no_thrust_when_depleted() {
        let env = Configuration::default();
        let mut s = hover_state(&env);
        s.m = env.lander.dry_mass;
        let act = Actuation { thrust: env.lander.max_thrust, pitch: 0.0 };
        let d = derivatives(&s, &act, &env);
        assert_eq!(d.dm, 0.0);
        assert!((d.ddr + gravity_accel(&env.body, s.r)).abs() < 1e-12);
    }

    #[test]
    fn mass_flow_follows_rocket_equation() {
        let env = Configuration::default();
        let s = hover_state(&env);
        let act = Actuation { thrust: 45_000.0, pitch: 0.0 };
        let d = derivatives(&s, &act, &env);
        let expected = -45_000.0 / (env.lander.isp * env.g_surface);
        assert!((d.dm - expected).abs() < 1e-12);
    }
}
