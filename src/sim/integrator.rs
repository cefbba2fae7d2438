use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Configuration};
use crate::dynamics;
use crate::dynamics::state::{Actuation, PolarState};
use crate::dynamics::StateVector;
use crate::error::GncError;

// ---------------------------------------------------------------------------
// Integration discipline
// ---------------------------------------------------------------------------

/// How the plant is advanced over one control period. Actuation is held
/// constant across the period in every discipline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Integrator {
    /// Semi-implicit Euler: velocities first, positions with the new velocities.
    Euler { h: f64 },
    /// Classical 4th-order Runge-Kutta.
    Rk4 { h: f64 },
    /// Dormand-Prince 5(4) with step-size control.
    Adaptive {
        #[serde(default = "default_rtol")]
        rtol: f64,
        #[serde(default = "default_atol")]
        atol: f64,
        #[serde(default = "default_h_init")]
        h_init: f64,
    },
}

fn default_rtol() -> f64 {
    1e-9
}

fn default_atol() -> f64 {
    1e-9
}

fn default_h_init() -> f64 {
    0.01
}

impl Default for Integrator {
    fn default() -> Self {
        Integrator::Euler { h: 0.01 }
    }
}

impl Integrator {
    pub fn euler() -> Self {
        Integrator::Euler { h: 0.01 }
    }

    pub fn rk4() -> Self {
        Integrator::Rk4 { h: 0.01 }
    }

    pub fn adaptive() -> Self {
        Integrator::Adaptive { rtol: default_rtol(), atol: default_atol(), h_init: default_h_init() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Integrator::Euler { .. } => "euler",
            Integrator::Rk4 { .. } => "rk4",
            Integrator::Adaptive { .. } => "adaptive",
        }
    }

    pub fn validate(&self, dt: f64) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::Invalid { field, reason });
        match *self {
            Integrator::Euler { h } | Integrator::Rk4 { h } => {
                if !(h.is_finite() && h > 0.0 && h <= dt) {
                    return invalid("sim.integrator.h", format!("need 0 < h <= dt ({dt}), got {h}"));
                }
            }
            Integrator::Adaptive { rtol, atol, h_init } => {
                if !(rtol > 0.0 && atol > 0.0 && rtol.is_finite() && atol.is_finite()) {
                    return invalid("sim.integrator", format!("tolerances must be positive, got rtol {rtol} / atol {atol}"));
                }
                if !(h_init.is_finite() && h_init > 0.0) {
                    return invalid("sim.integrator.h_init", format!("must be positive, got {h_init}"));
                }
            }
        }
        Ok(())
    }

    /// Advance `state` by one control period `dt` under constant actuation.
    /// Stops early at the first surface contact.
    pub fn advance(
        &self,
        state: &PolarState,
        act: &Actuation,
        env: &Configuration,
        dt: f64,
    ) -> Result<Step, GncError> {
        match *self {
            Integrator::Euler { h } => Ok(fixed_steps(state, dt, h, env, |s, h| euler_step(s, act, env, h))),
            Integrator::Rk4 { h } => Ok(fixed_steps(state, dt, h, env, |s, h| rk4_step(s, act, env, h))),
            Integrator::Adaptive { rtol, atol, h_init } => {
                let tol = Tolerance { rtol, atol };
                let mut rhs = |_t: f64, y: &StateVector| {
                    dynamics::derivatives(&PolarState::from_vector(y), act, env).to_vector()
                };
                let run = integrate_adaptive(&mut rhs, 0.0, &state.to_vector(), dt, h_init.min(dt), &tol, env)?;
                Ok(Step { state: PolarState::from_vector(&run.state), contact: run.contact })
            }
        }
    }
}

/// Result of advancing one control period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: PolarState,
    /// Offset into the period at which `r` reached the body radius.
    pub contact: Option<f64>,
}

// ---------------------------------------------------------------------------
// Fixed-step disciplines
// ---------------------------------------------------------------------------

/// Mass never drops below the empty mass through integration.
fn clamp_mass(m: f64, m_prev: f64, env: &Configuration) -> f64 {
    m.max(env.lander.dry_mass.min(m_prev))
}

/// Single semi-implicit Euler step.
pub fn euler_step(state: &PolarState, act: &Actuation, env: &Configuration, h: f64) -> PolarState {
    let d = dynamics::derivatives(state, act, env);
    let dr = state.dr + d.ddr * h;
    let dtheta = state.dtheta + d.ddtheta * h;
    PolarState {
        r: state.r + dr * h,
        dr,
        theta: state.theta + dtheta * h,
        dtheta,
        m: clamp_mass(state.m + d.dm * h, state.m, env),
    }
}

/// Single RK4 step with constant actuation over the step.
pub fn rk4_step(state: &PolarState, act: &Actuation, env: &Configuration, h: f64) -> PolarState {
    let k1 = dynamics::derivatives(state, act, env);
    let k2 = dynamics::derivatives(&state.apply(&k1, h * 0.5), act, env);
    let k3 = dynamics::derivatives(&state.apply(&k2, h * 0.5), act, env);
    let k4 = dynamics::derivatives(&state.apply(&k3, h), act, env);

    let incr = (k1.to_vector() + 2.0 * k2.to_vector() + 2.0 * k3.to_vector() + k4.to_vector()) * (h / 6.0);
    let mut next = PolarState::from_vector(&(state.to_vector() + incr));
    next.m = clamp_mass(next.m, state.m, env);
    next
}

/// `n = round(dt / h)` equal substeps covering exactly `dt`. On contact
/// the state is interpolated linearly to `r = R` inside the last substep.
fn fixed_steps<F>(state: &PolarState, dt: f64, h: f64, env: &Configuration, mut step: F) -> Step
where
    F: FnMut(&PolarState, f64) -> PolarState,
{
    let n = (dt / h).round().max(1.0) as usize;
    let hs = dt / n as f64;
    let radius = env.body.radius;

    let mut current = *state;
    for i in 0..n {
        let next = step(&current, hs);
        if next.r <= radius {
            let frac = if current.r > next.r {
                ((current.r - radius) / (current.r - next.r)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let y = current.to_vector() + (next.to_vector() - current.to_vector()) * frac;
            return Step {
                state: PolarState::from_vector(&y),
                contact: Some((i as f64 + frac) * hs),
            };
        }
        current = next;
    }
    Step { state: current, contact: None }
}

// ---------------------------------------------------------------------------
// Dormand-Prince 5(4)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { rtol: default_rtol(), atol: default_atol() }
    }
}

mod dp45 {
    pub const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

    pub const A: [[f64; 6]; 7] = [
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
        [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
        [19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0, 0.0, 0.0],
        [9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0, 0.0],
        [35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0],
    ];

    // 5th-order solution weights (same as the last row of A).
    pub const B: [f64; 7] = [35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0, 0.0];

    // 4th-order embedded weights.
    pub const B_HAT: [f64; 7] = [
        5179.0 / 57600.0,
        0.0,
        7571.0 / 16695.0,
        393.0 / 640.0,
        -92097.0 / 339200.0,
        187.0 / 2100.0,
        1.0 / 40.0,
    ];
}

const MIN_STEP: f64 = 1e-12;
const SAFETY: f64 = 0.9;
const CONTACT_TOL: f64 = 1e-9; // s

/// One Dormand-Prince step. Returns the 5th-order solution and the scaled
/// RMS error estimate (accept when <= 1).
pub fn dopri_step<F>(rhs: &mut F, t: f64, y: &StateVector, h: f64, tol: &Tolerance) -> (StateVector, f64)
where
    F: FnMut(f64, &StateVector) -> StateVector,
{
    let mut k = [StateVector::zeros(); 7];
    for i in 0..7 {
        let mut yi = *y;
        for (j, kj) in k.iter().enumerate().take(i) {
            yi += *kj * (dp45::A[i][j] * h);
        }
        k[i] = rhs(t + dp45::C[i] * h, &yi);
    }

    let mut y5 = *y;
    let mut err = StateVector::zeros();
    for i in 0..7 {
        y5 += k[i] * (dp45::B[i] * h);
        err += k[i] * ((dp45::B[i] - dp45::B_HAT[i]) * h);
    }

    let norm = (0..5)
        .map(|i| {
            let scale = tol.atol + tol.rtol * y[i].abs().max(y5[i].abs());
            (err[i] / scale).powi(2)
        })
        .sum::<f64>()
        / 5.0;
    (y5, norm.sqrt())
}

/// Outcome of an adaptive integration segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveRun {
    pub t: f64,
    pub state: StateVector,
    /// Suggested first step for the next segment.
    pub h_next: f64,
    /// Absolute time of surface contact, if it happened in this segment.
    pub contact: Option<f64>,
}

/// Integrate from `t0` to `t_end` with step-size control, stopping at the
/// first `r = R` crossing. The crossing is located by bisection on the
/// length of the step that produced it.
pub fn integrate_adaptive<F>(
    rhs: &mut F,
    t0: f64,
    y0: &StateVector,
    t_end: f64,
    h_init: f64,
    tol: &Tolerance,
    env: &Configuration,
) -> Result<AdaptiveRun, GncError>
where
    F: FnMut(f64, &StateVector) -> StateVector,
{
    let radius = env.body.radius;
    let dry_mass = env.lander.dry_mass;

    let mut t = t0;
    let mut y = *y0;
    let mut h = h_init;

    while t < t_end {
        let span = t_end - t;
        let step = h.min(span);
        let (mut y_new, err) = dopri_step(rhs, t, &y, step, tol);
        if !err.is_finite() || err > 1.0 {
            let shrink = if err.is_finite() { (SAFETY * err.powf(-0.2)).max(0.2) } else { 0.2 };
            h = step * shrink;
            if h < MIN_STEP {
                return Err(GncError::invariant("step size", h));
            }
            continue;
        }

        y_new[4] = y_new[4].max(dry_mass.min(y[4]));

        if y_new[0] <= radius {
            let (dt_contact, y_contact) = bisect_contact(rhs, t, &y, step, tol, radius);
            let mut y_c = y_contact;
            y_c[4] = y_c[4].max(dry_mass.min(y[4]));
            return Ok(AdaptiveRun {
                t: t + dt_contact,
                state: y_c,
                h_next: step,
                contact: Some(t + dt_contact),
            });
        }

        let grow = if err > 0.0 { (SAFETY * err.powf(-0.2)).clamp(0.2, 5.0) } else { 5.0 };
        // A step truncated to hit t_end says nothing about the next one.
        h = if step < h { h.max(step * grow) } else { step * grow };
        t = if step >= span { t_end } else { t + step };
        y = y_new;
    }

    Ok(AdaptiveRun { t, state: y, h_next: h, contact: None })
}

fn bisect_contact<F>(
    rhs: &mut F,
    t: f64,
    y: &StateVector,
    step: f64,
    tol: &Tolerance,
    radius: f64,
) -> (f64, StateVector)
where
    F: FnMut(f64, &StateVector) -> StateVector,
{
    if y[0] <= radius {
        return (0.0, *y);
    }
    let (mut lo, mut hi) = (0.0, step);
    let mut y_hi = dopri_step(rhs, t, y, hi, tol).0;
    while hi - lo > CONTACT_TOL {
        let mid = 0.5 * (lo + hi);
        let y_mid = dopri_step(rhs, t, y, mid, tol).0;
        if y_mid[0] <= radius {
            hi = mid;
            y_hi = y_mid;
        } else {
            lo = mid;
        }
    }
    (hi, y_hi)
}
