use std::cell::RefCell;

use crate::config::{Configuration, MissionFile};
use crate::dynamics;
use crate::dynamics::state::{Actuation, PolarState};
use crate::dynamics::{to_lvlh, StateVector};
use crate::error::GncError;
use crate::gnc::{control_law, DescentTarget, Guidance, GuidanceConfig};
use super::integrator::{integrate_adaptive, Tolerance};

// ---------------------------------------------------------------------------
// Continuous open-loop propagation
// ---------------------------------------------------------------------------

/// Output of an open-loop study.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenLoopRun {
    /// `(t, state)` at every output time, plus the contact point if any.
    pub samples: Vec<(f64, PolarState)>,
    pub contact: Option<f64>,
}

impl OpenLoopRun {
    pub fn final_state(&self) -> Option<&PolarState> {
        self.samples.last().map(|(_, s)| s)
    }
}

/// Integrate an arbitrary actuation law from `initial` until `t_end` or
/// surface contact, sampling every `output_interval` seconds.
///
/// The law is evaluated inside every integrator stage, so it acts as a
/// continuous-time command with no sensor, slew or tick structure.
pub fn propagate<L>(
    env: &Configuration,
    initial: &PolarState,
    mut law: L,
    t_end: f64,
    output_interval: f64,
    tol: &Tolerance,
) -> Result<OpenLoopRun, GncError>
where
    L: FnMut(f64, &PolarState) -> Result<Actuation, GncError>,
{
    initial.validate()?;
    if !(output_interval > 0.0 && output_interval.is_finite()) {
        return Err(GncError::invariant("output_interval", output_interval));
    }

    let fault: RefCell<Option<GncError>> = RefCell::new(None);
    let mut rhs = |t: f64, y: &StateVector| {
        let s = PolarState::from_vector(y);
        let act = match law(t, &s) {
            Ok(act) => act,
            Err(e) => {
                fault.borrow_mut().get_or_insert(e);
                Actuation::default()
            }
        };
        dynamics::derivatives(&s, &act, env).to_vector()
    };

    let mut samples = vec![(0.0, *initial)];
    let mut y = initial.to_vector();
    let mut t = 0.0;
    let mut h = output_interval.min(0.01);
    let mut k = 0_u64;

    while t < t_end {
        k += 1;
        let t_next = (k as f64 * output_interval).min(t_end);
        let run = integrate_adaptive(&mut rhs, t, &y, t_next, h, tol, env)?;
        if let Some(e) = fault.borrow_mut().take() {
            return Err(e);
        }

        let state = PolarState::from_vector(&run.state);
        state.validate()?;
        samples.push((run.t, state));

        if run.contact.is_some() {
            return Ok(OpenLoopRun { samples, contact: run.contact });
        }
        t = run.t;
        y = run.state;
        h = run.h_next;
    }

    Ok(OpenLoopRun { samples, contact: None })
}

/// Continuous guidance law: the cubic target is re-solved from the exact
/// state and the throttle envelope applied, with no slew limit.
pub fn guided_law(
    env: &Configuration,
    guidance: GuidanceConfig,
    target: DescentTarget,
) -> impl FnMut(f64, &PolarState) -> Result<Actuation, GncError> + '_ {
    let mut guidance = Guidance::new(guidance, target);
    move |t: f64, state: &PolarState| {
        let nav = to_lvlh(state, &env.body);
        let accel = guidance.update(&nav, t)?;
        let (thrust_cmd, pitch) = control_law(&nav, &accel, env);
        let lander = &env.lander;
        let thrust = if lander.is_depleted(state.m) {
            0.0
        } else {
            lander.throttle.limit(thrust_cmd, lander.max_thrust)
        };
        Ok(Actuation { thrust, pitch })
    }
}

/// Open-loop study of a mission file: guided law, sampled at the control
/// period, until the horizon or contact.
pub fn study(mission: &MissionFile) -> Result<OpenLoopRun, GncError> {
    mission.validate()?;
    let env = &mission.environment;
    let target = mission.scenario.descent_target(env);
    let law = guided_law(env, mission.guidance.clone(), target);
    propagate(
        env,
        &mission.scenario.initial_state(env),
        law,
        mission.sim.max_time,
        mission.sim.dt,
        &Tolerance::default(),
    )
}
