use crate::config::Configuration;
use crate::dynamics::{ControlCommand, LvlhState};
use crate::error::GncError;
use super::control_law::control_law;
use super::controller::{Controller, GncOutput};
use super::guidance::{DescentTarget, Guidance, GuidanceConfig};
use super::limiter::{propellant_guard, SlewLimiter};

// ---------------------------------------------------------------------------
// Descent controller: guidance + control law + actuator limiters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DescentController {
    pub guidance: Guidance,
    pub slew: SlewLimiter,
    initial_pitch: Option<f64>,
}

impl DescentController {
    pub fn new(
        guidance: GuidanceConfig,
        target: DescentTarget,
        max_slew_rate: f64,
        initial_pitch: Option<f64>,
    ) -> Self {
        Self {
            guidance: Guidance::new(guidance, target),
            slew: Self::limiter(max_slew_rate, initial_pitch),
            initial_pitch,
        }
    }

    fn limiter(max_slew_rate: f64, initial_pitch: Option<f64>) -> SlewLimiter {
        match initial_pitch {
            Some(pitch) => SlewLimiter::new(max_slew_rate, pitch),
            None => SlewLimiter::unprimed(max_slew_rate),
        }
    }

    /// measure -> guide -> control -> limit, for an already measured state.
    pub fn update(
        &mut self,
        nav: &LvlhState,
        env: &Configuration,
        elapsed: f64,
        dt: f64,
    ) -> Result<GncOutput, GncError> {
        let lander = &env.lander;
        let target = self.guidance.update(nav, elapsed)?;
        let (thrust_cmd, pitch_cmd) = control_law(nav, &target, env);
        if !thrust_cmd.is_finite() {
            return Err(GncError::invariant("thrust_cmd", thrust_cmd));
        }
        if !pitch_cmd.is_finite() {
            return Err(GncError::invariant("pitch_cmd", pitch_cmd));
        }

        let mut command = ControlCommand {
            thrust_cmd,
            pitch_cmd,
            thrust: lander.throttle.limit(thrust_cmd, lander.max_thrust),
            pitch: self.slew.update(pitch_cmd, dt),
        };

        if propellant_guard(&mut command, nav.m, lander) {
            self.slew.force(command.pitch);
        }

        Ok(GncOutput { target, command })
    }

    pub fn reset(&mut self) {
        self.guidance.reset();
        self.slew = Self::limiter(self.slew.max_rate, self.initial_pitch);
    }
}

impl Controller for DescentController {
    fn control(
        &mut self,
        nav: &LvlhState,
        env: &Configuration,
        elapsed: f64,
        dt: f64,
    ) -> Result<GncOutput, GncError> {
        self.update(nav, env, elapsed, dt)
    }

    fn reset(&mut self) {
        DescentController::reset(self);
    }

    fn name(&self) -> &str {
        "DescentController"
    }
}
