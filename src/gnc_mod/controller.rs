use crate::config::Configuration;
use crate::dynamics::{ControlCommand, LvlhState};
use crate::error::GncError;
use crate::gnc::guidance::TargetAccel;

/// What a controller hands back each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GncOutput {
    pub target: TargetAccel,
    pub command: ControlCommand,
}

/// Trait for descent controllers.
///
/// Implement this to plug a custom guidance/control scheme into the
/// simulation loop. Controllers only ever see the *measured* state.
pub trait Controller {
    /// Compute the feasible command for this tick.
    fn control(
        &mut self,
        nav: &LvlhState,
        env: &Configuration,
        elapsed: f64,
        dt: f64,
    ) -> Result<GncOutput, GncError>;

    /// Reset controller internal state (limiter memory, cached plans).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
