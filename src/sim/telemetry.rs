use serde::Serialize;

use crate::dynamics::state::PolarState;
use crate::dynamics::{ControlCommand, LvlhState};
use crate::gnc::TargetAccel;

/// Everything observable about one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    pub time: f64,
    /// True state after integrating the tick.
    pub truth: PolarState,
    pub truth_lvlh: LvlhState,
    /// Navigation output the controller acted on.
    pub measured: LvlhState,
    pub command: ControlCommand,
    pub target: TargetAccel,
}

impl TelemetrySample {
    pub fn altitude(&self) -> f64 {
        self.truth_lvlh.z
    }

    /// Engine setting as a fraction of full thrust.
    pub fn throttle(&self, max_thrust: f64) -> f64 {
        self.command.thrust / max_thrust
    }
}

/// Receives one sample per tick. The runner never reads back from it.
pub trait TelemetrySink {
    fn record(&mut self, sample: &TelemetrySample);
}

impl TelemetrySink for Vec<TelemetrySample> {
    fn record(&mut self, sample: &TelemetrySample) {
        self.push(*sample);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&mut self, _sample: &TelemetrySample) {}
}
