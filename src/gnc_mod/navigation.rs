use crate::dynamics::state::PolarState;
use crate::dynamics::{to_lvlh, LvlhState};
use crate::gnc::sensor::{Altimeter, LowPassFilter, SensorConfig};
use crate::physics::Body;

// ---------------------------------------------------------------------------
// Navigation: true polar state -> measured LVLH state
// ---------------------------------------------------------------------------

/// Projects the true state into LVLH and corrupts altitude through the
/// altimeter (and optional smoother). Velocity, downrange and mass pass
/// through untouched.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub body: Body,
    altimeter: Altimeter,
    filter: Option<LowPassFilter>,
}

impl Navigation {
    pub fn new(body: Body, sensor: &SensorConfig, dt: f64) -> Self {
        Self {
            body,
            altimeter: Altimeter::new(sensor),
            filter: sensor.filter_tau.map(|tau| LowPassFilter::new(dt, tau)),
        }
    }

    /// Noise-free projection.
    pub fn truth(&self, state: &PolarState) -> LvlhState {
        to_lvlh(state, &self.body)
    }

    /// Measured state for this tick.
    pub fn measure(&mut self, state: &PolarState) -> LvlhState {
        let truth = self.truth(state);
        let raw = self.altimeter.measure(truth.z);
        let z = match self.filter.as_mut() {
            Some(filter) => filter.filter(raw),
            None => raw,
        };
        LvlhState { z, ..truth }
    }
}
