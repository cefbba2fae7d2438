use serde::Serialize;

use crate::config::Configuration;
use crate::dynamics::state::PolarState;
use crate::dynamics::to_lvlh;
use crate::gnc::DescentTarget;
use super::event::SimEvent;

/// Terminal status of a closed-loop run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Surface contact.
    Landed,
    /// Horizon reached without contact.
    OutOfTime,
    /// A numeric fault stopped the loop; the report holds the last valid state.
    Halted { reason: String },
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Landed => write!(f, "LANDED"),
            Status::OutOfTime => write!(f, "OUT_OF_TIME"),
            Status::Halted { reason } => write!(f, "HALTED ({})", reason),
        }
    }
}

/// Final state plus derived landing metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionReport {
    pub status: Status,
    pub final_time: f64,
    pub final_state: PolarState,
    pub altitude: f64,
    pub vertical_speed: f64,
    pub horizontal_speed: f64,
    pub impact_velocity: f64,
    pub altitude_error: f64,
    pub miss_distance: f64,
    pub remaining_propellant: f64,
    pub propellant_consumed: f64,
    pub delta_v: f64,
    pub events: Vec<SimEvent>,
}

impl MissionReport {
    pub fn from_run(
        status: Status,
        final_time: f64,
        initial: &PolarState,
        final_state: &PolarState,
        target: &DescentTarget,
        env: &Configuration,
        events: Vec<SimEvent>,
    ) -> Self {
        let lvlh = to_lvlh(final_state, &env.body);
        let lander = &env.lander;
        Self {
            status,
            final_time,
            final_state: *final_state,
            altitude: lvlh.z,
            vertical_speed: final_state.dr,
            horizontal_speed: final_state.horizontal_speed(),
            impact_velocity: final_state.speed(),
            altitude_error: lvlh.z - target.altitude,
            miss_distance: lvlh.x - target.downrange,
            remaining_propellant: (final_state.m - lander.dry_mass).max(0.0),
            propellant_consumed: initial.m - final_state.m,
            delta_v: lander.delta_v(initial.m, final_state.m, env.g_surface),
            events,
        }
    }

    pub fn landed(&self) -> bool {
        self.status == Status::Landed
    }
}
