pub mod error;
pub mod config;
pub mod physics;
pub mod dynamics;
pub mod vehicle;
mod gnc_mod;
pub mod sim;
pub mod io;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use config::{load_mission, parse_mission, ConfigError, Configuration, MissionFile, SimConfig};
pub use error::GncError;

pub mod types {
    pub use crate::dynamics::state::{Actuation, ControlCommand, Deriv, LvlhState, PolarState, StateVector};
    pub use crate::physics::{Body, G_EARTH};
    pub use crate::vehicle::{Lander, Scenario};
}
