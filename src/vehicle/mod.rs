pub mod lander;
pub mod mission;

pub use lander::{presets, Lander, LanderBuilder};
pub use mission::presets::apollo_braking;
pub use mission::{InitialConditions, Scenario, TargetConditions};
