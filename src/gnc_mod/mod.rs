pub mod control_law;
pub mod controller;
pub mod descent;
pub mod guidance;
pub mod limiter;
pub mod navigation;
pub mod sensor;

pub use control_law::control_law;
pub use controller::{Controller, GncOutput};
pub use descent::DescentController;
pub use guidance::{poly_guidance, BoundaryValue, CubicProfile, DescentTarget, Guidance, GuidanceConfig, GuidanceMode, TargetAccel};
pub use limiter::{propellant_guard, SlewLimiter, ThrottleEnvelope};
pub use navigation::Navigation;
pub use sensor::{Altimeter, LowPassFilter, SensorConfig};
