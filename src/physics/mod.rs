pub mod body;
pub mod gravity;

pub use body::Body;
pub use gravity::{circular_rate, gravity_accel, G_EARTH, G_UNIVERSAL};
