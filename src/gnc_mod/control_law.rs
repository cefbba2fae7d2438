use crate::config::Configuration;
use crate::dynamics::{angular_rate, LvlhState};
use crate::gnc::guidance::TargetAccel;

/// Convert commanded LVLH accelerations into a required thrust magnitude
/// and pitch angle, cancelling gravity and the centrifugal / Coriolis terms
/// of the curved frame.
///
/// Returns `(T_cmd, alpha_cmd)`; `(0, 0)` once the vehicle is at empty mass.
pub fn control_law(
    nav: &LvlhState,
    accel: &TargetAccel,
    env: &Configuration,
) -> (f64, f64) {
    if env.lander.is_depleted(nav.m) {
        return (0.0, 0.0);
    }

    let r = env.body.radius + nav.z;
    let dtheta = angular_rate(nav, &env.body);

    let tz = accel.vertical + env.body.mu / (r * r) - r * dtheta * dtheta;
    let tx = accel.horizontal + 2.0 * nav.dz * dtheta;

    (nav.m * tz.hypot(tx), tx.atan2(tz))
}
