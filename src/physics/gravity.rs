use super::body::Body;

pub const G_UNIVERSAL: f64 = 6.674_08e-11; // m^3/(kg s^2)
pub const G_EARTH: f64 = 9.81; // reference gravity for Isp, m/s^2

/// Inverse-square gravity magnitude at radius `r` (pointing to the body center).
pub fn gravity_accel(body: &Body, r: f64) -> f64 {
    body.mu / (r * r)
}

/// Angular rate of a circular orbit at radius `r`, rad/s.
pub fn circular_rate(body: &Body, r: f64) -> f64 {
    (body.mu / r.powi(3)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_decreases_with_altitude() {
        let moon = Body::moon();
        let g0 = gravity_accel(&moon, moon.radius);
        let g15k = gravity_accel(&moon, moon.radius + 15_000.0);
        assert!(g15k < g0);
    }

    #[test]
    fn circular_rate_balances_gravity() {
        let moon = Body::moon();
        let r = moon.radius + 14_878.0;
        let w = circular_rate(&moon, r);
        assert!((r * w * w - moon.mu / (r * r)).abs() < 1e-9);
    }
}
