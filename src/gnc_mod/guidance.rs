use nalgebra::{Matrix4, Vector4};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::dynamics::LvlhState;
use crate::error::GncError;

/// Horizons at or below this are treated as zero.
const MIN_HORIZON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Cubic boundary-value problem (one translational axis)
// ---------------------------------------------------------------------------

/// Boundary conditions for one axis: f(0), f(tf), f'(0), f'(tf), tf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryValue {
    pub start: f64,
    pub end: f64,
    pub start_rate: f64,
    pub end_rate: f64,
    pub time_to_go: f64,
}

/// f(t) = a t^3 + b t^2 + c t + d
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicProfile {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CubicProfile {
    /// Solve the 4x4 boundary system. Fails for a zero/negative horizon,
    /// where the constraint matrix is singular.
    pub fn solve(bv: &BoundaryValue) -> Result<Self, GncError> {
        let tf = bv.time_to_go;
        // Also rejects NaN.
        if !(tf > MIN_HORIZON) {
            return Err(GncError::InvalidTimeHorizon { time_to_go: tf });
        }

        let tf2 = tf * tf;
        #[rustfmt::skip]
        let a_mat = Matrix4::new(
            0.0,       0.0,      0.0, 1.0,
            tf2 * tf,  tf2,      tf,  1.0,
            0.0,       0.0,      1.0, 0.0,
            3.0 * tf2, 2.0 * tf, 1.0, 0.0,
        );
        let b_vec = Vector4::new(bv.start, bv.end, bv.start_rate, bv.end_rate);

        let coeffs = a_mat
            .lu()
            .solve(&b_vec)
            .ok_or(GncError::InvalidTimeHorizon { time_to_go: tf })?;

        Ok(Self { a: coeffs[0], b: coeffs[1], c: coeffs[2], d: coeffs[3] })
    }

    pub fn position(&self, t: f64) -> f64 {
        ((self.a * t + self.b) * t + self.c) * t + self.d
    }

    pub fn velocity(&self, t: f64) -> f64 {
        (3.0 * self.a * t + 2.0 * self.b) * t + self.c
    }

    pub fn acceleration(&self, t: f64) -> f64 {
        6.0 * self.a * t + 2.0 * self.b
    }

    /// (f, f', f'') at `t`.
    pub fn evaluate(&self, t: f64) -> (f64, f64, f64) {
        (self.position(t), self.velocity(t), self.acceleration(t))
    }
}

/// Reference position, velocity and acceleration at `t` for a cubic
/// trajectory meeting the given boundary conditions.
pub fn poly_guidance(t: f64, bv: &BoundaryValue) -> Result<(f64, f64, f64), GncError> {
    Ok(CubicProfile::solve(bv)?.evaluate(t))
}

// ---------------------------------------------------------------------------
// Descent guidance (both axes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuidanceMode {
    /// Re-solve from the current state every tick.
    #[default]
    RecedingHorizon,
    /// Solve once at the first call and replay the profile.
    OneShot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    pub mode: GuidanceMode,
    /// Time-to-go floor, s.
    pub min_time_to_go: f64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self { mode: GuidanceMode::default(), min_time_to_go: 1e-3 }
    }
}

impl GuidanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_time_to_go.is_finite() && self.min_time_to_go > MIN_HORIZON {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                field: "guidance.min_time_to_go",
                reason: format!("must be a positive horizon, got {}", self.min_time_to_go),
            })
        }
    }
}

/// Terminal conditions in LVLH coordinates, reached at `time` after ignition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescentTarget {
    pub altitude: f64,         // m
    pub vertical_speed: f64,   // m/s, up positive
    pub downrange: f64,        // m, absolute
    pub horizontal_speed: f64, // m/s
    pub time: f64,             // s, total horizon tf
}

/// Commanded accelerations in the local vertical / horizontal frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetAccel {
    pub vertical: f64,   // m/s^2
    pub horizontal: f64, // m/s^2
}

#[derive(Debug, Clone, Copy)]
struct Plan {
    start: f64,
    vertical: CubicProfile,
    horizontal: CubicProfile,
}

#[derive(Debug, Clone)]
pub struct Guidance {
    pub config: GuidanceConfig,
    pub target: DescentTarget,
    plan: Option<Plan>,
}

impl Guidance {
    pub fn new(config: GuidanceConfig, target: DescentTarget) -> Self {
        Self { config, target, plan: None }
    }

    /// Remaining time, floored so the boundary system never degenerates.
    pub fn time_to_go(&self, elapsed: f64) -> f64 {
        (self.target.time - elapsed).max(self.config.min_time_to_go)
    }

    fn solve_axes(&self, nav: &LvlhState, tgo: f64) -> Result<(CubicProfile, CubicProfile), GncError> {
        let vertical = CubicProfile::solve(&BoundaryValue {
            start: nav.z,
            end: self.target.altitude,
            start_rate: nav.dz,
            end_rate: self.target.vertical_speed,
            time_to_go: tgo,
        })?;
        let horizontal = CubicProfile::solve(&BoundaryValue {
            start: nav.x,
            end: self.target.downrange,
            start_rate: nav.dx,
            end_rate: self.target.horizontal_speed,
            time_to_go: tgo,
        })?;
        Ok((vertical, horizontal))
    }

    /// Target accelerations for the current (measured) state.
    pub fn update(&mut self, nav: &LvlhState, elapsed: f64) -> Result<TargetAccel, GncError> {
        let tgo = self.time_to_go(elapsed);
        match self.config.mode {
            GuidanceMode::RecedingHorizon => {
                let (vertical, horizontal) = self.solve_axes(nav, tgo)?;
                Ok(TargetAccel {
                    vertical: vertical.acceleration(0.0),
                    horizontal: horizontal.acceleration(0.0),
                })
            }
            GuidanceMode::OneShot => {
                let plan = match self.plan {
                    Some(plan) => plan,
                    None => {
                        let (vertical, horizontal) = self.solve_axes(nav, tgo)?;
                        let plan = Plan { start: elapsed, vertical, horizontal };
                        self.plan = Some(plan);
                        plan
                    }
                };
                let t = elapsed - plan.start;
                Ok(TargetAccel {
                    vertical: plan.vertical.acceleration(t),
                    horizontal: plan.horizontal.acceleration(t),
                })
            }
        }
    }

    pub fn reset(&mut self) {
        self.plan = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, scale: f64) -> bool {
        (a - b).abs() <= 1e-9 * scale.max(1.0)
    }

    #[test]
    fn profile_meets_boundary_conditions() {
        let cases = [
            (14_878.0, 2_346.96, -1.22, -44.2, 500.0),
            (1.2e6, 1.6e6, 1_673.0, 44.2, 500.0),
            (0.0, 10.0, 0.0, 0.0, 1.0),
            (-5.0, 5.0, 3.0, -3.0, 0.01),
            (100.0, 100.0, 0.0, 0.0, 1_000.0),
        ];
        for (p0, pf, v0, vf, tf) in cases {
            let bv = BoundaryValue { start: p0, end: pf, start_rate: v0, end_rate: vf, time_to_go: tf };
            let f = CubicProfile::solve(&bv).unwrap();
            let scale = p0.abs().max(pf.abs());
            assert!(close(f.position(0.0), p0, scale), "f(0) for {:?}", bv);
            assert!(close(f.position(tf), pf, scale), "f(tf) for {:?}: {}", bv, f.position(tf));
            assert!(close(f.velocity(0.0), v0, scale / tf), "f'(0) for {:?}", bv);
            assert!(close(f.velocity(tf), vf, scale / tf), "f'(tf) for {:?}", bv);
        }
    }

    #[test]
    fn acceleration_matches_closed_form() {
        // f''(0) = 2b = 2 (3 (pf - p0) - (2 v0 + vf) tf) / tf^2
        let bv = BoundaryValue { start: 14_878.0, end: 2_346.96, start_rate: -1.22, end_rate: -44.2, time_to_go: 500.0 };
        let (_, _, ddf) = poly_guidance(0.0, &bv).unwrap();
        let expected = 2.0 * (3.0 * (2_346.96 - 14_878.0) - (2.0 * -1.22 - 44.2) * 500.0) / 250_000.0;
        assert!((ddf - expected).abs() < 1e-6, "{} vs {}", ddf, expected);
    }

    #[test]
    fn zero_horizon_is_rejected() {
        for tf in [0.0, -1.0, 1e-12, f64::NAN] {
            let bv = BoundaryValue { start: 0.0, end: 1.0, start_rate: 0.0, end_rate: 0.0, time_to_go: tf };
            assert!(matches!(
                CubicProfile::solve(&bv),
                Err(GncError::InvalidTimeHorizon { .. })
            ));
        }
    }

    fn target() -> DescentTarget {
        DescentTarget {
            altitude: 2_346.96,
            vertical_speed: -44.2,
            downrange: 1_600_000.0,
            horizontal_speed: 44.2,
            time: 500.0,
        }
    }

    fn nav() -> LvlhState {
        LvlhState { z: 14_878.0, dz: -1.22, x: 1_200_000.0, dx: 1_673.0, m: 15_240.0 }
    }

    #[test]
    fn time_to_go_is_floored() {
        let g = Guidance::new(GuidanceConfig::default(), target());
        assert_eq!(g.time_to_go(100.0), 400.0);
        assert_eq!(g.time_to_go(500.0), 1e-3);
        assert_eq!(g.time_to_go(700.0), 1e-3);
    }

    #[test]
    fn guidance_past_horizon_still_solves() {
        let mut g = Guidance::new(GuidanceConfig::default(), target());
        let accel = g.update(&nav(), 500.0).unwrap();
        assert!(accel.vertical.is_finite() && accel.horizontal.is_finite());
    }

    #[test]
    fn braking_commands_deceleration() {
        let mut g = Guidance::new(GuidanceConfig::default(), target());
        let accel = g.update(&nav(), 0.0).unwrap();
        assert!(accel.horizontal < 0.0, "should brake, got {}", accel.horizontal);
        assert!(accel.vertical < 0.0, "should start descending, got {}", accel.vertical);
    }

    #[test]
    fn one_shot_and_receding_agree_on_first_call() {
        let mut receding = Guidance::new(GuidanceConfig::default(), target());
        let mut one_shot = Guidance::new(
            GuidanceConfig { mode: GuidanceMode::OneShot, ..GuidanceConfig::default() },
            target(),
        );
        let a = receding.update(&nav(), 0.0).unwrap();
        let b = one_shot.update(&nav(), 0.0).unwrap();
        assert!((a.vertical - b.vertical).abs() < 1e-12);
        assert!((a.horizontal - b.horizontal).abs() < 1e-12);
    }

    #[test]
    fn one_shot_replays_the_first_plan() {
        let mut g = Guidance::new(
            GuidanceConfig { mode: GuidanceMode::OneShot, ..GuidanceConfig::default() },
            target(),
        );
        let first = g.update(&nav(), 0.0).unwrap();
        // A wildly different state must not change the replayed profile.
        let mut other = nav();
        other.z += 5_000.0;
        let later = g.update(&other, 10.0).unwrap();
        let plan = g.plan.as_ref().unwrap();
        assert!((later.vertical - plan.vertical.acceleration(10.0)).abs() < 1e-12);
        assert!((first.vertical - plan.vertical.acceleration(0.0)).abs() < 1e-12);

        g.reset();
        assert!(g.plan.is_none());
    }
}
