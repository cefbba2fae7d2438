use std::io::Write;

use lander_sim::config::ConfigError;
use lander_sim::sim::integrator::Integrator;
use lander_sim::sim::{self, EventKind, Status, TelemetrySample};
use lander_sim::vehicle::apollo_braking;
use lander_sim::{load_mission, GncError, MissionFile};

fn braking_phase() -> MissionFile {
    MissionFile { scenario: apollo_braking(), ..MissionFile::default() }
}

#[test]
fn braking_phase_reaches_high_gate() {
    let mission = braking_phase();
    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let report = sim::simulate(&mission, &mut telemetry).unwrap();

    let lander = &mission.environment.lander;
    assert_eq!(report.status, Status::OutOfTime);
    assert_eq!(telemetry.len(), 5000);
    assert!(
        (report.altitude - 2_346.96).abs() < 10.0,
        "final altitude {:.1} m",
        report.altitude
    );
    let m = report.final_state.m;
    assert!(m > lander.dry_mass && m < lander.wet_mass, "final mass {}", m);

    assert!((report.vertical_speed + 44.2).abs() < 10.0, "vz {}", report.vertical_speed);

    // Never touched the ground on the way.
    assert!(telemetry.iter().all(|s| s.altitude() > 0.0));
}

#[test]
fn adaptive_integrator_reaches_high_gate() {
    let mut mission = braking_phase();
    mission.sim.integrator = Integrator::adaptive();
    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let report = sim::simulate(&mission, &mut telemetry).unwrap();

    assert_eq!(report.status, Status::OutOfTime);
    assert_eq!(telemetry.len(), 5000);
    assert!((report.altitude - 2_346.96).abs() < 10.0, "final altitude {:.1} m", report.altitude);
    assert!((report.vertical_speed + 44.2).abs() < 10.0, "vz {}", report.vertical_speed);
}

#[test]
fn limiters_hold_every_tick() {
    let mission = braking_phase();
    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    sim::simulate(&mission, &mut telemetry).unwrap();

    let lander = &mission.environment.lander;
    let step = lander.max_slew_rate * mission.sim.dt;
    for pair in telemetry.windows(2) {
        let dalpha = (pair[1].command.pitch - pair[0].command.pitch).abs();
        assert!(dalpha <= step + 1e-12, "slew {} at t={}", dalpha, pair[1].time);
    }
    for s in &telemetry {
        let pct = s.throttle(lander.max_thrust) * 100.0;
        assert!(pct >= lander.throttle.floor_percent - 1e-9);
        assert!(pct < lander.throttle.upper_percent || (pct - 100.0).abs() < 1e-9);
    }
}

#[test]
fn same_seed_same_run() {
    let mission = braking_phase();
    let mut a: Vec<TelemetrySample> = Vec::new();
    let mut b: Vec<TelemetrySample> = Vec::new();
    let ra = sim::simulate(&mission, &mut a).unwrap();
    let rb = sim::simulate(&mission, &mut b).unwrap();
    assert_eq!(a, b);
    assert_eq!(ra, rb);

    let mut other = mission.clone();
    other.sensor.seed = 7;
    other.sim.max_time = 10.0;
    let mut c: Vec<TelemetrySample> = Vec::new();
    sim::simulate(&other, &mut c).unwrap();
    assert_ne!(c[0].measured.z, a[0].measured.z);
}

#[test]
fn guided_descent_to_surface_lands() {
    let mut mission = MissionFile::default();
    let scenario = &mut mission.scenario;
    scenario.initial.altitude = 1_000.0;
    scenario.initial.vertical_speed = -20.0;
    scenario.initial.angular_rate = Some(0.0);
    scenario.initial.mass = Some(8_000.0);
    scenario.target.altitude = -50.0;
    scenario.target.vertical_speed = -5.0;
    scenario.target.travel = 0.0;
    scenario.target.horizontal_speed = 0.0;
    scenario.target.time = 60.0;
    mission.sim.max_time = 60.0;

    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let report = sim::simulate(&mission, &mut telemetry).unwrap();
    assert_eq!(report.status, Status::Landed);
    assert!(report.final_time > 40.0 && report.final_time < 60.0, "t={}", report.final_time);
    assert!(report.altitude.abs() < 1e-6);
    assert!(report.impact_velocity > 0.0);
    assert!(matches!(report.events.last().map(|e| &e.kind), Some(EventKind::Touchdown)));
    assert_eq!(telemetry.last().map(|s| s.time), Some(report.final_time));
}

#[test]
fn depleted_vehicle_coasts_without_thrust() {
    let mut mission = braking_phase();
    let dry = mission.environment.lander.dry_mass;
    mission.scenario.initial.mass = Some(dry + 5.0);
    mission.sim.max_time = 50.0;

    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let report = sim::simulate(&mission, &mut telemetry).unwrap();

    let depleted_at = report
        .events
        .iter()
        .find(|e| e.kind == EventKind::PropellantDepleted)
        .map(|e| e.time)
        .unwrap();
    assert!(depleted_at < 1.0);

    for s in &telemetry {
        assert!(s.truth.m >= dry, "mass {} below empty", s.truth.m);
    }
    // Commands issued once the vehicle is dry at the start of the tick.
    for pair in telemetry.windows(2) {
        if pair[0].truth.m <= dry {
            assert_eq!(pair[1].command.thrust, 0.0);
            assert_eq!(pair[1].command.pitch, 0.0);
        }
    }
    assert_eq!(report.final_state.m, dry);
    assert_eq!(report.remaining_propellant, 0.0);
}

#[test]
fn mission_file_overrides_only_what_it_names() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[sim]
dt = 0.2
max_time = 4.0

[sim.integrator]
kind = "rk4"
h = 0.05

[sensor]
seed = 11
filter_tau = 1.5

[guidance]
mode = "one-shot"
"#
    )
    .unwrap();

    let mission = load_mission(file.path()).unwrap();
    assert_eq!(mission.sim.dt, 0.2);
    assert_eq!(mission.sensor.seed, 11);
    assert_eq!(mission.environment, MissionFile::default().environment);
    assert_eq!(mission.scenario, MissionFile::default().scenario);

    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let report = sim::simulate(&mission, &mut telemetry).unwrap();
    assert_eq!(telemetry.len(), 20);
    assert_eq!(report.status, Status::OutOfTime);
}

#[test]
fn negative_max_thrust_rejected_before_any_tick() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[environment.lander]\nmax_thrust = -45000.0").unwrap();

    match load_mission(file.path()) {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "lander.max_thrust"),
        other => panic!("expected invalid max_thrust, got {:?}", other),
    }

    let mut mission = MissionFile::default();
    mission.environment.lander.max_thrust = -45_000.0;
    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let err = sim::simulate(&mission, &mut telemetry).unwrap_err();
    assert!(matches!(err, GncError::Config(_)));
    assert!(telemetry.is_empty());
}

#[test]
fn start_below_empty_mass_rejected_before_any_tick() {
    let mut mission = braking_phase();
    mission.scenario.initial.mass = Some(100.0);
    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let err = sim::simulate(&mission, &mut telemetry).unwrap_err();
    assert!(matches!(
        err,
        GncError::Config(ConfigError::Invalid { field: "scenario.initial.mass", .. })
    ));
    assert!(telemetry.is_empty());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_mission(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
