use log::{debug, info, warn};

use crate::config::MissionFile;
use crate::error::GncError;
use crate::gnc::{propellant_guard, Controller, DescentController, Navigation};
use super::event::{AltitudeDetector, DepletionDetector, EventDetector, EventKind, SimEvent};
use super::report::{MissionReport, Status};
use super::telemetry::{NullSink, TelemetrySample, TelemetrySink};

// ---------------------------------------------------------------------------
// Default controller wiring
// ---------------------------------------------------------------------------

/// The guidance / control / limiter chain configured by a mission file.
pub fn descent_controller(mission: &MissionFile) -> DescentController {
    let env = &mission.environment;
    DescentController::new(
        mission.guidance.clone(),
        mission.scenario.descent_target(env),
        env.lander.max_slew_rate,
        mission.sim.initial_pitch,
    )
}

// ---------------------------------------------------------------------------
// Closed-loop simulation
// ---------------------------------------------------------------------------

/// Run one closed-loop descent with a custom controller.
///
/// Setup problems (invalid configuration, invalid initial state) are
/// returned as errors before the first tick. Faults inside the loop stop
/// it with [`Status::Halted`] and the last valid state.
pub fn simulate_with(
    mission: &MissionFile,
    controller: &mut dyn Controller,
    sink: &mut dyn TelemetrySink,
) -> Result<MissionReport, GncError> {
    mission.validate()?;

    let env = &mission.environment;
    let sim = &mission.sim;

    let initial = mission.scenario.initial_state(env);
    initial.validate()?;
    let target = mission.scenario.descent_target(env);

    let mut nav = Navigation::new(env.body, &mission.sensor, sim.dt);
    let mut detectors: Vec<Box<dyn EventDetector>> = vec![
        Box::new(DepletionDetector::new(env.lander.dry_mass)),
        Box::new(AltitudeDetector::new(env.body, target.altitude)),
    ];
    let mut events = vec![SimEvent { time: 0.0, kind: EventKind::Ignition, state: initial }];

    info!(
        "Starting descent: controller={}, integrator={}, dt={} s, horizon={} s, seed={}",
        controller.name(),
        sim.integrator.name(),
        sim.dt,
        sim.max_time,
        mission.sensor.seed
    );
    debug!("Initial state: {:?}", initial);
    debug!("Target: {:?}", target);

    controller.reset();

    let mut state = initial;
    let mut time = 0.0;
    let mut status = Status::OutOfTime;
    let max_ticks = sim.max_ticks();

    for k in 0..max_ticks {
        let t = k as f64 * sim.dt;

        // Navigation
        let measured = nav.measure(&state);

        // Guidance + control + limiters
        let out = match controller.control(&measured, env, t, sim.dt) {
            Ok(out) => out,
            Err(e) => {
                status = Status::Halted { reason: e.to_string() };
                break;
            }
        };

        // The guard sees true mass whatever the controller did.
        let mut command = out.command;
        propellant_guard(&mut command, state.m, &env.lander);

        // Integrate
        let step = match sim
            .integrator
            .advance(&state, &command.actuation(), env, sim.dt)
            .and_then(|step| step.state.validate().map(|()| step))
        {
            Ok(step) => step,
            Err(e) => {
                status = Status::Halted { reason: e.to_string() };
                break;
            }
        };

        let next = step.state;
        let t_next = match step.contact {
            Some(offset) => t + offset,
            None => (k + 1) as f64 * sim.dt,
        };

        sink.record(&TelemetrySample {
            time: t_next,
            truth: next,
            truth_lvlh: nav.truth(&next),
            measured,
            command,
            target: out.target,
        });

        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&state, &next) {
                events.push(SimEvent { time: t_next, kind, state: next });
            }
        }

        state = next;
        time = t_next;

        // Surface contact
        if step.contact.is_some() {
            events.push(SimEvent { time, kind: EventKind::Touchdown, state });
            status = Status::Landed;
            break;
        }
    }

    match &status {
        Status::Halted { reason } => warn!("Descent halted at t={:.2} s: {}", time, reason),
        _ => info!("Descent finished: {} at t={:.2} s", status, time),
    }
    for event in &events {
        info!("  event t={:8.2} s  {}", event.time, event.kind);
    }

    Ok(MissionReport::from_run(
        status,
        time,
        &initial,
        &state,
        &target,
        env,
        events,
    ))
}

/// Simulate with the default DescentController (convenience wrapper).
pub fn simulate(
    mission: &MissionFile,
    sink: &mut dyn TelemetrySink,
) -> Result<MissionReport, GncError> {
    let mut controller = descent_controller(mission);
    simulate_with(mission, &mut controller, sink)
}

/// Run without keeping telemetry.
pub fn simulate_report(mission: &MissionFile) -> Result<MissionReport, GncError> {
    simulate(mission, &mut NullSink)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, Configuration};
    use crate::dynamics::LvlhState;
    use crate::gnc::GncOutput;

    fn short_mission(max_time: f64) -> MissionFile {
        let mut mission = MissionFile::default();
        mission.sim.max_time = max_time;
        mission
    }

    #[test]
    fn records_one_sample_per_tick() {
        let mission = short_mission(5.0);
        let mut samples: Vec<TelemetrySample> = Vec::new();
        let report = simulate(&mission, &mut samples).unwrap();
        assert_eq!(samples.len(), 50);
        assert_eq!(report.status, Status::OutOfTime);
        assert!((samples[0].time - 0.1).abs() < 1e-12);
        assert!((report.final_time - 5.0).abs() < 1e-9);
    }

    #[test]
    fn elapsed_time_is_tick_index_times_period() {
        let mission = short_mission(20.0);
        let mut samples: Vec<TelemetrySample> = Vec::new();
        simulate(&mission, &mut samples).unwrap();
        for (k, s) in samples.iter().enumerate() {
            assert_eq!(s.time, (k + 1) as f64 * 0.1);
        }
    }

    #[test]
    fn invalid_environment_fails_before_first_tick() {
        let mut mission = short_mission(5.0);
        mission.environment.lander.max_thrust = -1.0;
        let mut samples: Vec<TelemetrySample> = Vec::new();
        let err = simulate(&mission, &mut samples).unwrap_err();
        assert!(matches!(err, GncError::Config(ConfigError::Invalid { field: "lander.max_thrust", .. })));
        assert!(samples.is_empty());
    }

    struct Faulty;

    impl Controller for Faulty {
        fn control(
            &mut self,
            _nav: &LvlhState,
            _env: &Configuration,
            elapsed: f64,
            _dt: f64,
        ) -> Result<GncOutput, GncError> {
            if elapsed >= 1.0 {
                Err(GncError::InvalidTimeHorizon { time_to_go: 0.0 })
            } else {
                Ok(GncOutput::default())
            }
        }
    }

    #[test]
    fn controller_fault_halts_with_last_state() {
        let mission = short_mission(5.0);
        let mut samples: Vec<TelemetrySample> = Vec::new();
        let report = simulate_with(&mission, &mut Faulty, &mut samples).unwrap();
        assert!(matches!(report.status, Status::Halted { .. }));
        assert_eq!(samples.len(), 10);
        assert_eq!(report.final_state, samples[9].truth);
    }

    #[test]
    fn unpowered_drop_lands() {
        let mut mission = short_mission(60.0);
        mission.scenario.initial.altitude = 100.0;
        mission.scenario.initial.vertical_speed = 0.0;
        mission.scenario.initial.angular_rate = Some(0.0);
        let mut samples: Vec<TelemetrySample> = Vec::new();
        let report = simulate_with(&mission, &mut Coast, &mut samples).unwrap();
        assert!(report.landed());
        assert_eq!(report.final_state, samples.last().unwrap().truth);
        assert!(report.altitude.abs() < 1e-6);
        assert!(matches!(report.events.last().map(|e| &e.kind), Some(EventKind::Touchdown)));
    }

    struct Coast;

    impl Controller for Coast {
        fn control(
            &mut self,
            _nav: &LvlhState,
            _env: &Configuration,
            _elapsed: f64,
            _dt: f64,
        ) -> Result<GncOutput, GncError> {
            Ok(GncOutput::default())
        }

        fn name(&self) -> &str {
            "Coast"
        }
    }
}
