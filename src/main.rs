use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;

use lander_sim::gnc::GuidanceMode;
use lander_sim::io;
use lander_sim::sim::integrator::Integrator;
use lander_sim::sim::open_loop;
use lander_sim::sim::{self, MissionReport, TelemetrySample};
use lander_sim::{load_mission, MissionFile};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IntegratorArg {
    Euler,
    Rk4,
    Adaptive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GuidanceArg {
    Receding,
    OneShot,
}

/// Closed-loop powered-descent simulation of a lunar lander.
#[derive(Parser, Debug)]
#[command(author, version, about = "Lunar lander powered-descent GNC simulator")]
struct Cli {
    /// Mission file (TOML). Missing sections use the Apollo braking-phase preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Altimeter noise seed
    #[arg(long)]
    seed: Option<u64>,

    /// Altimeter bias, m
    #[arg(long)]
    bias: Option<f64>,

    /// Integration discipline
    #[arg(long, value_enum)]
    integrator: Option<IntegratorArg>,

    /// Guidance mode
    #[arg(long, value_enum)]
    guidance: Option<GuidanceArg>,

    /// Simulation horizon, s
    #[arg(long)]
    horizon: Option<f64>,

    /// Write per-tick telemetry CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the mission report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Run the continuous open-loop study instead of the closed loop
    #[arg(long, default_value_t = false)]
    open_loop: bool,
}

impl Cli {
    fn mission(&self) -> Result<MissionFile, Box<dyn Error>> {
        let mut mission = match &self.config {
            Some(path) => load_mission(path)?,
            None => MissionFile::default(),
        };
        if let Some(seed) = self.seed {
            mission.sensor.seed = seed;
        }
        if let Some(bias) = self.bias {
            mission.sensor.bias = bias;
        }
        if let Some(integrator) = self.integrator {
            mission.sim.integrator = match integrator {
                IntegratorArg::Euler => Integrator::euler(),
                IntegratorArg::Rk4 => Integrator::rk4(),
                IntegratorArg::Adaptive => Integrator::adaptive(),
            };
        }
        if let Some(guidance) = self.guidance {
            mission.guidance.mode = match guidance {
                GuidanceArg::Receding => GuidanceMode::RecedingHorizon,
                GuidanceArg::OneShot => GuidanceMode::OneShot,
            };
        }
        if let Some(horizon) = self.horizon {
            mission.sim.max_time = horizon;
        }
        mission.validate()?;
        Ok(mission)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mission = cli.mission()?;

    if cli.open_loop {
        return run_open_loop(&mission);
    }

    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let report = sim::simulate(&mission, &mut telemetry)?;

    print_report(&mission, &report, &telemetry);

    if let Some(path) = &cli.csv {
        io::write_telemetry_file(path, &telemetry)?;
        info!("Telemetry written to {}", path.display());
    }
    if let Some(path) = &cli.json {
        io::write_report_file(path, &mission, &report)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn run_open_loop(mission: &MissionFile) -> Result<(), Box<dyn Error>> {
    let run = open_loop::study(mission)?;
    let env = &mission.environment;

    println!();
    println!("  Open-loop study ({} samples)", run.samples.len());
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  {:>7}  {:>9}  {:>9}  {:>9}  {:>9}", "t (s)", "alt (m)", "vz (m/s)", "vx (m/s)", "mass(kg)");
    let stride = (run.samples.len() / 25).max(1);
    for (i, (t, s)) in run.samples.iter().enumerate() {
        if i % stride == 0 || i == run.samples.len() - 1 {
            println!(
                "  {:>7.1}  {:>9.1}  {:>9.2}  {:>9.2}  {:>9.1}",
                t,
                env.body.altitude(s.r),
                s.dr,
                s.horizontal_speed(),
                s.m
            );
        }
    }
    match run.contact {
        Some(t) => println!("  Surface contact at t={:.3} s", t),
        None => println!("  No contact before t={:.1} s", mission.sim.max_time),
    }
    println!();
    Ok(())
}

fn print_report(mission: &MissionFile, report: &MissionReport, telemetry: &[TelemetrySample]) {
    let env = &mission.environment;
    let lander = &env.lander;
    let initial = mission.scenario.initial_state(env);

    println!();
    println!("====================================================================");
    println!("  POWERED DESCENT SIMULATION — {}", lander.name);
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Empty mass:    {:>8.0} kg    Initial mass: {:>8.0} kg",
        lander.dry_mass, initial.m
    );
    println!(
        "  Max thrust:    {:>8.0} N     Isp:          {:>8.0} s",
        lander.max_thrust, lander.isp
    );
    println!(
        "  Throttle:      {:>5.0}-{:<3.0}%     Slew limit:   {:>8.1} deg/s",
        lander.throttle.floor_percent,
        lander.throttle.upper_percent,
        lander.max_slew_rate.to_degrees()
    );
    println!(
        "  Propellant:    {:>8.0} kg    Burn time:    {:>8.1} s (full thrust)",
        lander.propellant_mass(),
        lander.full_thrust_burn_time(env.g_surface)
    );
    println!();

    println!("  Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for event in &report.events {
        println!(
            "  t={:>7.1}s   alt={:>8.0}m   mass={:>7.0}kg   {}",
            event.time,
            env.body.altitude(event.state.r),
            event.state.m,
            event.kind
        );
    }
    println!();

    println!("  Mission Report");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Status:               {}", report.status);
    println!("  Final time:           {:>10.2} s", report.final_time);
    println!("  Final altitude:       {:>10.1} m   (error {:+.1} m)", report.altitude, report.altitude_error);
    println!("  Vertical speed:       {:>10.2} m/s", report.vertical_speed);
    println!("  Horizontal speed:     {:>10.2} m/s", report.horizontal_speed);
    println!("  Impact velocity:      {:>10.2} m/s", report.impact_velocity);
    println!("  Miss distance:        {:>10.1} m", report.miss_distance);
    println!("  Propellant consumed:  {:>10.1} kg", report.propellant_consumed);
    println!("  Propellant remaining: {:>10.1} kg", report.remaining_propellant);
    println!("  Delta-v expended:     {:>10.1} m/s", report.delta_v);
    println!();

    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>8}  {:>8}  {:>8}  {:>7}",
        "t (s)", "alt (m)", "vz (m/s)", "vx (m/s)", "thr (%)", "pitch"
    );
    println!("  {}", "─".repeat(60));

    let stride = (telemetry.len() / 30).max(1);
    for (i, s) in telemetry.iter().enumerate() {
        if i % stride != 0 && i != telemetry.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.1}  {:>9.1}  {:>8.2}  {:>8.2}  {:>8.1}  {:>7.1}",
            s.time,
            s.altitude(),
            s.truth.dr,
            s.truth_lvlh.dx,
            s.throttle(lander.max_thrust) * 100.0,
            s.command.pitch.to_degrees()
        );
    }

    println!();
    println!(
        "  Simulation: {} ticks, dt={} s, integrator={}",
        telemetry.len(),
        mission.sim.dt,
        mission.sim.integrator.name()
    );
    println!("====================================================================");
    println!();
}
