use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use lander_sim::sim::{self, MissionReport, TelemetrySample};
use lander_sim::{load_mission, MissionFile};

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mission = match std::env::args().nth(1) {
        Some(path) => match load_mission(&path) {
            Ok(mission) => mission,
            Err(e) => {
                log::error!("{}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => MissionFile::default(),
    };

    let mut telemetry: Vec<TelemetrySample> = Vec::new();
    let report = match sim::simulate(&mission, &mut telemetry) {
        Ok(report) => report,
        Err(e) => {
            log::error!("simulation failed: {}", e);
            std::process::exit(1);
        }
    };

    let app = DescentViz { telemetry, report, mission };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Lunar Descent Simulator", options, Box::new(|_| Ok(Box::new(app))))
}

struct DescentViz {
    telemetry: Vec<TelemetrySample>,
    report: MissionReport,
    mission: MissionFile,
}

fn series<F>(samples: &[&TelemetrySample], f: F) -> Vec<[f64; 2]>
where
    F: Fn(&TelemetrySample) -> f64,
{
    samples.iter().map(|s| [s.time, f(s)]).collect()
}

impl eframe::App for DescentViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let step = (self.telemetry.len() / 2000).max(1);
        let sampled: Vec<&TelemetrySample> = self.telemetry.iter().step_by(step).collect();
        let max_thrust = self.mission.environment.lander.max_thrust;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Lander: {}", self.mission.environment.lander.name));
            ui.label(format!(
                "Status: {}  |  Altitude: {:.0} m ({:+.0})  |  Miss: {:.0} m  |  Propellant left: {:.0} kg  |  t = {:.1} s",
                self.report.status,
                self.report.altitude,
                self.report.altitude_error,
                self.report.miss_distance,
                self.report.remaining_propellant,
                self.report.final_time,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Altitude vs Time
                ui.vertical(|ui| {
                    ui.label("Altitude (m)");
                    let truth = series(&sampled, |s| s.truth_lvlh.z);
                    let measured = series(&sampled, |s| s.measured.z);
                    Plot::new("altitude")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Measured", PlotPoints::from(measured)));
                            plot_ui.line(Line::new("True", PlotPoints::from(truth)));
                        });
                });

                // Velocity components vs Time
                ui.vertical(|ui| {
                    ui.label("Velocity (m/s)");
                    let vertical = series(&sampled, |s| s.truth.dr);
                    let horizontal = series(&sampled, |s| s.truth_lvlh.dx);
                    Plot::new("velocity")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Vertical", PlotPoints::from(vertical)));
                            plot_ui.line(Line::new("Horizontal", PlotPoints::from(horizontal)));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Throttle vs Time
                ui.vertical(|ui| {
                    ui.label("Thrust (% of max)");
                    let required = series(&sampled, |s| s.command.thrust_cmd / max_thrust * 100.0);
                    let actual = series(&sampled, |s| s.throttle(max_thrust) * 100.0);
                    Plot::new("thrust")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Required", PlotPoints::from(required)));
                            plot_ui.line(Line::new("Delivered", PlotPoints::from(actual)));
                        });
                });

                // Pitch command vs actuated pitch
                ui.vertical(|ui| {
                    ui.label("Pitch Angle (deg)");
                    let commanded = series(&sampled, |s| s.command.pitch_cmd.to_degrees());
                    let actuated = series(&sampled, |s| s.command.pitch.to_degrees());
                    Plot::new("pitch")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Commanded", PlotPoints::from(commanded)));
                            plot_ui.line(Line::new("Actuated", PlotPoints::from(actuated)));
                        });
                });
            });
        });
    }
}
