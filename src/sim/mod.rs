pub mod event;
pub mod integrator;
pub mod open_loop;
pub mod report;
pub mod runner;
pub mod telemetry;

pub use event::{EventDetector, EventKind, SimEvent};
pub use integrator::{rk4_step, Integrator, Step};
pub use report::{MissionReport, Status};
pub use runner::{descent_controller, simulate, simulate_report, simulate_with};
pub use telemetry::{NullSink, TelemetrySample, TelemetrySink};
