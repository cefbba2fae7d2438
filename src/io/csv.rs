use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::TelemetrySample;

/// One CSV row per control tick.
///
/// Columns: time, true polar state, true and measured altitude/downrange,
/// raw and limited command, guidance target accelerations.
#[derive(Debug, Serialize)]
struct TelemetryRow {
    time: f64,
    r: f64,
    dr: f64,
    theta: f64,
    dtheta: f64,
    mass: f64,
    altitude: f64,
    downrange: f64,
    horizontal_speed: f64,
    altitude_measured: f64,
    thrust_cmd: f64,
    thrust: f64,
    pitch_cmd_deg: f64,
    pitch_deg: f64,
    target_accel_z: f64,
    target_accel_x: f64,
}

impl From<&TelemetrySample> for TelemetryRow {
    fn from(s: &TelemetrySample) -> Self {
        Self {
            time: s.time,
            r: s.truth.r,
            dr: s.truth.dr,
            theta: s.truth.theta,
            dtheta: s.truth.dtheta,
            mass: s.truth.m,
            altitude: s.truth_lvlh.z,
            downrange: s.truth_lvlh.x,
            horizontal_speed: s.truth_lvlh.dx,
            altitude_measured: s.measured.z,
            thrust_cmd: s.command.thrust_cmd,
            thrust: s.command.thrust,
            pitch_cmd_deg: s.command.pitch_cmd.to_degrees(),
            pitch_deg: s.command.pitch.to_degrees(),
            target_accel_z: s.target.vertical,
            target_accel_x: s.target.horizontal,
        }
    }
}

/// Write telemetry to CSV format.
pub fn write_telemetry<W: Write>(writer: W, samples: &[TelemetrySample]) -> io::Result<()> {
    let mut csv = ::csv::Writer::from_writer(writer);
    for s in samples {
        csv.serialize(TelemetryRow::from(s))?;
    }
    csv.flush()
}

/// Write telemetry to a CSV file at the given path.
pub fn write_telemetry_file<P: AsRef<Path>>(path: P, samples: &[TelemetrySample]) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    write_telemetry(io::BufWriter::new(file), samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissionFile;
    use crate::sim::simulate;

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut mission = MissionFile::default();
        mission.sim.max_time = 1.0;
        let mut samples: Vec<TelemetrySample> = Vec::new();
        simulate(&mission, &mut samples).unwrap();

        let mut buf = Vec::new();
        write_telemetry(&mut buf, &samples).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,r,dr,theta,dtheta,mass,altitude"));
        assert_eq!(lines.len(), 11); // header + 10 ticks
        assert_eq!(lines[1].split(',').count(), 16);
        assert!(lines[1].starts_with("0.1,"));
    }
}
