use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::MissionFile;
use crate::sim::MissionReport;

#[derive(Serialize)]
struct ReportDocument<'a> {
    scenario: &'a str,
    lander: &'a str,
    integrator: &'a str,
    seed: u64,
    report: &'a MissionReport,
}

/// Write the mission report as JSON to a writer.
pub fn write_report<W: Write>(writer: &mut W, mission: &MissionFile, report: &MissionReport) -> io::Result<()> {
    let doc = ReportDocument {
        scenario: &mission.scenario.name,
        lander: &mission.environment.lander.name,
        integrator: mission.sim.integrator.name(),
        seed: mission.sensor.seed,
        report,
    };
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)
}

/// Write the mission report JSON to a file.
pub fn write_report_file<P: AsRef<Path>>(path: P, mission: &MissionFile, report: &MissionReport) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_report(&mut file, mission, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::simulate_report;

    #[test]
    fn json_output_is_valid() {
        let mut mission = MissionFile::default();
        mission.scenario.name = "Test".into();
        mission.sim.max_time = 2.0;
        let report = simulate_report(&mission).unwrap();

        let mut buf = Vec::new();
        write_report(&mut buf, &mission, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["scenario"], "Test");
        assert_eq!(value["integrator"], "euler");
        assert_eq!(value["report"]["status"], "out_of_time");
        assert!(value["report"]["delta_v"].as_f64().unwrap() > 0.0);
        assert_eq!(value["report"]["events"][0]["kind"], "Ignition");
    }
}
