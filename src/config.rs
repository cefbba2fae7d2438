//! Session configuration: environment constants, vehicle, run settings and
//! TOML mission files.
//!
//! Everything here is built once before the first tick and passed by
//! reference afterwards; nothing in the loop mutates it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gnc::guidance::GuidanceConfig;
use crate::gnc::sensor::SensorConfig;
use crate::physics::{Body, G_EARTH};
use crate::sim::integrator::Integrator;
use crate::vehicle::{Lander, Scenario};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read mission file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn require(ok: bool, field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: reason.into() })
    }
}

fn require_positive(value: f64, field: &'static str) -> Result<(), ConfigError> {
    require(value.is_finite() && value > 0.0, field, format!("must be positive, got {value}"))
}

// ---------------------------------------------------------------------------
// Environment + vehicle constants
// ---------------------------------------------------------------------------

/// Immutable physical and vehicle constants for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub body: Body,
    pub g_surface: f64, // m/s^2, reference gravity for Isp
    pub lander: Lander,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            body: Body::moon(),
            g_surface: G_EARTH,
            lander: Lander::default(),
        }
    }
}

impl Configuration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(self.body.mu, "body.mu")?;
        require_positive(self.body.radius, "body.radius")?;
        require_positive(self.g_surface, "g_surface")?;

        let lander = &self.lander;
        require_positive(lander.isp, "lander.isp")?;
        require_positive(lander.dry_mass, "lander.dry_mass")?;
        require_positive(lander.max_thrust, "lander.max_thrust")?;
        require_positive(lander.max_slew_rate, "lander.max_slew_rate")?;
        require(
            lander.wet_mass >= lander.dry_mass,
            "lander.wet_mass",
            format!("{} kg is below the empty mass {} kg", lander.wet_mass, lander.dry_mass),
        )?;

        let throttle = &lander.throttle;
        require(
            throttle.floor_percent > 0.0
                && throttle.floor_percent < throttle.upper_percent
                && throttle.upper_percent <= 100.0,
            "lander.throttle",
            format!(
                "need 0 < floor < upper <= 100, got floor {} / upper {}",
                throttle.floor_percent, throttle.upper_percent
            ),
        )
    }
}

// ---------------------------------------------------------------------------
// Run settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,       // outer control period, s
    pub max_time: f64, // hard stop, s
    pub integrator: Integrator,
    /// Actuated pitch at ignition. `None` primes the slew limiter with the
    /// first raw command.
    pub initial_pitch: Option<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,         // 10 Hz guidance/control
            max_time: 500.0, // braking phase horizon
            integrator: Integrator::default(),
            initial_pitch: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(self.dt, "sim.dt")?;
        require_positive(self.max_time, "sim.max_time")?;
        if let Some(pitch) = self.initial_pitch {
            require(pitch.is_finite(), "sim.initial_pitch", "must be finite")?;
        }
        self.integrator.validate(self.dt)
    }

    /// Number of outer ticks until the horizon.
    pub fn max_ticks(&self) -> u64 {
        (self.max_time / self.dt - 1e-9).ceil() as u64
    }
}

// ---------------------------------------------------------------------------
// Mission file
// ---------------------------------------------------------------------------

/// Everything a driver needs to start a session. Missing sections fall
/// back to the Apollo braking-phase preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionFile {
    pub environment: Configuration,
    pub sim: SimConfig,
    pub sensor: SensorConfig,
    pub guidance: GuidanceConfig,
    pub scenario: Scenario,
}

impl MissionFile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.environment.validate()?;
        self.sim.validate()?;
        self.sensor.validate()?;
        self.guidance.validate()?;
        self.scenario.validate(&self.environment)
    }
}

/// Parse and validate a mission file from TOML text.
pub fn parse_mission(text: &str) -> Result<MissionFile, ConfigError> {
    let mission: MissionFile = toml::from_str(text)?;
    mission.validate()?;
    Ok(mission)
}

/// Load and validate a mission file.
pub fn load_mission<P: AsRef<Path>>(path: P) -> Result<MissionFile, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_mission(&contents)
}
