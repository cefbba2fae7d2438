use thiserror::Error;

use crate::config::ConfigError;

/// Faults raised by the guidance, navigation and control chain.
#[derive(Debug, Error)]
pub enum GncError {
    /// Boundary-value guidance asked to solve over a zero or negative horizon.
    #[error("invalid guidance time horizon: time-to-go = {time_to_go} s")]
    InvalidTimeHorizon { time_to_go: f64 },

    /// A state vector left its physical domain (NaN, r <= 0, negative mass, ...).
    #[error("state invariant violated: {what} = {value}")]
    StateInvariantViolation { what: &'static str, value: f64 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GncError {
    pub(crate) fn invariant(what: &'static str, value: f64) -> Self {
        GncError::StateInvariantViolation { what, value }
    }
}
