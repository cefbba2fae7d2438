use serde::Serialize;

use crate::dynamics::state::PolarState;
use crate::physics::Body;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventKind {
    Ignition,
    PropellantDepleted,
    AltitudeGate { altitude: f64 },
    Touchdown,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Ignition => write!(f, "ignition"),
            EventKind::PropellantDepleted => write!(f, "propellant depleted"),
            EventKind::AltitudeGate { altitude } => write!(f, "altitude gate {:.0} m", altitude),
            EventKind::Touchdown => write!(f, "touchdown"),
        }
    }
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub state: PolarState,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive true states and report events;
/// they never alter the run.
pub trait EventDetector {
    fn check(&mut self, prev: &PolarState, current: &PolarState) -> Option<EventKind>;
}

/// Fires once when mass reaches the empty mass.
pub struct DepletionDetector {
    pub dry_mass: f64,
    fired: bool,
}

impl DepletionDetector {
    pub fn new(dry_mass: f64) -> Self {
        Self { dry_mass, fired: false }
    }
}

impl EventDetector for DepletionDetector {
    fn check(&mut self, _prev: &PolarState, current: &PolarState) -> Option<EventKind> {
        if self.fired || current.m > self.dry_mass {
            return None;
        }
        self.fired = true;
        Some(EventKind::PropellantDepleted)
    }
}

/// Fires once when altitude crosses a gate on the way down.
pub struct AltitudeDetector {
    pub body: Body,
    pub altitude: f64,
    fired: bool,
}

impl AltitudeDetector {
    pub fn new(body: Body, altitude: f64) -> Self {
        Self { body, altitude, fired: false }
    }
}

impl EventDetector for AltitudeDetector {
    fn check(&mut self, prev: &PolarState, current: &PolarState) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let before = self.body.altitude(prev.r);
        let after = self.body.altitude(current.r);
        if before > self.altitude && after <= self.altitude {
            self.fired = true;
            Some(EventKind::AltitudeGate { altitude: self.altitude })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(body: &Body, alt: f64, m: f64) -> PolarState {
        PolarState { r: body.radius + alt, dr: -30.0, theta: 0.0, dtheta: 0.0, m }
    }

    #[test]
    fn depletion_fires_once() {
        let moon = Body::moon();
        let mut det = DepletionDetector::new(4_280.0);
        let full = state(&moon, 1_000.0, 4_290.0);
        let dry = state(&moon, 990.0, 4_280.0);
        assert_eq!(det.check(&full, &full), None);
        assert_eq!(det.check(&full, &dry), Some(EventKind::PropellantDepleted));
        assert_eq!(det.check(&dry, &dry), None);
    }

    #[test]
    fn altitude_gate_descending_only() {
        let moon = Body::moon();
        let mut det = AltitudeDetector::new(moon, 2_000.0);
        let above = state(&moon, 2_050.0, 9_000.0);
        let below = state(&moon, 1_990.0, 9_000.0);
        assert_eq!(det.check(&below, &above), None);
        assert_eq!(det.check(&above, &below), Some(EventKind::AltitudeGate { altitude: 2_000.0 }));
        // Should not fire again
        assert!(det.check(&above, &below).is_none());
    }
}
