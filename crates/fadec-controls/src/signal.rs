//! Edge detection on discrete cockpit signals.

use fadec_core::Real;
use serde::{Deserialize, Serialize};

/// Rising/falling edge detector on a boolean signal.
///
/// Holds the previous sample; call [`EdgeDetector::update`] exactly once per
/// frame, after every reader of the previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDetector {
    previous: bool,
}

/// Edges seen in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
    pub rising: bool,
    pub falling: bool,
}

impl EdgeDetector {
    pub fn new(initial: bool) -> Self {
        Self { previous: initial }
    }

    pub fn previous(&self) -> bool {
        self.previous
    }

    /// Edges between the stored sample and `now` without storing `now`.
    pub fn peek(&self, now: bool) -> Edges {
        Edges {
            rising: !self.previous && now,
            falling: self.previous && !now,
        }
    }

    /// Compare with the previous sample and store `now`.
    pub fn update(&mut self, now: bool) -> Edges {
        let edges = self.peek(now);
        self.previous = now;
        edges
    }
}

/// Master switch edges derived from the fuel valve travel.
///
/// The valve reports a fraction; the switch only counts as on once the
/// valve has fully opened, which models the one-frame travel delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MasterSwitchEdges {
    pub turned_on: bool,
    pub turned_off: bool,
}

impl MasterSwitchEdges {
    pub fn detect(previous_valve: Real, valve: Real) -> Self {
        Self {
            turned_on: previous_valve < 1.0 && valve >= 1.0,
            turned_off: previous_valve == 1.0 && valve < 1.0,
        }
    }
}
