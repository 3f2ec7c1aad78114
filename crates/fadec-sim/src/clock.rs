//! Frame clock.
//!
//! The host supplies absolute simulation time; the FADEC works with the
//! step since the last frame. Steps are floored so rate and decay laws
//! never see a zero or negative interval.

use fadec_core::{MIN_FRAME_DT_S, Real, floor_delta_time};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    /// Simulation time of the last frame, `None` before the first.
    pub previous_time: Option<Real>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step since the previous frame, floored to [`MIN_FRAME_DT_S`].
    ///
    /// The first frame of a session and a host clock that moved backwards
    /// both yield the floor value. Gaps are not capped: a host that stopped
    /// calling for a while resumes with the full interval.
    pub fn advance(&mut self, sim_time: Real) -> Real {
        let dt = match self.previous_time {
            Some(prev) => floor_delta_time(sim_time - prev),
            None => MIN_FRAME_DT_S,
        };
        self.previous_time = Some(sim_time);
        dt
    }

    /// Forget the previous frame.
    pub fn reset(&mut self) {
        self.previous_time = None;
    }
}
