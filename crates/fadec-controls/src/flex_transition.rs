//! FLX to CLB thrust limit transition filter.
//!
//! After a flexible takeoff the climb limit is held at the flex value and
//! then raised at a fixed rate once the crew selects climb thrust, so the
//! displayed limit never jumps.

use fadec_core::Real;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ControlError, ControlResult};

/// Thrust limit type selected by the thrust levers, as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThrustLimitType {
    #[default]
    None,
    Climb,
    MaximumContinuous,
    Flex,
    Toga,
}

impl ThrustLimitType {
    pub const ALL: [ThrustLimitType; 5] = [
        ThrustLimitType::None,
        ThrustLimitType::Climb,
        ThrustLimitType::MaximumContinuous,
        ThrustLimitType::Flex,
        ThrustLimitType::Toga,
    ];

    pub fn code(self) -> Real {
        match self {
            ThrustLimitType::None => 0.0,
            ThrustLimitType::Climb => 1.0,
            ThrustLimitType::MaximumContinuous => 2.0,
            ThrustLimitType::Flex => 3.0,
            ThrustLimitType::Toga => 4.0,
        }
    }
}

impl TryFrom<Real> for ThrustLimitType {
    type Error = ControlError;

    fn try_from(code: Real) -> ControlResult<Self> {
        ThrustLimitType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(ControlError::UnknownLimitType { code })
    }
}

/// Timing of the FLX to CLB ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexTransitionConfig {
    /// Seconds the climb limit stays at the flex value after CLB is selected.
    pub wait_s: Real,
    /// Ramp rate (%N1/s) from flex to climb.
    pub ramp_per_s: Real,
}

impl Default for FlexTransitionConfig {
    fn default() -> Self {
        Self {
            wait_s: 10.0,
            ramp_per_s: 0.2,
        }
    }
}

impl FlexTransitionConfig {
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.wait_s.is_finite() && self.wait_s >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "flex transition wait must be finite and non-negative",
            });
        }
        if !(self.ramp_per_s.is_finite() && self.ramp_per_s > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "flex transition ramp rate must be finite and positive",
            });
        }
        Ok(())
    }
}

/// Filter state carried across frames for the whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexClimbTransition {
    pub flex_active: bool,
    pub transition_active: bool,
    /// Simulation time (s) at which CLB was selected with flex active.
    pub start_time: Real,
    pub previous_flex_temp: Real,
    pub previous_type: ThrustLimitType,
}

impl FlexClimbTransition {
    /// Filtered climb limit for this frame.
    ///
    /// `now` is simulation time in seconds; `flex_temp` is the selected
    /// flex temperature, zero when none is set.
    pub fn apply(
        &mut self,
        cfg: &FlexTransitionConfig,
        now: Real,
        limit_type: ThrustLimitType,
        flex_temp: Real,
        climb: Real,
        flex: Real,
    ) -> Real {
        let entered_flex =
            self.previous_type != ThrustLimitType::Flex && limit_type == ThrustLimitType::Flex;
        let flex_set = self.previous_flex_temp == 0.0 && flex_temp > 0.0;
        if entered_flex || flex_set {
            self.flex_active = true;
        } else if flex_temp == 0.0 || limit_type == ThrustLimitType::Toga {
            self.flex_active = false;
        }

        if self.flex_active && !self.transition_active && limit_type == ThrustLimitType::Climb {
            self.transition_active = true;
            self.start_time = now;
            debug!(start = now, "FLX to CLB transition started");
        } else if !self.flex_active && self.transition_active {
            self.transition_active = false;
            self.start_time = 0.0;
            debug!("FLX to CLB transition cancelled");
        }

        let mut delta = 0.0;
        if self.transition_active {
            let ramp_time = (now - self.start_time - cfg.wait_s).max(0.0);
            if ramp_time > 0.0 && climb > flex {
                delta = (climb - flex).min(ramp_time * cfg.ramp_per_s);
            }
            if flex + delta >= climb {
                self.flex_active = false;
                self.transition_active = false;
                debug!(at = now, "FLX to CLB transition complete");
            }
        }

        self.previous_type = limit_type;
        self.previous_flex_temp = flex_temp;

        if self.flex_active {
            climb.min(flex) + delta
        } else {
            climb
        }
    }
}
