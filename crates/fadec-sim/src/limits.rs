//! Thrust limit computation for one frame.

use fadec_controls::{FlexClimbTransition, FlexTransitionConfig, ThrustLimitType};
use fadec_core::{Real, unit_clamp};
use fadec_engine::{BleedConfig, LimitType, limit_n1};
use serde::{Deserialize, Serialize};

use crate::frame::{Ambient, ThrustLimitOutputs};

/// Takeoff and go-around ratings are evaluated no higher than this (ft).
pub const TAKEOFF_ALTITUDE_CAP_FT: Real = 16_600.0;
/// Above this altitude (ft) MCT folds into CLB and TOGA follows MCT.
pub const HIGH_ALTITUDE_FT: Real = 25_000.0;

/// Inputs the limit computer reads besides the ambient conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitInputs {
    pub sim_time: Real,
    pub limit_type: ThrustLimitType,
    pub flex_temp_c: Real,
    pub bleed: BleedConfig,
    pub idle_n1: Real,
    pub highest_n1: Real,
}

/// Holds the FLX to CLB filter across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrustLimitComputer {
    pub config: FlexTransitionConfig,
    pub transition: FlexClimbTransition,
}

impl ThrustLimitComputer {
    pub fn new(config: FlexTransitionConfig) -> Self {
        Self {
            config,
            transition: FlexClimbTransition::default(),
        }
    }

    pub fn compute(&mut self, amb: &Ambient, inp: &LimitInputs) -> ThrustLimitOutputs {
        let alt = amb.pressure_altitude_ft;
        let rating = |limit: LimitType, alt: Real, flex: Real| {
            limit_n1(limit, alt, amb.temperature_c, amb.pressure_hpa, flex, inp.bleed)
        };

        let takeoff_alt = alt.min(TAKEOFF_ALTITUDE_CAP_FT);
        let to = rating(LimitType::Takeoff, takeoff_alt, 0.0);
        let ga = rating(LimitType::GoAround, takeoff_alt, 0.0);
        let (flex_to, flex_ga) = if inp.flex_temp_c > 0.0 {
            (
                rating(LimitType::Takeoff, takeoff_alt, inp.flex_temp_c),
                rating(LimitType::GoAround, takeoff_alt, inp.flex_temp_c),
            )
        } else {
            (0.0, 0.0)
        };
        let clb = rating(LimitType::Climb, alt, 0.0);
        let mut mct = rating(LimitType::MaximumContinuous, alt, 0.0);

        let low_mach = unit_clamp((amb.mach - 0.04) / 0.04);
        let mut toga = to + (ga - to) * low_mach;
        let flex = flex_to + (flex_ga - flex_to) * low_mach;

        let climb = self.transition.apply(
            &self.config,
            inp.sim_time,
            inp.limit_type,
            inp.flex_temp_c,
            clb,
            flex,
        );

        let mach_factor = unit_clamp((amb.mach - 0.37) / 0.05);
        let alt_low = unit_clamp((alt - TAKEOFF_ALTITUDE_CAP_FT) / 500.0);
        let alt_high = unit_clamp((alt - HIGH_ALTITUDE_FT) / 500.0);

        if alt >= HIGH_ALTITUDE_FT {
            mct = climb.max(mct + (climb - mct) * alt_high);
            toga = mct;
        } else {
            let blend = (alt_low + mach_factor).min(1.0);
            if mct > toga {
                mct = toga + (mct - toga) * blend;
                toga = mct;
            } else {
                toga += (mct - toga) * blend;
            }
        }

        ThrustLimitOutputs {
            idle: inp.idle_n1,
            climb,
            flex,
            maximum_continuous: mct,
            toga,
            highest_n1: inp.highest_n1,
        }
    }
}
