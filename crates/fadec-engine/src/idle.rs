//! Idle baseline from ambient conditions.

use fadec_core::atmosphere::{delta2, theta, theta2};
use fadec_core::units::constants::LB_TO_KG;
use fadec_core::Real;

use crate::corrected_speed::corrected_idle;
use crate::polynomials::{corrected_egt, corrected_fuel_flow};

/// Idle reference point for one frame.
///
/// Recomputed every frame; start, shutdown and steady-state models all
/// read it within the same tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IdleBaseline {
    /// Fan speed (%).
    pub n1: Real,
    /// Core speed (%).
    pub n2: Real,
    /// Fuel flow (kg/h).
    pub ff: Real,
    /// Exhaust gas temperature (°C).
    pub egt: Real,
}

/// Idle fan speed, core speed, fuel flow and EGT at the given conditions.
///
/// Idle fuel flow and EGT are evaluated at zero Mach on the corrected side
/// and un-corrected with the static ratios.
pub fn idle_baseline(
    pressure_altitude_ft: Real,
    mach: Real,
    ambient_temp_c: Real,
    ambient_pressure_hpa: Real,
) -> IdleBaseline {
    let corrected = corrected_idle(pressure_altitude_ft, mach);
    let theta2_static = theta2(0.0, ambient_temp_c);
    let delta2_static = delta2(0.0, ambient_pressure_hpa);

    let cff = corrected_fuel_flow(corrected.cn1, 0.0, pressure_altitude_ft);

    IdleBaseline {
        n1: corrected.cn1 * theta2_static.sqrt(),
        n2: corrected.cn2 * theta(ambient_temp_c).sqrt(),
        ff: cff * LB_TO_KG * delta2_static * theta2_static.sqrt(),
        egt: corrected_egt(corrected.cn1, cff, 0.0, pressure_altitude_ft) * theta2_static,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn idle_n1_monotone_in_altitude(alt in -2_000.0_f64..39_000.0, step in 0.0_f64..1_000.0) {
            let a = idle_baseline(alt, 0.3, 0.0, 900.0);
            let b = idle_baseline(alt + step, 0.3, 0.0, 900.0);
            prop_assert!(b.n1 >= a.n1 - 1e-9);
        }
    }
}
