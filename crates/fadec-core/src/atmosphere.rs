//! Standard atmosphere ratios used to correct engine parameters.
//!
//! Temperatures are °C, pressures hPa, altitudes ft, speeds kt.

use crate::Real;
use crate::units::constants::{
    CELSIUS_TO_KELVIN, ISA_LAPSE_K_PER_KFT, ISA_P0_HPA, ISA_T0_K, ISA_TROPOPAUSE_K,
};

/// Corrected core speed at idle for sea level static ISA (%).
pub const IDLE_CN2_SEA_LEVEL: Real = 68.2;

const CAS_TO_MACH_K: Real = 2_188_648.141;
const MIN_DELTA: Real = 1e-6;

#[inline]
fn ram_factor(mach: Real) -> Real {
    1.0 + 0.2 * mach.powi(2)
}

/// Static temperature ratio θ.
pub fn theta(ambient_temp_c: Real) -> Real {
    (CELSIUS_TO_KELVIN + ambient_temp_c) / ISA_T0_K
}

/// Static pressure ratio δ.
pub fn delta(ambient_pressure_hpa: Real) -> Real {
    ambient_pressure_hpa / ISA_P0_HPA
}

/// Total temperature ratio θ₂ at the fan face.
pub fn theta2(mach: Real, ambient_temp_c: Real) -> Real {
    theta(ambient_temp_c) * ram_factor(mach)
}

/// Total pressure ratio δ₂ at the fan face.
pub fn delta2(mach: Real, ambient_pressure_hpa: Real) -> Real {
    delta(ambient_pressure_hpa) * ram_factor(mach).powf(3.5)
}

/// Subsonic calibrated airspeed to Mach conversion.
///
/// A vanishing pressure ratio is floored so the conversion never divides by
/// zero; the result is 0 rather than NaN for negative radicands.
pub fn cas_to_mach(cas_kt: Real, ambient_pressure_hpa: Real) -> Real {
    let d = delta(ambient_pressure_hpa).max(MIN_DELTA);
    let impact = ((cas_kt.powi(2) / CAS_TO_MACH_K) + 1.0).powf(3.5);
    let inner = (impact / d - 1.0 / d + 1.0).max(0.0);
    (5.0 * inner.powf(0.285_714_286) - 5.0).max(0.0).sqrt()
}

/// ISA static temperature at pressure altitude (K), capped at the tropopause.
pub fn isa_temperature_k(pressure_altitude_ft: Real) -> Real {
    (ISA_T0_K - ISA_LAPSE_K_PER_KFT * pressure_altitude_ft / 1000.0).max(ISA_TROPOPAUSE_K)
}

/// Corrected idle core speed for the ISA day at altitude and Mach.
pub fn corrected_idle_core_speed(pressure_altitude_ft: Real, mach: Real) -> Real {
    let t_ratio = isa_temperature_k(pressure_altitude_ft) / ISA_T0_K;
    IDLE_CN2_SEA_LEVEL / (t_ratio.sqrt() * ram_factor(mach).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tolerances, nearly_equal};

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        }
    }

    #[test]
    fn sea_level_ratios_are_unity() {
        assert!(nearly_equal(theta(15.0), 1.0, tol()));
        assert!(nearly_equal(delta(1013.0), 1.0, tol()));
        assert!(nearly_equal(theta2(0.0, 15.0), 1.0, tol()));
        assert!(nearly_equal(delta2(0.0, 1013.0), 1.0, tol()));
    }

    #[test]
    fn ram_rise_increases_total_ratios() {
        assert!(theta2(0.8, 15.0) > theta(15.0));
        assert!(delta2(0.8, 1013.0) > delta(1013.0));
    }

    #[test]
    fn cas_to_mach_sea_level() {
        // 250 kt CAS at sea level is roughly Mach 0.378.
        let m = cas_to_mach(250.0, 1013.0);
        assert!((m - 0.378).abs() < 0.005, "mach = {m}");
        assert_eq!(cas_to_mach(0.0, 1013.0), 0.0);
    }

    #[test]
    fn cas_to_mach_rises_with_altitude() {
        assert!(cas_to_mach(250.0, 500.0) > cas_to_mach(250.0, 1013.0));
    }

    #[test]
    fn cas_to_mach_survives_zero_pressure() {
        let m = cas_to_mach(300.0, 0.0);
        assert!(m.is_finite());
    }

    #[test]
    fn idle_core_speed_corrects_upward_with_altitude() {
        assert!(nearly_equal(
            corrected_idle_core_speed(0.0, 0.0),
            IDLE_CN2_SEA_LEVEL,
            tol()
        ));
        assert!(corrected_idle_core_speed(30_000.0, 0.0) > IDLE_CN2_SEA_LEVEL);
        assert!(corrected_idle_core_speed(0.0, 0.8) < IDLE_CN2_SEA_LEVEL);
    }

    #[test]
    fn isa_temperature_caps_at_tropopause() {
        assert_eq!(isa_temperature_k(60_000.0), 216.65);
    }
}
