//! Corrected idle speed table.
//!
//! Rows are `[CN2, CN1 at M0.2, CN1 at M0.9]`, strictly increasing in CN2.

use fadec_core::atmosphere::corrected_idle_core_speed;
use fadec_core::{Real, interpolate};

const MACH_LO: Real = 0.2;
const MACH_HI: Real = 0.9;

pub(crate) const IDLE_TABLE: [[Real; 3]; 13] = [
    [18.20, 0.00, 17.00],
    [22.00, 1.90, 17.40],
    [26.00, 2.50, 18.20],
    [57.00, 12.80, 27.00],
    [68.20, 19.60, 34.83],
    [77.00, 26.00, 40.84],
    [83.00, 30.60, 44.84],
    [89.00, 40.10, 50.84],
    [92.80, 48.40, 55.84],
    [97.00, 55.00, 60.84],
    [100.00, 70.00, 65.84],
    [104.00, 93.00, 74.84],
    [116.50, 93.00, 104.84],
];

/// Corrected idle speeds `(cn2, cn1)` at altitude and Mach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrectedIdle {
    pub cn2: Real,
    pub cn1: Real,
}

/// Lower and upper bracketing rows for a corrected core speed.
///
/// The upper row is the first whose key exceeds `cn2`. Queries outside the
/// table collapse both brackets onto the nearest end row.
fn bracket(cn2: Real) -> (usize, usize) {
    match IDLE_TABLE.iter().position(|row| row[0] > cn2) {
        Some(0) => (0, 0),
        Some(hi) => (hi - 1, hi),
        None => (IDLE_TABLE.len() - 1, IDLE_TABLE.len() - 1),
    }
}

fn cn1_at_mach(row: &[Real; 3], mach: Real) -> Real {
    interpolate(mach, MACH_LO, MACH_HI, row[1], row[2])
}

/// Corrected idle core and fan speed for the ISA day.
pub fn corrected_idle(pressure_altitude_ft: Real, mach: Real) -> CorrectedIdle {
    let cn2 = corrected_idle_core_speed(pressure_altitude_ft, mach);
    let (lo, hi) = bracket(cn2);
    let row_lo = &IDLE_TABLE[lo];
    let row_hi = &IDLE_TABLE[hi];
    let cn1 = interpolate(
        cn2,
        row_lo[0],
        row_hi[0],
        cn1_at_mach(row_lo, mach),
        cn1_at_mach(row_hi, mach),
    );
    CorrectedIdle { cn2, cn1 }
}

/// Corrected idle fan speed.
///
/// The table is indexed by the ISA-corrected core speed, so ambient
/// temperature does not move the corrected value; it only enters when the
/// caller un-corrects with θ₂.
pub fn corrected_idle_fan_speed(pressure_altitude_ft: Real, mach: Real, _ambient_temp_c: Real) -> Real {
    corrected_idle(pressure_altitude_ft, mach).cn1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_keys_strictly_increase() {
        for w in IDLE_TABLE.windows(2) {
            assert!(w[1][0] > w[0][0]);
        }
    }

    #[test]
    fn sea_level_static_hits_idle_row() {
        let c = corrected_idle(0.0, 0.0);
        assert!((c.cn2 - 68.2).abs() < 1e-9);
        assert!((c.cn1 - 19.6).abs() < 1e-9);
    }

    #[test]
    fn bracket_clamps_both_ends() {
        assert_eq!(bracket(0.0), (0, 0));
        assert_eq!(bracket(500.0), (12, 12));
        assert_eq!(bracket(70.0), (4, 5));
    }

    #[test]
    fn mach_below_lower_breakpoint_uses_low_column() {
        let a = corrected_idle_fan_speed(10_000.0, 0.0, 15.0);
        let c = corrected_idle(10_000.0, 0.0);
        let (lo, hi) = bracket(c.cn2);
        let expected = interpolate(
            c.cn2,
            IDLE_TABLE[lo][0],
            IDLE_TABLE[hi][0],
            IDLE_TABLE[lo][1],
            IDLE_TABLE[hi][1],
        );
        assert!((a - expected).abs() < 1e-12);
    }

    #[test]
    fn ambient_temperature_does_not_move_corrected_value() {
        assert_eq!(
            corrected_idle_fan_speed(5_000.0, 0.3, -30.0),
            corrected_idle_fan_speed(5_000.0, 0.3, 40.0)
        );
    }
}
