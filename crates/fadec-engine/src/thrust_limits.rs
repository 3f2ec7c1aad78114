//! Thrust limit table and the N1 limit computation.
//!
//! Rows are `[altitude ft, corner point °C, limit point °C, CN1 flat,
//! CN1 last, CN1 flex]`. Below the corner point the engine is flat rated;
//! between corner and limit point the corrected limit falls linearly to
//! CN1 last; beyond the limit point flex temperatures continue toward the
//! CN1 flex value at 100 °C.

use fadec_core::atmosphere::{cas_to_mach, theta2};
use fadec_core::{Real, interpolate};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

const ALT: usize = 0;
const CP: usize = 1;
const LP: usize = 2;
const FLAT: usize = 3;
const LAST: usize = 4;
const FLEX: usize = 5;

/// Temperature at which the flex line reaches CN1 flex.
const FLEX_REFERENCE_TEMP: Real = 100.0;
/// Altitude above which bleed deductions use the high-altitude row.
const BLEED_HIGH_ALT_FT: Real = 8000.0;

pub(crate) const LIMITS: [[Real; 6]; 72] = [
    // takeoff
    [-2000.0, 48.0, 55.0, 81.351, 79.37, 61.535],
    [-1000.0, 46.0, 55.0, 82.605, 80.12, 62.105],
    [0.0, 44.0, 55.0, 83.832, 80.776, 62.655],
    [500.0, 42.0, 52.0, 84.21, 81.618, 62.655],
    [1000.0, 42.0, 52.0, 84.579, 81.712, 62.655],
    [2000.0, 40.0, 50.0, 85.594, 82.72, 62.655],
    [3000.0, 36.0, 48.0, 86.657, 83.167, 61.96],
    [4000.0, 32.0, 46.0, 87.452, 83.332, 61.206],
    [5000.0, 29.0, 44.0, 88.833, 84.166, 61.206],
    [6000.0, 25.0, 42.0, 90.232, 84.815, 61.206],
    [7000.0, 21.0, 40.0, 91.711, 85.565, 61.258],
    [8000.0, 17.0, 38.0, 93.247, 86.225, 61.777],
    [9000.0, 15.0, 36.0, 94.031, 86.889, 60.968],
    [10000.0, 13.0, 34.0, 94.957, 88.044, 60.935],
    [11000.0, 12.0, 32.0, 95.295, 88.526, 59.955],
    [12000.0, 11.0, 30.0, 95.568, 88.818, 58.677],
    [13000.0, 10.0, 28.0, 95.355, 88.819, 59.323],
    [14000.0, 10.0, 26.0, 95.372, 89.311, 59.965],
    [15000.0, 8.0, 24.0, 95.686, 89.907, 58.723],
    [16000.0, 5.0, 22.0, 96.16, 89.816, 57.189],
    [16600.0, 5.0, 22.0, 96.56, 89.816, 57.189],
    // go-around
    [-2000.0, 47.751, 54.681, 84.117, 81.901, 63.498],
    [-1000.0, 45.771, 54.681, 85.255, 82.461, 63.92],
    [0.0, 43.791, 54.681, 86.411, 83.021, 64.397],
    [500.0, 42.801, 52.701, 86.978, 83.74, 64.401],
    [1000.0, 41.811, 52.701, 87.568, 83.928, 64.525],
    [2000.0, 38.841, 50.721, 88.753, 84.935, 64.489],
    [3000.0, 36.861, 48.741, 89.93, 85.29, 63.364],
    [4000.0, 32.901, 46.761, 91.004, 85.836, 62.875],
    [5000.0, 28.941, 44.781, 92.198, 86.293, 62.614],
    [6000.0, 24.981, 42.801, 93.253, 86.563, 62.29],
    [7000.0, 21.022, 40.821, 94.273, 86.835, 61.952],
    [8000.0, 17.062, 38.841, 94.919, 87.301, 62.714],
    [9000.0, 15.082, 36.861, 95.365, 87.676, 61.692],
    [10000.0, 13.102, 34.881, 95.914, 88.15, 60.906],
    [11000.0, 12.112, 32.901, 96.392, 88.627, 59.77],
    [12000.0, 11.122, 30.921, 96.64, 89.206, 58.933],
    [13000.0, 10.132, 28.941, 96.516, 89.789, 60.503],
    [14000.0, 9.142, 26.961, 96.516, 90.475, 62.072],
    [15000.0, 9.142, 24.981, 96.623, 90.677, 59.333],
    [16000.0, 7.162, 23.001, 96.845, 90.783, 58.045],
    [16600.0, 5.182, 21.022, 97.366, 91.384, 58.642],
    // climb
    [-2000.0, 30.8, 56.87, 80.28, 72.0, 0.0],
    [2000.0, 20.99, 48.157, 82.58, 74.159, 0.0],
    [5000.0, 16.139, 43.216, 84.642, 75.737, 0.0],
    [8000.0, 7.342, 38.17, 86.835, 77.338, 0.0],
    [10000.0, 4.051, 34.518, 88.183, 77.999, 0.0],
    [10000.1, 4.051, 34.518, 87.453, 77.353, 0.0],
    [12000.0, 0.76, 30.865, 88.303, 78.66, 0.0],
    [15000.0, -4.859, 25.039, 89.748, 79.816, 0.0],
    [17000.0, -9.934, 19.813, 90.668, 80.895, 0.0],
    [20000.0, -15.822, 13.676, 92.106, 81.894, 0.0],
    [24000.0, -22.75, 6.371, 93.651, 82.716, 0.0],
    [27000.0, -29.105, -0.304, 93.838, 83.26, 0.0],
    [29314.0, -32.049, -3.377, 93.502, 82.962, 0.0],
    [31000.0, -34.98, -6.452, 95.392, 84.11, 0.0],
    [35000.0, -45.679, -17.15, 96.104, 85.248, 0.0],
    [39000.0, -45.679, -17.15, 96.205, 84.346, 0.0],
    [41500.0, -45.679, -17.15, 95.676, 83.745, 0.0],
    // maximum continuous
    [-1000.0, 26.995, 54.356, 82.465, 74.086, 0.0],
    [3000.0, 18.17, 45.437, 86.271, 77.802, 0.0],
    [7000.0, 9.23, 40.266, 89.128, 79.604, 0.0],
    [11000.0, 4.019, 31.046, 92.194, 82.712, 0.0],
    [15000.0, -5.226, 21.649, 95.954, 85.622, 0.0],
    [17000.0, -9.913, 20.702, 97.52, 85.816, 0.0],
    [20000.0, -15.129, 15.321, 99.263, 86.77, 0.0],
    [22000.0, -19.947, 10.382, 98.977, 86.661, 0.0],
    [25000.0, -25.397, 4.731, 98.44, 85.765, 0.0],
    [27000.0, -30.369, -0.391, 97.279, 85.556, 0.0],
    [31000.0, -36.806, -7.165, 98.674, 86.65, 0.0],
    [35000.0, -43.628, -14.384, 98.386, 85.747, 0.0],
    [39000.0, -47.286, -18.508, 97.278, 85.545, 0.0],
];

/// Thrust rating the table is evaluated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitType {
    Takeoff,
    GoAround,
    Climb,
    MaximumContinuous,
}

impl LimitType {
    /// Rating from its table index (0 TO, 1 GA, 2 CLB, 3 MCT).
    pub fn from_index(index: i64) -> ModelResult<Self> {
        match index {
            0 => Ok(LimitType::Takeoff),
            1 => Ok(LimitType::GoAround),
            2 => Ok(LimitType::Climb),
            3 => Ok(LimitType::MaximumContinuous),
            code => Err(ModelError::UnknownLimitType { code }),
        }
    }

    /// First and last table row of the rating's band.
    fn band(self) -> (usize, usize) {
        match self {
            LimitType::Takeoff => (0, 20),
            LimitType::GoAround => (21, 41),
            LimitType::Climb => (42, 58),
            LimitType::MaximumContinuous => (59, 71),
        }
    }

    /// Takeoff ratings accept a flex temperature.
    pub fn accepts_flex(self) -> bool {
        matches!(self, LimitType::Takeoff | LimitType::GoAround)
    }

    /// Mach number the rating is corrected at.
    pub fn reference_mach(self, altitude_ft: Real, ambient_pressure_hpa: Real) -> Real {
        match self {
            LimitType::Takeoff => 0.0,
            LimitType::GoAround => 0.225,
            LimitType::Climb if altitude_ft <= 10_000.0 => cas_to_mach(250.0, ambient_pressure_hpa),
            LimitType::Climb => cas_to_mach(300.0, ambient_pressure_hpa).min(0.78),
            LimitType::MaximumContinuous => cas_to_mach(230.0, ambient_pressure_hpa),
        }
    }
}

/// Band values interpolated at one altitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimitPoint {
    pub corner_point: Real,
    pub limit_point: Real,
    pub cn1_flat: Real,
    pub cn1_last: Real,
    pub cn1_flex: Real,
}

/// Interpolate the band at `altitude_ft`, holding the end rows outside it.
pub fn limit_point(limit: LimitType, altitude_ft: Real) -> LimitPoint {
    let (first, last) = limit.band();
    let (lo, hi) = if altitude_ft <= LIMITS[first][ALT] {
        (first, first)
    } else if altitude_ft >= LIMITS[last][ALT] {
        (last, last)
    } else {
        // Inside the band some row strictly above the altitude exists.
        let hi = (first..=last)
            .find(|&row| altitude_ft < LIMITS[row][ALT])
            .unwrap_or(last);
        (hi - 1, hi)
    };

    let column = |col: usize| {
        interpolate(
            altitude_ft,
            LIMITS[lo][ALT],
            LIMITS[hi][ALT],
            LIMITS[lo][col],
            LIMITS[hi][col],
        )
    };

    LimitPoint {
        corner_point: column(CP),
        limit_point: column(LP),
        cn1_flat: column(FLAT),
        cn1_last: column(LAST),
        cn1_flex: column(FLEX),
    }
}

/// Line through `(x0, y0)` and `(x1, y1)` evaluated at `x`, unclamped.
fn line(x: Real, x0: Real, y0: Real, x1: Real, y1: Real) -> Real {
    let m = (y1 - y0) / (x1 - x0);
    y1 + m * (x - x1)
}

fn flex_applies(limit: LimitType, flex_temp_c: Real) -> bool {
    flex_temp_c > 0.0 && limit.accepts_flex()
}

/// Corrected N1 limit before the Mach correction and bleed deductions.
pub fn corrected_limit_n1(
    limit: LimitType,
    altitude_ft: Real,
    ambient_temp_c: Real,
    flex_temp_c: Real,
) -> Real {
    let p = limit_point(limit, altitude_ft);
    let rated_line = |t: Real| line(t, p.corner_point, p.cn1_flat, p.limit_point, p.cn1_last);

    if flex_applies(limit, flex_temp_c) {
        if flex_temp_c <= p.corner_point {
            p.cn1_flat
        } else if flex_temp_c > p.limit_point {
            line(
                flex_temp_c,
                p.limit_point,
                p.cn1_last,
                FLEX_REFERENCE_TEMP,
                p.cn1_flex,
            )
        } else {
            rated_line(flex_temp_c)
        }
    } else if ambient_temp_c <= p.corner_point {
        p.cn1_flat
    } else {
        rated_line(ambient_temp_c)
    }
}

/// Air bleed consumers that derate the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BleedConfig {
    pub packs: bool,
    pub nacelle_anti_ice: bool,
    pub wing_anti_ice: bool,
}

impl BleedConfig {
    pub const OFF: BleedConfig = BleedConfig {
        packs: false,
        nacelle_anti_ice: false,
        wing_anti_ice: false,
    };
}

/// N1 deduction (negative, %) for the active bleed consumers.
pub fn bleed_total(
    limit: LimitType,
    altitude_ft: Real,
    ambient_temp_c: Real,
    point: &LimitPoint,
    flex_temp_c: Real,
    bleed: BleedConfig,
) -> Real {
    let below_corner = ambient_temp_c < point.corner_point;
    let low_alt = altitude_ft < BLEED_HIGH_ALT_FT;

    // (packs, nacelle anti-ice, wing anti-ice)
    let (packs, nai, wai) = if flex_temp_c > point.limit_point && limit.accepts_flex() {
        (-0.6, -0.7, -0.7)
    } else {
        match (limit, low_alt, below_corner) {
            (LimitType::Takeoff, true, true) => (-0.4, 0.0, 0.0),
            (LimitType::Takeoff, true, false) => (-0.5, -0.6, -0.7),
            (LimitType::Takeoff, false, true) => (-0.6, 0.0, 0.0),
            (LimitType::Takeoff, false, false) => (-0.7, -0.8, -0.8),
            (LimitType::GoAround, true, true) => (-0.4, 0.0, 0.0),
            (LimitType::GoAround, true, false) => (-0.4, -0.6, -0.6),
            (LimitType::GoAround, false, true) => (-0.6, 0.0, 0.0),
            (LimitType::GoAround, false, false) => (-0.6, -0.7, -0.8),
            (LimitType::Climb, _, true) => (-0.2, 0.0, 0.0),
            (LimitType::Climb, _, false) => (-0.3, -0.8, -0.4),
            (LimitType::MaximumContinuous, _, true) => (-0.6, 0.0, 0.0),
            (LimitType::MaximumContinuous, _, false) => (-0.6, -0.9, -1.2),
        }
    };

    let on = |enabled: bool, v: Real| if enabled { v } else { 0.0 };
    on(bleed.packs, packs) + on(bleed.nacelle_anti_ice, nai) + on(bleed.wing_anti_ice, wai)
}

/// N1 thrust limit (%) for a rating at the given conditions.
pub fn limit_n1(
    limit: LimitType,
    altitude_ft: Real,
    ambient_temp_c: Real,
    ambient_pressure_hpa: Real,
    flex_temp_c: Real,
    bleed: BleedConfig,
) -> Real {
    let point = limit_point(limit, altitude_ft);
    let cn1 = corrected_limit_n1(limit, altitude_ft, ambient_temp_c, flex_temp_c);
    let mach = limit.reference_mach(altitude_ft, ambient_pressure_hpa);
    let deduction = bleed_total(limit, altitude_ft, ambient_temp_c, &point, flex_temp_c, bleed);
    cn1 * theta2(mach, ambient_temp_c).sqrt() + deduction
}

#[cfg(test)]
mod tests {
    use super::*;
    use fadec_core::{Tolerances, nearly_equal};

    const ALL: [LimitType; 4] = [
        LimitType::Takeoff,
        LimitType::GoAround,
        LimitType::Climb,
        LimitType::MaximumContinuous,
    ];

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        }
    }

    #[test]
    fn bands_strictly_increase_in_altitude() {
        for limit in ALL {
            let (first, last) = limit.band();
            for row in first..last {
                assert!(LIMITS[row + 1][ALT] > LIMITS[row][ALT], "{limit:?} row {row}");
            }
        }
    }

    #[test]
    fn band_edges_clamp() {
        let below = limit_point(LimitType::Takeoff, -5_000.0);
        assert_eq!(below.cn1_flat, 81.351);
        let above = limit_point(LimitType::Climb, 50_000.0);
        assert_eq!(above.cn1_flat, 95.676);
    }

    #[test]
    fn takeoff_corner_point_at_sea_level() {
        // Sea level takeoff: corner point 44 °C, limit point 55 °C.
        let at_cp = corrected_limit_n1(LimitType::Takeoff, 0.0, 44.0, 0.0);
        assert!(nearly_equal(at_cp, 83.832, tol()));
        let at_lp = corrected_limit_n1(LimitType::Takeoff, 0.0, 55.0, 0.0);
        assert!(nearly_equal(at_lp, 80.776, tol()));
    }

    #[test]
    fn takeoff_limit_at_corner_point_without_bleed() {
        let n1 = limit_n1(LimitType::Takeoff, 0.0, 44.0, 1013.0, 0.0, BleedConfig::OFF);
        let expected = 83.832 * theta2(0.0, 44.0).sqrt();
        assert!(nearly_equal(n1, expected, tol()));
    }

    #[test]
    fn flex_reaches_cn1_flex_at_reference_temperature() {
        let cn1 = corrected_limit_n1(LimitType::Takeoff, 0.0, 15.0, 100.0);
        assert!(nearly_equal(cn1, 62.655, tol()));
    }

    #[test]
    fn flex_ignored_for_climb() {
        let with_flex = corrected_limit_n1(LimitType::Climb, 5_000.0, 10.0, 60.0);
        let without = corrected_limit_n1(LimitType::Climb, 5_000.0, 10.0, 0.0);
        assert_eq!(with_flex, without);
    }

    #[test]
    fn bleed_deductions_zeroed_when_off() {
        let point = limit_point(LimitType::MaximumContinuous, 20_000.0);
        let all = BleedConfig {
            packs: true,
            nacelle_anti_ice: true,
            wing_anti_ice: true,
        };
        let hot = point.corner_point + 1.0;
        assert!(nearly_equal(
            bleed_total(LimitType::MaximumContinuous, 20_000.0, hot, &point, 0.0, all),
            -2.7,
            tol()
        ));
        assert_eq!(
            bleed_total(LimitType::MaximumContinuous, 20_000.0, hot, &point, 0.0, BleedConfig::OFF),
            0.0
        );
        let packs_only = BleedConfig {
            packs: true,
            ..BleedConfig::OFF
        };
        assert!(nearly_equal(
            bleed_total(LimitType::MaximumContinuous, 20_000.0, hot, &point, 0.0, packs_only),
            -0.6,
            tol()
        ));
    }

    #[test]
    fn flex_bleed_row_applies_above_limit_point() {
        let point = limit_point(LimitType::Takeoff, 0.0);
        let all = BleedConfig {
            packs: true,
            nacelle_anti_ice: true,
            wing_anti_ice: true,
        };
        assert!(nearly_equal(
            bleed_total(LimitType::Takeoff, 0.0, 15.0, &point, 60.0, all),
            -2.0,
            tol()
        ));
    }

    #[test]
    fn climb_mach_capped_above_ten_thousand_feet() {
        let m = LimitType::Climb.reference_mach(35_000.0, 238.0);
        assert!(m <= 0.78);
        let low = LimitType::Climb.reference_mach(5_000.0, 843.0);
        assert!(low > 0.3 && low < 0.5);
    }

    #[test]
    fn unknown_limit_index_is_rejected() {
        assert!(LimitType::from_index(4).is_err());
        assert_eq!(LimitType::from_index(2), Ok(LimitType::Climb));
    }
}
