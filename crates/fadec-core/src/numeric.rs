use crate::{FadecError, FadecResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Smallest frame step any rate or decay law is allowed to see (seconds).
pub const MIN_FRAME_DT_S: Real = 0.002;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> FadecResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FadecError::NonFinite { what, value: v })
    }
}

/// Linear interpolation of `y` over `x` between `(x0, y0)` and `(x1, y1)`.
///
/// Outside `[x0, x1]` the result is held at the nearest end point, so table
/// lookups never extrapolate. A degenerate interval returns `y0`.
pub fn interpolate(x: Real, x0: Real, x1: Real, y0: Real, y1: Real) -> Real {
    if x1 == x0 {
        return y0;
    }
    let (lo, hi) = if x0 < x1 { (x0, x1) } else { (x1, x0) };
    let x = x.clamp(lo, hi);
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Clamp to `[0, 1]`.
#[inline]
pub fn unit_clamp(v: Real) -> Real {
    v.clamp(0.0, 1.0)
}

/// Frame step as seen by the engine models.
///
/// Zero, negative and non-finite steps collapse to [`MIN_FRAME_DT_S`].
#[inline]
pub fn floor_delta_time(dt: Real) -> Real {
    if dt.is_finite() {
        dt.max(MIN_FRAME_DT_S)
    } else {
        MIN_FRAME_DT_S
    }
}

/// Evaluate `sum(c[i] * x^i)` with Horner's scheme.
pub fn polyval(coefficients: &[Real], x: Real) -> Real {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn interpolate_holds_end_points() {
        assert_eq!(interpolate(-5.0, 0.0, 10.0, 1.0, 2.0), 1.0);
        assert_eq!(interpolate(15.0, 0.0, 10.0, 1.0, 2.0), 2.0);
        assert!((interpolate(5.0, 0.0, 10.0, 1.0, 2.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn interpolate_degenerate_interval() {
        assert_eq!(interpolate(3.0, 2.0, 2.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn interpolate_descending_axis() {
        assert!((interpolate(2.5, 5.0, 0.0, 10.0, 0.0) - 5.0).abs() < 1e-12);
        assert_eq!(interpolate(6.0, 5.0, 0.0, 10.0, 0.0), 10.0);
    }

    #[test]
    fn delta_time_floor() {
        assert_eq!(floor_delta_time(0.0), MIN_FRAME_DT_S);
        assert_eq!(floor_delta_time(-1.0), MIN_FRAME_DT_S);
        assert_eq!(floor_delta_time(Real::NAN), MIN_FRAME_DT_S);
        assert_eq!(floor_delta_time(0.016), 0.016);
    }

    #[test]
    fn polyval_matches_naive_sum() {
        let c = [1.0, -2.0, 0.5, 0.25];
        let x: Real = 1.7;
        let naive: Real = c.iter().enumerate().map(|(i, ci)| ci * x.powi(i as i32)).sum();
        assert!(nearly_equal(polyval(&c, x), naive, Tolerances::default()));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn interpolate_stays_between_end_values(
            x in -100.0_f64..200.0,
            y0 in -50.0_f64..50.0,
            y1 in -50.0_f64..50.0,
        ) {
            let y = interpolate(x, 0.0, 100.0, y0, y1);
            prop_assert!(y >= y0.min(y1) - 1e-9);
            prop_assert!(y <= y0.max(y1) + 1e-9);
        }

        #[test]
        fn floored_delta_time_is_positive(dt in proptest::num::f64::ANY) {
            prop_assert!(floor_delta_time(dt) >= MIN_FRAME_DT_S);
        }
    }
}
