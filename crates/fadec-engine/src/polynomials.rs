//! Regression polynomials and decay laws for the engine model.
//!
//! Speeds are % of rated, temperatures °C, fuel flow lb/h (corrected) or in
//! the caller's unit for the idle-relative start laws, altitude ft.

use fadec_core::{Real, polyval};

/// Corrected core speed at idle that the start polynomial was fitted on.
const START_N2_REFERENCE: Real = 68.2;

const C_START_N2: [Real; 16] = [
    4.036_498_79e+00,
    -9.419_819_60e-01,
    1.984_266_14e-01,
    -2.119_078_40e-02,
    1.007_775_07e-03,
    -1.573_191_66e-06,
    -2.150_348_88e-06,
    1.082_883_79e-07,
    -2.485_046_32e-09,
    2.523_070_89e-11,
    -2.068_692_43e-14,
    8.990_457_61e-16,
    -9.948_539_59e-17,
    1.853_664_99e-18,
    -1.448_699_28e-20,
    4.310_330_31e-23,
];

const C_START_N1: [Real; 9] = [
    -2.281_215_6e-12,
    -5.983_037_4e+01,
    7.062_909_4e+02,
    -3.458_036_1e+03,
    9.142_892_3e+03,
    -1.409_774_0e+04,
    1.270_411_0e+04,
    -6.209_993_5e+03,
    1.273_307_1e+03,
];

const C_START_FF: [Real; 9] = [
    3.111_028_2e-12,
    1.080_433_1e+02,
    -1.397_262_9e+03,
    7.487_413_1e+03,
    -2.151_198_3e+04,
    3.595_775_7e+04,
    -3.509_399_4e+04,
    1.857_303_3e+04,
    -4.122_006_2e+03,
];

const C_START_EGT: [Real; 9] = [
    -6.872_516_7e+02,
    7.754_886_4e+03,
    -3.750_709_8e+04,
    1.014_701_6e+05,
    -1.677_927_3e+05,
    1.735_715_7e+05,
    -1.096_092_4e+05,
    3.859_195_6e+04,
    -5.791_260_0e+03,
];

/// Smallest per-frame rise of core speed during a start.
pub const START_N2_MIN_STEP: Real = 0.002;
/// Margin above idle that start outputs may not exceed.
pub const START_IDLE_MARGIN: Real = 0.1;

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

/// Core speed spin-down. The decay rate switches below 30 %.
pub fn shutdown_n2(previous_n2: Real, dt: Real) -> Real {
    let rate = if previous_n2 < 30.0 { -0.0515 } else { -0.081_83 };
    previous_n2 * (rate * dt).exp()
}

/// Fan speed spin-down. The decay rate switches below 4 %.
pub fn shutdown_n1(previous_n1: Real, dt: Real) -> Real {
    let rate = if previous_n1 < 4.0 { -0.08 } else { -0.164 };
    previous_n1 * (rate * dt).exp()
}

/// EGT cool-down toward an ambient-relative floor.
///
/// Above ambient + 140 °C the gas path cools fast toward ambient + 135 °C;
/// below it the casing soaks slowly toward ambient + 30 °C.
pub fn shutdown_egt(previous_egt: Real, ambient_temp: Real, dt: Real) -> Real {
    let threshold = ambient_temp + 140.0;
    let (rate, steady) = if previous_egt > threshold {
        (0.025_774_3, 135.0 + ambient_temp)
    } else {
        (0.000_727_56, 30.0 + ambient_temp)
    };
    steady + (previous_egt - steady) * (-rate * dt).exp()
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

/// Next core speed during a start.
///
/// Never less than `previous + START_N2_MIN_STEP` and never above
/// `idle_n2 + START_IDLE_MARGIN`.
pub fn start_n2(sensor_n2: Real, previous_n2: Real, idle_n2: Real) -> Real {
    let normal = sensor_n2 * START_N2_REFERENCE / idle_n2;
    let out = polyval(&C_START_N2, normal);
    (out * sensor_n2)
        .max(previous_n2 + START_N2_MIN_STEP)
        .min(idle_n2 + START_IDLE_MARGIN)
}

/// Fan speed during a start as a function of core speed.
pub fn start_n1(n2: Real, idle_n2: Real, idle_n1: Real) -> Real {
    let x = n2 / idle_n2;
    let pre = -2.469_808_7 * x.powi(3) + 0.966_202_6 * x.powi(2) + 0.070_136_7 * x;
    let post = polyval(&C_START_N1, x);
    post.max(pre) * idle_n1
}

/// Fuel flow during a start. Zero until core speed reaches 37 % of idle.
pub fn start_ff(n2: Real, idle_n2: Real, idle_ff: Real) -> Real {
    let x = n2 / idle_n2;
    let normal = if x <= 0.37 {
        0.0
    } else {
        polyval(&C_START_FF, x)
    };
    normal.max(0.0) * idle_ff
}

/// EGT during a start, scaled between ambient and idle EGT.
pub fn start_egt(n2: Real, idle_n2: Real, ambient_temp: Real, idle_egt: Real) -> Real {
    let x = n2 / idle_n2;
    let normal = if x < 0.17 {
        0.0
    } else if x <= 0.4 {
        0.047_83 * x - 0.008_13
    } else {
        polyval(&C_START_EGT, x)
    };
    normal * (idle_egt - ambient_temp) + ambient_temp
}

/// Three-step oil temperature during a start.
pub fn start_oil_temp(n2: Real, idle_n2: Real, ambient_temp: Real) -> Real {
    if n2 < 0.79 * idle_n2 {
        ambient_temp
    } else if n2 < 0.98 * idle_n2 {
        ambient_temp + 5.0
    } else {
        ambient_temp + 10.0
    }
}

// ---------------------------------------------------------------------------
// Steady state
// ---------------------------------------------------------------------------

/// Corrected EGT (°C) from corrected fan speed, corrected fuel flow (lb/h),
/// Mach and altitude (ft).
pub fn corrected_egt(cn1: Real, cff: Real, mach: Real, alt: Real) -> Real {
    3.2636e+02
        + 9.2893e-01 * cn1
        + 3.9505e-02 * cff
        + 3.9070e+02 * mach
        - 4.7911e-04 * alt
        + 7.7679e-03 * cn1.powi(2)
        + 5.8361e-05 * cn1 * cff
        - 2.5566e+00 * cn1 * mach
        + 5.1227e-06 * cn1 * alt
        + 1.0178e-07 * cff.powi(2)
        - 7.4602e-03 * mach * cff
        + 1.2106e-07 * cff * alt
        - 5.1639e+01 * mach.powi(2)
        - 2.7356e-03 * mach * alt
        + 1.9312e-08 * alt.powi(2)
}

/// Corrected fuel flow (lb/h) from corrected fan speed, Mach and altitude.
pub fn corrected_fuel_flow(cn1: Real, mach: Real, alt: Real) -> Real {
    -1.7630e+02 - 2.1542e-01
        + 4.7119e+01 * cn1
        + 6.1519e+02 * mach
        + 1.8047e-03 * alt
        - 4.4554e-01 * cn1.powi(2)
        - 4.3940e+01 * cn1 * mach
        + 4.0459e-05 * cn1 * alt
        - 3.2912e+01 * mach.powi(2)
        - 6.2894e-03 * mach * alt
        - 1.2544e-07 * alt.powi(2)
        + 1.0938e-02 * cn1.powi(3)
        + 4.0936e-01 * cn1.powi(2) * mach
        - 5.5841e-06 * cn1.powi(2) * alt
        - 2.3829e+01 * cn1 * mach.powi(2)
        + 9.3269e-04 * cn1 * mach * alt
        + 2.0273e-11 * cn1 * alt.powi(2)
        - 2.4100e+02 * mach.powi(3)
        + 1.4171e-02 * mach.powi(2) * alt
        - 9.5581e-07 * mach * alt.powi(2)
        + 1.2728e-11 * alt.powi(3)
}

/// Oil temperature lag toward `max_oil_temp`, cooled by thermal energy.
///
/// Saturates at the maximum and damps slightly in the last 10 °C below it.
pub fn oil_temperature(energy: Real, previous: Real, max_oil_temp: Real, dt: Real) -> Real {
    const K: Real = 0.001;
    let cooling = energy * dt * 0.002;
    let t_steady = (max_oil_temp * K * dt + previous) / (1.0 + K * dt);
    let t = t_steady - cooling;
    if t >= max_oil_temp {
        max_oil_temp
    } else if t >= max_oil_temp - 10.0 {
        t * 0.999_997
    } else {
        t
    }
}

/// Fraction of the oil held in the engine at a given thrust (N).
pub fn oil_gulp_fraction(thrust: Real) -> Real {
    (20.196_884_8 - 1.227_030_2e-4 * thrust + 1.784_42e-8 * thrust.powi(2)) / 100.0
}

/// Oil pressure (psi) from core speed.
pub fn oil_pressure(n2: Real) -> Real {
    -0.889_21 + 0.237_11 * n2 + 0.006_82 * n2.powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_polynomials_reach_one_at_idle() {
        assert!((polyval(&C_START_N1, 1.0) - 1.0).abs() < 1e-3);
        assert!((polyval(&C_START_FF, 1.0) - 1.0).abs() < 1e-3);
        assert!((polyval(&C_START_EGT, 1.0) - 1.0).abs() < 1e-2);
    }

    #[test]
    fn start_n2_is_bounded() {
        let idle = 68.2;
        let next = start_n2(10.0, 10.0, idle);
        assert!(next >= 10.0 + START_N2_MIN_STEP);
        assert!(next <= idle + START_IDLE_MARGIN);

        let capped = start_n2(idle, idle + 0.5, idle);
        assert_eq!(capped, idle + START_IDLE_MARGIN);
    }

    #[test]
    fn start_ff_zero_below_light_off() {
        assert_eq!(start_ff(0.3 * 68.2, 68.2, 300.0), 0.0);
        assert!(start_ff(0.9 * 68.2, 68.2, 300.0) > 0.0);
    }

    #[test]
    fn start_egt_is_ambient_before_light_off() {
        assert_eq!(start_egt(0.1 * 68.2, 68.2, 12.0, 390.0), 12.0);
        let at_idle = start_egt(68.2, 68.2, 12.0, 390.0);
        assert!((at_idle - 390.0).abs() < 5.0);
    }

    #[test]
    fn start_oil_temp_steps() {
        assert_eq!(start_oil_temp(50.0, 68.2, 10.0), 10.0);
        assert_eq!(start_oil_temp(60.0, 68.2, 10.0), 15.0);
        assert_eq!(start_oil_temp(68.0, 68.2, 10.0), 20.0);
    }

    #[test]
    fn shutdown_laws_switch_regime_at_threshold() {
        let dt = 1.0;
        assert!((shutdown_n2(50.0, dt) - 50.0 * (-0.08183_f64).exp()).abs() < 1e-12);
        assert!((shutdown_n2(20.0, dt) - 20.0 * (-0.0515_f64).exp()).abs() < 1e-12);
        assert!((shutdown_n1(3.0, dt) - 3.0 * (-0.08_f64).exp()).abs() < 1e-12);

        let hot = shutdown_egt(600.0, 15.0, dt);
        assert!(hot < 600.0 && hot > 150.0);
        let cool = shutdown_egt(100.0, 15.0, dt);
        assert!(cool < 100.0 && cool > 45.0);
    }

    #[test]
    fn oil_temperature_saturates() {
        assert_eq!(oil_temperature(0.0, 200.0, 90.0, 1.0), 90.0);
        let near = oil_temperature(0.0, 85.0, 90.0, 1.0);
        assert!(near < 90.0 && near > 84.9);
    }

    #[test]
    fn oil_pressure_rises_with_core_speed() {
        assert!(oil_pressure(95.0) > oil_pressure(68.0));
    }

    #[test]
    fn gulp_fraction_at_zero_thrust() {
        assert!((oil_gulp_fraction(0.0) - 0.201_968_848).abs() < 1e-12);
    }
}
