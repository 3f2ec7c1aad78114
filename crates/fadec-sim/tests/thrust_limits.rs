//! Thrust limit outputs across a takeoff and climb.

use fadec_controls::ThrustLimitType;
use fadec_engine::{BleedConfig, LimitType, limit_n1};
use fadec_sim::{Ambient, Fadec, FadecConfig, FrameInputs, LimitInputs, ThrustLimitComputer};

fn running_fadec(ambient: Ambient) -> (Fadec, FrameInputs) {
    let config = FadecConfig {
        seed: Some(1),
        ..FadecConfig::default()
    };
    let mut fadec = Fadec::new(2, config).unwrap();
    let mut frame = FrameInputs::ground(2);
    frame.identity = Some("F-WXWB".into());
    frame.ambient = ambient;
    fadec.update(&frame).unwrap();
    frame.sim_time = 0.05;
    (fadec, frame)
}

#[test]
fn hot_day_toga_is_takeoff_rating() {
    let ambient = Ambient {
        temperature_c: 44.0,
        ..Ambient::default()
    };
    let (mut fadec, frame) = running_fadec(ambient);
    let out = fadec.update(&frame).unwrap();

    let to = limit_n1(LimitType::Takeoff, 0.0, 44.0, 1013.0, 0.0, BleedConfig::OFF);
    assert!((out.limits.toga - to).abs() < 1e-9, "{} vs {to}", out.limits.toga);
    assert!(out.limits.toga > out.limits.climb);
}

#[test]
fn bleed_lowers_climb_limit() {
    let (mut fadec, mut frame) = running_fadec(Ambient::default());
    let clean = fadec.update(&frame).unwrap().limits.climb;

    frame.sim_time = 0.1;
    frame.bleed = BleedConfig {
        packs: true,
        nacelle_anti_ice: true,
        wing_anti_ice: true,
    };
    let bled = fadec.update(&frame).unwrap().limits.climb;
    assert!(bled < clean, "{bled} !< {clean}");
}

#[test]
fn flex_to_climb_is_continuous() {
    let mut computer = ThrustLimitComputer::default();
    let ambient = Ambient::default();
    let mut inp = LimitInputs {
        sim_time: 0.0,
        limit_type: ThrustLimitType::Flex,
        flex_temp_c: 65.0,
        bleed: BleedConfig::OFF,
        idle_n1: 19.0,
        highest_n1: 0.0,
    };

    let dt = 0.1;
    let ramp = computer.config.ramp_per_s * dt + 1e-9;
    let mut previous = computer.compute(&ambient, &inp).climb;
    for step in 1..3_000 {
        inp.sim_time = f64::from(step) * dt;
        if inp.sim_time >= 30.0 {
            inp.limit_type = ThrustLimitType::Climb;
        }
        let climb = computer.compute(&ambient, &inp).climb;
        assert!(
            (climb - previous).abs() <= ramp,
            "jump at t={}: {previous} -> {climb}",
            inp.sim_time
        );
        previous = climb;
    }

    let clb = limit_n1(LimitType::Climb, 0.0, 15.0, 1013.0, 0.0, BleedConfig::OFF);
    assert!((previous - clb).abs() < 1e-9);
    assert!(!computer.transition.transition_active);
}

#[test]
fn cruise_folds_toga_into_mct() {
    let ambient = Ambient {
        pressure_altitude_ft: 37_000.0,
        mach: 0.8,
        temperature_c: -56.5,
        pressure_hpa: 217.0,
        on_ground: false,
    };
    let (mut fadec, frame) = running_fadec(ambient);
    let limits = fadec.update(&frame).unwrap().limits;
    assert_eq!(limits.toga, limits.maximum_continuous);
    assert!(limits.maximum_continuous >= limits.climb);
    assert!(limits.idle > 0.0);
}
