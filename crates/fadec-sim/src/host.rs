//! Bridge between named host variables and frame records.
//!
//! The host exposes plain numeric variables by name. Per-engine variables
//! carry the 1-based engine number as a `:N` suffix.

use std::collections::HashMap;

use fadec_controls::{Igniter, StarterCommand, ThrustLimitType};
use fadec_core::{Real, deg_c, ensure_finite, ft, hpa, in_newtons, lbf};
use fadec_engine::BleedConfig;

use crate::error::{SimError, SimResult};
use crate::frame::{Ambient, EngineInputs, FrameInputs, FrameOutputs};
use crate::fuel::{FuelInputs, FuelTanks};

/// Named numeric variables owned by the host simulation.
pub trait HostVariables {
    fn read(&self, name: &str) -> Option<Real>;
    fn write(&mut self, name: &str, value: Real);
    /// Aircraft registration, once the host has it.
    fn identity(&self) -> Option<&str>;
}

/// Variable names read and written by the bridge.
pub mod names {
    pub const SIM_TIME: &str = "SIMULATION TIME";
    pub const PRESSURE_ALTITUDE: &str = "PRESSURE ALTITUDE";
    pub const MACH: &str = "AIRSPEED MACH";
    pub const AMBIENT_TEMPERATURE: &str = "AMBIENT TEMPERATURE";
    pub const AMBIENT_PRESSURE: &str = "AMBIENT PRESSURE";
    pub const ON_GROUND: &str = "SIM ON GROUND";
    pub const PACKS: &str = "PACKS STATE";
    pub const NACELLE_ANTI_ICE: &str = "ENG ANTI ICE";
    pub const WING_ANTI_ICE: &str = "WING ANTI ICE";
    pub const THRUST_LIMIT_TYPE: &str = "AUTOTHRUST THRUST LIMIT TYPE";
    pub const FLEX_TEMPERATURE: &str = "AIRLINER TO FLEX TEMP";
    pub const IMBALANCE: &str = "ENGINE IMBALANCE";

    pub const IGNITER: &str = "TURB ENG IGNITION SWITCH EX1";
    pub const STARTER: &str = "GENERAL ENG STARTER";
    pub const STARTER_PRESSURIZED: &str = "PNEUMATIC STARTER PRESSURIZED";
    pub const FUEL_VALVE: &str = "FUELSYSTEM VALVE OPEN";
    pub const SENSOR_N1: &str = "TURB ENG N1";
    pub const SENSOR_N2: &str = "TURB ENG N2";
    pub const CORRECTED_N1: &str = "TURB ENG CORRECTED N1";
    pub const THRUST: &str = "TURB ENG JET THRUST";
    pub const COMBUSTION: &str = "GENERAL ENG COMBUSTION";

    pub const TANK_LEFT: &str = "FUEL TANK LEFT MAIN QUANTITY";
    pub const TANK_RIGHT: &str = "FUEL TANK RIGHT MAIN QUANTITY";
    pub const TANK_LEFT_AUX: &str = "FUEL TANK LEFT AUX QUANTITY";
    pub const TANK_RIGHT_AUX: &str = "FUEL TANK RIGHT AUX QUANTITY";
    pub const TANK_CENTER: &str = "FUEL TANK CENTER QUANTITY";
    pub const FUEL_WEIGHT: &str = "FUEL WEIGHT PER GALLON";
    pub const CROSSFEED: &str = "FUELSYSTEM CROSSFEED VALVE";
    pub const APU_FUEL: &str = "APU FUEL CONSUMPTION";
    pub const APU_N: &str = "APU PCT RPM";
    pub const REFUEL_STARTED: &str = "REFUEL STARTED BY USER";
    pub const REFUEL_RATE: &str = "REFUEL RATE SETTING";

    pub const ENGINE_STATE: &str = "ENGINE STATE";
    pub const ENGINE_TIMER: &str = "ENGINE TIMER";
    pub const ENGINE_N1: &str = "ENGINE N1";
    pub const ENGINE_N2: &str = "ENGINE N2";
    pub const ENGINE_FF: &str = "ENGINE FF";
    pub const ENGINE_EGT: &str = "ENGINE EGT";
    pub const ENGINE_OIL_TEMPERATURE: &str = "ENGINE OIL TEMPERATURE";
    pub const ENGINE_OIL_PRESSURE: &str = "ENGINE OIL PRESSURE";
    pub const ENGINE_OIL_QUANTITY: &str = "ENGINE OIL QUANTITY";
    pub const ENGINE_OIL_TOTAL: &str = "ENGINE OIL TOTAL";
    pub const ENGINE_FUEL_USED: &str = "ENGINE FUEL USED";
    pub const STARTER_HELD: &str = "SET STARTER HELD";

    pub const LIMIT_IDLE: &str = "THRUST LIMIT IDLE";
    pub const LIMIT_CLIMB: &str = "THRUST LIMIT CLB";
    pub const LIMIT_FLEX: &str = "THRUST LIMIT FLEX";
    pub const LIMIT_MCT: &str = "THRUST LIMIT MCT";
    pub const LIMIT_TOGA: &str = "THRUST LIMIT TOGA";
    pub const HIGHEST_N1: &str = "HIGHEST N1";

    /// `NAME:N` for engine `number`.
    pub fn indexed(name: &str, number: usize) -> String {
        format!("{name}:{number}")
    }
}

/// Host variables kept in a map, for tests and the scenario runner.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    values: HashMap<String, Real>,
    identity: Option<String>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_identity(&mut self, identity: impl Into<String>) {
        self.identity = Some(identity.into());
    }

    pub fn set(&mut self, name: impl Into<String>, value: Real) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Real> {
        self.values.get(name).copied()
    }
}

impl HostVariables for InMemoryHost {
    fn read(&self, name: &str) -> Option<Real> {
        self.get(name)
    }

    fn write(&mut self, name: &str, value: Real) {
        self.values.insert(name.to_owned(), value);
    }

    fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

/// Reads frame inputs from, and writes frame outputs to, a host.
#[derive(Debug, Clone, Copy)]
pub struct HostBridge {
    engine_count: usize,
}

fn require(host: &dyn HostVariables, name: &str) -> SimResult<Real> {
    let value = host.read(name).ok_or_else(|| SimError::MissingVariable {
        name: name.to_owned(),
    })?;
    ensure_finite(value, "host variable").map_err(|e| SimError::Backend {
        message: format!("{name}: {e}"),
    })
}

fn flag(host: &dyn HostVariables, name: &str) -> bool {
    host.read(name).is_some_and(|v| v > 0.5)
}

/// Missing and non-finite readings count as zero.
fn optional(host: &dyn HostVariables, name: &str) -> Real {
    host.read(name).filter(|v| v.is_finite()).unwrap_or(0.0)
}

impl HostBridge {
    pub fn new(engine_count: usize) -> Self {
        Self { engine_count }
    }

    /// Assemble this frame's inputs.
    ///
    /// Ambient and per-engine core variables are required and must be
    /// finite; fuel system and bleed switches default to off when the host
    /// does not publish them. The host publishes altitude in ft, temperature
    /// in degC, pressure in hPa and thrust in lbf.
    pub fn read_frame(&self, host: &dyn HostVariables) -> SimResult<FrameInputs> {
        use names::*;

        let ambient = Ambient::from_quantities(
            ft(require(host, PRESSURE_ALTITUDE)?),
            require(host, MACH)?,
            deg_c(require(host, AMBIENT_TEMPERATURE)?),
            hpa(require(host, AMBIENT_PRESSURE)?),
            flag(host, ON_GROUND),
        );

        let engines = (1..=self.engine_count)
            .map(|n| self.read_engine(host, n))
            .collect::<SimResult<Vec<_>>>()?;

        let limit_type = match host.read(THRUST_LIMIT_TYPE) {
            Some(code) => ThrustLimitType::try_from(code)?,
            None => ThrustLimitType::None,
        };

        Ok(FrameInputs {
            sim_time: require(host, SIM_TIME)?,
            identity: host.identity().map(str::to_owned),
            ambient,
            engines,
            bleed: BleedConfig {
                packs: flag(host, PACKS),
                nacelle_anti_ice: flag(host, NACELLE_ANTI_ICE),
                wing_anti_ice: flag(host, WING_ANTI_ICE),
            },
            limit_type,
            flex_temp_c: optional(host, FLEX_TEMPERATURE),
            shared_imbalance: host.read(IMBALANCE).filter(|&v| v != 0.0),
            fuel: self.read_fuel(host),
        })
    }

    fn read_engine(&self, host: &dyn HostVariables, n: usize) -> SimResult<EngineInputs> {
        use names::*;
        let req = |name: &str| require(host, &indexed(name, n));
        Ok(EngineInputs {
            igniter: Igniter::try_from(req(IGNITER)?)?,
            starter_engaged: req(STARTER)? > 0.5,
            starter_pressurized: flag(host, &indexed(STARTER_PRESSURIZED, n)),
            fuel_valve: req(FUEL_VALVE)?,
            sensor_n1: req(SENSOR_N1)?,
            sensor_n2: req(SENSOR_N2)?,
            corrected_n1: req(CORRECTED_N1)?,
            thrust_n: in_newtons(lbf(optional(host, &indexed(THRUST, n)))),
            combustion: flag(host, &indexed(COMBUSTION, n)),
        })
    }

    fn read_fuel(&self, host: &dyn HostVariables) -> FuelInputs {
        use names::*;
        let defaults = FuelInputs::default();
        let weight = host.read(FUEL_WEIGHT).unwrap_or(defaults.fuel_weight_lb_gal);
        let lb = |name: &str| optional(host, name) * weight;
        FuelInputs {
            tanks: FuelTanks {
                left: lb(TANK_LEFT),
                right: lb(TANK_RIGHT),
                left_aux: lb(TANK_LEFT_AUX),
                right_aux: lb(TANK_RIGHT_AUX),
                center: lb(TANK_CENTER),
            },
            crossfeed_open: flag(host, CROSSFEED),
            apu_gal_h: optional(host, APU_FUEL),
            apu_n: optional(host, APU_N),
            fuel_weight_lb_gal: weight,
            refuel_by_user: flag(host, REFUEL_STARTED),
            refuel_rate: optional(host, REFUEL_RATE),
            ..defaults
        }
    }

    /// Publish a frame's results. Nothing is written while awaiting identity.
    pub fn write_frame(&self, host: &mut dyn HostVariables, out: &FrameOutputs, fuel_weight_lb_gal: Real) {
        use crate::frame::FrameStatus;
        use names::*;

        if out.status == FrameStatus::AwaitingIdentity {
            return;
        }

        host.write(IMBALANCE, out.imbalance_code);
        for (i, e) in out.engines.iter().enumerate() {
            let n = i + 1;
            host.write(&indexed(ENGINE_STATE, n), e.state.code());
            host.write(&indexed(ENGINE_TIMER, n), e.timer);
            host.write(&indexed(ENGINE_N1, n), e.n1);
            host.write(&indexed(ENGINE_N2, n), e.n2);
            host.write(&indexed(ENGINE_FF, n), e.fuel_flow);
            host.write(&indexed(ENGINE_EGT, n), e.egt);
            host.write(&indexed(ENGINE_OIL_TEMPERATURE, n), e.oil_temperature);
            host.write(&indexed(ENGINE_OIL_PRESSURE, n), e.oil_pressure);
            host.write(&indexed(ENGINE_OIL_QUANTITY, n), e.oil_quantity);
            host.write(&indexed(ENGINE_OIL_TOTAL, n), e.oil_total);
            host.write(&indexed(ENGINE_FUEL_USED, n), e.fuel_used);
            match e.starter_command {
                Some(StarterCommand::Hold) => host.write(&indexed(STARTER_HELD, n), 1.0),
                Some(StarterCommand::Release) => host.write(&indexed(STARTER_HELD, n), 0.0),
                None => {}
            }
        }

        let l = &out.limits;
        host.write(LIMIT_IDLE, l.idle);
        host.write(LIMIT_CLIMB, l.climb);
        host.write(LIMIT_FLEX, l.flex);
        host.write(LIMIT_MCT, l.maximum_continuous);
        host.write(LIMIT_TOGA, l.toga);
        host.write(HIGHEST_N1, l.highest_n1);

        if let Some(tanks) = out.fuel {
            let gal = |lb: Real| if fuel_weight_lb_gal > 0.0 { lb / fuel_weight_lb_gal } else { 0.0 };
            host.write(TANK_LEFT, gal(tanks.left));
            host.write(TANK_RIGHT, gal(tanks.right));
            host.write(TANK_LEFT_AUX, gal(tanks.left_aux));
            host.write(TANK_RIGHT_AUX, gal(tanks.right_aux));
            host.write(TANK_CENTER, gal(tanks.center));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::names::*;
    use super::*;

    fn host() -> InMemoryHost {
        let mut h = InMemoryHost::new();
        h.set(SIM_TIME, 1.0);
        h.set(PRESSURE_ALTITUDE, 0.0);
        h.set(MACH, 0.0);
        h.set(AMBIENT_TEMPERATURE, 15.0);
        h.set(AMBIENT_PRESSURE, 1013.0);
        h.set(ON_GROUND, 1.0);
        for n in 1..=2 {
            h.set(indexed(IGNITER, n), 1.0);
            h.set(indexed(STARTER, n), 0.0);
            h.set(indexed(FUEL_VALVE, n), 0.0);
            h.set(indexed(SENSOR_N1, n), 0.0);
            h.set(indexed(SENSOR_N2, n), 0.0);
            h.set(indexed(CORRECTED_N1, n), 0.0);
        }
        h
    }

    #[test]
    fn reads_a_complete_frame() {
        let mut h = host();
        h.set(indexed(IGNITER, 2), 2.0);
        h.set(FLEX_TEMPERATURE, 55.0);
        h.set(THRUST_LIMIT_TYPE, 3.0);
        h.set(TANK_LEFT, 100.0);
        h.set(FUEL_WEIGHT, 6.7);
        h.set_identity("N320FB");

        let frame = HostBridge::new(2).read_frame(&h).unwrap();
        assert_eq!(frame.identity.as_deref(), Some("N320FB"));
        assert_eq!(frame.engines.len(), 2);
        assert_eq!(frame.engines[1].igniter, Igniter::Start);
        assert_eq!(frame.limit_type, ThrustLimitType::Flex);
        assert_eq!(frame.flex_temp_c, 55.0);
        assert!((frame.fuel.tanks.left - 670.0).abs() < 1e-9);
        assert!(frame.ambient.on_ground);
        assert_eq!(frame.shared_imbalance, None);
    }

    #[test]
    fn missing_variable_is_named() {
        let mut h = host();
        h.values.remove(&indexed(SENSOR_N2, 2));
        match HostBridge::new(2).read_frame(&h) {
            Err(SimError::MissingVariable { name }) => assert_eq!(name, "TURB ENG N2:2"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_igniter_position_is_an_error() {
        let mut h = host();
        h.set(indexed(IGNITER, 1), 7.0);
        assert!(matches!(
            HostBridge::new(2).read_frame(&h),
            Err(SimError::Backend { .. })
        ));
    }

    #[test]
    fn non_finite_required_variable_is_named() {
        let mut h = host();
        h.set(AMBIENT_TEMPERATURE, Real::NAN);
        match HostBridge::new(2).read_frame(&h) {
            Err(SimError::Backend { message }) => {
                assert!(message.starts_with("AMBIENT TEMPERATURE:"));
                assert!(message.contains("Non-finite"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_finite_optional_variable_reads_zero() {
        let mut h = host();
        h.set(FLEX_TEMPERATURE, Real::INFINITY);
        let frame = HostBridge::new(2).read_frame(&h).unwrap();
        assert_eq!(frame.flex_temp_c, 0.0);
    }

    #[test]
    fn readings_land_in_table_units() {
        let mut h = host();
        h.set(PRESSURE_ALTITUDE, 10_000.0);
        h.set(AMBIENT_TEMPERATURE, -4.8);
        h.set(AMBIENT_PRESSURE, 696.8);
        h.set(indexed(THRUST, 1), 1_000.0);

        let frame = HostBridge::new(2).read_frame(&h).unwrap();
        assert!((frame.ambient.pressure_altitude_ft - 10_000.0).abs() < 1e-6);
        assert!((frame.ambient.temperature_c + 4.8).abs() < 1e-9);
        assert!((frame.ambient.pressure_hpa - 696.8).abs() < 1e-9);
        assert!((frame.engines[0].thrust_n - 4_448.222).abs() < 1e-3);
        assert_eq!(frame.engines[1].thrust_n, 0.0);
    }

    #[test]
    fn awaiting_frame_writes_nothing() {
        let mut h = InMemoryHost::new();
        let out = FrameOutputs::awaiting(2);
        HostBridge::new(2).write_frame(&mut h, &out, 6.7);
        assert!(h.values.is_empty());
    }
}
