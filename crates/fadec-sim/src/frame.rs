//! Per-frame input and output records.

use fadec_controls::{EngineState, Igniter, StarterCommand, ThrustLimitType};
use fadec_core::{Length, Pressure, Real, Temperature, in_deg_c, in_ft, in_hpa};
use fadec_engine::BleedConfig;
use serde::{Deserialize, Serialize};

use crate::fuel::{FuelInputs, FuelTanks};

/// Ambient and aircraft conditions shared by every engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ambient {
    pub pressure_altitude_ft: Real,
    pub mach: Real,
    pub temperature_c: Real,
    pub pressure_hpa: Real,
    pub on_ground: bool,
}

impl Ambient {
    /// Conditions from typed quantities, stored in the table units.
    pub fn from_quantities(
        pressure_altitude: Length,
        mach: Real,
        temperature: Temperature,
        pressure: Pressure,
        on_ground: bool,
    ) -> Self {
        Self {
            pressure_altitude_ft: in_ft(pressure_altitude),
            mach,
            temperature_c: in_deg_c(temperature),
            pressure_hpa: in_hpa(pressure),
            on_ground,
        }
    }
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            pressure_altitude_ft: 0.0,
            mach: 0.0,
            temperature_c: 15.0,
            pressure_hpa: 1013.0,
            on_ground: true,
        }
    }
}

/// Host readings for one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineInputs {
    pub igniter: Igniter,
    pub starter_engaged: bool,
    pub starter_pressurized: bool,
    /// Fuel valve travel, 0 closed, 1 fully open.
    pub fuel_valve: Real,
    pub sensor_n1: Real,
    pub sensor_n2: Real,
    pub corrected_n1: Real,
    /// Net thrust (N), drives oil gulping.
    pub thrust_n: Real,
    /// Host combustion flag, only read at session start.
    pub combustion: bool,
}

/// Everything the host hands over in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInputs {
    /// Simulation time (s).
    pub sim_time: Real,
    /// Aircraft registration; `None` until the host knows it.
    pub identity: Option<String>,
    pub ambient: Ambient,
    pub engines: Vec<EngineInputs>,
    pub bleed: BleedConfig,
    pub limit_type: ThrustLimitType,
    /// Selected flex temperature (°C), 0 when none.
    pub flex_temp_c: Real,
    /// Packed imbalance already held by the host, if any.
    pub shared_imbalance: Option<Real>,
    pub fuel: FuelInputs,
}

impl FrameInputs {
    /// Quiet ground frame for `engine_count` engines at sea level ISA.
    pub fn ground(engine_count: usize) -> Self {
        Self {
            sim_time: 0.0,
            identity: None,
            ambient: Ambient::default(),
            engines: vec![EngineInputs::default(); engine_count],
            bleed: BleedConfig::OFF,
            limit_type: ThrustLimitType::None,
            flex_temp_c: 0.0,
            shared_imbalance: None,
            fuel: FuelInputs::default(),
        }
    }
}

/// Outcome of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameStatus {
    /// No aircraft identity yet; nothing was computed.
    AwaitingIdentity,
    /// The session was initialised this frame.
    Initialized,
    Running,
}

/// Values computed for one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOutputs {
    pub state: EngineState,
    /// Seconds since the state was entered.
    pub timer: Real,
    pub n1: Real,
    pub n2: Real,
    /// Fuel flow (kg/h).
    pub fuel_flow: Real,
    pub egt: Real,
    pub oil_temperature: Real,
    pub oil_pressure: Real,
    pub oil_quantity: Real,
    pub oil_total: Real,
    /// Fuel burnt by this engine (kg).
    pub fuel_used: Real,
    /// Command for the host starter, when the FADEC overrides it.
    pub starter_command: Option<StarterCommand>,
}

/// Thrust limits (%N1) published each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrustLimitOutputs {
    pub idle: Real,
    pub climb: Real,
    pub flex: Real,
    pub maximum_continuous: Real,
    pub toga: Real,
    /// Highest sensor N1 across engines.
    pub highest_n1: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutputs {
    pub status: FrameStatus,
    pub engines: Vec<EngineOutputs>,
    pub limits: ThrustLimitOutputs,
    /// Tank quantities (lb) to write back, when the FADEC owns them this frame.
    pub fuel: Option<FuelTanks>,
    /// Packed session imbalance.
    pub imbalance_code: Real,
}

impl FrameOutputs {
    pub(crate) fn awaiting(engine_count: usize) -> Self {
        Self {
            status: FrameStatus::AwaitingIdentity,
            engines: vec![EngineOutputs::default(); engine_count],
            limits: ThrustLimitOutputs::default(),
            fuel: None,
            imbalance_code: 0.0,
        }
    }
}
