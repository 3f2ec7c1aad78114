//! Per-engine deviation parameters and their packed shared code.
//!
//! One engine per session runs slightly off the others. Internally the
//! deviations live in [`Imbalance`]; only the host boundary sees the packed
//! `f64` form produced by [`Imbalance::encode`].
//!
//! Packing: the engine number takes the low 4 bits, then seven 7-bit
//! deviation slots follow. 53 bits in total, so every code is an integer
//! that an `f64` represents exactly.

use fadec_core::{EngineId, Real};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, ModelResult};

const ENGINE_BITS: u32 = 4;
const SLOT_BITS: u32 = 7;
const ENGINE_MAX: u32 = (1 << ENGINE_BITS) - 1;
const SLOT_MAX: u32 = (1 << SLOT_BITS) - 1;
const TOTAL_BITS: u32 = ENGINE_BITS + 7 * SLOT_BITS;

/// Slot positions in the packed code, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImbalanceSlot {
    Engine = 1,
    Egt = 2,
    FuelFlow = 3,
    N2 = 4,
    OilQuantity = 5,
    OilPressure = 6,
    OilPressureIdle = 7,
    OilTempMax = 8,
}

impl ImbalanceSlot {
    pub const ALL: [ImbalanceSlot; 8] = [
        ImbalanceSlot::Engine,
        ImbalanceSlot::Egt,
        ImbalanceSlot::FuelFlow,
        ImbalanceSlot::N2,
        ImbalanceSlot::OilQuantity,
        ImbalanceSlot::OilPressure,
        ImbalanceSlot::OilPressureIdle,
        ImbalanceSlot::OilTempMax,
    ];

    /// Slot from its 1-based position.
    pub fn from_position(position: u8) -> Option<Self> {
        Self::ALL.get(usize::from(position).checked_sub(1)?).copied()
    }

    pub fn position(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ImbalanceSlot::Engine => "engine",
            ImbalanceSlot::Egt => "egt",
            ImbalanceSlot::FuelFlow => "fuel flow",
            ImbalanceSlot::N2 => "n2",
            ImbalanceSlot::OilQuantity => "oil quantity",
            ImbalanceSlot::OilPressure => "oil pressure",
            ImbalanceSlot::OilPressureIdle => "oil pressure idle",
            ImbalanceSlot::OilTempMax => "oil temperature max",
        }
    }

    /// Largest value the slot can carry.
    pub fn max(self) -> u32 {
        match self {
            ImbalanceSlot::Engine => ENGINE_MAX,
            _ => SLOT_MAX,
        }
    }

    fn shift(self) -> u32 {
        match self {
            ImbalanceSlot::Engine => 0,
            other => ENGINE_BITS + (u32::from(other.position()) - 2) * SLOT_BITS,
        }
    }

    fn width(self) -> u32 {
        match self {
            ImbalanceSlot::Engine => ENGINE_BITS,
            _ => SLOT_BITS,
        }
    }
}

/// Deviation set for the one imbalanced engine.
///
/// Raw slot units: EGT °C, fuel flow kg/h, N2 hundredths of a percent, oil
/// quantity tenths of a quart, oil pressure tenths of a psi, oil pressure
/// idle psi offset by +6, oil temperature max °C.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imbalance {
    /// 1-based engine number, 0 when no engine is imbalanced.
    pub engine: u8,
    pub egt: u8,
    pub fuel_flow: u8,
    pub n2: u8,
    pub oil_quantity: u8,
    pub oil_pressure: u8,
    pub oil_pressure_idle: u8,
    pub oil_temp_max: u8,
}

impl Imbalance {
    pub fn get(&self, slot: ImbalanceSlot) -> u8 {
        match slot {
            ImbalanceSlot::Engine => self.engine,
            ImbalanceSlot::Egt => self.egt,
            ImbalanceSlot::FuelFlow => self.fuel_flow,
            ImbalanceSlot::N2 => self.n2,
            ImbalanceSlot::OilQuantity => self.oil_quantity,
            ImbalanceSlot::OilPressure => self.oil_pressure,
            ImbalanceSlot::OilPressureIdle => self.oil_pressure_idle,
            ImbalanceSlot::OilTempMax => self.oil_temp_max,
        }
    }

    fn set(&mut self, slot: ImbalanceSlot, value: u8) {
        match slot {
            ImbalanceSlot::Engine => self.engine = value,
            ImbalanceSlot::Egt => self.egt = value,
            ImbalanceSlot::FuelFlow => self.fuel_flow = value,
            ImbalanceSlot::N2 => self.n2 = value,
            ImbalanceSlot::OilQuantity => self.oil_quantity = value,
            ImbalanceSlot::OilPressure => self.oil_pressure = value,
            ImbalanceSlot::OilPressureIdle => self.oil_pressure_idle = value,
            ImbalanceSlot::OilTempMax => self.oil_temp_max = value,
        }
    }

    /// Pack into the shared numeric channel.
    ///
    /// Rejects any slot outside its width instead of truncating, since a
    /// truncated slot would alias a different configuration.
    pub fn encode(&self) -> ModelResult<f64> {
        let mut bits: u64 = 0;
        for slot in ImbalanceSlot::ALL {
            let value = u32::from(self.get(slot));
            if value > slot.max() {
                return Err(ModelError::ImbalanceOutOfRange {
                    slot: slot.name(),
                    value,
                    max: slot.max(),
                });
            }
            bits |= u64::from(value) << slot.shift();
        }
        Ok(bits as f64)
    }

    /// Unpack a code produced by [`Imbalance::encode`].
    pub fn decode(code: f64) -> ModelResult<Self> {
        let bits = code_bits(code)?;
        let mut out = Imbalance::default();
        for slot in ImbalanceSlot::ALL {
            out.set(slot, extract(bits, slot));
        }
        Ok(out)
    }

    /// Single slot of a packed code.
    pub fn decode_slot(code: f64, slot: ImbalanceSlot) -> ModelResult<u8> {
        Ok(extract(code_bits(code)?, slot))
    }

    /// Whether the deviations apply to `engine`.
    pub fn applies_to(&self, engine: EngineId) -> bool {
        self.engine == engine.number()
    }

    fn scaled(&self, engine: EngineId, raw: u8, scale: Real) -> Real {
        if self.applies_to(engine) {
            Real::from(raw) * scale
        } else {
            0.0
        }
    }

    /// EGT deviation (°C).
    pub fn egt_offset(&self, engine: EngineId) -> Real {
        self.scaled(engine, self.egt, 1.0)
    }

    /// Fuel flow deviation (kg/h).
    pub fn fuel_flow_offset(&self, engine: EngineId) -> Real {
        self.scaled(engine, self.fuel_flow, 1.0)
    }

    /// Core speed deviation (%).
    pub fn n2_offset(&self, engine: EngineId) -> Real {
        self.scaled(engine, self.n2, 0.01)
    }

    /// Oil quantity deviation (qt).
    pub fn oil_quantity_offset(&self, engine: EngineId) -> Real {
        self.scaled(engine, self.oil_quantity, 0.1)
    }

    /// Oil pressure deviation (psi).
    pub fn oil_pressure_offset(&self, engine: EngineId) -> Real {
        self.scaled(engine, self.oil_pressure, 0.1)
    }

    /// Random idle oil pressure offset shared by all engines (psi).
    pub fn oil_pressure_idle_offset(&self) -> Real {
        Real::from(self.oil_pressure_idle) - 6.0
    }

    /// Oil temperature ceiling shared by all engines (°C).
    pub fn oil_temp_max(&self) -> Real {
        Real::from(self.oil_temp_max)
    }
}

fn code_bits(code: f64) -> ModelResult<u64> {
    let limit = (1_u64 << TOTAL_BITS) as f64;
    if !code.is_finite() || code < 0.0 || code.fract() != 0.0 || code >= limit {
        return Err(ModelError::MalformedCode { value: code });
    }
    Ok(code as u64)
}

fn extract(bits: u64, slot: ImbalanceSlot) -> u8 {
    let mask = (1_u64 << slot.width()) - 1;
    // Widths are at most 7 bits, so the value fits a u8.
    ((bits >> slot.shift()) & mask) as u8
}

/// Session imbalance generator.
///
/// Seeded for reproducible sessions, or from OS entropy.
pub struct ImbalanceGenerator {
    rng: StdRng,
}

impl ImbalanceGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Draw a fresh imbalance for an aircraft with `engine_count` engines.
    pub fn generate(&mut self, engine_count: usize) -> Imbalance {
        let engines = u8::try_from(engine_count.clamp(1, ENGINE_MAX as usize)).unwrap_or(1);
        let imbalance = Imbalance {
            engine: self.rng.gen_range(1..=engines),
            egt: self.rng.gen_range(1..=20),
            fuel_flow: self.rng.gen_range(1..=36),
            n2: self.rng.gen_range(1..=30),
            oil_quantity: self.rng.gen_range(1..=20),
            oil_pressure: self.rng.gen_range(1..=30),
            oil_pressure_idle: self.rng.gen_range(1..=12),
            oil_temp_max: self.rng.gen_range(86..=95),
        };
        debug!(?imbalance, "generated engine imbalance");
        imbalance
    }

    /// Uniform draw in `[lo, hi]`, used for initial oil quantities.
    pub fn uniform(&mut self, lo: Real, hi: Real) -> Real {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}
