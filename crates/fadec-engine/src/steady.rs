//! Running-engine parameters: speeds, fuel flow, EGT and oil.

use fadec_core::atmosphere::{delta2, theta2};
use fadec_core::units::constants::LB_TO_KG;
use fadec_core::Real;

use crate::polynomials::{corrected_egt, corrected_fuel_flow, oil_gulp_fraction, oil_pressure, oil_temperature};

/// Corrected fuel flow (lb/h) below which the engine is treated as unfuelled.
pub const MIN_CORRECTED_FF: Real = 1.0;
/// Oil consumption (qt/s).
pub const OIL_BURN_QT_PER_S: Real = 0.000_111_11;
/// Time constant of the oil gulping lag (s).
pub const OIL_GULP_TAU_S: Real = 10.0;
/// EGT lag rate (1/s).
pub const EGT_LAG_RATE: Real = 0.1;

/// Flight condition shared by the steady-state laws in one frame.
#[derive(Clone, Copy, Debug)]
pub struct FlightCondition {
    pub mach: Real,
    pub pressure_altitude_ft: Real,
    pub ambient_temp_c: Real,
    pub ambient_pressure_hpa: Real,
}

/// Displayed speeds `(n1, n2)` from sensor speeds and the core speed deviation.
pub fn primary_speeds(sensor_n1: Real, sensor_n2: Real, n2_offset: Real) -> (Real, Real) {
    (sensor_n1, (sensor_n2 - n2_offset).max(0.0))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuelFlow {
    /// Corrected fuel flow (lb/h), feeds the EGT law.
    pub corrected_lb_h: Real,
    /// Metered fuel flow (kg/h).
    pub kg_h: Real,
}

/// Fuel flow from corrected fan speed.
///
/// Zero while the corrected flow is below [`MIN_CORRECTED_FF`]; the fuel
/// flow deviation only applies once the engine is fuelled.
pub fn fuel_flow(cn1: Real, cond: &FlightCondition, ff_offset: Real) -> FuelFlow {
    let cff = corrected_fuel_flow(cn1, cond.mach, cond.pressure_altitude_ft);
    let kg_h = if cff >= MIN_CORRECTED_FF {
        let uncorrected = cff
            * LB_TO_KG
            * delta2(cond.mach, cond.ambient_pressure_hpa)
            * theta2(cond.mach, cond.ambient_temp_c).sqrt();
        (uncorrected - ff_offset).max(0.0)
    } else {
        0.0
    };
    FuelFlow {
        corrected_lb_h: cff,
        kg_h,
    }
}

/// EGT lag toward the un-corrected regression value.
///
/// A cold engine on the ground reads ambient.
pub fn egt(
    previous_egt: Real,
    cn1: Real,
    cff: Real,
    cond: &FlightCondition,
    egt_offset: Real,
    cold_on_ground: bool,
    dt: Real,
) -> Real {
    if cold_on_ground {
        return cond.ambient_temp_c;
    }
    let target = corrected_egt(cn1, cff, cond.mach, cond.pressure_altitude_ft)
        * theta2(cond.mach, cond.ambient_temp_c)
        - egt_offset;
    target + (previous_egt - target) * (-EGT_LAG_RATE * dt).exp()
}

/// Oil state carried between frames for one engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OilState {
    /// Oil temperature (°C).
    pub temperature: Real,
    /// Thermal energy accumulator driving the temperature lag.
    pub thermal_energy: Real,
    /// Oil in the tank (qt).
    pub quantity: Real,
    /// Total oil in the engine (qt).
    pub total: Real,
    /// Oil pressure (psi).
    pub pressure: Real,
}

/// Inputs for one oil update.
#[derive(Clone, Copy, Debug)]
pub struct OilInputs {
    pub n2: Real,
    pub previous_n2: Real,
    pub egt: Real,
    pub thrust_n: Real,
    pub oil_temp_max: Real,
    pub ambient_temp_c: Real,
    /// Engine off and on the ground: the oil soaks to ambient.
    pub cold_on_ground: bool,
    /// Deviation of the imbalanced engine (psi).
    pub pressure_offset: Real,
    /// Random idle offset shared by all engines (psi).
    pub pressure_idle_offset: Real,
    pub dt: Real,
}

impl OilState {
    /// Advance temperature, quantity and pressure by one frame.
    pub fn step(&mut self, inp: &OilInputs) {
        self.step_temperature(inp);
        self.step_quantity(inp.thrust_n, inp.dt);
        self.pressure = (oil_pressure(inp.n2) - inp.pressure_offset + inp.pressure_idle_offset).max(0.0);
    }

    fn step_temperature(&mut self, inp: &OilInputs) {
        if inp.cold_on_ground && inp.ambient_temp_c > self.temperature - 10.0 {
            self.temperature = inp.ambient_temp_c;
            return;
        }
        let steady = inp.egt.min(inp.oil_temp_max);
        self.thermal_energy = 0.995 * self.thermal_energy + (inp.n2 - inp.previous_n2) / inp.dt;
        self.temperature = oil_temperature(self.thermal_energy, self.temperature, steady, inp.dt);
    }

    fn step_quantity(&mut self, thrust_n: Real, dt: Real) {
        let objective = self.total * (1.0 - oil_gulp_fraction(thrust_n));
        self.quantity -= (self.quantity - objective) / OIL_GULP_TAU_S * dt;
        let burn = OIL_BURN_QT_PER_S * dt;
        self.quantity -= burn;
        self.total -= burn;
    }
}
