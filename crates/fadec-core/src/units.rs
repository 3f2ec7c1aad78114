// fadec-core/src/units.rs
//
// The engine tables are written in feet, hPa and degC. The host bridge tags
// each reading with its unit; the models work on plain `Real` in the table
// units, so readback helpers convert once at the boundary.

use uom::si::f64::{
    Force as UomForce, Length as UomLength, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

use crate::Real;

pub type Force = UomForce;
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn ft(v: Real) -> Length {
    use uom::si::length::foot;
    Length::new::<foot>(v)
}

#[inline]
pub fn hpa(v: Real) -> Pressure {
    use uom::si::pressure::hectopascal;
    Pressure::new::<hectopascal>(v)
}

#[inline]
pub fn deg_c(v: Real) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn lbf(v: Real) -> Force {
    use uom::si::force::pound_force;
    Force::new::<pound_force>(v)
}

#[inline]
pub fn in_ft(v: Length) -> Real {
    use uom::si::length::foot;
    v.get::<foot>()
}

#[inline]
pub fn in_hpa(v: Pressure) -> Real {
    use uom::si::pressure::hectopascal;
    v.get::<hectopascal>()
}

#[inline]
pub fn in_deg_c(v: Temperature) -> Real {
    use uom::si::thermodynamic_temperature::degree_celsius;
    v.get::<degree_celsius>()
}

#[inline]
pub fn in_newtons(v: Force) -> Real {
    use uom::si::force::newton;
    v.get::<newton>()
}

pub mod constants {
    use crate::Real;

    /// ISA sea level temperature (K).
    pub const ISA_T0_K: Real = 288.15;
    /// Sea level pressure used by the ratio tables (hPa).
    pub const ISA_P0_HPA: Real = 1013.0;
    /// Offset between Celsius and Kelvin.
    pub const CELSIUS_TO_KELVIN: Real = 273.15;
    /// Tropopause temperature (K).
    pub const ISA_TROPOPAUSE_K: Real = 216.65;
    /// ISA lapse rate (K per 1000 ft).
    pub const ISA_LAPSE_K_PER_KFT: Real = 1.98;
    /// Pounds to kilograms.
    pub const LB_TO_KG: Real = 0.453_592;
}
