//! fadec-core: shared foundation for the engine control crates.
//!
//! Contains:
//! - numeric (Real + tolerances + clamped interpolation + frame time floor)
//! - units (uom quantities at the host boundary + readback into table units)
//! - ids (1-based engine identifiers)
//! - atmosphere (temperature/pressure ratios, CAS to Mach)
//! - profiling (per-phase frame timers)
//! - error (shared error types)

pub mod atmosphere;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod profiling;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FadecError, FadecResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
