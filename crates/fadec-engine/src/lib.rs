//! fadec-engine: engine physics for the FADEC core.
//!
//! Pure, frame-local models. Nothing in here keeps state between frames;
//! callers hand in the previous values they own.
//!
//! - `polynomials`: regression polynomials and decay laws
//! - `corrected_speed`: corrected idle speed table
//! - `idle`: idle baseline from ambient conditions
//! - `imbalance`: per-engine deviation record, its packed code and generator
//! - `transient`: start and shutdown trajectories
//! - `steady`: running-engine fuel flow, EGT and oil model
//! - `thrust_limits`: thrust limit table, bleed derating and `limit_n1`

pub mod corrected_speed;
pub mod error;
pub mod idle;
pub mod imbalance;
pub mod polynomials;
pub mod steady;
pub mod thrust_limits;
pub mod transient;

pub use corrected_speed::corrected_idle_fan_speed;
pub use error::{ModelError, ModelResult};
pub use idle::{IdleBaseline, idle_baseline};
pub use imbalance::{Imbalance, ImbalanceGenerator, ImbalanceSlot};
pub use thrust_limits::{BleedConfig, LimitType, corrected_limit_n1, limit_n1};
