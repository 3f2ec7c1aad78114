//! Frame-synchronous FADEC session for a simulated turbofan aircraft.
//!
//! Provides:
//! - per-session identity capture and engine imbalance selection
//! - per-engine state machine dispatch into start, shutdown and steady models
//! - thrust limit computation with the FLX to CLB transition
//! - fuel burn accounting against the aircraft tanks
//! - a bridge to named host variables
//! - a scripted scenario runner

pub mod clock;
pub mod engine;
pub mod error;
pub mod fadec;
pub mod frame;
pub mod fuel;
pub mod host;
pub mod limits;
pub mod scenario;

pub use clock::FrameClock;
pub use engine::{EngineContext, EngineRecord, StepEffects};
pub use error::{SimError, SimResult};
pub use fadec::{Fadec, FadecConfig};
pub use frame::{Ambient, EngineInputs, EngineOutputs, FrameInputs, FrameOutputs, FrameStatus, ThrustLimitOutputs};
pub use fuel::{FuelAccount, FuelDisposition, FuelInputs, FuelTanks, FuelUpdate};
pub use host::{HostBridge, HostVariables, InMemoryHost};
pub use limits::{LimitInputs, ThrustLimitComputer};
pub use scenario::{Action, Event, Scenario, ScenarioRecord, ScenarioSample, run_scenario};
