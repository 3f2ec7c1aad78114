//! Discrete engine control logic.
//!
//! Everything here is frame-synchronous and free of physics:
//! - switch edge detection on the fuel valve and starter
//! - starter command synthesis
//! - the per-engine state machine
//! - the FLX to CLB thrust limit transition filter
//!
//! # Design Principles
//!
//! - **Explicit state**: previous-frame values live in records the caller owns
//! - **Pure transitions**: `next_state` is a function of its inputs only
//! - **Shutdown wins**: a master-off edge beats every other transition

pub mod error;
pub mod flex_transition;
pub mod signal;
pub mod starter;
pub mod state_machine;

pub use error::{ControlError, ControlResult};
pub use flex_transition::{FlexClimbTransition, FlexTransitionConfig, ThrustLimitType};
pub use signal::{EdgeDetector, MasterSwitchEdges};
pub use starter::{StarterCommand, StarterInputs, synthesize_starter};
pub use state_machine::{EngineState, Igniter, StateInputs, Transition, next_state};
