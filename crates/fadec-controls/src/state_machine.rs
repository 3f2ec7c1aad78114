//! Per-engine state machine.
//!
//! The state alone selects which model runs in a frame. Edges are derived
//! by the caller from the previous frame's switch positions.

use fadec_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Core speed (%) above which an engine found with the starter held is
/// already running.
pub const RUNNING_N2: Real = 20.0;
/// Core speed (%) above which a spooling-down engine can be relit.
pub const RELIGHT_N2: Real = 50.0;
/// Core speed (%) below which a shutdown is complete.
pub const STOPPED_N2: Real = 0.05;
/// Margin below idle core speed at which a start is complete.
pub const IDLE_REACHED_MARGIN: Real = 0.1;

/// Engine operating state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineState {
    #[default]
    Off,
    On,
    Starting,
    Restarting,
    Shutting,
}

impl EngineState {
    pub const ALL: [EngineState; 5] = [
        EngineState::Off,
        EngineState::On,
        EngineState::Starting,
        EngineState::Restarting,
        EngineState::Shutting,
    ];

    /// Numeric code used on the host variable channel.
    pub fn code(self) -> Real {
        match self {
            EngineState::Off => 0.0,
            EngineState::On => 1.0,
            EngineState::Starting => 2.0,
            EngineState::Restarting => 3.0,
            EngineState::Shutting => 4.0,
        }
    }

    /// True for the two states driven by the start trajectory.
    pub fn is_starting(self) -> bool {
        matches!(self, EngineState::Starting | EngineState::Restarting)
    }
}

impl TryFrom<Real> for EngineState {
    type Error = ControlError;

    fn try_from(code: Real) -> ControlResult<Self> {
        EngineState::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(ControlError::UnknownState { code })
    }
}

/// Igniter selector position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Igniter {
    Crank,
    #[default]
    Normal,
    Start,
}

impl Igniter {
    pub const ALL: [Igniter; 3] = [Igniter::Crank, Igniter::Normal, Igniter::Start];

    pub fn code(self) -> Real {
        match self {
            Igniter::Crank => 0.0,
            Igniter::Normal => 1.0,
            Igniter::Start => 2.0,
        }
    }
}

impl TryFrom<Real> for Igniter {
    type Error = ControlError;

    fn try_from(code: Real) -> ControlResult<Self> {
        Igniter::ALL
            .into_iter()
            .find(|i| i.code() == code)
            .ok_or(ControlError::UnknownIgniter { code })
    }
}

/// Everything the state machine looks at in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInputs {
    pub igniter: Igniter,
    /// Starter engaged after command synthesis.
    pub starter: bool,
    /// Igniter selector moved into START this frame.
    pub igniter_start_edge: bool,
    /// Starter went from engaged to released this frame.
    pub starter_turned_off: bool,
    pub master_on: bool,
    pub master_off: bool,
    /// Core speed (%).
    pub n2: Real,
    /// Idle core speed (%) of this engine, imbalance applied.
    pub idle_n2: Real,
}

/// Result of one state machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: EngineState,
    /// The state changed and the per-engine timer restarts from zero.
    pub reset_timer: bool,
}

/// Next state for one engine.
pub fn next_state(current: EngineState, inp: &StateInputs) -> Transition {
    let state = match current {
        EngineState::Off => from_off(inp),
        EngineState::On => from_on(inp),
        EngineState::Starting | EngineState::Restarting => starting_transition(current, inp),
        EngineState::Shutting => from_shutting(inp),
    };
    Transition {
        state,
        reset_timer: state != current,
    }
}

fn from_off(inp: &StateInputs) -> EngineState {
    if inp.igniter == Igniter::Normal && inp.starter && inp.n2 > RUNNING_N2 {
        EngineState::On
    } else if inp.igniter == Igniter::Start && inp.master_on && inp.starter {
        EngineState::Starting
    } else {
        EngineState::Off
    }
}

fn from_on(inp: &StateInputs) -> EngineState {
    if inp.master_off || !inp.starter {
        EngineState::Shutting
    } else if inp.igniter_start_edge && idle_reached(inp) {
        EngineState::Restarting
    } else {
        EngineState::On
    }
}

fn idle_reached(inp: &StateInputs) -> bool {
    inp.n2 >= inp.idle_n2 - IDLE_REACHED_MARGIN
}

/// Shared by STARTING and RESTARTING.
fn starting_transition(current: EngineState, inp: &StateInputs) -> EngineState {
    if inp.master_off {
        EngineState::Shutting
    } else if inp.starter && idle_reached(inp) {
        EngineState::On
    } else if inp.starter_turned_off || !inp.starter {
        EngineState::Shutting
    } else {
        current
    }
}

fn from_shutting(inp: &StateInputs) -> EngineState {
    if inp.igniter == Igniter::Start && inp.master_on {
        EngineState::Restarting
    } else if !inp.starter && inp.n2 < STOPPED_N2 {
        EngineState::Off
    } else if inp.starter && inp.n2 > RELIGHT_N2 {
        EngineState::Restarting
    } else {
        EngineState::Shutting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE_N2: Real = 68.2;

    fn quiet(n2: Real) -> StateInputs {
        StateInputs {
            igniter: Igniter::Normal,
            starter: false,
            igniter_start_edge: false,
            starter_turned_off: false,
            master_on: false,
            master_off: false,
            n2,
            idle_n2: IDLE_N2,
        }
    }

    fn next(current: EngineState, inp: StateInputs) -> EngineState {
        next_state(current, &inp).state
    }

    #[test]
    fn codes_round_trip() {
        for s in EngineState::ALL {
            assert_eq!(EngineState::try_from(s.code()), Ok(s));
        }
        for i in Igniter::ALL {
            assert_eq!(Igniter::try_from(i.code()), Ok(i));
        }
        assert_eq!(
            Igniter::try_from(7.0),
            Err(ControlError::UnknownIgniter { code: 7.0 })
        );
        assert!(EngineState::try_from(0.5).is_err());
    }

    #[test]
    fn ground_start_sequence() {
        let mut inp = quiet(0.0);
        inp.igniter = Igniter::Start;
        inp.starter = true;
        inp.master_on = true;
        assert_eq!(next(EngineState::Off, inp), EngineState::Starting);

        inp.master_on = false;
        inp.n2 = 40.0;
        assert_eq!(next(EngineState::Starting, inp), EngineState::Starting);

        inp.n2 = IDLE_N2 - 0.05;
        assert_eq!(next(EngineState::Starting, inp), EngineState::On);
    }

    #[test]
    fn starter_lost_before_idle_shuts_down() {
        let mut inp = quiet(45.0);
        inp.starter_turned_off = true;
        assert_eq!(next(EngineState::Starting, inp), EngineState::Shutting);
        assert_eq!(next(EngineState::Restarting, inp), EngineState::Shutting);
    }

    #[test]
    fn master_off_beats_idle_reached() {
        let mut inp = quiet(IDLE_N2);
        inp.starter = true;
        inp.master_off = true;
        assert_eq!(next(EngineState::Starting, inp), EngineState::Shutting);
        assert_eq!(next(EngineState::On, inp), EngineState::Shutting);
    }

    #[test]
    fn running_engine_found_at_session_start() {
        let mut inp = quiet(70.0);
        inp.starter = true;
        assert_eq!(next(EngineState::Off, inp), EngineState::On);
        inp.igniter = Igniter::Crank;
        assert_eq!(next(EngineState::Off, inp), EngineState::Off);
    }

    #[test]
    fn shutdown_completes_near_zero() {
        assert_eq!(next(EngineState::Shutting, quiet(0.04)), EngineState::Off);
        assert_eq!(next(EngineState::Shutting, quiet(0.06)), EngineState::Shutting);
    }

    #[test]
    fn relight_from_shutdown() {
        let mut inp = quiet(30.0);
        inp.igniter = Igniter::Start;
        inp.master_on = true;
        assert_eq!(next(EngineState::Shutting, inp), EngineState::Restarting);

        let mut spinning = quiet(55.0);
        spinning.starter = true;
        assert_eq!(next(EngineState::Shutting, spinning), EngineState::Restarting);
        spinning.n2 = 45.0;
        assert_eq!(next(EngineState::Shutting, spinning), EngineState::Shutting);
    }

    #[test]
    fn relight_selected_while_running() {
        let mut inp = quiet(IDLE_N2);
        inp.starter = true;
        assert_eq!(next(EngineState::On, inp), EngineState::On);

        inp.igniter = Igniter::Start;
        inp.igniter_start_edge = true;
        assert_eq!(next(EngineState::On, inp), EngineState::Restarting);
        // Held in START without a fresh selection keeps running.
        inp.igniter_start_edge = false;
        assert_eq!(next(EngineState::On, inp), EngineState::On);

        inp.igniter_start_edge = true;
        inp.n2 = IDLE_N2 - 5.0;
        assert_eq!(next(EngineState::On, inp), EngineState::On);
    }

    #[test]
    fn timer_resets_only_on_change() {
        let t = next_state(EngineState::Off, &quiet(0.0));
        assert!(!t.reset_timer);
        let t = next_state(EngineState::Shutting, &quiet(0.0));
        assert_eq!(t.state, EngineState::Off);
        assert!(t.reset_timer);
    }

    /// Every combination of discrete inputs at a few core speeds.
    #[test]
    fn exhaustive_table() {
        let speeds = [0.0, 0.04, 10.0, 30.0, 60.0, IDLE_N2];
        for current in EngineState::ALL {
            for igniter in Igniter::ALL {
                for bits in 0u8..32 {
                    for &n2 in &speeds {
                        let inp = StateInputs {
                            igniter,
                            starter: bits & 1 != 0,
                            igniter_start_edge: bits & 2 != 0,
                            starter_turned_off: bits & 4 != 0,
                            master_on: bits & 8 != 0,
                            master_off: bits & 16 != 0,
                            n2,
                            idle_n2: IDLE_N2,
                        };
                        let got = next(current, inp);
                        let idle_reached = n2 >= IDLE_N2 - IDLE_REACHED_MARGIN;
                        let expected = match current {
                            EngineState::Off => {
                                if igniter == Igniter::Normal && inp.starter && n2 > RUNNING_N2 {
                                    EngineState::On
                                } else if igniter == Igniter::Start && inp.master_on && inp.starter {
                                    EngineState::Starting
                                } else {
                                    EngineState::Off
                                }
                            }
                            EngineState::On => {
                                if inp.master_off || !inp.starter {
                                    EngineState::Shutting
                                } else if inp.igniter_start_edge && idle_reached {
                                    EngineState::Restarting
                                } else {
                                    EngineState::On
                                }
                            }
                            EngineState::Starting | EngineState::Restarting => {
                                if inp.master_off || !inp.starter {
                                    EngineState::Shutting
                                } else if idle_reached {
                                    EngineState::On
                                } else if inp.starter_turned_off {
                                    EngineState::Shutting
                                } else {
                                    current
                                }
                            }
                            EngineState::Shutting => {
                                if igniter == Igniter::Start && inp.master_on {
                                    EngineState::Restarting
                                } else if !inp.starter && n2 < STOPPED_N2 {
                                    EngineState::Off
                                } else if inp.starter && n2 > RELIGHT_N2 {
                                    EngineState::Restarting
                                } else {
                                    EngineState::Shutting
                                }
                            }
                        };
                        assert_eq!(got, expected, "{current:?} {inp:?}");

                        if current == EngineState::Off {
                            assert_ne!(got, EngineState::Restarting);
                        }
                        if inp.master_off && current != EngineState::Off && current != EngineState::Shutting {
                            assert_eq!(got, EngineState::Shutting);
                        }
                        if current.is_starting() && !inp.starter {
                            assert_ne!(got, EngineState::On);
                        }
                    }
                }
            }
        }
    }
}
