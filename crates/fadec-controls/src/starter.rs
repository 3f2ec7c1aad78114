//! Starter engage/release commands.
//!
//! Runs before the state machine each frame so the state machine sees the
//! starter the FADEC actually holds, not only what the host reported.

use fadec_core::Real;
use serde::{Deserialize, Serialize};

/// Core speed (%) above which a spinning engine can light without air.
pub const SELF_SUSTAIN_N2: Real = 20.0;

/// Command sent back to the host starter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarterCommand {
    Hold,
    Release,
}

#[derive(Debug, Clone, Copy)]
pub struct StarterInputs {
    pub engaged: bool,
    /// Fuel valve fraction, 1.0 when fully open.
    pub fuel_valve: Real,
    pub pressurized: bool,
    pub sensor_n2: Real,
}

/// Starter state after command synthesis, plus the command to emit if any.
pub fn synthesize_starter(inp: &StarterInputs) -> (bool, Option<StarterCommand>) {
    let valve_open = inp.fuel_valve == 1.0;
    let can_light = inp.pressurized || inp.sensor_n2 >= SELF_SUSTAIN_N2;

    if !inp.engaged && valve_open && can_light {
        return (true, Some(StarterCommand::Hold));
    }

    let lost_air = valve_open && !inp.pressurized && inp.sensor_n2 < SELF_SUSTAIN_N2;
    if inp.engaged && (inp.fuel_valve < 1.0 || lost_air) {
        return (false, Some(StarterCommand::Release));
    }

    (inp.engaged, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(engaged: bool, fuel_valve: Real, pressurized: bool, sensor_n2: Real) -> StarterInputs {
        StarterInputs {
            engaged,
            fuel_valve,
            pressurized,
            sensor_n2,
        }
    }

    #[test]
    fn engages_with_air_and_open_valve() {
        assert_eq!(
            synthesize_starter(&inputs(false, 1.0, true, 0.0)),
            (true, Some(StarterCommand::Hold))
        );
    }

    #[test]
    fn engages_when_spinning_fast_enough() {
        assert_eq!(
            synthesize_starter(&inputs(false, 1.0, false, 25.0)),
            (true, Some(StarterCommand::Hold))
        );
    }

    #[test]
    fn does_not_engage_with_valve_in_transit() {
        assert_eq!(synthesize_starter(&inputs(false, 0.5, true, 0.0)), (false, None));
    }

    #[test]
    fn releases_when_valve_closes() {
        assert_eq!(
            synthesize_starter(&inputs(true, 0.0, true, 60.0)),
            (false, Some(StarterCommand::Release))
        );
    }

    #[test]
    fn releases_when_air_lost_below_self_sustain() {
        assert_eq!(
            synthesize_starter(&inputs(true, 1.0, false, 10.0)),
            (false, Some(StarterCommand::Release))
        );
        assert_eq!(synthesize_starter(&inputs(true, 1.0, false, 40.0)), (true, None));
    }
}
