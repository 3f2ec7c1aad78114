//! Start and shutdown trajectories.
//!
//! Both take the previous frame's values from the caller and return the
//! next ones; the engine record that owns them lives in the frame loop.

use fadec_core::Real;

use crate::idle::IdleBaseline;
use crate::polynomials::{
    START_IDLE_MARGIN, shutdown_egt, shutdown_n1, shutdown_n2, start_egt, start_ff, start_n1,
    start_n2, start_oil_temp,
};

/// Seconds after entering shutdown during which values are held.
pub const DEFAULT_SHUTDOWN_HOLD_S: Real = 1.8;
/// Band within which a restart hands over to the normal start EGT.
pub const RESTART_EGT_CAPTURE: Real = 1.5;
/// Sensor fan speed below which windmilling can hold N1 up.
pub const WINDMILL_N1_LIMIT: Real = 5.0;

/// Previous-frame values and conditions for one start step.
#[derive(Clone, Copy, Debug)]
pub struct StartInputs {
    pub sensor_n2: Real,
    pub previous_n1: Real,
    pub previous_n2: Real,
    pub previous_egt: Real,
    pub idle: IdleBaseline,
    /// Deviations of the imbalanced engine; zero for the others.
    pub n2_offset: Real,
    pub ff_offset: Real,
    pub egt_offset: Real,
    pub ambient_temp_c: Real,
    pub dt: Real,
    /// Relight of an engine that is still spinning down.
    pub restarting: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartStep {
    pub n1: Real,
    pub n2: Real,
    pub ff: Real,
    pub egt: Real,
    pub oil_temp: Real,
    /// A restart has caught up with the normal start EGT.
    pub restart_captured: bool,
}

/// Advance a start or restart by one frame.
///
/// Fan speed never drops below the previous frame and never exceeds idle
/// plus [`START_IDLE_MARGIN`].
pub fn start_step(inp: &StartInputs) -> StartStep {
    let idle_n2 = inp.idle.n2 - inp.n2_offset;

    let n2 = start_n2(inp.sensor_n2, inp.previous_n2, idle_n2);
    let n1 = start_n1(n2, idle_n2, inp.idle.n1)
        .max(inp.previous_n1)
        .min(inp.idle.n1 + START_IDLE_MARGIN);
    let ff = start_ff(n2, idle_n2, inp.idle.ff - inp.ff_offset);
    let start_egt = start_egt(n2, idle_n2, inp.ambient_temp_c, inp.idle.egt - inp.egt_offset);

    let (egt, restart_captured) = if inp.restarting {
        if (start_egt - inp.previous_egt).abs() <= RESTART_EGT_CAPTURE {
            (start_egt, true)
        } else if start_egt > inp.previous_egt {
            (
                inp.previous_egt + 0.75 * inp.dt * (inp.idle.n2 - n2),
                false,
            )
        } else {
            (
                shutdown_egt(inp.previous_egt, inp.ambient_temp_c, inp.dt),
                false,
            )
        }
    } else {
        (start_egt, false)
    };

    StartStep {
        n1,
        n2,
        ff,
        egt,
        oil_temp: start_oil_temp(n2, inp.idle.n2, inp.ambient_temp_c),
        restart_captured,
    }
}

/// Previous-frame values and conditions for one shutdown step.
#[derive(Clone, Copy, Debug)]
pub struct ShutdownInputs {
    /// Seconds since the engine entered shutdown.
    pub timer: Real,
    pub hold_s: Real,
    pub sensor_n1: Real,
    pub previous_n1: Real,
    pub previous_n2: Real,
    pub previous_egt: Real,
    pub ambient_temp_c: Real,
    pub dt: Real,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShutdownStep {
    pub n1: Real,
    pub n2: Real,
    pub egt: Real,
    pub timer: Real,
}

/// Advance a shutdown by one frame.
///
/// During the hold only the timer moves. Afterwards each quantity decays
/// with its two-regime law; a windmilling fan keeps its sensor speed.
pub fn shutdown_step(inp: &ShutdownInputs) -> ShutdownStep {
    if inp.timer < inp.hold_s {
        return ShutdownStep {
            n1: inp.previous_n1,
            n2: inp.previous_n2,
            egt: inp.previous_egt,
            timer: inp.timer + inp.dt,
        };
    }

    let mut n1 = shutdown_n1(inp.previous_n1, inp.dt);
    if inp.sensor_n1 < WINDMILL_N1_LIMIT && inp.sensor_n1 > n1 {
        n1 = inp.sensor_n1;
    }

    ShutdownStep {
        n1,
        n2: shutdown_n2(inp.previous_n2, inp.dt),
        egt: shutdown_egt(inp.previous_egt, inp.ambient_temp_c, inp.dt),
        timer: inp.timer,
    }
}
