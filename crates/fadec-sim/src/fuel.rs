//! Propulsion fuel accounting.
//!
//! Burns the metered engine flow out of the inner tanks, applies
//! cross-feed and APU consumption, moves the host's center and aux
//! transfers into the inner tanks and guards against quantities being
//! edited from outside while the simulation runs.

use fadec_core::Real;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Pounds per kilogram.
pub const KG_TO_LB: Real = 2.204_62;
/// Quantity change rate (gal/s) above which a change is an outside edit.
pub const TAMPER_RATE_GAL_S: Real = 661.0;
/// Floor on the fuel density used to convert the change rate (lb/gal).
const MIN_FUEL_WEIGHT_LB_GAL: Real = 1.0;
/// Refuel rates at or above this setting are treated as instant refuels.
pub const INSTANT_REFUEL_RATE: Real = 2.0;

/// Tank quantities (lb).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelTanks {
    pub left: Real,
    pub right: Real,
    pub left_aux: Real,
    pub right_aux: Real,
    pub center: Real,
}

impl FuelTanks {
    pub fn total(&self) -> Real {
        self.left + self.right + self.left_aux + self.right_aux + self.center
    }
}

/// Host readings for the fuel system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelInputs {
    /// Quantities the host currently holds (lb).
    pub tanks: FuelTanks,
    /// Inner tank pumps, two per side.
    pub left_pumps: [bool; 2],
    pub right_pumps: [bool; 2],
    pub crossfeed_open: bool,
    pub center_xfr_left_open: bool,
    pub center_xfr_right_open: bool,
    pub outer_xfr_left_open: bool,
    pub outer_xfr_right_open: bool,
    /// Line flow toward the center tank on each side, sets the center split.
    pub line_flow_left: Real,
    pub line_flow_right: Real,
    /// APU fuel consumption (gal/h).
    pub apu_gal_h: Real,
    /// APU speed (%); a stopped APU burns nothing.
    pub apu_n: Real,
    pub fuel_weight_lb_gal: Real,
    pub refuel_by_user: bool,
    pub refuel_rate: Real,
}

impl Default for FuelInputs {
    fn default() -> Self {
        Self {
            tanks: FuelTanks::default(),
            left_pumps: [true; 2],
            right_pumps: [true; 2],
            crossfeed_open: false,
            center_xfr_left_open: false,
            center_xfr_right_open: false,
            outer_xfr_left_open: false,
            outer_xfr_right_open: false,
            line_flow_left: 0.0,
            line_flow_right: 0.0,
            apu_gal_h: 0.0,
            apu_n: 0.0,
            fuel_weight_lb_gal: 6.699_999,
            refuel_by_user: false,
            refuel_rate: 0.0,
        }
    }
}

/// Which inner tanks feed the engines while cross-feed is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    /// Cross-feed closed: each side feeds its own engines.
    Split,
    /// Left pumps off: everything burns from the right.
    RightOnly,
    /// Right pumps off: everything burns from the left.
    LeftOnly,
    /// All pumps off: nothing is drawn from the inner tanks by the engines.
    Neither,
    /// Both sides feed.
    Both,
}

impl Feed {
    fn select(inp: &FuelInputs) -> Feed {
        if !inp.crossfeed_open {
            return Feed::Split;
        }
        let left = inp.left_pumps.iter().any(|&p| p);
        let right = inp.right_pumps.iter().any(|&p| p);
        match (left, right) {
            (false, false) => Feed::Neither,
            (false, true) => Feed::RightOnly,
            (true, false) => Feed::LeftOnly,
            (true, true) => Feed::Both,
        }
    }
}

/// How the frame treated the host quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelDisposition {
    /// Burn applied; the returned quantities go back to the host.
    Burned,
    /// Outside edit detected; the previous quantities go back to the host.
    Restored,
    /// A user refuel owns the quantities; nothing is written back.
    Refueling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelUpdate {
    pub disposition: FuelDisposition,
    /// Quantities to write back, `None` while refuelling.
    pub tanks: Option<FuelTanks>,
}

/// Fuel state carried across frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelAccount {
    previous: FuelTanks,
    previous_flow: Vec<Real>,
    fuel_used: Vec<Real>,
}

impl FuelAccount {
    pub fn new(engine_count: usize, initial: FuelTanks) -> Self {
        Self {
            previous: initial,
            previous_flow: vec![0.0; engine_count],
            fuel_used: vec![0.0; engine_count],
        }
    }

    /// Fuel burnt per engine since its last ground start (kg).
    pub fn fuel_used(&self) -> &[Real] {
        &self.fuel_used
    }

    pub fn reset_fuel_used(&mut self, index: usize) {
        if let Some(used) = self.fuel_used.get_mut(index) {
            *used = 0.0;
        }
    }

    pub fn previous(&self) -> &FuelTanks {
        &self.previous
    }

    /// Advance one frame. `flow_kg_h` holds this frame's metered flow per engine.
    pub fn update(&mut self, inp: &FuelInputs, flow_kg_h: &[Real], dt: Real) -> FuelUpdate {
        let actual = inp.tanks;
        let weight = inp.fuel_weight_lb_gal.max(MIN_FUEL_WEIGHT_LB_GAL);
        let rate = (actual.total() - self.previous.total()).abs() / (weight * dt);
        let tampered =
            rate > TAMPER_RATE_GAL_S && (!inp.refuel_by_user || inp.refuel_rate < INSTANT_REFUEL_RATE);

        if tampered {
            warn!(rate_gal_s = rate, "fuel quantity edited outside the simulation, restoring");
            return FuelUpdate {
                disposition: FuelDisposition::Restored,
                tanks: Some(self.previous),
            };
        }
        if inp.refuel_by_user {
            self.previous = actual;
            return FuelUpdate {
                disposition: FuelDisposition::Refueling,
                tanks: None,
            };
        }

        let dt_h = dt / 3600.0;
        let left_engines = flow_kg_h.len() / 2;
        let mut pre = self.previous;

        // Trapezoidal integration of the flow between frames.
        let mut left_burn = 0.0;
        let mut right_burn = 0.0;
        for (i, &flow) in flow_kg_h.iter().enumerate() {
            let previous = self.previous_flow.get(i).copied().unwrap_or(flow);
            let burn = 0.5 * (previous + flow) * dt_h;
            let left = i < left_engines;
            let tank = if left { pre.left } else { pre.right };
            if tank <= 0.0 {
                continue;
            }
            if let Some(used) = self.fuel_used.get_mut(i) {
                *used += burn;
            }
            if left {
                left_burn += burn;
            } else {
                right_burn += burn;
            }
        }
        if pre.left <= 0.0 {
            pre.left = 0.0;
        }
        if pre.right <= 0.0 {
            pre.right = 0.0;
        }

        let xfr_aux_left = if pre.left > 0.0 && inp.outer_xfr_left_open {
            pre.left_aux - actual.left_aux
        } else {
            0.0
        };
        let xfr_aux_right = if pre.right > 0.0 && inp.outer_xfr_right_open {
            pre.right_aux - actual.right_aux
        } else {
            0.0
        };

        let apu = if inp.apu_n > 0.0 {
            inp.apu_gal_h * inp.fuel_weight_lb_gal * dt_h
        } else {
            0.0
        };
        let (mut apu_left, mut apu_right) = (apu, 0.0);

        match Feed::select(inp) {
            Feed::Split => {}
            Feed::RightOnly => {
                right_burn += left_burn;
                left_burn = 0.0;
                apu_left = 0.0;
                apu_right = apu;
            }
            Feed::LeftOnly => {
                left_burn += right_burn;
                right_burn = 0.0;
            }
            Feed::Neither => {
                left_burn = 0.0;
                right_burn = 0.0;
                apu_left = 0.5 * apu;
                apu_right = 0.5 * apu;
            }
            Feed::Both => {
                apu_left = 0.5 * apu;
                apu_right = 0.5 * apu;
            }
        }

        let center_delta = pre.center - actual.center;
        let (to_left, to_right) = match (inp.center_xfr_left_open, inp.center_xfr_right_open) {
            (true, true) => {
                let ratio = if inp.line_flow_left < 0.1 && inp.line_flow_right < 0.1 {
                    0.5
                } else {
                    inp.line_flow_left / (inp.line_flow_left + inp.line_flow_right)
                };
                (center_delta * ratio, center_delta * (1.0 - ratio))
            }
            (true, false) => (center_delta, 0.0),
            (false, true) => (0.0, center_delta),
            (false, false) => (0.0, 0.0),
        };

        let left = pre.left - left_burn * KG_TO_LB + xfr_aux_left + to_left - apu_left;
        let right = pre.right - right_burn * KG_TO_LB + xfr_aux_right + to_right - apu_right;

        self.previous = FuelTanks {
            left,
            right,
            left_aux: actual.left_aux,
            right_aux: actual.right_aux,
            center: actual.center,
        };
        self.previous_flow.clear();
        self.previous_flow.extend_from_slice(flow_kg_h);
        debug!(left, right, "fuel burn applied");

        FuelUpdate {
            disposition: FuelDisposition::Burned,
            tanks: Some(self.previous),
        }
    }
}
