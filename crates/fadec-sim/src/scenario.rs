//! Scripted scenario runner.
//!
//! A scenario fixes the ambient conditions, scripts cockpit switch events
//! and stands in for the host's engine with a first-order spool model, so
//! start and shutdown sequences can be replayed without a simulator.

use std::path::Path;

use fadec_controls::{EngineState, Igniter, StarterCommand, ThrustLimitType};
use fadec_core::atmosphere::theta2;
use fadec_core::{Real, unit_clamp};
use fadec_engine::{BleedConfig, idle_baseline};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::fadec::{Fadec, FadecConfig};
use crate::frame::{Ambient, EngineOutputs, FrameInputs, FrameStatus, ThrustLimitOutputs};
use crate::fuel::FuelTanks;

/// Spool-up time constant of the stand-in engine (s).
const SPOOL_UP_TAU_S: Real = 8.0;
/// Spool-down time constant (s).
const SPOOL_DOWN_TAU_S: Real = 6.0;
/// Core speed the stand-in engine overshoots idle by while starting (%).
const START_OVERSHOOT: Real = 0.5;
/// Static thrust at 100 % N1 (N).
const RATED_THRUST_N: Real = 120_000.0;

/// Cockpit action applied at a scripted time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Master { on: bool },
    Igniter { position: Igniter },
    StarterAir { pressurized: bool },
    LimitType { limit: ThrustLimitType },
    FlexTemperature { temp_c: Real },
    Bleed { packs: bool, nacelle_anti_ice: bool, wing_anti_ice: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Simulation time (s) at which the action applies.
    pub at: Real,
    /// 1-based engine; `None` applies to every engine.
    #[serde(default)]
    pub engine: Option<usize>,
    #[serde(flatten)]
    pub action: Action,
}

fn default_identity() -> String {
    "F-WFDC".to_owned()
}

fn default_record_every() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub engines: usize,
    /// Frame step (s).
    pub dt: Real,
    /// Scenario length (s).
    pub duration: Real,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default = "default_identity")]
    pub identity: String,
    #[serde(default)]
    pub ambient: Ambient,
    #[serde(default)]
    pub tanks: FuelTanks,
    #[serde(default)]
    pub config: FadecConfig,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Scenario {
    pub fn from_yaml_str(text: &str) -> SimResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SimError::Scenario {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.engines != 2 && self.engines != 4 {
            return Err(SimError::EngineCount { count: self.engines });
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "duration must be non-negative",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        if let Some(e) = self.events.iter().find(|e| e.engine.is_some_and(|n| n == 0 || n > self.engines)) {
            return Err(SimError::Scenario {
                message: format!("event at {} s names engine {:?}", e.at, e.engine),
            });
        }
        Ok(())
    }
}

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSample {
    pub t: Real,
    pub states: Vec<EngineState>,
    pub engines: Vec<EngineOutputs>,
    pub limits: ThrustLimitOutputs,
}

/// Recorded scenario, decimated like a simulation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub name: String,
    pub imbalance_code: Real,
    pub samples: Vec<ScenarioSample>,
}

impl ScenarioRecord {
    pub fn last(&self) -> Option<&ScenarioSample> {
        self.samples.last()
    }
}

/// Cockpit switches and stand-in engine for one engine.
#[derive(Debug, Clone, Copy, Default)]
struct StandInEngine {
    master: bool,
    starter_air: bool,
    starter_engaged: bool,
    igniter: Igniter,
    valve: Real,
    n2: Real,
}

impl StandInEngine {
    /// Valve takes one intermediate frame to travel.
    fn move_valve(&mut self) {
        let target = if self.master { 1.0 } else { 0.0 };
        self.valve = if (self.valve - target).abs() <= 0.5 {
            target
        } else {
            0.5
        };
    }

    fn spool(&mut self, state: EngineState, idle_n2: Real, dt: Real) {
        let (target, tau) = match state {
            EngineState::Starting | EngineState::Restarting | EngineState::On => {
                (idle_n2 + START_OVERSHOOT, SPOOL_UP_TAU_S)
            }
            EngineState::Off | EngineState::Shutting => (0.0, SPOOL_DOWN_TAU_S),
        };
        self.n2 += (target - self.n2) * (1.0 - (-dt / tau).exp());
        if target == 0.0 && self.n2 < 0.01 {
            self.n2 = 0.0;
        }
    }
}

/// Replay a scenario and record the FADEC outputs.
pub fn run_scenario(scenario: &Scenario) -> SimResult<ScenarioRecord> {
    scenario.validate()?;
    let mut fadec = Fadec::new(scenario.engines, scenario.config.clone())?;

    let mut events = scenario.events.clone();
    events.sort_by(|a, b| a.at.total_cmp(&b.at));
    let mut pending = events.iter().peekable();

    let amb = scenario.ambient;
    let idle = idle_baseline(amb.pressure_altitude_ft, amb.mach, amb.temperature_c, amb.pressure_hpa);
    let corrected = theta2(amb.mach, amb.temperature_c).sqrt();

    let mut stand_ins = vec![StandInEngine::default(); scenario.engines];
    let mut states = vec![EngineState::Off; scenario.engines];
    let mut frame = FrameInputs::ground(scenario.engines);
    frame.identity = Some(scenario.identity.clone());
    frame.ambient = amb;
    frame.fuel.tanks = scenario.tanks;

    let mut record = ScenarioRecord {
        name: scenario.name.clone(),
        imbalance_code: 0.0,
        samples: Vec::new(),
    };

    let mut t = 0.0;
    let mut step = 0usize;
    let mut last = None;
    while t <= scenario.duration {
        while let Some(e) = pending.next_if(|e| e.at <= t) {
            apply(e, &mut stand_ins, &mut frame);
        }

        frame.sim_time = t;
        for (engine, (input, state)) in stand_ins.iter_mut().zip(frame.engines.iter_mut().zip(&states)) {
            engine.move_valve();
            engine.spool(*state, idle.n2, scenario.dt);
            let n1 = idle.n1 * unit_clamp(engine.n2 / idle.n2).powi(2);
            input.igniter = engine.igniter;
            input.starter_engaged = engine.starter_engaged;
            input.starter_pressurized = engine.starter_air;
            input.fuel_valve = engine.valve;
            input.sensor_n2 = engine.n2;
            input.sensor_n1 = n1;
            input.corrected_n1 = n1 / corrected;
            input.thrust_n = RATED_THRUST_N * (n1 / 100.0).powi(2);
        }

        let out = fadec.update(&frame)?;
        if out.status != FrameStatus::AwaitingIdentity {
            record.imbalance_code = out.imbalance_code;
        }
        for ((engine, state), e) in stand_ins.iter_mut().zip(states.iter_mut()).zip(&out.engines) {
            *state = e.state;
            match e.starter_command {
                Some(StarterCommand::Hold) => engine.starter_engaged = true,
                Some(StarterCommand::Release) => engine.starter_engaged = false,
                None => {}
            }
        }
        // Burnt fuel stays with the host.
        if let Some(tanks) = out.fuel {
            frame.fuel.tanks = tanks;
        }

        let sample = ScenarioSample {
            t,
            states: states.clone(),
            engines: out.engines,
            limits: out.limits,
        };
        if step % scenario.record_every == 0 {
            record.samples.push(sample);
            last = None;
        } else {
            last = Some(sample);
        }

        step += 1;
        t = step as Real * scenario.dt;
    }

    if let Some(sample) = last {
        record.samples.push(sample);
    }
    Ok(record)
}

fn apply(event: &Event, engines: &mut [StandInEngine], frame: &mut FrameInputs) {
    let targets = engines
        .iter_mut()
        .enumerate()
        .filter(|(i, _)| event.engine.is_none_or(|n| n == i + 1))
        .map(|(_, e)| e);
    match event.action {
        Action::Master { on } => targets.for_each(|e| e.master = on),
        Action::Igniter { position } => targets.for_each(|e| e.igniter = position),
        Action::StarterAir { pressurized } => targets.for_each(|e| e.starter_air = pressurized),
        Action::LimitType { limit } => frame.limit_type = limit,
        Action::FlexTemperature { temp_c } => frame.flex_temp_c = temp_c,
        Action::Bleed {
            packs,
            nacelle_anti_ice,
            wing_anti_ice,
        } => {
            frame.bleed = BleedConfig {
                packs,
                nacelle_anti_ice,
                wing_anti_ice,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND_START: &str = r#"
name: ground start
engines: 2
dt: 0.1
duration: 5
record_every: 10
config:
  seed: 11
events:
  - at: 0.5
    action: igniter
    position: start
  - at: 0.5
    action: starter_air
    pressurized: true
  - at: 1.0
    engine: 2
    action: master
    on: true
"#;

    #[test]
    fn parses_yaml_with_defaults() {
        let s = Scenario::from_yaml_str(GROUND_START).unwrap();
        assert_eq!(s.identity, "F-WFDC");
        assert_eq!(s.events.len(), 3);
        assert_eq!(s.events[2].engine, Some(2));
        assert_eq!(s.events[2].action, Action::Master { on: true });
        assert_eq!(s.ambient, Ambient::default());
        assert_eq!(s.config.seed, Some(11));
    }

    #[test]
    fn rejects_bad_engine_reference() {
        let text = GROUND_START.replace("engine: 2", "engine: 3");
        assert!(matches!(Scenario::from_yaml_str(&text), Err(SimError::Scenario { .. })));
    }

    #[test]
    fn rejects_zero_step() {
        let text = GROUND_START.replace("dt: 0.1", "dt: 0.0");
        assert!(Scenario::from_yaml_str(&text).is_err());
    }

    #[test]
    fn records_are_decimated_with_final_sample() {
        let s = Scenario::from_yaml_str(GROUND_START).unwrap();
        let rec = run_scenario(&s).unwrap();
        // 51 frames, every 10th plus the last.
        assert_eq!(rec.samples.len(), 6);
        assert!((rec.samples[5].t - 5.0).abs() < 1e-9);
        let last = rec.last().unwrap();
        assert_eq!(last.states[0], EngineState::Off);
        assert_eq!(last.states[1], EngineState::Starting);
    }
}
