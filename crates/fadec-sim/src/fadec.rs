//! FADEC session: identity gating, initialisation and the frame update.

use fadec_controls::FlexTransitionConfig;
use fadec_core::profiling::{FramePhase, FrameProfiler};
use fadec_core::{EngineId, Real};
use fadec_engine::steady::FlightCondition;
use fadec_engine::transient::DEFAULT_SHUTDOWN_HOLD_S;
use fadec_engine::{Imbalance, ImbalanceGenerator, idle_baseline};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::FrameClock;
use crate::engine::{EngineContext, EngineRecord};
use crate::error::{SimError, SimResult};
use crate::frame::{FrameInputs, FrameOutputs, FrameStatus};
use crate::fuel::FuelAccount;
use crate::limits::{LimitInputs, ThrustLimitComputer};

/// Session knobs. `Default` gives the production values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadecConfig {
    /// Initial oil quantity range (qt).
    pub oil_quantity_min_qt: Real,
    pub oil_quantity_max_qt: Real,
    pub flex_transition: FlexTransitionConfig,
    /// Seconds values are held after entering shutdown.
    pub shutdown_hold_s: Real,
    /// Imbalance generator seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FadecConfig {
    fn default() -> Self {
        Self {
            oil_quantity_min_qt: 14.0,
            oil_quantity_max_qt: 20.0,
            flex_transition: FlexTransitionConfig::default(),
            shutdown_hold_s: DEFAULT_SHUTDOWN_HOLD_S,
            seed: None,
        }
    }
}

impl FadecConfig {
    pub fn validate(&self) -> SimResult<()> {
        let oil_ok = self.oil_quantity_min_qt.is_finite()
            && self.oil_quantity_max_qt.is_finite()
            && self.oil_quantity_min_qt > 0.0
            && self.oil_quantity_min_qt <= self.oil_quantity_max_qt;
        if !oil_ok {
            return Err(SimError::InvalidArg {
                what: "oil quantity range must be positive and ordered",
            });
        }
        if !(self.shutdown_hold_s.is_finite() && self.shutdown_hold_s >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "shutdown hold must be finite and non-negative",
            });
        }
        self.flex_transition.validate()?;
        Ok(())
    }
}

/// State that only exists once the aircraft identity is known.
struct Session {
    identity: String,
    imbalance: Imbalance,
    imbalance_code: Real,
    engines: Vec<EngineRecord>,
    fuel: FuelAccount,
    limits: ThrustLimitComputer,
    clock: FrameClock,
}

/// Engine control for one aircraft.
pub struct Fadec {
    config: FadecConfig,
    engine_count: usize,
    generator: ImbalanceGenerator,
    session: Option<Session>,
    profiler: FrameProfiler,
}

impl Fadec {
    pub fn new(engine_count: usize, config: FadecConfig) -> SimResult<Self> {
        if engine_count != 2 && engine_count != 4 {
            return Err(SimError::EngineCount { count: engine_count });
        }
        config.validate()?;
        Ok(Self {
            generator: ImbalanceGenerator::new(config.seed),
            config,
            engine_count,
            session: None,
            profiler: FrameProfiler::new(),
        })
    }

    pub fn engine_count(&self) -> usize {
        self.engine_count
    }

    pub fn config(&self) -> &FadecConfig {
        &self.config
    }

    /// Aircraft identity of the running session.
    pub fn identity(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.identity.as_str())
    }

    pub fn imbalance(&self) -> Option<&Imbalance> {
        self.session.as_ref().map(|s| &s.imbalance)
    }

    pub fn engines(&self) -> &[EngineRecord] {
        self.session.as_ref().map_or(&[], |s| s.engines.as_slice())
    }

    pub fn profiler(&self) -> &FrameProfiler {
        &self.profiler
    }

    /// Drop the session; the next frame with an identity starts a new one.
    pub fn reset(&mut self) {
        self.session = None;
        self.profiler.reset();
    }

    /// Run one frame.
    ///
    /// Errors on a frame whose engine count does not match the session and
    /// on a session imbalance that does not fit its code. Numeric edge cases
    /// are clamped inside the models.
    pub fn update(&mut self, inp: &FrameInputs) -> SimResult<FrameOutputs> {
        if inp.engines.len() != self.engine_count {
            return Err(SimError::EngineMismatch {
                expected: self.engine_count,
                got: inp.engines.len(),
            });
        }

        let Some(session) = self.session.as_mut() else {
            return Ok(match inp.identity.as_deref() {
                Some(identity) if !identity.is_empty() => self.initialize(identity, inp)?,
                _ => FrameOutputs::awaiting(self.engine_count),
            });
        };

        let dt = session.clock.advance(inp.sim_time);
        let amb = &inp.ambient;

        let timer = self.profiler.start(FramePhase::Idle);
        let idle = idle_baseline(
            amb.pressure_altitude_ft,
            amb.mach,
            amb.temperature_c,
            amb.pressure_hpa,
        );
        timer.stop();

        let ctx = EngineContext {
            idle,
            condition: FlightCondition {
                mach: amb.mach,
                pressure_altitude_ft: amb.pressure_altitude_ft,
                ambient_temp_c: amb.temperature_c,
                ambient_pressure_hpa: amb.pressure_hpa,
            },
            imbalance: &session.imbalance,
            on_ground: amb.on_ground,
            dt,
            shutdown_hold_s: self.config.shutdown_hold_s,
        };

        let mut engines = Vec::with_capacity(self.engine_count);
        let mut highest_n1: Real = 0.0;
        for (i, (record, engine_in)) in session.engines.iter_mut().zip(&inp.engines).enumerate() {
            let (out, effects) = record.step(&ctx, engine_in, &self.profiler);
            if effects.reset_fuel_used {
                session.fuel.reset_fuel_used(i);
            }
            highest_n1 = highest_n1.max(engine_in.sensor_n1);
            engines.push(out);
        }

        let timer = self.profiler.start(FramePhase::Fuel);
        let flows: Vec<Real> = engines.iter().map(|e| e.fuel_flow).collect();
        let fuel = session.fuel.update(&inp.fuel, &flows, dt);
        for (out, used) in engines.iter_mut().zip(session.fuel.fuel_used()) {
            out.fuel_used = *used;
        }
        timer.stop();

        let timer = self.profiler.start(FramePhase::ThrustLimits);
        let limits = session.limits.compute(
            amb,
            &LimitInputs {
                sim_time: inp.sim_time,
                limit_type: inp.limit_type,
                flex_temp_c: inp.flex_temp_c,
                bleed: inp.bleed,
                idle_n1: idle.n1,
                highest_n1,
            },
        );
        timer.stop();
        self.profiler.end_frame();

        Ok(FrameOutputs {
            status: FrameStatus::Running,
            engines,
            limits,
            fuel: fuel.tanks,
            imbalance_code: session.imbalance_code,
        })
    }

    fn initialize(&mut self, identity: &str, inp: &FrameInputs) -> SimResult<FrameOutputs> {
        info!(identity, engines = self.engine_count, "aircraft identity received");
        let imbalance = self.session_imbalance(inp.shared_imbalance);
        self.open_session(identity, imbalance, inp)
    }

    fn open_session(&mut self, identity: &str, imbalance: Imbalance, inp: &FrameInputs) -> SimResult<FrameOutputs> {
        let imbalance_code = imbalance.encode()?;
        let amb = &inp.ambient;

        let all_combusting = inp.engines.iter().all(|e| e.combustion);
        let oil_temperature = match (all_combusting, amb.on_ground) {
            (true, true) => 75.0,
            (true, false) => 85.0,
            (false, _) => amb.temperature_c,
        };

        let mut engines = Vec::with_capacity(self.engine_count);
        for (i, engine_in) in inp.engines.iter().enumerate() {
            let Some(id) = EngineId::from_index(i) else {
                continue;
            };
            let oil_total = self
                .generator
                .uniform(self.config.oil_quantity_min_qt, self.config.oil_quantity_max_qt)
                - imbalance.oil_quantity_offset(id);
            engines.push(EngineRecord::new(
                id,
                oil_total,
                oil_temperature,
                amb.temperature_c,
                engine_in.sensor_n2,
            ));
        }

        let mut clock = FrameClock::new();
        clock.advance(inp.sim_time);

        info!(
            engine = imbalance.engine,
            code = imbalance_code,
            oil_temperature,
            "FADEC session initialised"
        );

        let outputs = FrameOutputs {
            status: FrameStatus::Initialized,
            engines: engines.iter().map(EngineRecord::outputs).collect(),
            limits: Default::default(),
            fuel: None,
            imbalance_code,
        };

        self.session = Some(Session {
            identity: identity.to_owned(),
            imbalance,
            imbalance_code,
            engines,
            fuel: FuelAccount::new(self.engine_count, inp.fuel.tanks),
            limits: ThrustLimitComputer::new(self.config.flex_transition),
            clock,
        });
        Ok(outputs)
    }

    /// Shared code from the host when it decodes and names one of our
    /// engines, otherwise a fresh draw.
    fn session_imbalance(&mut self, shared: Option<Real>) -> Imbalance {
        if let Some(code) = shared {
            match Imbalance::decode(code) {
                Ok(imb) if usize::from(imb.engine) <= self.engine_count => return imb,
                Ok(imb) => warn!(engine = imb.engine, "shared imbalance names a missing engine, regenerating"),
                Err(e) => warn!(error = %e, "shared imbalance undecodable, regenerating"),
            }
        }
        self.generator.generate(self.engine_count)
    }
}
