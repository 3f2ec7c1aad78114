//! Per-engine record and per-frame dispatch.
//!
//! The record owns every value that has to survive to the next frame.
//! Previous-frame fields are only overwritten at the end of [`EngineRecord::step`],
//! after all reads.

use fadec_controls::signal::EdgeDetector;
use fadec_controls::{
    EngineState, Igniter, MasterSwitchEdges, StarterInputs, StateInputs, next_state, synthesize_starter,
};
use fadec_core::profiling::{FramePhase, FrameProfiler};
use fadec_core::{EngineId, Real};
use fadec_engine::steady::{self, FlightCondition, OilInputs, OilState};
use fadec_engine::transient::{ShutdownInputs, StartInputs, shutdown_step, start_step};
use fadec_engine::{IdleBaseline, Imbalance};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::{EngineInputs, EngineOutputs};

/// Frame-wide values every engine reads.
#[derive(Debug, Clone, Copy)]
pub struct EngineContext<'a> {
    pub idle: IdleBaseline,
    pub condition: FlightCondition,
    pub imbalance: &'a Imbalance,
    pub on_ground: bool,
    pub dt: Real,
    pub shutdown_hold_s: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRecord {
    pub id: EngineId,
    pub state: EngineState,
    pub timer: Real,
    pub n1: Real,
    pub n2: Real,
    pub fuel_flow: Real,
    pub egt: Real,
    pub oil: OilState,
    previous_valve: Real,
    previous_sensor_n2: Real,
    starter: EdgeDetector,
    igniter_start: EdgeDetector,
}

/// What a step did besides updating the record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepEffects {
    /// A start on the ground began burning fuel; the fuel-used counter restarts.
    pub reset_fuel_used: bool,
}

impl EngineRecord {
    /// Fresh record at session start.
    pub fn new(id: EngineId, oil_total: Real, oil_temperature: Real, ambient_temp_c: Real, sensor_n2: Real) -> Self {
        Self {
            id,
            state: EngineState::Off,
            timer: 0.0,
            n1: 0.0,
            n2: 0.0,
            fuel_flow: 0.0,
            egt: ambient_temp_c,
            oil: OilState {
                temperature: oil_temperature,
                thermal_energy: 0.0,
                quantity: oil_total,
                total: oil_total,
                pressure: 0.0,
            },
            previous_valve: 0.0,
            previous_sensor_n2: sensor_n2,
            starter: EdgeDetector::default(),
            igniter_start: EdgeDetector::default(),
        }
    }

    /// Advance one frame and return the published values.
    pub fn step(
        &mut self,
        ctx: &EngineContext<'_>,
        inp: &EngineInputs,
        profiler: &FrameProfiler,
    ) -> (EngineOutputs, StepEffects) {
        let mut effects = StepEffects::default();
        let imb = ctx.imbalance;
        let n2_offset = imb.n2_offset(self.id);

        let timer = profiler.start(FramePhase::StateMachine);
        let master = MasterSwitchEdges::detect(self.previous_valve, inp.fuel_valve);
        let (starter, starter_command) = synthesize_starter(&StarterInputs {
            engaged: inp.starter_engaged,
            fuel_valve: inp.fuel_valve,
            pressurized: inp.starter_pressurized,
            sensor_n2: inp.sensor_n2,
        });
        let starter_edges = self.starter.peek(starter);
        let igniter_start = inp.igniter == Igniter::Start;
        let igniter_edges = self.igniter_start.peek(igniter_start);

        let transition = next_state(
            self.state,
            &StateInputs {
                igniter: inp.igniter,
                starter,
                igniter_start_edge: igniter_edges.rising,
                starter_turned_off: starter_edges.falling,
                master_on: master.turned_on,
                master_off: master.turned_off,
                n2: inp.sensor_n2,
                idle_n2: ctx.idle.n2 - n2_offset,
            },
        );
        if transition.state != self.state {
            debug!(
                engine = %self.id,
                from = ?self.state,
                to = ?transition.state,
                n2 = inp.sensor_n2,
                "engine state change"
            );
            self.state = transition.state;
        }
        if transition.reset_timer {
            self.timer = 0.0;
        }
        timer.stop();

        match self.state {
            EngineState::Starting | EngineState::Restarting if starter => {
                let timer = profiler.start(FramePhase::Start);
                self.start(ctx, inp, &mut effects);
                timer.stop();
            }
            EngineState::Starting | EngineState::Restarting | EngineState::Shutting => {
                let timer = profiler.start(FramePhase::Shutdown);
                self.shutdown(ctx, inp);
                timer.stop();
            }
            EngineState::Off | EngineState::On => {
                let timer = profiler.start(FramePhase::SteadyState);
                self.steady_state(ctx, inp);
                timer.stop();
            }
        }

        self.previous_valve = inp.fuel_valve;
        self.previous_sensor_n2 = inp.sensor_n2;
        self.starter.update(starter);
        self.igniter_start.update(igniter_start);

        let mut out = self.outputs();
        out.starter_command = starter_command;
        (out, effects)
    }

    fn start(&mut self, ctx: &EngineContext<'_>, inp: &EngineInputs, effects: &mut StepEffects) {
        let imb = ctx.imbalance;
        if ctx.on_ground {
            effects.reset_fuel_used = true;
        }
        let step = start_step(&StartInputs {
            sensor_n2: inp.sensor_n2,
            previous_n1: self.n1,
            previous_n2: self.n2,
            previous_egt: self.egt,
            idle: ctx.idle,
            n2_offset: imb.n2_offset(self.id),
            ff_offset: imb.fuel_flow_offset(self.id),
            egt_offset: imb.egt_offset(self.id),
            ambient_temp_c: ctx.condition.ambient_temp_c,
            dt: ctx.dt,
            restarting: self.state == EngineState::Restarting,
        });
        self.n1 = step.n1;
        self.n2 = step.n2;
        self.fuel_flow = step.ff;
        self.egt = step.egt;
        self.oil.temperature = step.oil_temp;

        if step.restart_captured {
            debug!(engine = %self.id, egt = step.egt, "restart joined start trajectory");
            self.state = EngineState::Starting;
        }
    }

    fn shutdown(&mut self, ctx: &EngineContext<'_>, inp: &EngineInputs) {
        let step = shutdown_step(&ShutdownInputs {
            timer: self.timer,
            hold_s: ctx.shutdown_hold_s,
            sensor_n1: inp.sensor_n1,
            previous_n1: self.n1,
            previous_n2: self.n2,
            previous_egt: self.egt,
            ambient_temp_c: ctx.condition.ambient_temp_c,
            dt: ctx.dt,
        });
        self.n1 = step.n1;
        self.n2 = step.n2;
        self.egt = step.egt;
        self.timer = step.timer;
        self.fuel_flow =
            steady::fuel_flow(inp.corrected_n1, &ctx.condition, ctx.imbalance.fuel_flow_offset(self.id)).kg_h;
    }

    fn steady_state(&mut self, ctx: &EngineContext<'_>, inp: &EngineInputs) {
        let imb = ctx.imbalance;
        let (n1, n2) = steady::primary_speeds(inp.sensor_n1, inp.sensor_n2, imb.n2_offset(self.id));
        let ff = steady::fuel_flow(inp.corrected_n1, &ctx.condition, imb.fuel_flow_offset(self.id));
        let cold_on_ground = ctx.on_ground && self.state == EngineState::Off;

        self.n1 = n1;
        self.n2 = n2;
        self.fuel_flow = ff.kg_h;
        self.egt = steady::egt(
            self.egt,
            inp.corrected_n1,
            ff.corrected_lb_h,
            &ctx.condition,
            imb.egt_offset(self.id),
            cold_on_ground,
            ctx.dt,
        );
        self.oil.step(&OilInputs {
            n2: inp.sensor_n2,
            previous_n2: self.previous_sensor_n2,
            egt: self.egt,
            thrust_n: inp.thrust_n,
            oil_temp_max: imb.oil_temp_max(),
            ambient_temp_c: ctx.condition.ambient_temp_c,
            cold_on_ground,
            pressure_offset: imb.oil_pressure_offset(self.id),
            pressure_idle_offset: imb.oil_pressure_idle_offset(),
            dt: ctx.dt,
        });
    }

    pub fn outputs(&self) -> EngineOutputs {
        EngineOutputs {
            state: self.state,
            timer: self.timer,
            n1: self.n1,
            n2: self.n2,
            fuel_flow: self.fuel_flow,
            egt: self.egt,
            oil_temperature: self.oil.temperature,
            oil_pressure: self.oil.pressure,
            oil_quantity: self.oil.quantity,
            oil_total: self.oil.total,
            fuel_used: 0.0,
            starter_command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fadec_controls::StarterCommand;
    use fadec_engine::idle_baseline;

    fn condition() -> FlightCondition {
        FlightCondition {
            mach: 0.0,
            pressure_altitude_ft: 0.0,
            ambient_temp_c: 15.0,
            ambient_pressure_hpa: 1013.0,
        }
    }

    fn imbalance() -> Imbalance {
        Imbalance {
            oil_temp_max: 90,
            oil_pressure_idle: 6,
            ..Imbalance::default()
        }
    }

    fn ctx(imb: &Imbalance) -> EngineContext<'_> {
        EngineContext {
            idle: idle_baseline(0.0, 0.0, 15.0, 1013.0),
            condition: condition(),
            imbalance: imb,
            on_ground: true,
            dt: 0.1,
            shutdown_hold_s: 1.8,
        }
    }

    fn record() -> EngineRecord {
        EngineRecord::new(EngineId::new(1).unwrap(), 17.0, 15.0, 15.0, 0.0)
    }

    #[test]
    fn master_on_with_air_starts_engine() {
        let imb = imbalance();
        let ctx = ctx(&imb);
        let profiler = FrameProfiler::new();
        let mut rec = record();

        let mut inp = EngineInputs {
            igniter: Igniter::Start,
            starter_pressurized: true,
            ..EngineInputs::default()
        };
        let (out, _) = rec.step(&ctx, &inp, &profiler);
        assert_eq!(out.state, EngineState::Off);

        inp.fuel_valve = 1.0;
        let (out, effects) = rec.step(&ctx, &inp, &profiler);
        assert_eq!(out.state, EngineState::Starting);
        assert_eq!(out.starter_command, Some(StarterCommand::Hold));
        assert!(effects.reset_fuel_used);
    }

    #[test]
    fn cold_engine_reads_ambient() {
        let imb = imbalance();
        let ctx = ctx(&imb);
        let mut rec = record();
        rec.egt = 200.0;
        let (out, _) = rec.step(&ctx, &EngineInputs::default(), &FrameProfiler::new());
        assert_eq!(out.state, EngineState::Off);
        assert_eq!(out.egt, 15.0);
        assert_eq!(out.fuel_flow, 0.0);
    }

    #[test]
    fn master_off_shuts_running_engine_and_holds() {
        let imb = imbalance();
        let ctx = ctx(&imb);
        let profiler = FrameProfiler::new();
        let mut rec = record();
        rec.state = EngineState::On;
        rec.n1 = 19.6;
        rec.n2 = 68.2;
        rec.egt = 390.0;
        rec.previous_valve = 1.0;
        rec.starter = EdgeDetector::new(true);

        let inp = EngineInputs {
            starter_engaged: true,
            fuel_valve: 0.0,
            sensor_n1: 19.6,
            sensor_n2: 68.2,
            ..EngineInputs::default()
        };
        let (out, _) = rec.step(&ctx, &inp, &profiler);
        assert_eq!(out.state, EngineState::Shutting);
        assert_eq!(out.starter_command, Some(StarterCommand::Release));
        assert_eq!(out.n2, 68.2);
        assert!((out.timer - 0.1).abs() < 1e-12);
    }

    fn running_at_idle(idle: &IdleBaseline) -> (EngineRecord, EngineInputs) {
        let mut rec = record();
        rec.state = EngineState::On;
        rec.n1 = idle.n1;
        rec.n2 = idle.n2;
        rec.previous_valve = 1.0;
        rec.starter = EdgeDetector::new(true);
        let inp = EngineInputs {
            starter_engaged: true,
            fuel_valve: 1.0,
            sensor_n1: idle.n1,
            sensor_n2: idle.n2,
            corrected_n1: idle.n1,
            ..EngineInputs::default()
        };
        (rec, inp)
    }

    #[test]
    fn igniter_start_relights_running_engine() {
        let imb = imbalance();
        let ctx = ctx(&imb);
        let profiler = FrameProfiler::new();
        let (mut rec, mut inp) = running_at_idle(&ctx.idle);

        let (out, _) = rec.step(&ctx, &inp, &profiler);
        assert_eq!(out.state, EngineState::On);

        inp.igniter = Igniter::Start;
        let (out, _) = rec.step(&ctx, &inp, &profiler);
        assert_eq!(out.state, EngineState::Restarting);
        assert_eq!(out.starter_command, None);

        // Selector left in START: idle is already reached, back to ON.
        let (out, _) = rec.step(&ctx, &inp, &profiler);
        assert_eq!(out.state, EngineState::On);
        let (out, _) = rec.step(&ctx, &inp, &profiler);
        assert_eq!(out.state, EngineState::On);
    }

    #[test]
    fn igniter_start_below_idle_keeps_running() {
        let imb = imbalance();
        let ctx = ctx(&imb);
        let profiler = FrameProfiler::new();
        let (mut rec, mut inp) = running_at_idle(&ctx.idle);
        inp.sensor_n2 = ctx.idle.n2 - 5.0;

        rec.step(&ctx, &inp, &profiler);
        inp.igniter = Igniter::Start;
        let (out, _) = rec.step(&ctx, &inp, &profiler);
        assert_eq!(out.state, EngineState::On);
    }
}
