//! Lightweight per-frame timing.
//!
//! Each frame is split into phases; every phase owns an accumulating timer.
//! Enabled programmatically or through the `FADEC_PROFILING` environment
//! variable. A summary goes out through `tracing` every
//! [`SUMMARY_INTERVAL_FRAMES`] frames.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Frames between two logged summaries.
pub const SUMMARY_INTERVAL_FRAMES: u64 = 100;

pub fn enable_profiling() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn disable_profiling() {
    ENABLED.store(false, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("FADEC_PROFILING").is_ok()
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Portions of a frame that are timed separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    StateMachine,
    Start,
    Shutdown,
    SteadyState,
    Fuel,
    ThrustLimits,
}

impl FramePhase {
    pub const ALL: [FramePhase; 7] = [
        FramePhase::Idle,
        FramePhase::StateMachine,
        FramePhase::Start,
        FramePhase::Shutdown,
        FramePhase::SteadyState,
        FramePhase::Fuel,
        FramePhase::ThrustLimits,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FramePhase::Idle => "idle",
            FramePhase::StateMachine => "state machine",
            FramePhase::Start => "start",
            FramePhase::Shutdown => "shutdown",
            FramePhase::SteadyState => "steady state",
            FramePhase::Fuel => "fuel",
            FramePhase::ThrustLimits => "thrust limits",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Per-phase timers plus a frame counter.
#[derive(Default)]
pub struct FrameProfiler {
    phases: [AccumulatingTimer; 7],
    frames: AtomicU64,
}

/// Running measurement of one phase. Records on [`PhaseTimer::stop`].
pub struct PhaseTimer<'a> {
    profiler: &'a FrameProfiler,
    phase: FramePhase,
    start: Option<Instant>,
}

impl PhaseTimer<'_> {
    pub fn stop(self) {
        if let Some(start) = self.start {
            self.profiler.phases[self.phase.slot()].record(start.elapsed().as_secs_f64());
        }
    }
}

impl FrameProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing a phase. A no-op when profiling is disabled.
    pub fn start(&self, phase: FramePhase) -> PhaseTimer<'_> {
        PhaseTimer {
            profiler: self,
            phase,
            start: is_enabled().then(Instant::now),
        }
    }

    pub fn phase(&self, phase: FramePhase) -> &AccumulatingTimer {
        &self.phases[phase.slot()]
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Count a finished frame and log the summary on every interval.
    pub fn end_frame(&self) {
        let n = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        if n % SUMMARY_INTERVAL_FRAMES == 0 && is_enabled() {
            self.log_summary();
        }
    }

    pub fn log_summary(&self) {
        for phase in FramePhase::ALL {
            let timer = self.phase(phase);
            if timer.count() > 0 {
                tracing::info!(
                    phase = phase.label(),
                    calls = timer.count(),
                    total_s = timer.total_seconds(),
                    avg_us = timer.average_seconds() * 1e6,
                    "frame profile"
                );
            }
        }
    }

    pub fn reset(&self) {
        for timer in &self.phases {
            timer.reset();
        }
        self.frames.store(0, Ordering::Relaxed);
    }
}
