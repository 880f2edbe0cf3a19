//! Polled debouncer for the three operator inputs.
//!
//! ## Behaviour
//!
//! Each input keeps its last accepted level.  When the raw sample differs,
//! a settle timer starts; if the raw level returns before the timer runs
//! out the change is discarded as bounce.  Once the new level has held for
//! the full settle window it is accepted and exactly one [`Edge`] is
//! reported.
//!
//! `poll()` must be called at a cadence faster than the settle window
//! (20 ms against 50 ms on the bench unit), on every input cycle, whether
//! or not the system runs.

use log::debug;

use crate::app::ports::InputLevels;

/// Accepted transition of a debounced input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Inactive → asserted.
    Pressed,
    /// Asserted → inactive.
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    StableLow,
    StableHigh,
}

impl Level {
    const fn from_raw(asserted: bool) -> Self {
        if asserted { Self::StableHigh } else { Self::StableLow }
    }
}

pub struct DebouncedInput {
    name: &'static str,
    settle_ms: u32,
    level: Level,
    pending_since_ms: Option<u32>,
}

impl DebouncedInput {
    /// New input, initially released.
    pub fn new(name: &'static str, settle_ms: u32) -> Self {
        Self {
            name,
            settle_ms,
            level: Level::StableLow,
            pending_since_ms: None,
        }
    }

    /// Feed one raw sample.  Returns an edge at most once per accepted
    /// transition.
    pub fn poll(&mut self, raw_asserted: bool, now_ms: u32) -> Option<Edge> {
        let raw = Level::from_raw(raw_asserted);
        if raw == self.level {
            self.pending_since_ms = None;
            return None;
        }

        let since = *self.pending_since_ms.get_or_insert(now_ms);
        if now_ms.wrapping_sub(since) < self.settle_ms {
            return None;
        }

        self.level = raw;
        self.pending_since_ms = None;
        let edge = match raw {
            Level::StableHigh => Edge::Pressed,
            Level::StableLow => Edge::Released,
        };
        debug!("input {}: {:?}", self.name, edge);
        Some(edge)
    }

    /// Last accepted level.
    pub fn is_asserted(&self) -> bool {
        self.level == Level::StableHigh
    }
}

/// Debounced result of one input cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputEdges {
    /// Debounced level of the speed-request input (read as a level).
    pub speed_request: bool,
    pub auto_run_pressed: bool,
    pub stop_pressed: bool,
}

/// The speed-request, auto-run and stop inputs, each debounced on its own.
pub struct OperatorInputs {
    speed_request: DebouncedInput,
    auto_run: DebouncedInput,
    stop: DebouncedInput,
}

impl OperatorInputs {
    pub fn new(settle_ms: u32) -> Self {
        Self {
            speed_request: DebouncedInput::new("speed_request", settle_ms),
            auto_run: DebouncedInput::new("auto_run", settle_ms),
            stop: DebouncedInput::new("stop", settle_ms),
        }
    }

    pub fn poll(&mut self, levels: InputLevels, now_ms: u32) -> InputEdges {
        self.speed_request.poll(levels.speed_request, now_ms);
        let auto_run = self.auto_run.poll(levels.auto_run, now_ms);
        let stop = self.stop.poll(levels.stop, now_ms);

        InputEdges {
            speed_request: self.speed_request.is_asserted(),
            auto_run_pressed: auto_run == Some(Edge::Pressed),
            stop_pressed: stop == Some(Edge::Pressed),
        }
    }
}
