//! Mock hardware adapter for integration tests.
//!
//! Records every pulse-generator and LED call so tests can assert on the
//! full command history without touching real LEDC/GPIO registers.
//! Faults can be injected per channel and operation.

use ckpsim::app::events::AppEvent;
use ckpsim::app::ports::{EventSink, IndicatorPort, InputLevels, InputPort, PulsePort};
use ckpsim::error::{ChannelFault, ChannelOp};
use ckpsim::signal::Channel;

// ── Pulse call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseCall {
    Start { channel: Channel, freq_hz: f32 },
    Stop { channel: Channel },
    SetDuty { channel: Channel, percent: u8 },
    Led { on: bool },
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<PulseCall>,
    /// Next matching operation fails once.
    pub fail_next: Option<(Channel, ChannelOp)>,
    /// Every matching operation fails.
    pub fail_always: Option<(Channel, ChannelOp)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            fail_next: None,
            fail_always: None,
        }
    }

    /// Whether `channel` is currently producing a signal, by replaying
    /// the call history.
    pub fn is_running(&self, channel: Channel) -> bool {
        self.frequency(channel).is_some()
    }

    /// Frequency `channel` was last started at, `None` if stopped.
    pub fn frequency(&self, channel: Channel) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match *c {
            PulseCall::Start { channel: ch, freq_hz } if ch == channel => Some(Some(freq_hz)),
            PulseCall::Stop { channel: ch } if ch == channel => Some(None),
            _ => None,
        })?
    }

    pub fn led_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match *c {
                PulseCall::Led { on } => Some(on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PulseCall::Start { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn check(&mut self, channel: Channel, op: ChannelOp) -> Result<(), ChannelFault> {
        if self.fail_always == Some((channel, op)) {
            return Err(ChannelFault::new(channel, op, -1));
        }
        if self.fail_next == Some((channel, op)) {
            self.fail_next = None;
            return Err(ChannelFault::new(channel, op, -1));
        }
        Ok(())
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl PulsePort for MockHardware {
    fn start(&mut self, channel: Channel, freq_hz: f32) -> Result<(), ChannelFault> {
        self.check(channel, ChannelOp::Start)?;
        self.calls.push(PulseCall::Start { channel, freq_hz });
        Ok(())
    }

    fn stop(&mut self, channel: Channel) -> Result<(), ChannelFault> {
        self.check(channel, ChannelOp::Stop)?;
        self.calls.push(PulseCall::Stop { channel });
        Ok(())
    }

    fn set_duty_cycle(&mut self, channel: Channel, percent: u8) -> Result<(), ChannelFault> {
        self.check(channel, ChannelOp::SetDutyCycle)?;
        self.calls.push(PulseCall::SetDuty { channel, percent });
        Ok(())
    }
}

impl IndicatorPort for MockHardware {
    fn set_led(&mut self, on: bool) {
        self.calls.push(PulseCall::Led { on });
    }
}

// ── MockInputs ────────────────────────────────────────────────

/// Operator panel whose levels the test sets directly.
#[derive(Default)]
pub struct MockInputs {
    pub levels: InputLevels,
}

impl InputPort for MockInputs {
    fn read_levels(&mut self) -> InputLevels {
        self.levels
    }
}

// ── VecSink ───────────────────────────────────────────────────

/// Collects every emitted event.
#[derive(Default)]
pub struct VecSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn acks(&self) -> Vec<(u32, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Ack(a) => Some((a.command_id, a.success)),
                _ => None,
            })
            .collect()
    }

    pub fn rpm_updates(&self) -> Vec<(f32, f32, f32)> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                AppEvent::RpmUpdate {
                    ind_rpm,
                    hall_rpm,
                    active_rpm,
                } => Some((ind_rpm, hall_rpm, active_rpm)),
                _ => None,
            })
            .collect()
    }

    pub fn faults(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Fault { .. }))
            .count()
    }

    /// Position of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&AppEvent) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
