//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (pulse generators, operator inputs, LED, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::ChannelFault;
use crate::signal::Channel;

// ───────────────────────────────────────────────────────────────
// Pulse port (driven adapter: domain → signal generators)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the two CKP pulse generators.
///
/// Every operation may fail; a failure leaves the channel in an undefined
/// state and the caller must run the stop sequence.
pub trait PulsePort {
    /// Start the channel (or retune it if already running) at `freq_hz`.
    fn start(&mut self, channel: Channel, freq_hz: f32) -> Result<(), ChannelFault>;

    /// Stop the channel and drive its pins low.  Must be safe to repeat.
    fn stop(&mut self, channel: Channel) -> Result<(), ChannelFault>;

    /// Set the duty cycle (1–100 %) used while the channel runs.
    fn set_duty_cycle(&mut self, channel: Channel, percent: u8) -> Result<(), ChannelFault>;
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: operator panel → domain)
// ───────────────────────────────────────────────────────────────

/// Raw levels of the three operator inputs, `true` = asserted.
/// Polarity (active-low wiring) is resolved by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputLevels {
    pub speed_request: bool,
    pub auto_run: bool,
    pub stop: bool,
}

/// Read-side port: sampled once per input cycle.
pub trait InputPort {
    fn read_levels(&mut self) -> InputLevels;
}

// ───────────────────────────────────────────────────────────────
// Indicator port
// ───────────────────────────────────────────────────────────────

/// Status LED.
pub trait IndicatorPort {
    fn set_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, web
/// socket, analog-calibration subsystem, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Fan out to two sinks, e.g. the serial log and a transport callback.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}
