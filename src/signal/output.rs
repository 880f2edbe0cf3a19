//! Signal output driver.
//!
//! Decides which channel is active for the current [`SystemState`] and
//! issues start / stop / duty operations through the [`PulsePort`].  The
//! last command sent to each channel is cached so the 100 Hz refresh does
//! not hammer the generators with identical writes.
//!
//! ## Rules
//!
//! - Not running: stop both channels, every call.
//! - Running: RPM is pinned per system type first (APU high, Container
//!   zero, unused channel zero), then the inactive channel is stopped and
//!   the active one driven at `frequency(rpm)`.
//! - A frequency of 0 stops the channel.  Active channels always run at
//!   the configured duty.

use crate::app::ports::PulsePort;
use crate::error::ChannelFault;
use crate::presets::pin_rpm;
use crate::state::SystemState;

use super::{Channel, FrequencyMapper};

/// Last command the driver issued to a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelOutput {
    /// Not yet commanded, or the last operation failed.
    Unknown,
    Stopped,
    Running { freq_hz: f32 },
}

impl ChannelOutput {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

pub struct SignalOutputDriver {
    mapper: FrequencyMapper,
    duty_percent: u8,
    outputs: [ChannelOutput; 2],
}

impl SignalOutputDriver {
    pub fn new(mapper: FrequencyMapper, duty_percent: u8) -> Self {
        Self {
            mapper,
            duty_percent: duty_percent.clamp(1, 100),
            outputs: [ChannelOutput::Unknown; 2],
        }
    }

    /// Last command issued to `channel`.
    pub fn output(&self, channel: Channel) -> ChannelOutput {
        self.outputs[channel.index()]
    }

    /// Bring the generators in line with `state`.
    ///
    /// Pinned RPM values are written back into `state`, so after a
    /// successful call the store always satisfies the per-type invariants.
    pub fn apply(
        &mut self,
        state: &mut SystemState,
        hw: &mut impl PulsePort,
    ) -> Result<(), ChannelFault> {
        if !state.system_running {
            return self.stop_all(hw);
        }

        let rpm = pin_rpm(state.system_type, state.rpm());
        state.set_rpm(rpm);

        match state.system_type.active_channel() {
            Some(active) => {
                self.stop_channel(active.other(), hw)?;
                let freq = self.mapper.frequency(rpm.get(active));
                self.drive(active, freq, hw)
            }
            None => self.stop_all(hw),
        }
    }

    /// Stop both channels unconditionally.  Both are attempted even if the
    /// first fails; the first fault is returned.
    pub fn stop_all(&mut self, hw: &mut impl PulsePort) -> Result<(), ChannelFault> {
        let mut first = None;
        for channel in Channel::ALL {
            let slot = &mut self.outputs[channel.index()];
            match hw.stop(channel) {
                Ok(()) => *slot = ChannelOutput::Stopped,
                Err(e) => {
                    *slot = ChannelOutput::Unknown;
                    first.get_or_insert(e);
                }
            }
        }
        first.map_or(Ok(()), Err)
    }

    fn stop_channel(
        &mut self,
        channel: Channel,
        hw: &mut impl PulsePort,
    ) -> Result<(), ChannelFault> {
        let slot = &mut self.outputs[channel.index()];
        if *slot == ChannelOutput::Stopped {
            return Ok(());
        }
        *slot = ChannelOutput::Unknown;
        hw.stop(channel)?;
        *slot = ChannelOutput::Stopped;
        Ok(())
    }

    fn drive(
        &mut self,
        channel: Channel,
        freq_hz: f32,
        hw: &mut impl PulsePort,
    ) -> Result<(), ChannelFault> {
        if freq_hz <= 0.0 {
            return self.stop_channel(channel, hw);
        }

        let slot = &mut self.outputs[channel.index()];
        if *slot == (ChannelOutput::Running { freq_hz }) {
            return Ok(());
        }

        let was_running = slot.is_running();
        *slot = ChannelOutput::Unknown;
        if !was_running {
            hw.set_duty_cycle(channel, self.duty_percent)?;
        }
        hw.start(channel, freq_hz)?;
        *slot = ChannelOutput::Running { freq_hz };
        Ok(())
    }
}
