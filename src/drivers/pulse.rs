//! CKP pulse generator driver.
//!
//! One [`PulseGenerator`] per output channel.  Frequency is rounded to
//! whole hertz for the LEDC timer; anything that rounds to 0 (or is not
//! finite) stops the channel instead of reaching the hardware.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives LEDC timers and channels via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::error::ChannelFault;
use crate::signal::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseState {
    Stopped,
    Running { freq_hz: u32 },
}

pub struct PulseGenerator {
    channel: Channel,
    duty_percent: u8,
    state: PulseState,
}

impl PulseGenerator {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            duty_percent: 50,
            state: PulseState::Stopped,
        }
    }

    /// Start, or retune if already running.
    pub fn start(&mut self, freq_hz: f32) -> Result<(), ChannelFault> {
        let hz = if freq_hz.is_finite() && freq_hz > 0.0 {
            freq_hz.round() as u32
        } else {
            0
        };
        if hz == 0 {
            return self.stop();
        }

        hw_init::pulse_set_frequency(self.channel, hz)?;
        if !self.is_running() {
            hw_init::pulse_set_duty(self.channel, self.duty_percent)?;
        }
        self.state = PulseState::Running { freq_hz: hz };
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ChannelFault> {
        // Mark stopped first: after a failed stop the output is not
        // trusted to be running either.
        self.state = PulseState::Stopped;
        hw_init::pulse_stop(self.channel)
    }

    /// Stored immediately; written to hardware now if running, otherwise
    /// on the next start.
    pub fn set_duty_cycle(&mut self, percent: u8) -> Result<(), ChannelFault> {
        self.duty_percent = percent.clamp(1, 100);
        if self.is_running() {
            hw_init::pulse_set_duty(self.channel, self.duty_percent)?;
        }
        Ok(())
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PulseState::Running { .. })
    }

    pub fn duty_percent(&self) -> u8 {
        self.duty_percent
    }
}
