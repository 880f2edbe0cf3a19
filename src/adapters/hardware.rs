//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns both [`PulseGenerator`]s and the status LED, exposing them
//! through [`PulsePort`] and [`IndicatorPort`].  [`GpioInputs`] wraps the
//! three operator input pins behind [`InputPort`].  On non-espidf targets
//! the pulse generators use the cfg-gated simulation stubs in `hw_init`.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{IndicatorPort, InputLevels, InputPort, PulsePort};
use crate::drivers::pulse::PulseGenerator;
use crate::drivers::status_led::StatusLed;
use crate::error::ChannelFault;
use crate::signal::Channel;

/// Concrete adapter that combines the output hardware behind port traits.
pub struct HardwareAdapter<L: OutputPin> {
    inductive: PulseGenerator,
    hall: PulseGenerator,
    led: StatusLed<L>,
}

impl<L: OutputPin> HardwareAdapter<L> {
    pub fn new(led: StatusLed<L>) -> Self {
        Self {
            inductive: PulseGenerator::new(Channel::Inductive),
            hall: PulseGenerator::new(Channel::Hall),
            led,
        }
    }

    fn generator(&mut self, channel: Channel) -> &mut PulseGenerator {
        match channel {
            Channel::Inductive => &mut self.inductive,
            Channel::Hall => &mut self.hall,
        }
    }
}

// ── PulsePort implementation ──────────────────────────────────

impl<L: OutputPin> PulsePort for HardwareAdapter<L> {
    fn start(&mut self, channel: Channel, freq_hz: f32) -> Result<(), ChannelFault> {
        self.generator(channel).start(freq_hz)
    }

    fn stop(&mut self, channel: Channel) -> Result<(), ChannelFault> {
        self.generator(channel).stop()
    }

    fn set_duty_cycle(&mut self, channel: Channel, percent: u8) -> Result<(), ChannelFault> {
        self.generator(channel).set_duty_cycle(percent)
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<L: OutputPin> IndicatorPort for HardwareAdapter<L> {
    fn set_led(&mut self, on: bool) {
        self.led.set(on);
    }
}

// ── Operator inputs ───────────────────────────────────────────

/// The three active-low operator inputs (internal pull-ups).
pub struct GpioInputs<S: InputPin, A: InputPin, P: InputPin> {
    speed_request: S,
    auto_run: A,
    stop: P,
}

impl<S: InputPin, A: InputPin, P: InputPin> GpioInputs<S, A, P> {
    pub fn new(speed_request: S, auto_run: A, stop: P) -> Self {
        Self {
            speed_request,
            auto_run,
            stop,
        }
    }
}

/// Low = asserted.  A read error counts as released.
fn asserted(pin: &mut impl InputPin, name: &str) -> bool {
    match pin.is_low() {
        Ok(low) => low,
        Err(e) => {
            warn!("input {} read failed: {:?}", name, e);
            false
        }
    }
}

impl<S: InputPin, A: InputPin, P: InputPin> InputPort for GpioInputs<S, A, P> {
    fn read_levels(&mut self) -> InputLevels {
        InputLevels {
            speed_request: asserted(&mut self.speed_request, "speed_request"),
            auto_run: asserted(&mut self.auto_run, "auto_run"),
            stop: asserted(&mut self.stop, "stop"),
        }
    }
}
