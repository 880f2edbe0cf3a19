//! Single-colour status LED driver.
//!
//! Generic over any `embedded-hal` output pin so the same driver runs on
//! an ESP-IDF `PinDriver` and on a host mock.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) {
        if let Err(e) = self.pin.set_state(PinState::from(on)) {
            warn!("status LED write failed: {:?}", e);
            return;
        }
        self.on = on;
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
