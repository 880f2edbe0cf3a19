//! System configuration parameters
//!
//! All tunable parameters for the CKP emulator.  Values are fixed at
//! construction; the defaults match the reference bench unit.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Signal ---
    /// Signal edges per shaft revolution (frequency = rpm / 60 * K).
    pub edges_per_revolution: f32,
    /// Duty cycle used whenever a channel is active (1-100%).
    pub output_duty_percent: u8,

    // --- Inputs ---
    /// Minimum time a raw level must hold before an edge is accepted.
    pub debounce_ms: u32,
    /// Honour the physical speed-request input every input cycle.
    /// When `false`, only `SetSpeedMode` commands change the speed.
    pub speed_input_enabled: bool,

    // --- Notifications ---
    /// Minimum spacing between throttled "RPM changed" notifications.
    pub rpm_notify_interval_ms: u32,

    // --- Timing ---
    /// Input loop cadence (debounce, speed level, command queue).
    pub input_poll_ms: u32,
    /// Signal loop cadence (output re-application).
    pub signal_refresh_ms: u32,
    /// Status LED toggle period while running.
    pub blink_interval_ms: u32,
    /// Status LED refresh period while stopped.
    pub idle_led_refresh_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Signal
            edges_per_revolution: 205.0,
            output_duty_percent: 50,

            // Inputs
            debounce_ms: 50,
            speed_input_enabled: true,

            // Notifications
            rpm_notify_interval_ms: 200,

            // Timing
            input_poll_ms: 20,       // 50 Hz
            signal_refresh_ms: 10,   // 100 Hz
            blink_interval_ms: 100,  // 5 Hz blink
            idle_led_refresh_ms: 1000,
        }
    }
}

impl SystemConfig {
    /// Reject values that would put an output in an undefined state or
    /// make the debounce window unobservable.
    pub fn validate(&self) -> Result<()> {
        if !self.edges_per_revolution.is_finite() || self.edges_per_revolution <= 0.0 {
            return Err(Error::Config("edges_per_revolution must be finite and > 0"));
        }
        if self.output_duty_percent == 0 || self.output_duty_percent > 100 {
            return Err(Error::Config("output_duty_percent must be 1-100"));
        }
        if self.input_poll_ms == 0
            || self.signal_refresh_ms == 0
            || self.blink_interval_ms == 0
            || self.idle_led_refresh_ms == 0
        {
            return Err(Error::Config("loop intervals must be non-zero"));
        }
        if self.debounce_ms < self.input_poll_ms {
            return Err(Error::Config("debounce_ms must be >= input_poll_ms"));
        }
        Ok(())
    }
}
