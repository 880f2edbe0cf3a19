//! One-shot LEDC configuration and the raw pulse-output helpers.
//!
//! Both CKP channels are square waves generated by LEDC: the inductive
//! channel runs two LEDC channels (IND_1, IND_2) off one timer so the
//! pins stay in phase, the hall channel has its own timer.  Frequency is
//! a timer property, duty a channel property.
//!
//! | Signal    | Timer | LEDC channel(s) | GPIO   |
//! |-----------|-------|-----------------|--------|
//! | inductive | 0     | 0, 1            | 25, 26 |
//! | hall      | 1     | 2               | 27     |

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::ChannelFault;
#[cfg(target_os = "espidf")]
use crate::error::ChannelOp;
#[cfg(target_os = "espidf")]
use crate::pins;
use crate::signal::Channel;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcTimerFailed(i32),
    LedcChannelFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcTimerFailed(rc) => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::LedcChannelFailed(rc) => write!(f, "LEDC channel config failed (rc={})", rc),
        }
    }
}

// ── Layout ────────────────────────────────────────────────────

pub const LEDC_TIMER_IND: u32 = 0;
pub const LEDC_TIMER_HALL: u32 = 1;
pub const LEDC_CH_IND_1: u32 = 0;
pub const LEDC_CH_IND_2: u32 = 1;
pub const LEDC_CH_HALL: u32 = 2;

/// 8-bit duty resolution; 100 % maps to 255.
const DUTY_MAX: u32 = 255;

/// Timer driving `channel`.
pub const fn ledc_timer(channel: Channel) -> u32 {
    match channel {
        Channel::Inductive => LEDC_TIMER_IND,
        Channel::Hall => LEDC_TIMER_HALL,
    }
}

/// LEDC channels belonging to `channel`.
pub const fn ledc_channels(channel: Channel) -> &'static [u32] {
    match channel {
        Channel::Inductive => &[LEDC_CH_IND_1, LEDC_CH_IND_2],
        Channel::Hall => &[LEDC_CH_HALL],
    }
}

/// Percent (1–100) to raw 8-bit duty.
pub const fn duty_raw(percent: u8) -> u32 {
    let pct = if percent > 100 { 100 } else { percent as u32 };
    pct * DUTY_MAX / 100
}

// ── Init ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_pulse_outputs() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe { init_ledc() }?;
    info!("hw_init: LEDC configured (ind=T0/CH0+CH1, hall=T1/CH2), outputs idle low");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_pulse_outputs() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): LEDC init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    for timer in [LEDC_TIMER_IND, LEDC_TIMER_HALL] {
        let cfg = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: timer,
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
            freq_hz: pins::PULSE_INIT_FREQ_HZ,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        let ret = unsafe { ledc_timer_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcTimerFailed(ret));
        }
    }

    let outputs = [
        (LEDC_CH_IND_1, LEDC_TIMER_IND, pins::IND_1_GPIO),
        (LEDC_CH_IND_2, LEDC_TIMER_IND, pins::IND_2_GPIO),
        (LEDC_CH_HALL, LEDC_TIMER_HALL, pins::HALL_GPIO),
    ];
    for (channel, timer, gpio) in outputs {
        let cfg = ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            timer_sel: timer,
            gpio_num: gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        };
        let ret = unsafe { ledc_channel_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcChannelFailed(ret));
        }
        // Idle low until the first start.
        unsafe { ledc_stop(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, 0) };
    }
    Ok(())
}

// ── Pulse operations ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn check(ret: esp_err_t, channel: Channel, op: ChannelOp) -> Result<(), ChannelFault> {
    if ret == ESP_OK as i32 {
        Ok(())
    } else {
        Err(ChannelFault::new(channel, op, ret))
    }
}

/// Retune the channel's timer.
#[cfg(target_os = "espidf")]
pub fn pulse_set_frequency(channel: Channel, freq_hz: u32) -> Result<(), ChannelFault> {
    // SAFETY: timers were configured in init_ledc(); only the control loop
    // calls into the pulse helpers.
    let ret = unsafe {
        ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_timer(channel), freq_hz)
    };
    check(ret, channel, ChannelOp::SetFrequency)
}

/// Write duty to every LEDC channel of `channel` and latch it, which also
/// (re)enables output after a stop.
#[cfg(target_os = "espidf")]
pub fn pulse_set_duty(channel: Channel, percent: u8) -> Result<(), ChannelFault> {
    let duty = duty_raw(percent);
    for &ch in ledc_channels(channel) {
        // SAFETY: see pulse_set_frequency.
        let ret = unsafe { ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ch, duty) };
        check(ret, channel, ChannelOp::SetDutyCycle)?;
        let ret = unsafe { ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ch) };
        check(ret, channel, ChannelOp::SetDutyCycle)?;
    }
    Ok(())
}

/// Stop output and hold the pins low.
#[cfg(target_os = "espidf")]
pub fn pulse_stop(channel: Channel) -> Result<(), ChannelFault> {
    for &ch in ledc_channels(channel) {
        // SAFETY: see pulse_set_frequency.
        let ret = unsafe { ledc_stop(ledc_mode_t_LEDC_LOW_SPEED_MODE, ch, 0) };
        check(ret, channel, ChannelOp::Stop)?;
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn pulse_set_frequency(_channel: Channel, _freq_hz: u32) -> Result<(), ChannelFault> {
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn pulse_set_duty(_channel: Channel, _percent: u8) -> Result<(), ChannelFault> {
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn pulse_stop(_channel: Channel) -> Result<(), ChannelFault> {
    Ok(())
}
