//! CKP emulator firmware — main entry point.
//!
//! One cooperative loop owns the [`AppService`] and runs three cadences:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │  HardwareAdapter (Pulse+Indicator)  GpioInputs (Input)       │
//! │  LogEventSink (EventSink)           MonotonicClock           │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │          AppService (sole SystemState owner)       │      │
//! │  │  input 20 ms · signal 10 ms · LED 100 / 1000 ms    │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                         ▲                                    │
//! │                 ControlLink (static)  ◀── transport tasks    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{PinDriver, Pull};
use esp_idf_svc::hal::peripherals::Peripherals;
use log::info;

use ckpsim::adapters::hardware::{GpioInputs, HardwareAdapter};
use ckpsim::adapters::log_sink::LogEventSink;
use ckpsim::adapters::time::MonotonicClock;
use ckpsim::app::link::ControlLink;
use ckpsim::app::service::AppService;
use ckpsim::cadence::Cadence;
use ckpsim::config::SystemConfig;
use ckpsim::drivers::hw_init;
use ckpsim::drivers::status_led::StatusLed;
use ckpsim::pins;

/// Command intake and state publication for transport tasks.
static LINK: ControlLink = ControlLink::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CKP emulator v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {e}"))?;

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_pulse_outputs().map_err(|e| anyhow!("pulse output init failed: {e}"))?;

    let peripherals = Peripherals::take()?;
    let io = peripherals.pins;

    // The HAL types each GPIO separately, so the board map is checked
    // against the peripheral fields picked here at compile time.
    const _: () = assert!(
        pins::SPEED_REQUEST_GPIO == 4
            && pins::AUTO_RUN_GPIO == 33
            && pins::STOP_GPIO == 32
            && pins::STATUS_LED_GPIO == 2
    );

    // Active-low inputs with internal pull-ups.
    let mut speed_request = PinDriver::input(io.gpio4)?;
    speed_request.set_pull(Pull::Up)?;
    let mut auto_run = PinDriver::input(io.gpio33)?;
    auto_run.set_pull(Pull::Up)?;
    let mut stop = PinDriver::input(io.gpio32)?;
    stop.set_pull(Pull::Up)?;
    let led = PinDriver::output(io.gpio2)?;
    info!(
        "Inputs: speed=GPIO{} auto-run=GPIO{} stop=GPIO{}, LED=GPIO{}",
        pins::SPEED_REQUEST_GPIO,
        pins::AUTO_RUN_GPIO,
        pins::STOP_GPIO,
        pins::STATUS_LED_GPIO
    );

    let mut inputs = GpioInputs::new(speed_request, auto_run, stop);
    let mut hw = HardwareAdapter::new(StatusLed::new(led));
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    // ── 4. Application core ───────────────────────────────────
    let mut app = AppService::new(config.clone());
    app.start_up(clock.now_ms(), &mut hw, &mut sink);
    LINK.publish(app.snapshot());

    let mut input_tick = Cadence::new(config.input_poll_ms);
    let mut signal_tick = Cadence::new(config.signal_refresh_ms);
    let mut led_tick = Cadence::new(app.led_interval_ms());

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let now = clock.now_ms();

        if input_tick.due(now) {
            app.poll_inputs(&mut inputs, now, &mut hw, &mut sink);
            app.service_link(&LINK, now, &mut hw, &mut sink);
        }

        if signal_tick.due(now) {
            app.refresh_outputs(now, &mut hw, &mut sink);
        }

        led_tick.set_interval(app.led_interval_ms());
        if led_tick.due(now) {
            app.blink(&mut hw);
        }

        FreeRtos::delay_ms(config.signal_refresh_ms);
    }
}
