//! Application service — the hexagonal core.
//!
//! [`AppService`] is the single owner of [`SystemState`].  It runs the
//! run / stop / speed state machine, drives the signal outputs and shapes
//! outbound notifications.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  InputPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  ControlLink ─▶│        AppService        │
//!                │ state · presets · output │ ──▶ PulsePort / IndicatorPort
//!                └──────────────────────────┘
//! ```
//!
//! ## States
//!
//! `Stopped` ⇄ `Running`, with speed-mode changes as self-transitions on
//! `Running`.  Stop is always accepted and always leaves both channels
//! stopped with zero RPM.  Any [`ChannelFault`] forces the stop sequence.
//!
//! Faults are latched per channel: a channel that keeps failing the same
//! operation is reported once, and again only after it has accepted a
//! command in between.

use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::drivers::debounce::OperatorInputs;
use crate::error::{ChannelFault, ChannelOp, Error};
use crate::presets::{self, RpmPair, SpeedMode, SystemType};
use crate::signal::{Channel, ChannelOutput, FrequencyMapper, SignalOutputDriver};
use crate::state::{SensorId, SystemSnapshot, SystemState};

use super::commands::{AppCommand, CommandRejection};
use super::events::{AppEvent, CommandAck};
use super::link::ControlLink;
use super::notify::NotificationThrottle;
use super::ports::{EventSink, IndicatorPort, InputPort, PulsePort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    state: SystemState,
    output: SignalOutputDriver,
    inputs: OperatorInputs,
    throttle: NotificationThrottle,
    /// Operation each channel last failed, until the channel recovers.
    faulted: [Option<ChannelOp>; 2],
}

impl AppService {
    /// Construct the service from (already validated) configuration.
    pub fn new(config: SystemConfig) -> Self {
        let mapper = FrequencyMapper::new(config.edges_per_revolution);
        Self {
            output: SignalOutputDriver::new(mapper, config.output_duty_percent),
            inputs: OperatorInputs::new(config.debounce_ms),
            throttle: NotificationThrottle::new(config.rpm_notify_interval_ms),
            faulted: [None; 2],
            state: SystemState::new(),
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the outputs into the power-on state and announce it.
    pub fn start_up(
        &mut self,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        let preset = presets::resolve(self.state.system_type);
        self.state.apply_preset(&preset);
        hw.set_led(false);
        if let Err(fault) = self.stop_outputs(hw) {
            self.fault_stop(fault, 0, now_ms, hw, sink);
        }
        info!(
            "AppService started: {} selected, outputs stopped",
            self.state.system_type.display_name()
        );
        sink.emit(&AppEvent::Status(self.snapshot()));
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one command from the transport or the operator panel.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Start {
                system_type,
                command_id,
            } => {
                let system_type = system_type.unwrap_or(self.state.system_type);
                self.start(system_type, command_id, now_ms, hw, sink);
            }
            AppCommand::Stop { command_id } => self.stop(command_id, now_ms, hw, sink),
            AppCommand::SetSpeedMode { mode, command_id } => {
                if !self.state.system_running {
                    warn!("Speed mode {:?} ignored: system not running", mode);
                    ack_failed(command_id, Error::NotRunning, sink);
                    return;
                }
                if self.state.system_type == SystemType::Container {
                    info!("Container: {:?} speed requested, RPM control not applicable", mode);
                }
                if let Err(fault) = self.set_speed(mode, hw) {
                    self.fault_stop(fault, command_id, now_ms, hw, sink);
                    return;
                }
                ack_ok(command_id, sink);
                self.throttle.on_state_change(&self.state, now_ms, sink);
            }
            AppCommand::ApplyPreset {
                system_type,
                command_id,
            } => self.apply_preset(system_type, command_id, now_ms, hw, sink),
            AppCommand::SetSensor {
                sensor,
                value,
                command_id,
            } => self.set_sensor(sensor, value, command_id, sink),
            AppCommand::RequestStatus => sink.emit(&AppEvent::Status(self.snapshot())),
            AppCommand::Rejected(CommandRejection { command_id, error }) => {
                warn!("Rejected command (id={}): {}", command_id, error);
                ack_failed(command_id, error, sink);
            }
        }
    }

    /// Drain the command queue and republish the state snapshot.
    pub fn service_link(
        &mut self,
        link: &ControlLink,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        while let Some(cmd) = link.try_next() {
            self.handle_command(cmd, now_ms, hw, sink);
        }
        link.publish(self.snapshot());
    }

    // ── Periodic work ─────────────────────────────────────────

    /// Input cycle: debounce, react to the auto-run and stop inputs,
    /// follow the speed-request level, then give the throttle a chance to
    /// deliver pending RPM changes.  Runs whether or not the system runs.
    pub fn poll_inputs(
        &mut self,
        input: &mut impl InputPort,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        let edges = self.inputs.poll(input.read_levels(), now_ms);

        if edges.auto_run_pressed {
            self.state.auto_run_enabled = !self.state.auto_run_enabled;
            info!(
                "Auto-run {}",
                if self.state.auto_run_enabled { "enabled" } else { "disabled" }
            );
            if self.state.auto_run_enabled && !self.state.system_running {
                let system_type = self.state.system_type;
                self.start(system_type, 0, now_ms, hw, sink);
            }
        }

        if edges.stop_pressed && self.state.system_running {
            info!("Stop input pressed");
            self.stop(0, now_ms, hw, sink);
        }

        if self.state.system_running && self.config.speed_input_enabled {
            let mode = SpeedMode::from_level(edges.speed_request);
            if let Err(fault) = self.set_speed(mode, hw) {
                self.fault_stop(fault, 0, now_ms, hw, sink);
            }
        }

        self.throttle.on_state_change(&self.state, now_ms, sink);
    }

    /// Signal cycle: re-assert the outputs against the current state.
    pub fn refresh_outputs(
        &mut self,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        if let Err(fault) = self.sync_outputs(hw) {
            self.fault_stop(fault, 0, now_ms, hw, sink);
        }
    }

    /// LED cycle: toggle while running, hold off while stopped.
    pub fn blink(&mut self, led: &mut impl IndicatorPort) {
        self.state.led_state = self.state.system_running && !self.state.led_state;
        led.set_led(self.state.led_state);
    }

    /// Period for [`blink`](Self::blink) in the current state.
    pub fn led_interval_ms(&self) -> u32 {
        if self.state.system_running {
            self.config.blink_interval_ms
        } else {
            self.config.idle_led_refresh_ms
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        self.state.snapshot()
    }

    pub fn output(&self) -> &SignalOutputDriver {
        &self.output
    }

    // ── Transitions ───────────────────────────────────────────

    fn start(
        &mut self,
        system_type: SystemType,
        command_id: u32,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        info!("Starting system: {}", system_type.display_name());
        self.state.system_running = true;
        let preset = presets::resolve(system_type);
        self.state.apply_preset(&preset);
        emit_preset(&self.state, sink);

        if let Err(fault) = self.sync_outputs(hw) {
            self.fault_stop(fault, command_id, now_ms, hw, sink);
            return;
        }

        ack_ok(command_id, sink);
        self.throttle.force(&self.state, now_ms, sink);
        sink.emit(&AppEvent::Status(self.snapshot()));
    }

    fn stop(
        &mut self,
        command_id: u32,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        let was_running = self.state.system_running;
        self.state.enter_stopped();
        hw.set_led(false);
        if let Err(fault) = self.stop_outputs(hw) {
            self.report_fault(fault, sink);
        }

        ack_ok(command_id, sink);
        if was_running {
            info!("System stopped");
        }
        self.throttle.force(&self.state, now_ms, sink);
        sink.emit(&AppEvent::Status(self.snapshot()));
    }

    /// Write the RPM for `mode` and resync outputs if anything changed.
    /// Container accepts the request but has no signal to change.
    fn set_speed(
        &mut self,
        mode: SpeedMode,
        hw: &mut impl PulsePort,
    ) -> Result<(), ChannelFault> {
        if self.state.system_type == SystemType::Container {
            return Ok(());
        }
        let target = presets::target_rpm(self.state.system_type, mode);
        if self.state.set_rpm(target) {
            info!(
                "{}: {:?} speed (ind={:.0}, hall={:.0})",
                self.state.system_type.display_name(),
                mode,
                target.ind_rpm,
                target.hall_rpm
            );
            self.sync_outputs(hw)?;
        }
        Ok(())
    }

    fn apply_preset(
        &mut self,
        system_type: SystemType,
        command_id: u32,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        info!("Preset: {}", system_type.display_name());
        let preset = presets::resolve(system_type);
        self.state.apply_preset(&preset);
        emit_preset(&self.state, sink);

        if self.state.system_running {
            if let Err(fault) = self.sync_outputs(hw) {
                self.fault_stop(fault, command_id, now_ms, hw, sink);
                return;
            }
            self.throttle.on_state_change(&self.state, now_ms, sink);
        }

        ack_ok(command_id, sink);
        sink.emit(&AppEvent::Status(self.snapshot()));
    }

    fn set_sensor(
        &mut self,
        sensor: SensorId,
        value: f32,
        command_id: u32,
        sink: &mut impl EventSink,
    ) {
        if !value.is_finite() {
            warn!("Sensor {} override rejected: {}", sensor.as_str(), value);
            ack_failed(
                command_id,
                Error::MalformedCommand("sensor value must be finite"),
                sink,
            );
            return;
        }
        self.state.sensors.set(sensor, value);
        info!("Sensor {} set to {:.2}", sensor.as_str(), value);
        sink.emit(&AppEvent::SensorUpdate { sensor, value });
        ack_ok(command_id, sink);
    }

    /// A channel misbehaved: stop everything, report, fail the command.
    /// A fault hit while already stopped and at rest changes nothing the
    /// UI shows, so only the fault itself is reported.
    fn fault_stop(
        &mut self,
        fault: ChannelFault,
        command_id: u32,
        now_ms: u32,
        hw: &mut (impl PulsePort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        let at_rest = !self.state.system_running && self.state.rpm() == RpmPair::ZERO;
        self.state.enter_stopped();
        hw.set_led(false);
        self.report_fault(fault, sink);
        if let Err(again) = self.stop_outputs(hw) {
            self.report_fault(again, sink);
        }

        ack_failed(command_id, Error::from(fault), sink);
        if !at_rest {
            self.throttle.force(&self.state, now_ms, sink);
            sink.emit(&AppEvent::Status(self.snapshot()));
        }
    }

    // ── Output plumbing ───────────────────────────────────────

    fn sync_outputs(&mut self, hw: &mut impl PulsePort) -> Result<(), ChannelFault> {
        let result = self.output.apply(&mut self.state, hw);
        self.clear_recovered();
        result
    }

    fn stop_outputs(&mut self, hw: &mut impl PulsePort) -> Result<(), ChannelFault> {
        let result = self.output.stop_all(hw);
        self.clear_recovered();
        result
    }

    /// Drop the latch of every channel whose last command went through.
    fn clear_recovered(&mut self) {
        for channel in Channel::ALL {
            let latched = &mut self.faulted[channel.index()];
            if latched.is_some() && self.output.output(channel) != ChannelOutput::Unknown {
                info!("{} channel recovered", channel);
                *latched = None;
            }
        }
    }

    /// Log and emit `fault` unless its channel is already latched on the
    /// same operation.
    fn report_fault(&mut self, fault: ChannelFault, sink: &mut impl EventSink) {
        let latched = &mut self.faulted[fault.channel.index()];
        if *latched == Some(fault.op) {
            debug!("{} (already reported)", fault);
            return;
        }
        *latched = Some(fault.op);
        error!("{}; forcing stop", fault);
        emit_fault(fault, sink);
    }
}

// ── Emit helpers ──────────────────────────────────────────────

fn ack_ok(command_id: u32, sink: &mut impl EventSink) {
    if command_id != 0 {
        sink.emit(&AppEvent::Ack(CommandAck::ok(command_id)));
    }
}

fn ack_failed(command_id: u32, error: Error, sink: &mut impl EventSink) {
    if command_id != 0 {
        sink.emit(&AppEvent::Ack(CommandAck::failed(command_id, error)));
    }
}

fn emit_preset(state: &SystemState, sink: &mut impl EventSink) {
    sink.emit(&AppEvent::PresetApplied {
        system_type: state.system_type,
        sensors: state.sensors,
    });
}

fn emit_fault(fault: ChannelFault, sink: &mut impl EventSink) {
    sink.emit(&AppEvent::Fault {
        channel: fault.channel,
        op: fault.op,
        code: fault.code,
    });
}
