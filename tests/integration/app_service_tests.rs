//! Integration tests for the AppService → SignalOutputDriver → pulse port
//! pipeline.
//!
//! These run on the host (x86_64) and verify the full chain from an
//! incoming command or operator input down to pulse-generator calls and
//! outbound events, without any real hardware.

use ckpsim::app::commands::{AppCommand, decode_command};
use ckpsim::app::events::AppEvent;
use ckpsim::app::service::AppService;
use ckpsim::config::SystemConfig;
use ckpsim::error::ChannelOp;
use ckpsim::presets::{RpmPair, SpeedMode, SystemType};
use ckpsim::signal::{Channel, ChannelOutput};
use ckpsim::state::SensorId;

use super::mock_hw::{MockHardware, MockInputs, PulseCall, VecSink};

fn make_app_with(config: SystemConfig) -> (AppService, MockHardware, VecSink) {
    let mut app = AppService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = VecSink::new();
    app.start_up(0, &mut hw, &mut sink);
    hw.clear();
    sink.clear();
    (app, hw, sink)
}

fn make_app() -> (AppService, MockHardware, VecSink) {
    make_app_with(SystemConfig::default())
}

fn start(system_type: SystemType, command_id: u32) -> AppCommand {
    AppCommand::Start {
        system_type: Some(system_type),
        command_id,
    }
}

fn speed(mode: SpeedMode) -> AppCommand {
    AppCommand::SetSpeedMode {
        mode,
        command_id: 0,
    }
}

fn hz(rpm: f32) -> f32 {
    rpm / 60.0 * 205.0
}

/// Poll the input loop every 20 ms over `[from, to]`.
fn poll_span(
    app: &mut AppService,
    inputs: &mut MockInputs,
    from: u32,
    to: u32,
    hw: &mut MockHardware,
    sink: &mut VecSink,
) {
    for t in (from..=to).step_by(20) {
        app.poll_inputs(inputs, t, hw, sink);
    }
}

// ── Start / stop ──────────────────────────────────────────────

#[test]
fn start_up_leaves_both_channels_stopped() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = VecSink::new();
    app.start_up(0, &mut hw, &mut sink);

    assert!(hw.calls.contains(&PulseCall::Stop { channel: Channel::Inductive }));
    assert!(hw.calls.contains(&PulseCall::Stop { channel: Channel::Hall }));
    assert!(matches!(sink.events.last(), Some(AppEvent::Status(_))));
    assert_eq!(app.state().sensors.coolant_temp, 183.0, "carrier defaults loaded");
}

#[test]
fn start_carrier_acks_then_notifies() {
    let (mut app, mut hw, mut sink) = make_app();

    app.handle_command(start(SystemType::Carrier, 5), 0, &mut hw, &mut sink);

    let s = app.state();
    assert!(s.system_running);
    assert_eq!(s.system_type, SystemType::Carrier);
    assert_eq!(s.hall_rpm, 1450.0);
    assert_eq!(s.ind_rpm, 0.0);

    assert_eq!(sink.acks(), vec![(5, true)]);
    assert_eq!(sink.rpm_updates(), vec![(0.0, 1450.0, 1450.0)]);

    let ack = sink.position(|e| matches!(e, AppEvent::Ack(_))).unwrap();
    let rpm = sink
        .position(|e| matches!(e, AppEvent::RpmUpdate { .. }))
        .unwrap();
    assert!(ack < rpm, "ack must precede the RPM notification");

    assert_eq!(hw.frequency(Channel::Hall), Some(hz(1450.0)));
    assert!(!hw.is_running(Channel::Inductive));
    assert!(hw.calls.contains(&PulseCall::SetDuty {
        channel: Channel::Hall,
        percent: 50
    }));
}

#[test]
fn command_id_zero_gets_no_ack() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::ThermoKing, 0), 0, &mut hw, &mut sink);
    app.handle_command(AppCommand::Stop { command_id: 0 }, 10, &mut hw, &mut sink);
    assert!(sink.acks().is_empty());
}

#[test]
fn start_then_stop_is_fully_stopped_regardless_of_speed_changes() {
    let (mut app, mut hw, mut sink) = make_app();

    app.handle_command(start(SystemType::ThermoKing, 1), 0, &mut hw, &mut sink);
    app.handle_command(speed(SpeedMode::High), 5, &mut hw, &mut sink);
    app.handle_command(speed(SpeedMode::Low), 6, &mut hw, &mut sink);
    app.handle_command(speed(SpeedMode::High), 7, &mut hw, &mut sink);
    app.handle_command(AppCommand::Stop { command_id: 2 }, 8, &mut hw, &mut sink);

    let s = app.state();
    assert!(!s.system_running);
    assert!(!s.auto_run_enabled);
    assert!(!s.led_state);
    assert_eq!(s.rpm(), RpmPair::ZERO);
    assert!(!hw.is_running(Channel::Inductive));
    assert!(!hw.is_running(Channel::Hall));
    assert!(!hw.led_on());
    assert_eq!(sink.acks(), vec![(1, true), (2, true)]);
}

#[test]
fn stop_is_idempotent() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);

    app.handle_command(AppCommand::Stop { command_id: 3 }, 10, &mut hw, &mut sink);
    let once = app.state().clone();
    app.handle_command(AppCommand::Stop { command_id: 4 }, 20, &mut hw, &mut sink);

    assert_eq!(app.state(), &once);
    assert_eq!(sink.acks(), vec![(3, true), (4, true)]);
}

#[test]
fn stop_from_stopped_acks_then_notifies() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::Stop { command_id: 3 }, 0, &mut hw, &mut sink);

    assert_eq!(sink.acks(), vec![(3, true)]);
    assert!(hw.calls.contains(&PulseCall::Stop { channel: Channel::Hall }));
    assert_eq!(sink.rpm_updates(), vec![(0.0, 0.0, 0.0)]);

    let ack = sink.position(|e| matches!(e, AppEvent::Ack(_))).unwrap();
    let rpm = sink
        .position(|e| matches!(e, AppEvent::RpmUpdate { .. }))
        .unwrap();
    assert!(ack < rpm);
    assert!(matches!(sink.events.last(), Some(AppEvent::Status(_))));
}

// ── Per-type invariants ───────────────────────────────────────

#[test]
fn apu_stays_pinned_through_speed_changes() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Apu, 0), 0, &mut hw, &mut sink);
    assert_eq!(app.state().ind_rpm, 2200.0);

    for (t, mode) in [(10, SpeedMode::Low), (20, SpeedMode::High), (30, SpeedMode::Low)] {
        app.handle_command(speed(mode), t, &mut hw, &mut sink);
        assert_eq!(app.state().ind_rpm, 2200.0);
        assert_eq!(app.state().hall_rpm, 0.0);
    }
    assert_eq!(hw.frequency(Channel::Inductive), Some(hz(2200.0)));
    assert_eq!(hw.starts(), 1, "pinned RPM never retunes the generator");
}

#[test]
fn container_never_produces_a_signal() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Container, 4), 0, &mut hw, &mut sink);
    assert!(app.state().system_running);
    app.handle_command(speed(SpeedMode::High), 10, &mut hw, &mut sink);
    app.refresh_outputs(20, &mut hw, &mut sink);

    assert_eq!(app.state().rpm(), RpmPair::ZERO);
    assert_eq!(hw.starts(), 0);
    assert_eq!(sink.acks(), vec![(4, true)]);
}

#[test]
fn thermo_king_speed_modes() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::ThermoKing, 0), 0, &mut hw, &mut sink);
    app.handle_command(speed(SpeedMode::High), 10, &mut hw, &mut sink);
    assert_eq!(app.state().rpm(), RpmPair::new(2200.0, 0.0));
    assert_eq!(hw.frequency(Channel::Inductive), Some(hz(2200.0)));

    app.handle_command(speed(SpeedMode::Low), 20, &mut hw, &mut sink);
    assert_eq!(app.state().rpm(), RpmPair::new(1450.0, 0.0));
    assert_eq!(hw.frequency(Channel::Inductive), Some(hz(1450.0)));
}

#[test]
fn unchanged_speed_does_not_touch_hardware() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);
    hw.clear();
    app.handle_command(speed(SpeedMode::Low), 10, &mut hw, &mut sink);
    app.refresh_outputs(20, &mut hw, &mut sink);
    assert!(hw.calls.is_empty());
}

#[test]
fn unknown_type_starts_as_carrier_with_success_ack() {
    let (mut app, mut hw, mut sink) = make_app();
    let cmd = decode_command(br#"{"cmd":"run","systemType":"blimp","commandId":12}"#).unwrap();
    app.handle_command(cmd, 0, &mut hw, &mut sink);

    assert_eq!(app.state().system_type, SystemType::Carrier);
    assert_eq!(app.state().hall_rpm, 1450.0);
    assert_eq!(sink.acks(), vec![(12, true)]);
}

#[test]
fn run_without_type_keeps_selected_preset() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::ApplyPreset {
            system_type: SystemType::Apu,
            command_id: 0,
        },
        0,
        &mut hw,
        &mut sink,
    );
    app.handle_command(
        AppCommand::Start {
            system_type: None,
            command_id: 0,
        },
        10,
        &mut hw,
        &mut sink,
    );
    assert_eq!(app.state().system_type, SystemType::Apu);
    assert_eq!(app.state().ind_rpm, 2200.0);
}

// ── Rejections ────────────────────────────────────────────────

#[test]
fn speed_mode_while_stopped_is_rejected() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::SetSpeedMode {
            mode: SpeedMode::High,
            command_id: 6,
        },
        0,
        &mut hw,
        &mut sink,
    );
    assert_eq!(sink.acks(), vec![(6, false)]);
    assert_eq!(app.state().rpm(), RpmPair::ZERO);
    assert!(hw.calls.is_empty());
}

#[test]
fn invalid_speed_mode_frame_fails_ack_without_mutation() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);
    let before = app.state().clone();
    sink.clear();

    let cmd = decode_command(br#"{"cmd":"rpm","mode":"ludicrous","commandId":8}"#)
        .unwrap_or_else(AppCommand::Rejected);
    app.handle_command(cmd, 10, &mut hw, &mut sink);

    assert_eq!(app.state(), &before);
    let Some(AppEvent::Ack(ack)) = sink.events.first() else {
        panic!("expected an ack, got {:?}", sink.events);
    };
    assert_eq!(ack.command_id, 8);
    assert!(!ack.success);
    assert_eq!(ack.message.as_deref(), Some("invalid RPM mode"));
}

#[test]
fn non_finite_sensor_override_is_rejected() {
    let (mut app, mut hw, mut sink) = make_app();
    let before = app.state().sensors;
    app.handle_command(
        AppCommand::SetSensor {
            sensor: SensorId::CoilTemp,
            value: f32::INFINITY,
            command_id: 2,
        },
        0,
        &mut hw,
        &mut sink,
    );
    assert_eq!(app.state().sensors, before);
    assert_eq!(sink.acks(), vec![(2, false)]);
}

#[test]
fn sensor_override_updates_state_and_notifies() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::SetSensor {
            sensor: SensorId::SuctionPressure,
            value: 42.5,
            command_id: 3,
        },
        0,
        &mut hw,
        &mut sink,
    );
    assert_eq!(app.state().sensors.suction_pressure, 42.5);
    assert!(sink.events.contains(&AppEvent::SensorUpdate {
        sensor: SensorId::SuctionPressure,
        value: 42.5
    }));
    assert_eq!(sink.acks(), vec![(3, true)]);
}

// ── Presets ───────────────────────────────────────────────────

#[test]
fn preset_while_running_moves_signal_to_other_channel() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);
    assert!(hw.is_running(Channel::Hall));

    app.handle_command(
        AppCommand::ApplyPreset {
            system_type: SystemType::ThermoKing,
            command_id: 3,
        },
        10,
        &mut hw,
        &mut sink,
    );

    assert!(!hw.is_running(Channel::Hall));
    assert_eq!(hw.frequency(Channel::Inductive), Some(hz(1450.0)));
    assert_eq!(app.state().rpm(), RpmPair::new(1450.0, 0.0));
    assert_eq!(sink.acks(), vec![(3, true)]);

    let preset = sink.events.iter().rev().find_map(|e| match e {
        AppEvent::PresetApplied {
            system_type,
            sensors,
        } => Some((*system_type, *sensors)),
        _ => None,
    });
    let (system_type, sensors) = preset.unwrap();
    assert_eq!(system_type, SystemType::ThermoKing);
    assert_eq!(sensors.discharge_pressure, 385.0);
    assert_eq!(sensors.redundant_air_temp, 0.0);
}

#[test]
fn preset_while_stopped_records_type_only() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::ApplyPreset {
            system_type: SystemType::Apu,
            command_id: 0,
        },
        0,
        &mut hw,
        &mut sink,
    );
    assert_eq!(app.state().system_type, SystemType::Apu);
    assert_eq!(app.state().rpm(), RpmPair::ZERO);
    assert_eq!(app.state().sensors.return_air_temp, 0.0);
    assert_eq!(hw.starts(), 0);
}

// ── Notification throttle ─────────────────────────────────────

#[test]
fn rapid_mutations_produce_one_final_notification() {
    let config = SystemConfig {
        speed_input_enabled: false,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app_with(config);
    let mut inputs = MockInputs::default();

    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);
    sink.clear();

    app.handle_command(speed(SpeedMode::High), 10, &mut hw, &mut sink);
    app.handle_command(speed(SpeedMode::Low), 20, &mut hw, &mut sink);
    app.handle_command(speed(SpeedMode::High), 30, &mut hw, &mut sink);
    poll_span(&mut app, &mut inputs, 40, 180, &mut hw, &mut sink);
    assert!(sink.rpm_updates().is_empty(), "still inside the quiet window");

    poll_span(&mut app, &mut inputs, 200, 400, &mut hw, &mut sink);
    assert_eq!(sink.rpm_updates(), vec![(0.0, 1800.0, 1800.0)]);
}

#[test]
fn start_and_stop_bypass_the_throttle() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);
    app.handle_command(AppCommand::Stop { command_id: 0 }, 5, &mut hw, &mut sink);
    app.handle_command(start(SystemType::ThermoKing, 0), 10, &mut hw, &mut sink);
    assert_eq!(
        sink.rpm_updates(),
        vec![
            (0.0, 1450.0, 1450.0),
            (0.0, 0.0, 0.0),
            (1450.0, 0.0, 1450.0)
        ]
    );
}

// ── Operator inputs ───────────────────────────────────────────

#[test]
fn auto_run_press_starts_and_stop_press_stops() {
    let (mut app, mut hw, mut sink) = make_app();
    let mut inputs = MockInputs::default();

    inputs.levels.auto_run = true;
    poll_span(&mut app, &mut inputs, 0, 60, &mut hw, &mut sink);
    assert!(app.state().auto_run_enabled);
    assert!(app.state().system_running);
    assert!(hw.is_running(Channel::Hall));

    inputs.levels.auto_run = false;
    poll_span(&mut app, &mut inputs, 80, 160, &mut hw, &mut sink);
    assert!(app.state().system_running, "release is not a press");

    inputs.levels.stop = true;
    poll_span(&mut app, &mut inputs, 180, 260, &mut hw, &mut sink);
    assert!(!app.state().system_running);
    assert!(!app.state().auto_run_enabled);
    assert!(!hw.is_running(Channel::Hall));
}

#[test]
fn auto_run_toggle_off_never_stops() {
    let (mut app, mut hw, mut sink) = make_app();
    let mut inputs = MockInputs::default();

    for (from, level) in [(0, true), (100, false), (200, true)] {
        inputs.levels.auto_run = level;
        poll_span(&mut app, &mut inputs, from, from + 80, &mut hw, &mut sink);
    }
    assert!(!app.state().auto_run_enabled, "second press disables");
    assert!(app.state().system_running, "disabling auto-run does not stop");
}

#[test]
fn stop_input_while_stopped_does_nothing() {
    let (mut app, mut hw, mut sink) = make_app();
    let mut inputs = MockInputs::default();
    inputs.levels.stop = true;
    poll_span(&mut app, &mut inputs, 0, 100, &mut hw, &mut sink);
    assert!(sink.events.is_empty());
}

#[test]
fn bouncing_auto_run_input_is_ignored() {
    let (mut app, mut hw, mut sink) = make_app();
    let mut inputs = MockInputs::default();
    for (t, level) in [(0, true), (20, false), (40, true), (60, false), (80, false)] {
        inputs.levels.auto_run = level;
        app.poll_inputs(&mut inputs, t, &mut hw, &mut sink);
    }
    assert!(!app.state().auto_run_enabled);
    assert!(!app.state().system_running);
}

#[test]
fn speed_request_held_selects_high_while_running() {
    let (mut app, mut hw, mut sink) = make_app();
    let mut inputs = MockInputs::default();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);

    inputs.levels.speed_request = true;
    poll_span(&mut app, &mut inputs, 20, 100, &mut hw, &mut sink);
    assert_eq!(app.state().hall_rpm, 1800.0);
    assert_eq!(hw.frequency(Channel::Hall), Some(hz(1800.0)));
}

// ── LED ───────────────────────────────────────────────────────

#[test]
fn led_blinks_while_running_and_is_held_off_when_stopped() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);

    let mut seen = Vec::new();
    for _ in 0..4 {
        app.blink(&mut hw);
        seen.push(hw.led_on());
    }
    assert_eq!(seen, vec![true, false, true, false]);

    app.handle_command(AppCommand::Stop { command_id: 0 }, 10, &mut hw, &mut sink);
    app.blink(&mut hw);
    app.blink(&mut hw);
    assert!(!hw.led_on());
    assert!(!app.state().led_state);
}

// ── Channel faults ────────────────────────────────────────────

#[test]
fn start_fault_forces_stop_and_fails_ack() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.fail_always = Some((Channel::Hall, ChannelOp::Start));

    app.handle_command(start(SystemType::Carrier, 7), 0, &mut hw, &mut sink);

    assert!(!app.state().system_running);
    assert_eq!(app.state().rpm(), RpmPair::ZERO);
    assert_eq!(sink.acks(), vec![(7, false)]);
    assert_eq!(sink.faults(), 1);
    assert!(!hw.is_running(Channel::Hall));
    assert!(!hw.is_running(Channel::Inductive));
}

#[test]
fn fault_during_speed_change_stops_everything() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::ThermoKing, 0), 0, &mut hw, &mut sink);
    hw.fail_next = Some((Channel::Inductive, ChannelOp::Start));

    app.handle_command(
        AppCommand::SetSpeedMode {
            mode: SpeedMode::High,
            command_id: 11,
        },
        10,
        &mut hw,
        &mut sink,
    );

    assert!(!app.state().system_running);
    assert_eq!(sink.acks(), vec![(11, false)]);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::Fault {
            channel: Channel::Inductive,
            op: ChannelOp::Start,
            ..
        }
    )));
    assert!(!hw.is_running(Channel::Inductive));
}

#[test]
fn failed_stop_still_acks_and_reports_fault() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);
    hw.fail_next = Some((Channel::Inductive, ChannelOp::Stop));

    app.handle_command(AppCommand::Stop { command_id: 5 }, 10, &mut hw, &mut sink);

    assert!(!app.state().system_running);
    assert_eq!(sink.acks(), vec![(5, true)]);
    assert_eq!(sink.faults(), 1);
    assert!(!hw.is_running(Channel::Hall), "other channel still stopped");
}

#[test]
fn stuck_stop_while_idle_is_reported_once() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.fail_always = Some((Channel::Hall, ChannelOp::Stop));

    for t in (0..1000).step_by(10) {
        app.refresh_outputs(t, &mut hw, &mut sink);
    }
    assert_eq!(sink.faults(), 1);
    assert_eq!(sink.events.len(), 1, "only the fault itself: {:?}", sink.events);
    assert_eq!(app.output().output(Channel::Hall), ChannelOutput::Unknown);

    hw.fail_always = None;
    app.refresh_outputs(1000, &mut hw, &mut sink);
    assert_eq!(app.output().output(Channel::Hall), ChannelOutput::Stopped);

    hw.fail_always = Some((Channel::Hall, ChannelOp::Stop));
    for t in (1010..2000).step_by(10) {
        app.refresh_outputs(t, &mut hw, &mut sink);
    }
    assert_eq!(sink.faults(), 2, "a fresh failure after recovery is reported");
    assert!(sink.rpm_updates().is_empty());
}

#[test]
fn stuck_stop_after_running_settles_after_one_report() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(start(SystemType::Carrier, 0), 0, &mut hw, &mut sink);
    hw.fail_always = Some((Channel::Hall, ChannelOp::Stop));

    app.handle_command(AppCommand::Stop { command_id: 2 }, 10, &mut hw, &mut sink);
    assert!(!app.state().system_running);
    assert_eq!(sink.faults(), 1);
    sink.clear();

    for t in (20..1020).step_by(10) {
        app.refresh_outputs(t, &mut hw, &mut sink);
    }
    assert!(sink.events.is_empty(), "{:?}", sink.events);
}
