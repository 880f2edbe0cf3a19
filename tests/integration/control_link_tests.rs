//! Transport-side view of the controller: frames go in through the
//! [`ControlLink`], snapshots and events come back out.

use ckpsim::app::commands::AppCommand;
use ckpsim::app::events::AppEvent;
use ckpsim::app::link::{COMMAND_QUEUE_DEPTH, ControlLink};
use ckpsim::app::service::AppService;
use ckpsim::config::SystemConfig;
use ckpsim::presets::SystemType;
use ckpsim::signal::Channel;

use super::mock_hw::{MockHardware, VecSink};

fn boot(link: &ControlLink) -> (AppService, MockHardware, VecSink) {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = VecSink::new();
    app.start_up(0, &mut hw, &mut sink);
    link.publish(app.snapshot());
    sink.clear();
    (app, hw, sink)
}

#[test]
fn frames_are_applied_in_order_and_state_is_published() {
    let link = ControlLink::new();
    let (mut app, mut hw, mut sink) = boot(&link);

    link.submit_frame(br#"{"cmd":"preset","systemType":"thermoking","commandId":1}"#)
        .unwrap();
    link.submit_frame(br#"{"cmd":"run","commandId":2}"#).unwrap();
    link.submit_frame(br#"{"cmd":"rpm","mode":"high","commandId":3}"#)
        .unwrap();
    assert!(!link.state().system_running, "nothing applied before servicing");

    app.service_link(&link, 20, &mut hw, &mut sink);

    let snap = link.state();
    assert!(snap.system_running);
    assert_eq!(snap.system_type, SystemType::ThermoKing);
    assert_eq!(snap.ind_rpm, 2200.0);
    assert_eq!(snap.active_rpm, 2200.0);
    assert_eq!(sink.acks(), vec![(1, true), (2, true), (3, true)]);
    assert!(hw.is_running(Channel::Inductive));
    assert!(link.try_next().is_none(), "queue drained");
}

#[test]
fn undecodable_frame_is_acknowledged_as_failure() {
    let link = ControlLink::new();
    let (mut app, mut hw, mut sink) = boot(&link);

    link.submit_frame(br#"{"cmd":"warp","commandId":40}"#).unwrap();
    link.submit_frame(br#"{"cmd":"preset","systemType":"  ","commandId":41}"#)
        .unwrap();
    app.service_link(&link, 20, &mut hw, &mut sink);

    assert_eq!(sink.acks(), vec![(40, false), (41, false)]);
    assert_eq!(link.state(), app.snapshot());
    assert!(hw.calls.is_empty());
}

#[test]
fn full_queue_hands_the_command_back() {
    let link = ControlLink::new();
    for id in 1..=COMMAND_QUEUE_DEPTH as u32 {
        link.submit(AppCommand::Stop { command_id: id }).unwrap();
    }
    let overflow = AppCommand::Stop { command_id: 99 };
    assert_eq!(link.submit(overflow), Err(overflow));

    let (mut app, mut hw, mut sink) = {
        let mut app = AppService::new(SystemConfig::default());
        let mut hw = MockHardware::new();
        let mut sink = VecSink::new();
        app.start_up(0, &mut hw, &mut sink);
        sink.clear();
        (app, hw, sink)
    };
    app.service_link(&link, 20, &mut hw, &mut sink);
    assert_eq!(sink.acks().len(), COMMAND_QUEUE_DEPTH);
    assert!(link.submit(overflow).is_ok(), "room again after draining");
}

#[test]
fn status_request_replies_with_current_snapshot() {
    let link = ControlLink::new();
    let (mut app, mut hw, mut sink) = boot(&link);

    link.submit_frame(br#"{"cmd":"run","systemType":"apu"}"#).unwrap();
    app.service_link(&link, 20, &mut hw, &mut sink);
    sink.clear();

    link.submit_frame(br#"{"cmd":"status"}"#).unwrap();
    app.service_link(&link, 40, &mut hw, &mut sink);

    let [AppEvent::Status(snap)] = sink.events.as_slice() else {
        panic!("expected exactly one status, got {:?}", sink.events);
    };
    assert_eq!(snap.system_type, SystemType::Apu);
    assert_eq!(snap.ind_rpm, 2200.0);
    assert_eq!(*snap, link.state());
}

#[test]
fn sensor_override_round_trips_through_the_link() {
    let link = ControlLink::new();
    let (mut app, mut hw, mut sink) = boot(&link);

    link.submit_frame(br#"{"cmd":"updateSensor","sensor":"ambientTemp","value":101.5,"commandId":7}"#)
        .unwrap();
    app.service_link(&link, 20, &mut hw, &mut sink);

    assert_eq!(link.state().sensors.ambient_temp, 101.5);
    assert_eq!(sink.acks(), vec![(7, true)]);
}

#[test]
fn events_serialize_for_the_transport() {
    let link = ControlLink::new();
    let (mut app, mut hw, mut sink) = boot(&link);

    link.submit_frame(br#"{"cmd":"run","systemType":"carrier","commandId":5}"#)
        .unwrap();
    app.service_link(&link, 20, &mut hw, &mut sink);

    let frames: Vec<String> = sink
        .events
        .iter()
        .map(|e| serde_json::to_string(e).unwrap())
        .collect();
    assert!(frames.iter().any(|f| f.contains(r#""type":"response""#)
        && f.contains(r#""commandId":5"#)
        && f.contains(r#""success":true"#)));
    assert!(frames
        .iter()
        .any(|f| f.starts_with(r#"{"type":"rpmUpdate""#) && f.contains(r#""hallRpm":1450.0"#)));
    assert!(frames
        .iter()
        .any(|f| f.contains("Low speed is ON (1450 RPM) - Carrier")));
}
