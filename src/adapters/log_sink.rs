//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                info!(
                    "STATUS | {} | running={} auto={} | ind={:.0} hall={:.0} active={:.0} | led={}",
                    s.system_type.display_name(),
                    s.system_running,
                    s.auto_run_enabled,
                    s.ind_rpm,
                    s.hall_rpm,
                    s.active_rpm,
                    s.led_state,
                );
            }
            AppEvent::Event(n) => {
                info!("EVENT | {} | {}", n.event_type, n.message);
            }
            AppEvent::RpmUpdate {
                ind_rpm,
                hall_rpm,
                active_rpm,
            } => {
                info!(
                    "RPM | ind={:.1} hall={:.1} active={:.1}",
                    ind_rpm, hall_rpm, active_rpm
                );
            }
            AppEvent::Ack(ack) => match &ack.message {
                Some(msg) => info!("ACK | id={} success={} | {}", ack.command_id, ack.success, msg),
                None => info!("ACK | id={} success={}", ack.command_id, ack.success),
            },
            AppEvent::PresetApplied {
                system_type,
                sensors,
            } => {
                info!(
                    "PRESET | {} | RA={:.0} DA={:.0} AMB={:.0} COOL={:.0} COIL={:.0} \
                     SUC={:.0} DIS={:.0} RED={:.0}",
                    system_type.display_name(),
                    sensors.return_air_temp,
                    sensors.discharge_air_temp,
                    sensors.ambient_temp,
                    sensors.coolant_temp,
                    sensors.coil_temp,
                    sensors.suction_pressure,
                    sensors.discharge_pressure,
                    sensors.redundant_air_temp,
                );
            }
            AppEvent::SensorUpdate { sensor, value } => {
                info!("SENSOR | {}={:.2}", sensor.as_str(), value);
            }
            AppEvent::Fault { channel, op, code } => {
                error!("FAULT | {} channel {} failed (rc={})", channel, op, code);
            }
        }
    }
}
