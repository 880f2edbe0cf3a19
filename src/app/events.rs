//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, push to the web UI,
//! feed the analog-calibration subsystem, etc.
//!
//! Every variant serializes to a JSON object with an internal `"type"`
//! tag and camelCase fields, matching what the bench UI consumes.

use heapless::String;
use serde::Serialize;

use crate::error::ChannelOp;
use crate::presets::SystemType;
use crate::signal::Channel;
use crate::state::{SensorId, SensorSnapshot, SystemSnapshot};

/// Capacity of a human-readable notice.
pub const NOTICE_CAPACITY: usize = 80;
/// Capacity of an acknowledgement message.
pub const ACK_MESSAGE_CAPACITY: usize = 96;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AppEvent {
    /// Full state snapshot.
    Status(SystemSnapshot),

    /// Human-readable notice (start, stop, speed change).
    Event(Notice),

    /// Structured RPM values after a change.
    #[serde(rename_all = "camelCase")]
    RpmUpdate {
        ind_rpm: f32,
        hall_rpm: f32,
        active_rpm: f32,
    },

    /// Acknowledgement for a command that carried a non-zero id.
    #[serde(rename = "response")]
    Ack(CommandAck),

    /// A preset was resolved; consumed by the analog-calibration subsystem.
    #[serde(rename = "preset", rename_all = "camelCase")]
    PresetApplied {
        system_type: SystemType,
        sensors: SensorSnapshot,
    },

    /// One sensor value was overridden.
    SensorUpdate { sensor: SensorId, value: f32 },

    /// A pulse channel failed and the system was forced to stop.
    Fault {
        channel: Channel,
        #[serde(serialize_with = "serialize_op")]
        op: ChannelOp,
        code: i32,
    },
}

/// Free-text notification shown in the UI log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub event_type: &'static str,
    pub message: String<NOTICE_CAPACITY>,
    pub timestamp: u32,
}

/// Command acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    pub command_id: u32,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String<ACK_MESSAGE_CAPACITY>>,
}

impl CommandAck {
    pub fn ok(command_id: u32) -> Self {
        Self {
            command_id,
            success: true,
            message: None,
        }
    }

    /// Failed ack carrying `reason`, truncated to fit.
    pub fn failed(command_id: u32, reason: impl core::fmt::Display) -> Self {
        Self {
            command_id,
            success: false,
            message: Some(truncated(reason)),
        }
    }
}

/// Render `value` into a fixed-capacity string, dropping whatever does
/// not fit.
pub fn truncated<const N: usize>(value: impl core::fmt::Display) -> String<N> {
    use core::fmt::Write;

    struct Lossy<'a, const N: usize>(&'a mut String<N>);

    impl<const N: usize> Write for Lossy<'_, N> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            for c in s.chars() {
                if self.0.push(c).is_err() {
                    break;
                }
            }
            Ok(())
        }
    }

    let mut out = String::new();
    let _ = write!(Lossy(&mut out), "{value}");
    out
}

fn serialize_op<S: serde::Serializer>(op: &ChannelOp, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(op)
}
