//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (web UI,
//! operator panel) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.  JSON frames from the transport are decoded
//! here, once, into closed enums; nothing past this module compares
//! strings.

use std::borrow::Cow;

use log::warn;
use serde::Deserialize;

use crate::error::Error;
use crate::presets::{SpeedMode, SystemType};
use crate::state::SensorId;

/// Commands that external adapters can send into the application core.
///
/// `command_id == 0` means fire-and-forget: no acknowledgement is emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Start the emulator.  `None` keeps the currently selected type.
    Start {
        system_type: Option<SystemType>,
        command_id: u32,
    },

    /// Stop both outputs.  Always succeeds.
    Stop { command_id: u32 },

    /// Select low / high engine speed while running.
    SetSpeedMode { mode: SpeedMode, command_id: u32 },

    /// Switch system type and load its defaults.
    ApplyPreset {
        system_type: SystemType,
        command_id: u32,
    },

    /// Override one simulated sensor value.
    SetSensor {
        sensor: SensorId,
        value: f32,
        command_id: u32,
    },

    /// Ask for a full status snapshot (sent on client connect).
    RequestStatus,

    /// A frame that failed to decode.  Carried through the queue so the
    /// controller can fail its acknowledgement in order.
    Rejected(CommandRejection),
}

impl AppCommand {
    pub fn command_id(&self) -> u32 {
        match *self {
            Self::Start { command_id, .. }
            | Self::Stop { command_id }
            | Self::SetSpeedMode { command_id, .. }
            | Self::ApplyPreset { command_id, .. }
            | Self::SetSensor { command_id, .. } => command_id,
            Self::RequestStatus => 0,
            Self::Rejected(r) => r.command_id,
        }
    }
}

/// Why a frame was refused, plus whatever id could be salvaged from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRejection {
    pub command_id: u32,
    pub error: Error,
}

// ───────────────────────────────────────────────────────────────
// JSON decoding
// ───────────────────────────────────────────────────────────────

/// Text fields borrow from the frame (owned only when JSON escapes force
/// it), so their length never decides whether a frame parses.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandFrame<'a> {
    #[serde(borrow)]
    cmd: Cow<'a, str>,
    #[serde(default)]
    command_id: u32,
    #[serde(default, borrow)]
    system_type: Option<Cow<'a, str>>,
    #[serde(default, borrow)]
    mode: Option<Cow<'a, str>>,
    #[serde(default, borrow)]
    sensor: Option<Cow<'a, str>>,
    #[serde(default)]
    value: Option<f32>,
}

#[derive(Deserialize)]
struct IdOnly {
    #[serde(default, rename = "commandId")]
    command_id: u32,
}

/// Decode one transport frame.
///
/// Unknown system types are not an error: they normalize to Carrier with
/// a warning.  Everything else that does not fit is rejected with the
/// `commandId` recovered from the frame when possible.
pub fn decode_command(frame: &[u8]) -> Result<AppCommand, CommandRejection> {
    let parsed: CommandFrame = match serde_json::from_slice(frame) {
        Ok(f) => f,
        Err(e) => {
            warn!("decode_command: unparseable frame: {e}");
            let command_id = serde_json::from_slice::<IdOnly>(frame)
                .map(|f| f.command_id)
                .unwrap_or(0);
            return Err(CommandRejection {
                command_id,
                error: Error::MalformedCommand("unparseable frame"),
            });
        }
    };

    let command_id = parsed.command_id;
    let reject = |error: Error| CommandRejection { command_id, error };

    match parsed.cmd.as_ref() {
        "run" => Ok(AppCommand::Start {
            system_type: parsed.system_type.as_deref().map(normalize_type),
            command_id,
        }),
        "stop" => Ok(AppCommand::Stop { command_id }),
        "preset" => match parsed.system_type.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(AppCommand::ApplyPreset {
                system_type: normalize_type(id),
                command_id,
            }),
            _ => Err(reject(Error::InvalidSystemType)),
        },
        "rpm" => {
            let mode = parsed.mode.as_deref().unwrap_or("");
            SpeedMode::parse(mode)
                .map(|mode| AppCommand::SetSpeedMode { mode, command_id })
                .map_err(reject)
        }
        "updateSensor" => {
            let sensor = SensorId::parse(parsed.sensor.as_deref().unwrap_or(""))
                .map_err(reject)?;
            let value = parsed
                .value
                .ok_or_else(|| reject(Error::MalformedCommand("missing sensor value")))?;
            Ok(AppCommand::SetSensor {
                sensor,
                value,
                command_id,
            })
        }
        "status" => Ok(AppCommand::RequestStatus),
        other => {
            warn!("decode_command: unknown cmd '{other}'");
            Err(reject(Error::MalformedCommand("unknown cmd")))
        }
    }
}

fn normalize_type(id: &str) -> SystemType {
    let (system_type, defaulted) = SystemType::normalize(id);
    if defaulted {
        warn!("Unknown system type '{id}', defaulting to {system_type}");
    }
    system_type
}
