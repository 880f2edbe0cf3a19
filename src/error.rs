//! Unified error types for the CKP emulator firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control task's error handling uniform.  All variants are `Copy` so they
//! travel through the controller and into command acknowledgements without
//! allocation.
//!
//! Only [`Error::OutputChannelFault`] is fatal: it forces the stop sequence.
//! Everything else is recovered locally (defaulting, clamping, or a failed
//! acknowledgement with no state change).

use core::fmt;

use crate::signal::Channel;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// System-type identifier did not match any known unit.
    /// Recovered by normalizing to Carrier; never fails a command.
    InvalidSystemType,
    /// Speed mode was neither `low` nor `high`.
    InvalidSpeedMode,
    /// The pulse generator behind a channel reported an error.
    OutputChannelFault(ChannelFault),
    /// A command frame from the transport could not be decoded.
    MalformedCommand(&'static str),
    /// The command is only meaningful while the system runs.
    NotRunning,
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSystemType => write!(f, "invalid system type"),
            Self::InvalidSpeedMode => write!(f, "invalid RPM mode"),
            Self::OutputChannelFault(e) => write!(f, "output channel fault: {e}"),
            Self::MalformedCommand(msg) => write!(f, "malformed command: {msg}"),
            Self::NotRunning => write!(f, "system not running"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output channel faults
// ---------------------------------------------------------------------------

/// Which pulse-generator operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOp {
    Start,
    Stop,
    SetFrequency,
    SetDutyCycle,
}

impl fmt::Display for ChannelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
            Self::SetFrequency => write!(f, "set frequency"),
            Self::SetDutyCycle => write!(f, "set duty cycle"),
        }
    }
}

/// A pulse channel refused an operation.  Leaves the channel in an
/// undefined frequency state, so the controller must stop everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFault {
    pub channel: Channel,
    pub op: ChannelOp,
    /// Raw driver return code, when the backend has one.
    pub code: i32,
}

impl ChannelFault {
    pub const fn new(channel: Channel, op: ChannelOp, code: i32) -> Self {
        Self { channel, op, code }
    }
}

impl fmt::Display for ChannelFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} channel {} failed (rc={})", self.channel, self.op, self.code)
    }
}

impl From<ChannelFault> for Error {
    fn from(e: ChannelFault) -> Self {
        Self::OutputChannelFault(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
