//! Control link — the only path between transport contexts and the
//! control task.
//!
//! Uses an `embassy-sync` bounded channel for inbound commands and a
//! blocking mutex around the latest [`SystemSnapshot`].  Transport code
//! never touches [`SystemState`](crate::state::SystemState) directly: it
//! submits commands and reads copies.
//!
//! ```text
//! ┌──────────────┐  AppCommand   ┌──────────────┐
//! │  Transport   │──────────────▶│ Control task │
//! │  (any ctx)   │◀──────────────│ (sole owner) │
//! └──────────────┘ SystemSnapshot└──────────────┘
//! ```

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use crate::state::SystemSnapshot;

use super::commands::{AppCommand, decode_command};

/// Commands buffered between control cycles.
pub const COMMAND_QUEUE_DEPTH: usize = 8;

pub struct ControlLink {
    commands: Channel<CriticalSectionRawMutex, AppCommand, COMMAND_QUEUE_DEPTH>,
    snapshot: Mutex<CriticalSectionRawMutex, Cell<SystemSnapshot>>,
}

impl Default for ControlLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlLink {
    /// `const` so the link can live in a `static`.
    pub const fn new() -> Self {
        Self {
            commands: Channel::new(),
            snapshot: Mutex::new(Cell::new(SystemSnapshot::INITIAL)),
        }
    }

    /// Queue a command without blocking.  A full queue hands the command
    /// back.
    pub fn submit(&self, cmd: AppCommand) -> Result<(), AppCommand> {
        self.commands.try_send(cmd).map_err(|TrySendError::Full(cmd)| cmd)
    }

    /// Decode a JSON frame and queue the result.  Frames that fail to
    /// decode are queued as [`AppCommand::Rejected`] so the control task
    /// acknowledges them in order.
    pub fn submit_frame(&self, frame: &[u8]) -> Result<(), AppCommand> {
        let cmd = decode_command(frame).unwrap_or_else(AppCommand::Rejected);
        self.submit(cmd)
    }

    /// Next pending command, if any.  Control task only.
    pub fn try_next(&self) -> Option<AppCommand> {
        self.commands.try_receive().ok()
    }

    /// Latest published state.
    pub fn state(&self) -> SystemSnapshot {
        self.snapshot.lock(Cell::get)
    }

    /// Replace the published state.  Control task only.
    pub fn publish(&self, snapshot: SystemSnapshot) {
        self.snapshot.lock(|cell| cell.set(snapshot));
    }
}
