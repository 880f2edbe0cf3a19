//! Signal generation — RPM to pulse-train mapping and channel dispatch.
//!
//! ```text
//!  SystemState ──▶ SignalOutputDriver ──▶ PulsePort (inductive | hall)
//!                        │
//!                        └── FrequencyMapper (rpm / 60 * K)
//! ```
//!
//! The board has two independent outputs: the inductive channel (two pins
//! driven in phase, Thermo King / APU) and the hall channel (Carrier).  At
//! most one is ever active.

pub mod frequency;
pub mod output;

use core::fmt;

use serde::Serialize;

pub use frequency::FrequencyMapper;
pub use output::{ChannelOutput, SignalOutputDriver};

/// Physical output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Inductive pickup emulation (IND_1 + IND_2).
    Inductive,
    /// Hall-effect pickup emulation.
    Hall,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Inductive, Channel::Hall];

    /// Stable index for per-channel arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Inductive => 0,
            Self::Hall => 1,
        }
    }

    /// The channel that is not `self`.
    pub const fn other(self) -> Self {
        match self {
            Self::Inductive => Self::Hall,
            Self::Hall => Self::Inductive,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inductive => write!(f, "inductive"),
            Self::Hall => write!(f, "hall"),
        }
    }
}
