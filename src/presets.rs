//! System types, speed modes, and the per-unit preset tables.
//!
//! Identifiers from the outside world are decoded here exactly once into
//! the closed [`SystemType`] enum.  The RPM pinning rules (APU always at its
//! fixed high speed, Container never rotating, inactive channel at 0) live
//! in [`pin_rpm`] and nowhere else.
//!
//! | Type        | Channel   | Low  | High |
//! |-------------|-----------|------|------|
//! | Carrier     | hall      | 1450 | 1800 |
//! | Thermo King | inductive | 1450 | 2200 |
//! | APU         | inductive | 2200 | 2200 |
//! | Container   | —         | 0    | 0    |

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::signal::Channel;
use crate::state::SensorSnapshot;

/// Low engine speed shared by Carrier and Thermo King.
pub const RPM_LOW: f32 = 1450.0;
/// Carrier high engine speed.
pub const RPM_CARRIER_HIGH: f32 = 1800.0;
/// Thermo King high engine speed.
pub const RPM_THERMO_KING_HIGH: f32 = 2200.0;
/// APU runs at a single fixed speed.
pub const RPM_APU_PINNED: f32 = 2200.0;

// ---------------------------------------------------------------------------
// System type
// ---------------------------------------------------------------------------

/// Refrigeration unit family being emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    #[default]
    Carrier,
    #[serde(rename = "thermoking")]
    ThermoKing,
    Apu,
    Container,
}

impl SystemType {
    pub const ALL: [SystemType; 4] = [
        SystemType::Carrier,
        SystemType::ThermoKing,
        SystemType::Apu,
        SystemType::Container,
    ];

    /// Case-insensitive match against the four wire identifiers.
    pub fn parse(id: &str) -> Result<Self, Error> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(id))
            .ok_or(Error::InvalidSystemType)
    }

    /// Like [`parse`](Self::parse) but unknown identifiers fall back to
    /// Carrier.  Returns `true` as the second element when the fallback
    /// was taken so the boundary can log it.
    pub fn normalize(id: &str) -> (Self, bool) {
        match Self::parse(id) {
            Ok(t) => (t, false),
            Err(_) => (Self::Carrier, true),
        }
    }

    /// Wire identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Carrier => "carrier",
            Self::ThermoKing => "thermoking",
            Self::Apu => "apu",
            Self::Container => "container",
        }
    }

    /// Name shown to the operator.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Carrier => "Carrier",
            Self::ThermoKing => "Thermo King",
            Self::Apu => "APU",
            Self::Container => "Container",
        }
    }

    /// Channel carrying this unit's signal, `None` for Container.
    pub const fn active_channel(self) -> Option<Channel> {
        match self {
            Self::Carrier => Some(Channel::Hall),
            Self::ThermoKing | Self::Apu => Some(Channel::Inductive),
            Self::Container => None,
        }
    }

    /// Channel whose RPM is reported as "active" in notifications.
    /// Hall for Carrier, inductive for everything else.
    pub const fn reported_channel(self) -> Channel {
        match self {
            Self::Carrier => Channel::Hall,
            _ => Channel::Inductive,
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Speed mode
// ---------------------------------------------------------------------------

/// Requested engine speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    #[default]
    Low,
    High,
}

impl SpeedMode {
    pub fn parse(mode: &str) -> Result<Self, Error> {
        let mode = mode.trim();
        if mode.eq_ignore_ascii_case("low") {
            Ok(Self::Low)
        } else if mode.eq_ignore_ascii_case("high") {
            Ok(Self::High)
        } else {
            Err(Error::InvalidSpeedMode)
        }
    }

    /// Speed-request input: held = high, released = low.
    pub const fn from_level(asserted: bool) -> Self {
        if asserted { Self::High } else { Self::Low }
    }
}

// ---------------------------------------------------------------------------
// RPM pair
// ---------------------------------------------------------------------------

/// Inductive and hall RPM, always written together.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpmPair {
    pub ind_rpm: f32,
    pub hall_rpm: f32,
}

impl RpmPair {
    pub const ZERO: RpmPair = RpmPair::new(0.0, 0.0);

    pub const fn new(ind_rpm: f32, hall_rpm: f32) -> Self {
        Self { ind_rpm, hall_rpm }
    }

    pub const fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Inductive => self.ind_rpm,
            Channel::Hall => self.hall_rpm,
        }
    }
}

/// Target RPM for `system` at `mode`.
pub fn target_rpm(system: SystemType, mode: SpeedMode) -> RpmPair {
    match (system, mode) {
        (SystemType::Carrier, SpeedMode::Low) => RpmPair::new(0.0, RPM_LOW),
        (SystemType::Carrier, SpeedMode::High) => RpmPair::new(0.0, RPM_CARRIER_HIGH),
        (SystemType::ThermoKing, SpeedMode::Low) => RpmPair::new(RPM_LOW, 0.0),
        (SystemType::ThermoKing, SpeedMode::High) => RpmPair::new(RPM_THERMO_KING_HIGH, 0.0),
        (SystemType::Apu, _) => RpmPair::new(RPM_APU_PINNED, 0.0),
        (SystemType::Container, _) => RpmPair::ZERO,
    }
}

/// Enforce the per-type RPM invariants on a running system: the unused
/// channel reads 0, APU is pinned high, Container never rotates.
/// Negative and non-finite values on the active channel clamp to 0.
pub fn pin_rpm(system: SystemType, rpm: RpmPair) -> RpmPair {
    let sane = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    match system {
        SystemType::Carrier => RpmPair::new(0.0, sane(rpm.hall_rpm)),
        SystemType::ThermoKing => RpmPair::new(sane(rpm.ind_rpm), 0.0),
        SystemType::Apu => RpmPair::new(RPM_APU_PINNED, 0.0),
        SystemType::Container => RpmPair::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Preset resolution
// ---------------------------------------------------------------------------

/// Everything a system-type change writes into the state store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub system_type: SystemType,
    /// RPM applied when (or while) the system runs.
    pub rpm: RpmPair,
    pub sensors: SensorSnapshot,
}

/// Default RPM and sensor values for `system`.
pub fn resolve(system: SystemType) -> Preset {
    Preset {
        system_type: system,
        rpm: target_rpm(system, SpeedMode::Low),
        sensors: sensor_defaults(system),
    }
}

/// Sensor table (°F / PSI) reflecting which physical sensors each unit has.
///
/// Carrier is the base.  Only Carrier exposes the redundant air sensor;
/// the APU has no return/discharge air, coil or refrigerant pressure
/// sensors at all.
pub fn sensor_defaults(system: SystemType) -> SensorSnapshot {
    let base = SensorSnapshot {
        return_air_temp: 70.0,
        discharge_air_temp: 55.0,
        ambient_temp: 85.0,
        coolant_temp: 183.0,
        coil_temp: 55.0,
        suction_pressure: 35.0,
        discharge_pressure: 180.0,
        redundant_air_temp: 70.0,
    };

    match system {
        SystemType::Carrier => base,
        SystemType::ThermoKing => SensorSnapshot {
            discharge_pressure: 385.0,
            redundant_air_temp: 0.0,
            ..base
        },
        SystemType::Container => SensorSnapshot {
            discharge_pressure: 185.0,
            redundant_air_temp: 0.0,
            ..base
        },
        SystemType::Apu => SensorSnapshot {
            return_air_temp: 0.0,
            discharge_air_temp: 0.0,
            coil_temp: 0.0,
            suction_pressure: 0.0,
            discharge_pressure: 0.0,
            redundant_air_temp: 0.0,
            ..base
        },
    }
}
