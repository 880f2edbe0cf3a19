//! System state store.
//!
//! [`SystemState`] is the single authoritative record of what the emulator
//! is doing.  It is owned exclusively by
//! [`AppService`](crate::app::service::AppService); everything else sees
//! [`SystemSnapshot`] copies.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::presets::{Preset, RpmPair, SystemType};

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// One of the eight simulated temperature / pressure sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorId {
    ReturnAirTemp,
    DischargeAirTemp,
    AmbientTemp,
    CoolantTemp,
    CoilTemp,
    SuctionPressure,
    DischargePressure,
    RedundantAirTemp,
}

impl SensorId {
    pub const ALL: [SensorId; 8] = [
        SensorId::ReturnAirTemp,
        SensorId::DischargeAirTemp,
        SensorId::AmbientTemp,
        SensorId::CoolantTemp,
        SensorId::CoilTemp,
        SensorId::SuctionPressure,
        SensorId::DischargePressure,
        SensorId::RedundantAirTemp,
    ];

    /// Wire name used by the UI.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReturnAirTemp => "returnAirTemp",
            Self::DischargeAirTemp => "dischargeAirTemp",
            Self::AmbientTemp => "ambientTemp",
            Self::CoolantTemp => "coolantTemp",
            Self::CoilTemp => "coilTemp",
            Self::SuctionPressure => "suctionPressure",
            Self::DischargePressure => "dischargePressure",
            Self::RedundantAirTemp => "redundantAirTemp",
        }
    }

    pub fn parse(name: &str) -> Result<Self, Error> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
            .ok_or(Error::MalformedCommand("unknown sensor"))
    }
}

/// Simulated sensor values (°F for temperatures, PSI for pressures).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    pub return_air_temp: f32,
    pub discharge_air_temp: f32,
    pub ambient_temp: f32,
    pub coolant_temp: f32,
    pub coil_temp: f32,
    pub suction_pressure: f32,
    pub discharge_pressure: f32,
    pub redundant_air_temp: f32,
}

impl SensorSnapshot {
    pub const ZERO: SensorSnapshot = SensorSnapshot {
        return_air_temp: 0.0,
        discharge_air_temp: 0.0,
        ambient_temp: 0.0,
        coolant_temp: 0.0,
        coil_temp: 0.0,
        suction_pressure: 0.0,
        discharge_pressure: 0.0,
        redundant_air_temp: 0.0,
    };

    pub fn get(&self, id: SensorId) -> f32 {
        *self.field(id)
    }

    pub fn set(&mut self, id: SensorId, value: f32) {
        *self.field_mut(id) = value;
    }

    fn field(&self, id: SensorId) -> &f32 {
        match id {
            SensorId::ReturnAirTemp => &self.return_air_temp,
            SensorId::DischargeAirTemp => &self.discharge_air_temp,
            SensorId::AmbientTemp => &self.ambient_temp,
            SensorId::CoolantTemp => &self.coolant_temp,
            SensorId::CoilTemp => &self.coil_temp,
            SensorId::SuctionPressure => &self.suction_pressure,
            SensorId::DischargePressure => &self.discharge_pressure,
            SensorId::RedundantAirTemp => &self.redundant_air_temp,
        }
    }

    fn field_mut(&mut self, id: SensorId) -> &mut f32 {
        match id {
            SensorId::ReturnAirTemp => &mut self.return_air_temp,
            SensorId::DischargeAirTemp => &mut self.discharge_air_temp,
            SensorId::AmbientTemp => &mut self.ambient_temp,
            SensorId::CoolantTemp => &mut self.coolant_temp,
            SensorId::CoilTemp => &mut self.coil_temp,
            SensorId::SuctionPressure => &mut self.suction_pressure,
            SensorId::DischargePressure => &mut self.discharge_pressure,
            SensorId::RedundantAirTemp => &mut self.redundant_air_temp,
        }
    }
}

// ---------------------------------------------------------------------------
// SystemState
// ---------------------------------------------------------------------------

/// Canonical emulator state.  Mutated only by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemState {
    pub system_type: SystemType,
    pub system_running: bool,
    pub auto_run_enabled: bool,
    pub ind_rpm: f32,
    pub hall_rpm: f32,
    pub led_state: bool,
    pub sensors: SensorSnapshot,
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemState {
    /// Power-on state: Carrier selected, stopped, everything zeroed.
    pub const fn new() -> Self {
        Self {
            system_type: SystemType::Carrier,
            system_running: false,
            auto_run_enabled: false,
            ind_rpm: 0.0,
            hall_rpm: 0.0,
            led_state: false,
            sensors: SensorSnapshot::ZERO,
        }
    }

    pub const fn rpm(&self) -> RpmPair {
        RpmPair::new(self.ind_rpm, self.hall_rpm)
    }

    /// Write both RPM fields.  Returns `true` if anything changed.
    pub fn set_rpm(&mut self, rpm: RpmPair) -> bool {
        if self.rpm() == rpm {
            return false;
        }
        self.ind_rpm = rpm.ind_rpm;
        self.hall_rpm = rpm.hall_rpm;
        true
    }

    /// RPM of the channel reported as active for the current type.
    pub const fn active_rpm(&self) -> f32 {
        self.rpm().get(self.system_type.reported_channel())
    }

    /// Stopped post-condition: not running, no auto-run, LED off, RPM 0.
    pub fn enter_stopped(&mut self) {
        self.system_running = false;
        self.auto_run_enabled = false;
        self.led_state = false;
        self.ind_rpm = 0.0;
        self.hall_rpm = 0.0;
    }

    /// Write a resolved preset.  RPM is only taken while running so a
    /// stopped system keeps both fields at 0.
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.system_type = preset.system_type;
        self.sensors = preset.sensors;
        let rpm = if self.system_running {
            preset.rpm
        } else {
            RpmPair::ZERO
        };
        self.set_rpm(rpm);
    }

    pub const fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            system_type: self.system_type,
            system_running: self.system_running,
            auto_run_enabled: self.auto_run_enabled,
            ind_rpm: self.ind_rpm,
            hall_rpm: self.hall_rpm,
            active_rpm: self.active_rpm(),
            led_state: self.led_state,
            sensors: self.sensors,
        }
    }
}

/// Read-only copy handed to the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    pub system_type: SystemType,
    pub system_running: bool,
    pub auto_run_enabled: bool,
    pub ind_rpm: f32,
    pub hall_rpm: f32,
    pub active_rpm: f32,
    pub led_state: bool,
    pub sensors: SensorSnapshot,
}

impl SystemSnapshot {
    /// Snapshot of the power-on state.
    pub const INITIAL: SystemSnapshot = SystemState::new().snapshot();
}

impl Default for SystemSnapshot {
    fn default() -> Self {
        Self::INITIAL
    }
}
