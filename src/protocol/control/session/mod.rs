//! Charge session requested by the vehicle control unit through 0x109.
use embassy_time::{Duration, Instant};

use crate::config::PowerUnit;
use crate::protocol::messages::inbound::{EnableRequest, VehicleModeFrame};

//==================================================================================MODE
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Operating mode requested by the vehicle.
pub enum OperatingMode {
    Off,
    Run,
    Precharge,
    Charge,
    /// Code without a meaning; carried verbatim and ignored by the mode machine.
    Unknown(u8),
}

impl OperatingMode {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Off,
            1 => Self::Run,
            2 => Self::Precharge,
            4 => Self::Charge,
            other => Self::Unknown(other),
        }
    }

    pub const fn code(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Run => 1,
            Self::Precharge => 2,
            Self::Charge => 4,
            Self::Unknown(code) => *code,
        }
    }
}

//==================================================================================SESSION
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Latest request from the vehicle. Valid until the next 0x109 frame.
pub struct ChargeSession {
    pub mode: OperatingMode,
    /// Volts, informational.
    pub bus_voltage: u16,
    /// Volts.
    pub voltage_setpoint: u16,
    /// Watts, already converted from the configured unit.
    pub max_power_w: u16,
    /// Amps.
    pub ac_current_limit_a: u8,
    pub charger_enable: bool,
    last_update: Option<Instant>,
}

impl Default for ChargeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChargeSession {
    pub const fn new() -> Self {
        Self {
            mode: OperatingMode::Off,
            bus_voltage: 0,
            voltage_setpoint: 0,
            max_power_w: 0,
            ac_current_limit_a: 0,
            charger_enable: false,
            last_update: None,
        }
    }

    /// Take over every field of a new vehicle-mode frame. An enable code other
    /// than enable/disable keeps the previous flag.
    pub fn apply(&mut self, frame: &VehicleModeFrame, unit: PowerUnit, now: Instant) {
        self.mode = OperatingMode::from_code(frame.mode_code);
        self.bus_voltage = frame.bus_voltage;
        self.voltage_setpoint = frame.voltage_setpoint;
        self.max_power_w = unit.to_watts(frame.max_power_raw);
        self.ac_current_limit_a = frame.ac_current_limit_a;
        match frame.enable {
            EnableRequest::Enable => self.charger_enable = true,
            EnableRequest::Disable => self.charger_enable = false,
            EnableRequest::Unchanged => {}
        }
        self.last_update = Some(now);
    }

    /// Arrival time of the last vehicle-mode frame.
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    /// Whether the last frame is older than `timeout`. Without a timeout, or
    /// before the first frame, the session is never stale.
    pub fn is_stale(&self, now: Instant, timeout: Option<Duration>) -> bool {
        match (timeout, self.last_update) {
            (Some(timeout), Some(last)) => now
                .checked_duration_since(last)
                .is_some_and(|age| age > timeout),
            _ => false,
        }
    }
}
