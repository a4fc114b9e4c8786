//! Decoders for the frames received from the PCS (IPC bus) and the vehicle
//! control unit (vehicle bus).
//!
//! Every decoder works on the zero-padded 8-byte payload of a queue entry and
//! is total: a short frame decodes its missing bytes as zero, an unhandled
//! multiplexer value yields `None`.
//!
//! # Signal layout (Intel bit order, start|length)
//!
//! ```text
//! 0x264  0|14 line voltage ×0.033 V   24|8 AC power ×0.1 kW
//!        ((b2<<9|b1)>>7)&0x3FF line current ×0.1 A   32|10 current limit ×0.1 A
//! 0x224  0|2 precharge status  6|4 main state  15|1 faulted  16|12 output current ×0.1 A
//! 0x2C4  0|5 page (6), byte 0 = 0xC6/0xE6: 6|10 LV bus ×0.0390625 V  16|12 HV bus ×0.146484 V
//! 0x204  0|4 charger state  4|2 HV charge status  6|2 grid config
//!        24|8 instant AC power ×0.1 kW  32|8 max AC power ×0.1 kW
//! 0x2A4  0|11 11|11 22|11 33|11 signed temperatures ×0.1 +40 °C
//! 0x3A4  0|3 page, 8|56 alert flags
//! 0x424  0|11 alert id  16|8 count  24|11 CAN id  36|4 receive error
//! ```
use crate::infra::codec::bits::{field, signed_field};
use crate::protocol::messages::ids;
use crate::protocol::transport::rx_queue::RxQueueEntry;

//==================================================================================VEHICLE_MODE
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Enable request carried in the low nibble of byte 7 of 0x109.
pub enum EnableRequest {
    /// Code `0xA`.
    Enable,
    /// Code `0xC`.
    Disable,
    /// Any other code: keep the previous state.
    Unchanged,
}

impl EnableRequest {
    /// Map the 4-bit code.
    pub const fn from_code(code: u8) -> Self {
        match code & 0x0F {
            0xA => Self::Enable,
            0xC => Self::Disable,
            _ => Self::Unchanged,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Decoded 0x109 frame from the vehicle control unit.
pub struct VehicleModeFrame {
    /// Operating mode code, verbatim.
    pub mode_code: u8,
    /// Measured HV bus voltage (V), informational.
    pub bus_voltage: u16,
    /// HV voltage setpoint (V).
    pub voltage_setpoint: u16,
    /// Maximum charger power, in the unit configured by the firmware.
    pub max_power_raw: u16,
    /// AC current limit in amps (1..=16).
    pub ac_current_limit_a: u8,
    /// Charger enable request.
    pub enable: EnableRequest,
}

/// Decode 0x109.
pub fn decode_vehicle_mode(data: &[u8; 8]) -> VehicleModeFrame {
    VehicleModeFrame {
        mode_code: data[0],
        bus_voltage: u16::from_le_bytes([data[1], data[2]]),
        voltage_setpoint: u16::from_le_bytes([data[3], data[4]]),
        max_power_raw: u16::from_le_bytes([data[5], data[6]]),
        ac_current_limit_a: (data[7] >> 4) + 1,
        enable: EnableRequest::from_code(data[7]),
    }
}

//==================================================================================CHARGE_STATUS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Charger main state reported in 0x204.
pub enum ChargerState {
    Init,
    Idle,
    Startup,
    WaitForLineVoltage,
    QualifyLineConfig,
    Enable,
    Shutdown,
    Faulted,
    ClearFaults,
    /// Code not documented.
    Other(u8),
}

impl ChargerState {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Init,
            1 => Self::Idle,
            2 => Self::Startup,
            3 => Self::WaitForLineVoltage,
            4 => Self::QualifyLineConfig,
            5 => Self::Enable,
            6 => Self::Shutdown,
            7 => Self::Faulted,
            8 => Self::ClearFaults,
            other => Self::Other(other),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Decoded 0x204 frame.
pub struct ChargeStatus {
    pub state: ChargerState,
    pub hv_charge_status: u8,
    pub grid_config: u8,
    /// kW.
    pub instant_ac_power_available: f32,
    /// kW.
    pub max_ac_power_available: f32,
}

/// Decode 0x204.
pub fn decode_charge_status(data: &[u8; 8]) -> ChargeStatus {
    ChargeStatus {
        state: ChargerState::from_code(field(data, 0, 4) as u8),
        hv_charge_status: field(data, 4, 2) as u8,
        grid_config: field(data, 6, 2) as u8,
        instant_ac_power_available: data[3] as f32 * 0.1,
        max_ac_power_available: data[4] as f32 * 0.1,
    }
}

//==================================================================================DCDC_STATUS
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Decoded 0x224 frame.
pub struct DcdcStatus {
    pub precharge_status: u8,
    pub main_state: u8,
    pub faulted: bool,
    /// Amps.
    pub output_current: f32,
}

/// Decode 0x224.
pub fn decode_dcdc_status(data: &[u8; 8]) -> DcdcStatus {
    DcdcStatus {
        precharge_status: field(data, 0, 2) as u8,
        main_state: field(data, 6, 4) as u8,
        faulted: field(data, 15, 1) == 1,
        output_current: field(data, 16, 12) as f32 * 0.1,
    }
}

//==================================================================================CHARGE_LINE
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Decoded 0x264 frame.
pub struct ChargeLineStatus {
    /// Volts RMS.
    pub line_voltage: f32,
    /// Amps RMS.
    pub line_current: f32,
    /// kW.
    pub ac_power: f32,
    /// Amps.
    pub current_limit: f32,
}

/// Decode 0x264.
pub fn decode_charge_line(data: &[u8; 8]) -> ChargeLineStatus {
    // Line current straddles bytes 1 and 2 with a 9-bit shift of byte 2.
    let current_raw = ((((data[2] as u32) << 9) | data[1] as u32) >> 7) & 0x3FF;
    ChargeLineStatus {
        line_voltage: field(data, 0, 14) as f32 * 0.033,
        line_current: current_raw as f32 * 0.1,
        ac_power: data[3] as f32 * 0.1,
        current_limit: field(data, 32, 10) as f32 * 0.1,
    }
}

//==================================================================================TEMPERATURES
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Decoded 0x2A4 frame, degrees Celsius.
pub struct Temperatures {
    pub dcdc: f32,
    pub phase_a: f32,
    pub phase_b: f32,
    pub phase_c: f32,
}

fn temperature(data: &[u8; 8], start_bit: usize) -> f32 {
    signed_field(data, start_bit, 11) as f32 * 0.1 + 40.0
}

/// Decode 0x2A4.
pub fn decode_temperatures(data: &[u8; 8]) -> Temperatures {
    Temperatures {
        dcdc: temperature(data, 0),
        phase_a: temperature(data, 11),
        phase_b: temperature(data, 22),
        phase_c: temperature(data, 33),
    }
}

//==================================================================================LOGGING
/// Mux values of 0x2C4 carrying the DC-DC bus voltages.
///
/// The page selector is the low five bits of byte 0; both values are page 6
/// and differ only in bit 5. Bits 6..8 of byte 0 are the two low bits of the
/// LV bus field, not part of the selector.
pub const LOGGING_DCDC_MUX: [u8; 2] = [0xC6, 0xE6];

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Bus voltages measured by the DC-DC, from 0x2C4.
pub struct BusVoltages {
    /// Volts.
    pub hv_bus: f32,
    /// Volts.
    pub lv_bus: f32,
}

/// Decode 0x2C4. Returns `None` for every mux value but the DC-DC page.
pub fn decode_logging(data: &[u8; 8]) -> Option<BusVoltages> {
    if !LOGGING_DCDC_MUX.contains(&data[0]) {
        return None;
    }
    Some(BusVoltages {
        hv_bus: field(data, 16, 12) as f32 * 0.146484,
        lv_bus: field(data, 6, 10) as f32 * 0.0390625,
    })
}

//==================================================================================ALERTS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// One page of the 0x3A4 alert matrix.
pub struct AlertMatrixPage {
    /// Page selector, 0..=7.
    pub page: u8,
    /// 56 alert flags, bit 0 = first flag of the page.
    pub flags: u64,
}

/// Decode 0x3A4.
pub fn decode_alert_matrix(data: &[u8; 8]) -> AlertMatrixPage {
    let mut raw = [0u8; 8];
    raw[..7].copy_from_slice(&data[1..]);
    AlertMatrixPage {
        page: data[0] & 0x07,
        flags: u64::from_le_bytes(raw),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Decoded 0x424 alert log entry.
pub struct AlertLogEntry {
    pub alert_id: u16,
    pub count: u8,
    /// Identifier the PCS judged irrational; 0 for other alerts.
    pub can_id: u16,
    pub rx_error: u8,
}

/// Decode 0x424.
pub fn decode_alert_log(data: &[u8; 8]) -> AlertLogEntry {
    AlertLogEntry {
        alert_id: field(data, 0, 11) as u16,
        count: data[2],
        can_id: field(data, 24, 11) as u16,
        rx_error: field(data, 36, 4) as u8,
    }
}

//==================================================================================PASS_THROUGH
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw 0x76C debug record.
pub struct DebugRecord {
    pub mux: u8,
    pub data: [u8; 7],
}

/// Decode 0x76C.
pub fn decode_debug(data: &[u8; 8]) -> DebugRecord {
    let mut payload = [0u8; 7];
    payload.copy_from_slice(&data[1..]);
    DebugRecord {
        mux: data[0],
        data: payload,
    }
}

//==================================================================================DISPATCH
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Any frame the controller acts on.
pub enum InboundMessage {
    VehicleMode(VehicleModeFrame),
    ChargeStatus(ChargeStatus),
    DcdcStatus(DcdcStatus),
    ChargeLine(ChargeLineStatus),
    Temperatures(Temperatures),
    BusVoltages(BusVoltages),
    AlertMatrix(AlertMatrixPage),
    AlertLog(AlertLogEntry),
    BootId(u64),
    Debug(DebugRecord),
}

/// Decode a queue entry by identifier. Unknown identifiers and unhandled mux
/// pages return `None`.
pub fn decode(entry: &RxQueueEntry) -> Option<InboundMessage> {
    let data = &entry.data;
    let message = match entry.id {
        id if id == ids::VCU_MODE_REQUEST.raw() => {
            InboundMessage::VehicleMode(decode_vehicle_mode(data))
        }
        id if id == ids::PCS_CHARGE_STATUS.raw() => {
            InboundMessage::ChargeStatus(decode_charge_status(data))
        }
        id if id == ids::PCS_DCDC_STATUS.raw() => {
            InboundMessage::DcdcStatus(decode_dcdc_status(data))
        }
        id if id == ids::PCS_CHARGE_LINE_STATUS.raw() => {
            InboundMessage::ChargeLine(decode_charge_line(data))
        }
        id if id == ids::PCS_TEMPERATURES.raw() => {
            InboundMessage::Temperatures(decode_temperatures(data))
        }
        id if id == ids::PCS_LOGGING.raw() => InboundMessage::BusVoltages(decode_logging(data)?),
        id if id == ids::PCS_ALERT_MATRIX.raw() => {
            InboundMessage::AlertMatrix(decode_alert_matrix(data))
        }
        id if id == ids::PCS_ALERT_LOG.raw() => InboundMessage::AlertLog(decode_alert_log(data)),
        id if id == ids::PCS_BOOT_ID.raw() => InboundMessage::BootId(u64::from_le_bytes(*data)),
        id if id == ids::PCS_DEBUG.raw() => InboundMessage::Debug(decode_debug(data)),
        _ => return None,
    };
    Some(message)
}
