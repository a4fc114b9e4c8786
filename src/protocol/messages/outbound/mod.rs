//! Encoders for the frames emulating the vehicle around the PCS.
//!
//! Most frames are byte-exact keep-alive constants. The dynamic ones are:
//!
//! ```text
//! 0x22A  bits 16..20 activation code, bits 20..32 bus voltage (12 bit)
//! 0x2B2  bytes 0-1 LE power request (W), byte 2 charger flag, len 3 US / 5 EU
//! 0x23D  len 2 US / 4 EU
//! 0x21D  byte 0 0x5D US / 0x2D EU
//! 0x3B2  byte 0 alternates 0x5E / 0x5D
//! 0x545  alternates two payloads, 4-bit rolling counter, checksum
//! 0x108  byte 0 0xAA (HV request) / 0xCC
//! ```
//!
//! The alternation flags and the rolling counter live in [`OutboundEncoder`]
//! and advance only when their own message is encoded.
use crate::config::PcsVariant;
use crate::infra::codec::bits::set_field;
use crate::protocol::messages::{checksum, ids::OutboundMessage};
use crate::protocol::transport::can_frame::CanFrame;

//==================================================================================CONSTANTS
const HVP_CONTACTOR_STATE: [u8; 8] = [0xF6, 0x15, 0x09, 0x82, 0x18, 0x01, 0x00, 0x00];
const BMS_READY: [u8; 8] = [0xB9, 0x1C, 0x94, 0xAD, 0xC1, 0x15, 0x36, 0x6B];
const CP_EVSE_STATUS: [u8; 8] = [0x5D, 0x20, 0x00, 0x20, 0x80, 0x00, 0x60, 0x10];
const CP_EVSE_STATUS_EU_BYTE0: u8 = 0x2D;
const BMS_CONTACTOR_REQUEST: [u8; 8] = [0x08, 0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
/// 60 A in 0.5 A steps.
const CP_AC_LIMIT: [u8; 8] = [0x78, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
const CP_STATIC: [u8; 8] = [0xD8, 0x8C, 0x01, 0xB5, 0x4A, 0xC1, 0x0A, 0xE0];
const VC_FRONT_SENSORS: [u8; 8] = [0x2C, 0xB6, 0xA8, 0x7F, 0x02, 0x7F, 0x00, 0x00];
const UI_CHARGE_REQUEST: [u8; 8] = [0x04, 0x30, 0x29, 0x07, 0x00, 0x00, 0x00, 0x00];
const VC_FRONT_VEHICLE_STATUS: [u8; 8] = [0x09, 0x62, 0x78, 0x9D, 0x08, 0x2C, 0x12, 0x5A];
const CP_CHARGE_STATUS: [u8; 8] = [0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
const BMS_LOG: [u8; 8] = [0x5E, 0x0F, 0xF9, 0xFF, 0x00, 0xCB, 0xB6, 0x04];
const BMS_LOG_ALT_BYTE0: u8 = 0x5D;
const VC_FRONT_ALIVE_A: [u8; 8] = [0x14, 0x00, 0x3F, 0x70, 0x9F, 0x01, 0x0A, 0x00];
const VC_FRONT_ALIVE_B: [u8; 8] = [0x03, 0x19, 0x64, 0x32, 0x19, 0x00, 0x00, 0x00];
const VC_FRONT_ALIVE_COUNTER_BYTE: usize = 6;

const HV_REQUEST_ON: u8 = 0xAA;
const HV_REQUEST_OFF: u8 = 0xCC;
const CHARGER_ACTIVE_FLAG: u8 = 0x02;

//==================================================================================ACTIVATION
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Which PCS halves 0x22A asks to run.
pub enum PcsActivation {
    /// Everything shut down.
    None,
    ChargerOnly,
    DcdcOnly,
    Both,
}

impl PcsActivation {
    /// 4-bit bus command code.
    pub const fn code(&self) -> u8 {
        match self {
            Self::None => 0x0,
            Self::ChargerOnly => 0x4,
            Self::DcdcOnly => 0x9,
            Self::Both => 0xD,
        }
    }
}

//==================================================================================CONTEXT
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Controller state consumed by the dynamic encoders.
pub struct EncodeContext {
    pub variant: PcsVariant,
    pub activation: PcsActivation,
    /// Measured HV bus voltage relayed from the vehicle, volts.
    pub bus_voltage: u16,
    /// Current ramp output, watts.
    pub power_w: u16,
    /// Charge mode with an enabled session.
    pub charging: bool,
}

impl EncodeContext {
    /// Context of a controller that has not received anything yet.
    pub const fn idle(variant: PcsVariant) -> Self {
        Self {
            variant,
            activation: PcsActivation::None,
            bus_voltage: 0,
            power_w: 0,
            charging: false,
        }
    }
}

//==================================================================================ENCODER
#[derive(Debug, Clone)]
/// Encoder state: the two payload alternations and the 0x545 counter.
pub struct OutboundEncoder {
    alive_use_b: bool,
    alive_counter: u8,
    bms_log_use_alt: bool,
}

impl Default for OutboundEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundEncoder {
    /// Fresh state: 0x545 starts on payload A with counter 0, 0x3B2 on `0x5E`.
    pub const fn new() -> Self {
        Self {
            alive_use_b: false,
            alive_counter: 0,
            bms_log_use_alt: false,
        }
    }

    /// Counter value the next 0x545 frame will carry.
    pub fn alive_counter(&self) -> u8 {
        self.alive_counter
    }

    /// Build the frame for `message` from the current controller state.
    pub fn encode(&mut self, message: OutboundMessage, ctx: &EncodeContext) -> CanFrame {
        let id = message.id();
        let (data, len) = match message {
            OutboundMessage::CpChargeStatus => {
                let mut data = CP_CHARGE_STATUS;
                checksum::apply(&mut data, id);
                (data, 8)
            }
            OutboundMessage::HvpContactorState => (HVP_CONTACTOR_STATE, 8),
            OutboundMessage::BmsReady => (BMS_READY, 8),
            OutboundMessage::CpEvseStatus => {
                let mut data = CP_EVSE_STATUS;
                if ctx.variant == PcsVariant::Eu {
                    data[0] = CP_EVSE_STATUS_EU_BYTE0;
                }
                (data, 8)
            }
            OutboundMessage::HvsPcsControl => (encode_pcs_control(ctx), 4),
            OutboundMessage::BmsContactorRequest => (BMS_CONTACTOR_REQUEST, 8),
            OutboundMessage::CpAcLimit => {
                let len = match ctx.variant {
                    PcsVariant::Us => 2,
                    PcsVariant::Eu => 4,
                };
                (CP_AC_LIMIT, len)
            }
            OutboundMessage::CpStatic => (CP_STATIC, 8),
            OutboundMessage::ChargePowerRequest => encode_power_request(ctx),
            OutboundMessage::VcFrontSensors => (VC_FRONT_SENSORS, 8),
            OutboundMessage::UiChargeRequest => (UI_CHARGE_REQUEST, 4),
            OutboundMessage::VcFrontVehicleStatus => (VC_FRONT_VEHICLE_STATUS, 8),
            OutboundMessage::BmsLog => (self.next_bms_log(), 8),
            OutboundMessage::VcFrontAlive => (self.next_alive(), 8),
            OutboundMessage::VcuHvRequest => {
                let mut data = [0u8; 8];
                data[0] = if ctx.charging {
                    HV_REQUEST_ON
                } else {
                    HV_REQUEST_OFF
                };
                (data, 8)
            }
        };
        CanFrame::from_array(id, data, len)
    }

    fn next_bms_log(&mut self) -> [u8; 8] {
        let mut data = BMS_LOG;
        if self.bms_log_use_alt {
            data[0] = BMS_LOG_ALT_BYTE0;
        }
        self.bms_log_use_alt = !self.bms_log_use_alt;
        data
    }

    fn next_alive(&mut self) -> [u8; 8] {
        let mut data = if self.alive_use_b {
            VC_FRONT_ALIVE_B
        } else {
            VC_FRONT_ALIVE_A
        };
        // Payload A keeps its 0xA marker in the low nibble.
        data[VC_FRONT_ALIVE_COUNTER_BYTE] |= self.alive_counter << 4;
        checksum::apply(&mut data, OutboundMessage::VcFrontAlive.id());

        self.alive_use_b = !self.alive_use_b;
        self.alive_counter = (self.alive_counter + 1) & 0x0F;
        data
    }
}

fn encode_pcs_control(ctx: &EncodeContext) -> [u8; 8] {
    let mut data = [0u8; 8];
    set_field(&mut data, 16, 4, ctx.activation.code() as u32);
    set_field(&mut data, 20, 12, (ctx.bus_voltage & 0x0FFF) as u32);
    data
}

fn encode_power_request(ctx: &EncodeContext) -> ([u8; 8], usize) {
    let mut data = [0u8; 8];
    data[..2].copy_from_slice(&ctx.power_w.to_le_bytes());
    data[2] = if ctx.charging { CHARGER_ACTIVE_FLAG } else { 0x00 };
    let len = match ctx.variant {
        PcsVariant::Us => 3,
        PcsVariant::Eu => 5,
    };
    (data, len)
}
