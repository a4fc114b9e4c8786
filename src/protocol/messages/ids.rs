//! Identifier table for every message the controller receives or emits.
use crate::protocol::transport::{can_id::CanId, traits::can_bus::BusChannel};

//==================================================================================INBOUND
/// Vehicle control unit: operating mode and charge request.
pub const VCU_MODE_REQUEST: CanId = CanId::from_masked(0x109);
/// PCS charger status.
pub const PCS_CHARGE_STATUS: CanId = CanId::from_masked(0x204);
/// PCS DC-DC status.
pub const PCS_DCDC_STATUS: CanId = CanId::from_masked(0x224);
/// PCS AC line status.
pub const PCS_CHARGE_LINE_STATUS: CanId = CanId::from_masked(0x264);
/// PCS temperatures.
pub const PCS_TEMPERATURES: CanId = CanId::from_masked(0x2A4);
/// PCS logging, multiplexed.
pub const PCS_LOGGING: CanId = CanId::from_masked(0x2C4);
/// PCS alert matrix.
pub const PCS_ALERT_MATRIX: CanId = CanId::from_masked(0x3A4);
/// PCS alert log.
pub const PCS_ALERT_LOG: CanId = CanId::from_masked(0x424);
/// PCS boot identifier.
pub const PCS_BOOT_ID: CanId = CanId::from_masked(0x504);
/// PCS debug output, multiplexed.
pub const PCS_DEBUG: CanId = CanId::from_masked(0x76C);

/// Identifiers the CAN driver must let through its acceptance filters.
pub const RX_ALLOWLIST: [CanId; 10] = [
    PCS_CHARGE_STATUS,
    PCS_DCDC_STATUS,
    PCS_CHARGE_LINE_STATUS,
    PCS_TEMPERATURES,
    PCS_LOGGING,
    PCS_ALERT_MATRIX,
    PCS_ALERT_LOG,
    PCS_BOOT_ID,
    PCS_DEBUG,
    VCU_MODE_REQUEST,
];

/// Whether `raw` is one of the identifiers the controller listens to.
pub fn is_registered(raw: u16) -> bool {
    RX_ALLOWLIST.iter().any(|id| id.raw() == raw)
}

//==================================================================================OUTBOUND
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Frames emitted to keep the PCS convinced it sits in a car.
pub enum OutboundMessage {
    /// 0x13D, charge port status (checksummed).
    CpChargeStatus,
    /// 0x20A, high-voltage contactor state.
    HvpContactorState,
    /// 0x212, battery ready.
    BmsReady,
    /// 0x21D, EVSE status from the charge port ECU.
    CpEvseStatus,
    /// 0x22A, PCS operating command and DC link voltage.
    HvsPcsControl,
    /// 0x232, battery contactor request.
    BmsContactorRequest,
    /// 0x23D, AC charge current limit.
    CpAcLimit,
    /// 0x25D, charge port static frame.
    CpStatic,
    /// 0x2B2, charge power request.
    ChargePowerRequest,
    /// 0x321, front body controller sensors.
    VcFrontSensors,
    /// 0x333, user interface charge request.
    UiChargeRequest,
    /// 0x3A1, front body controller vehicle status.
    VcFrontVehicleStatus,
    /// 0x3B2, battery log (alternating payload).
    BmsLog,
    /// 0x545, front body controller alive (alternating, counter, checksum).
    VcFrontAlive,
    /// 0x108, high-voltage request towards the vehicle control unit.
    VcuHvRequest,
}

impl OutboundMessage {
    /// Identifier on the wire.
    pub const fn id(&self) -> CanId {
        let raw = match self {
            Self::CpChargeStatus => 0x13D,
            Self::HvpContactorState => 0x20A,
            Self::BmsReady => 0x212,
            Self::CpEvseStatus => 0x21D,
            Self::HvsPcsControl => 0x22A,
            Self::BmsContactorRequest => 0x232,
            Self::CpAcLimit => 0x23D,
            Self::CpStatic => 0x25D,
            Self::ChargePowerRequest => 0x2B2,
            Self::VcFrontSensors => 0x321,
            Self::UiChargeRequest => 0x333,
            Self::VcFrontVehicleStatus => 0x3A1,
            Self::BmsLog => 0x3B2,
            Self::VcFrontAlive => 0x545,
            Self::VcuHvRequest => 0x108,
        };
        CanId::from_masked(raw)
    }

    /// Bus the frame is emitted on.
    pub const fn channel(&self) -> BusChannel {
        match self {
            Self::VcuHvRequest => BusChannel::Vehicle,
            _ => BusChannel::Ipc,
        }
    }
}

/// 10 ms class, in emission order.
pub const CLASS_10_MS: [OutboundMessage; 3] = [
    OutboundMessage::CpChargeStatus,
    OutboundMessage::HvsPcsControl,
    OutboundMessage::BmsLog,
];

/// 100 ms class, in emission order.
pub const CLASS_100_MS: [OutboundMessage; 11] = [
    OutboundMessage::HvpContactorState,
    OutboundMessage::BmsReady,
    OutboundMessage::CpEvseStatus,
    OutboundMessage::BmsContactorRequest,
    OutboundMessage::CpAcLimit,
    OutboundMessage::CpStatic,
    OutboundMessage::ChargePowerRequest,
    OutboundMessage::VcFrontSensors,
    OutboundMessage::UiChargeRequest,
    OutboundMessage::VcFrontVehicleStatus,
    OutboundMessage::VcuHvRequest,
];
