//! Last measurements reported by the PCS, exposed read-only to the parameter
//! collaborator.
use crate::protocol::messages::inbound::{ChargerState, DebugRecord, InboundMessage, Temperatures};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PcsTelemetry {
    /// AC line voltage, V.
    pub ac_line_voltage: f32,
    /// AC line current, A.
    pub ac_line_current: f32,
    /// AC input power, kW.
    pub ac_power: f32,
    /// AC current limit applied by the charger, A.
    pub ac_current_limit: f32,
    /// DC-DC output current, A.
    pub dcdc_output_current: f32,
    pub dcdc_main_state: u8,
    pub dcdc_faulted: bool,
    pub precharge_status: u8,
    /// HV bus measured by the DC-DC, V.
    pub hv_bus_voltage: f32,
    /// LV bus measured by the DC-DC, V.
    pub lv_bus_voltage: f32,
    pub charger_state: Option<ChargerState>,
    pub hv_charge_status: u8,
    pub grid_config: u8,
    /// kW.
    pub instant_ac_power_available: f32,
    /// kW.
    pub max_ac_power_available: f32,
    pub temperatures: Option<Temperatures>,
    pub boot_id: Option<u64>,
    pub last_debug: Option<DebugRecord>,
}

impl PcsTelemetry {
    /// Store the measurements carried by `message`. Other messages are ignored.
    pub fn record(&mut self, message: &InboundMessage) {
        match message {
            InboundMessage::ChargeLine(line) => {
                self.ac_line_voltage = line.line_voltage;
                self.ac_line_current = line.line_current;
                self.ac_power = line.ac_power;
                self.ac_current_limit = line.current_limit;
            }
            InboundMessage::DcdcStatus(status) => {
                self.dcdc_output_current = status.output_current;
                self.dcdc_main_state = status.main_state;
                self.dcdc_faulted = status.faulted;
                self.precharge_status = status.precharge_status;
            }
            InboundMessage::BusVoltages(voltages) => {
                self.hv_bus_voltage = voltages.hv_bus;
                self.lv_bus_voltage = voltages.lv_bus;
            }
            InboundMessage::ChargeStatus(status) => {
                self.charger_state = Some(status.state);
                self.hv_charge_status = status.hv_charge_status;
                self.grid_config = status.grid_config;
                self.instant_ac_power_available = status.instant_ac_power_available;
                self.max_ac_power_available = status.max_ac_power_available;
            }
            InboundMessage::Temperatures(temperatures) => self.temperatures = Some(*temperatures),
            InboundMessage::BootId(boot_id) => self.boot_id = Some(*boot_id),
            InboundMessage::Debug(record) => self.last_debug = Some(*record),
            InboundMessage::VehicleMode(_)
            | InboundMessage::AlertMatrix(_)
            | InboundMessage::AlertLog(_) => {}
        }
    }

    /// Whether the charger last reported its Enable state.
    pub fn charger_ready(&self) -> bool {
        self.charger_state == Some(ChargerState::Enable)
    }
}
