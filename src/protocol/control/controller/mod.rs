//! The controller context and its three task entry points.
//!
//! ```text
//! tick_fast   (1 ms, or 10 ms in burst) : drain RX queue, step ramp, emit cadence slot
//! tick_50ms                             : 0x545 (staggered strategy)
//! tick_100ms                            : mode machine, enable lines, countdown, faults
//! ```
//!
//! Lines, cadence and activation follow the mode machine, which only moves at
//! 100 ms boundaries. The power request does not wait for it: a received Off
//! or Run, or a stale session, holds the ramp at zero from the next fast tick.
//!
//! The firmware owns one [`PcsController`] and calls the entry points from
//! serialized task context; only the [`RxQueue`] is shared with the CAN
//! receive interrupt.
use embassy_time::Instant;

use crate::config::{CadenceStrategy, ControllerConfig};
use crate::error::ControllerError;
use crate::protocol::control::{
    cadence::CadenceScheduler,
    lines::{EnableLines, LineStates},
    mode::{ModeMachine, ModeOutputs},
    monitor::{charge_delay_passed, AlertMonitor, FaultReporter, PcsFault},
    ramp::PowerRamp,
    session::{ChargeSession, OperatingMode},
    telemetry::PcsTelemetry,
};
use crate::protocol::messages::{
    ids::{self, OutboundMessage},
    inbound::{self, InboundMessage},
    outbound::{EncodeContext, OutboundEncoder, PcsActivation},
};
use crate::protocol::transport::{
    rx_queue::{RxQueue, RxQueueEntry},
    traits::can_bus::CanBus,
};

//==================================================================================STATUS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Snapshot exposed to the parameter collaborator.
pub struct ControllerStatus {
    /// Mode the machine last evaluated, staleness included.
    pub mode: OperatingMode,
    /// Current power request, watts.
    pub power_w: u16,
    pub lines: LineStates,
    pub activation: PcsActivation,
    pub cadence_enabled: bool,
    /// Ramp held at zero, by the evaluated mode or by a pending Off/Run.
    pub force_zero: bool,
    pub mode_frame_stale: bool,
    /// At least one PCS alert flag is raised.
    pub alert_active: bool,
    pub power_down_remaining: u8,
    /// Frames refused by the transmit hardware.
    pub tx_dropped: u32,
    pub tx_sent: u32,
    /// Frames decoded and applied.
    pub rx_processed: u32,
    /// Frames with an unregistered identifier or unhandled mux page.
    pub rx_ignored: u32,
}

//==================================================================================CONTROLLER
pub struct PcsController {
    config: ControllerConfig,
    session: ChargeSession,
    telemetry: PcsTelemetry,
    mode: ModeMachine,
    ramp: PowerRamp,
    cadence: CadenceScheduler,
    encoder: OutboundEncoder,
    monitor: AlertMonitor,
    mode_frame_stale: bool,
    power_held: bool,
    tx_dropped: u32,
    tx_sent: u32,
    rx_processed: u32,
    rx_ignored: u32,
}

impl PcsController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            session: ChargeSession::new(),
            telemetry: PcsTelemetry::default(),
            mode: ModeMachine::new(),
            ramp: PowerRamp::new(config.ramp_step_w, config.power_ceiling_w),
            cadence: CadenceScheduler::new(config.cadence),
            encoder: OutboundEncoder::new(),
            monitor: AlertMonitor::new(),
            mode_frame_stale: false,
            power_held: true,
            tx_dropped: 0,
            tx_sent: 0,
            rx_processed: 0,
            rx_ignored: 0,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn session(&self) -> &ChargeSession {
        &self.session
    }

    pub fn telemetry(&self) -> &PcsTelemetry {
        &self.telemetry
    }

    pub fn monitor(&self) -> &AlertMonitor {
        &self.monitor
    }

    /// Time the machine last entered Charge.
    pub fn charge_entered_at(&self) -> Option<Instant> {
        self.mode.charge_entered_at()
    }

    /// One second of Off has elapsed since the last Off entry.
    pub fn power_down_elapsed(&self) -> bool {
        self.monitor.power_down_elapsed()
    }

    pub fn status(&self) -> ControllerStatus {
        let outputs = self.mode.outputs();
        ControllerStatus {
            mode: self.mode.mode(),
            power_w: self.ramp.current(),
            lines: outputs.lines,
            activation: outputs.activation,
            cadence_enabled: outputs.cadence_enabled,
            force_zero: outputs.force_zero || self.power_held,
            mode_frame_stale: self.mode_frame_stale,
            alert_active: self.monitor.any_alert(),
            power_down_remaining: self.monitor.power_down_remaining(),
            tx_dropped: self.tx_dropped,
            tx_sent: self.tx_sent,
            rx_processed: self.rx_processed,
            rx_ignored: self.rx_ignored,
        }
    }

    //------------------------------------------------------------------inbound
    /// Decode one received frame and apply it.
    pub fn process_entry(&mut self, entry: &RxQueueEntry, now: Instant) {
        if !ids::is_registered(entry.id) {
            self.rx_ignored = self.rx_ignored.wrapping_add(1);
            return;
        }
        let Some(message) = inbound::decode(entry) else {
            self.rx_ignored = self.rx_ignored.wrapping_add(1);
            return;
        };
        self.rx_processed = self.rx_processed.wrapping_add(1);

        match &message {
            InboundMessage::VehicleMode(frame) => {
                self.session.apply(frame, self.config.power_unit, now);
            }
            InboundMessage::AlertMatrix(page) => self.monitor.record_alert_page(page),
            InboundMessage::AlertLog(log) => self.monitor.record_alert_log(log),
            _ => self.telemetry.record(&message),
        }
    }

    //------------------------------------------------------------------tasks
    /// Fast task: drain the queue, step the ramp, emit the frames due now.
    pub fn tick_fast<const CAP: usize, B: CanBus>(
        &mut self,
        queue: &RxQueue<CAP>,
        now: Instant,
        bus: &mut B,
    ) {
        queue.drain(|entry| self.process_entry(&entry, now));

        self.power_held = self.power_held(now);
        let enabled = !self.power_held && self.ramp_enabled(now);
        self.ramp.update(self.session.max_power_w, enabled);

        let slot = self.cadence.advance(self.mode.outputs().cadence_enabled);
        for message in slot.frames() {
            self.send(*message, bus);
        }
    }

    /// 50 ms task: the front controller alive frame.
    pub fn tick_50ms<B: CanBus>(&mut self, bus: &mut B) {
        if self.config.cadence == CadenceStrategy::Staggered
            && self.mode.outputs().cadence_enabled
        {
            self.send(OutboundMessage::VcFrontAlive, bus);
        }
    }

    /// 100 ms task: evaluate the mode, drive the lines, report faults.
    pub fn tick_100ms<L: EnableLines, R: FaultReporter>(
        &mut self,
        now: Instant,
        lines: &mut L,
        reporter: &mut R,
    ) -> Result<(), ControllerError<L::Error>> {
        let stale = self.session.is_stale(now, self.config.mode_timeout);
        self.mode_frame_stale = stale;
        if self.monitor.update_staleness(stale) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Vehicle mode frame stale, forcing Off");
            reporter.report(PcsFault::ModeFrameStale);
        }

        let effective = self.requested_mode(now);
        let transition = self.mode.apply(effective, now);
        if transition.entered_off {
            self.monitor.reset_power_down();
        } else if effective == OperatingMode::Off {
            self.monitor.tick_power_down();
        }

        lines
            .drive(self.mode.outputs().lines)
            .map_err(ControllerError::EnableLines)?;

        self.monitor.poll(reporter);
        Ok(())
    }

    //------------------------------------------------------------------helpers
    /// Mode the vehicle currently asks for, Off once the session is stale.
    fn requested_mode(&self, now: Instant) -> OperatingMode {
        if self.session.is_stale(now, self.config.mode_timeout) {
            OperatingMode::Off
        } else {
            self.session.mode
        }
    }

    /// Zero power is due either from the evaluated outputs or from a request
    /// the next 100 ms evaluation will turn into Off or Run.
    fn power_held(&self, now: Instant) -> bool {
        let requested = ModeOutputs::for_mode(self.requested_mode(now));
        self.mode.outputs().force_zero || requested.is_some_and(|outputs| outputs.force_zero)
    }

    fn ramp_enabled(&self, now: Instant) -> bool {
        let delay_passed = charge_delay_passed(
            self.mode.charge_entered_at(),
            now,
            self.config.charge_delay_minutes,
        );
        let ready = !self.config.require_charger_ready || self.telemetry.charger_ready();
        self.session.charger_enable && delay_passed && ready
    }

    fn encode_context(&self) -> EncodeContext {
        EncodeContext {
            variant: self.config.variant,
            activation: self.mode.outputs().activation,
            bus_voltage: self.session.bus_voltage,
            power_w: self.ramp.current(),
            charging: !self.power_held
                && self.mode.mode() == OperatingMode::Charge
                && self.session.charger_enable,
        }
    }

    fn send<B: CanBus>(&mut self, message: OutboundMessage, bus: &mut B) {
        let context = self.encode_context();
        let frame = self.encoder.encode(message, &context);
        match bus.try_send(message.channel(), &frame) {
            Ok(()) => self.tx_sent = self.tx_sent.wrapping_add(1),
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("TX dropped {=u16:#x}: {}", frame.id.raw(), defmt::Debug2Format(&_err));
                self.tx_dropped = self.tx_dropped.wrapping_add(1);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
