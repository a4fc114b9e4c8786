extern crate std;

use std::vec::Vec;

use embassy_time::Duration;

use super::*;
use crate::protocol::control::monitor::POWER_DOWN_TICKS;
use crate::protocol::messages::ids::CLASS_100_MS;
use crate::protocol::transport::traits::can_bus::BusChannel;
use crate::protocol::transport::{can_frame::CanFrame, RX_QUEUE_CAPACITY};

#[derive(Default)]
struct Bus {
    sent: Vec<(BusChannel, CanFrame)>,
    refuse: bool,
}

impl CanBus for Bus {
    type Error = ();

    fn try_send(&mut self, channel: BusChannel, frame: &CanFrame) -> Result<(), Self::Error> {
        if self.refuse {
            return Err(());
        }
        self.sent.push((channel, *frame));
        Ok(())
    }
}

#[derive(Default)]
struct Lines {
    last: Option<LineStates>,
    broken: bool,
}

impl EnableLines for Lines {
    type Error = ();

    fn drive(&mut self, states: LineStates) -> Result<(), Self::Error> {
        if self.broken {
            return Err(());
        }
        self.last = Some(states);
        Ok(())
    }
}

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

fn mode_frame(mode: u8, power: u16, enable_code: u8) -> RxQueueEntry {
    let power = power.to_le_bytes();
    RxQueueEntry::new(0x109, &[mode, 0x90, 0x01, 0x9A, 0x01, power[0], power[1], enable_code])
}

fn hundred_ms(controller: &mut PcsController, now: Instant, lines: &mut Lines) -> Vec<PcsFault> {
    let mut faults = Vec::new();
    let mut reporter = |fault: PcsFault| faults.push(fault);
    controller.tick_100ms(now, lines, &mut reporter).unwrap();
    faults
}

#[test]
/// Unregistered identifiers and unhandled mux pages are dropped.
fn test_dispatch_counters() {
    let mut controller = PcsController::new(ControllerConfig::new());
    controller.process_entry(&RxQueueEntry::new(0x123, &[1, 2, 3]), at(0));
    controller.process_entry(&RxQueueEntry::new(0x2C4, &[0x01, 0, 0, 0]), at(0));
    controller.process_entry(&RxQueueEntry::new(0x504, &[1, 0, 0, 0, 0, 0, 0, 0]), at(0));
    let status = controller.status();
    assert_eq!(status.rx_ignored, 2);
    assert_eq!(status.rx_processed, 1);
    assert_eq!(controller.telemetry().boot_id, Some(1));
}

#[test]
/// Nothing is emitted and the lines stay released before the first request.
fn test_boot_state() {
    let mut controller = PcsController::new(ControllerConfig::new());
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus::default();
    let mut lines = Lines::default();

    for ms in 0..200 {
        controller.tick_fast(&queue, at(ms), &mut bus);
        if ms % 50 == 0 {
            controller.tick_50ms(&mut bus);
        }
    }
    hundred_ms(&mut controller, at(200), &mut lines);
    assert!(bus.sent.is_empty());
    assert_eq!(lines.last, Some(LineStates::RELEASED));
    assert_eq!(controller.status().mode, OperatingMode::Off);
}

#[test]
/// Run asserts PCS and DC-DC, starts the cadence and keeps the power at zero.
fn test_run_mode_cadence() {
    let mut controller = PcsController::new(ControllerConfig::new());
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus::default();
    let mut lines = Lines::default();

    queue.enqueue(mode_frame(1, 3500, 0x0A));
    controller.tick_fast(&queue, at(0), &mut bus);
    hundred_ms(&mut controller, at(0), &mut lines);
    assert_eq!(
        lines.last,
        Some(LineStates {
            pcs: true,
            dcdc: true,
            charger: false
        })
    );

    bus.sent.clear();
    for ms in 1..=100 {
        controller.tick_fast(&queue, at(ms), &mut bus);
    }
    assert_eq!(bus.sent.len(), 10 * 3 + CLASS_100_MS.len());
    assert_eq!(controller.status().power_w, 0);

    let control = bus.sent.iter().find(|(_, f)| f.id.raw() == 0x22A).unwrap().1;
    assert_eq!(control.data[2] & 0x0F, 0x9);
    let hv = bus.sent.iter().find(|(_, f)| f.id.raw() == 0x108).unwrap();
    assert_eq!(hv.0, BusChannel::Vehicle);
    assert_eq!(hv.1.data[0], 0xCC);
}

#[test]
/// Charge ramps by 10 W per tick up to the requested power.
fn test_charge_ramp() {
    let mut controller = PcsController::new(ControllerConfig::new());
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus::default();
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(4, 3500, 0x0A), at(0));
    hundred_ms(&mut controller, at(0), &mut lines);
    assert_eq!(controller.charge_entered_at(), Some(at(0)));

    for ms in 1..=350 {
        controller.tick_fast(&queue, at(ms), &mut bus);
        assert_eq!(controller.status().power_w, (ms * 10) as u16);
    }
    controller.tick_fast(&queue, at(351), &mut bus);
    assert_eq!(controller.status().power_w, 3500);

    let request = bus
        .sent
        .iter()
        .filter(|(_, f)| f.id.raw() == 0x2B2)
        .last()
        .unwrap()
        .1;
    assert_eq!(request.data[2], 0x02);
    assert_eq!(request.len, 3);
}

#[test]
/// A one-minute delay holds the ramp until strictly after 60 s in Charge.
fn test_charge_delay_gate() {
    let config = ControllerConfig::new().with_charge_delay(1);
    let mut controller = PcsController::new(config);
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus::default();
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(4, 3500, 0x0A), at(1_000));
    hundred_ms(&mut controller, at(1_000), &mut lines);

    controller.tick_fast(&queue, at(61_000), &mut bus);
    assert_eq!(controller.status().power_w, 0);
    controller.tick_fast(&queue, at(61_001), &mut bus);
    assert_eq!(controller.status().power_w, 10);
}

#[test]
/// With the readiness gate, the ramp waits for the charger Enable state.
fn test_charger_ready_gate() {
    let config = ControllerConfig::new().with_charger_ready_gate(true);
    let mut controller = PcsController::new(config);
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus::default();
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(4, 3500, 0x0A), at(0));
    hundred_ms(&mut controller, at(0), &mut lines);
    controller.tick_fast(&queue, at(1), &mut bus);
    assert_eq!(controller.status().power_w, 0);

    queue.enqueue(RxQueueEntry::new(0x204, &[0x05, 0, 0, 0, 0, 0, 0, 0]));
    controller.tick_fast(&queue, at(2), &mut bus);
    assert_eq!(controller.status().power_w, 10);
}

#[test]
/// Disabling the session drops the request to zero on the next tick.
fn test_disable_snaps_to_zero() {
    let mut controller = PcsController::new(ControllerConfig::new());
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus::default();
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(4, 3500, 0x0A), at(0));
    hundred_ms(&mut controller, at(0), &mut lines);
    for ms in 1..=50 {
        controller.tick_fast(&queue, at(ms), &mut bus);
    }
    assert_eq!(controller.status().power_w, 500);

    queue.enqueue(mode_frame(4, 3500, 0x0C));
    controller.tick_fast(&queue, at(51), &mut bus);
    assert_eq!(controller.status().power_w, 0);
}

#[test]
/// An Off request zeroes the power on the very next fast tick, ahead of the
/// 100 ms evaluation that releases the lines.
fn test_off_request_zeroes_power_before_mode_evaluation() {
    let mut controller = PcsController::new(ControllerConfig::new());
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus::default();
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(4, 3500, 0x0A), at(0));
    hundred_ms(&mut controller, at(0), &mut lines);
    for ms in 1..=120 {
        controller.tick_fast(&queue, at(ms), &mut bus);
    }
    assert_eq!(controller.status().power_w, 1200);

    queue.enqueue(mode_frame(0, 3500, 0x0A));
    controller.tick_fast(&queue, at(121), &mut bus);
    let status = controller.status();
    assert_eq!(status.power_w, 0);
    assert!(status.force_zero);
    assert_eq!(status.mode, OperatingMode::Charge);

    bus.sent.clear();
    for ms in 122..200 {
        controller.tick_fast(&queue, at(ms), &mut bus);
        assert_eq!(controller.status().power_w, 0);
    }
    let request = bus.sent.iter().find(|(_, f)| f.id.raw() == 0x2B2).unwrap().1;
    assert_eq!(request.payload(), &[0x00, 0x00, 0x00]);
    let hv = bus.sent.iter().find(|(_, f)| f.id.raw() == 0x108).unwrap().1;
    assert_eq!(hv.data[0], 0xCC);
}

#[test]
/// A session going stale mid-ramp stops the power request at once.
fn test_stale_session_zeroes_power_on_fast_tick() {
    let config = ControllerConfig::new().with_mode_timeout(Duration::from_millis(500));
    let mut controller = PcsController::new(config);
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus::default();
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(4, 9000, 0x0A), at(0));
    hundred_ms(&mut controller, at(0), &mut lines);
    for ms in 1..=500 {
        controller.tick_fast(&queue, at(ms), &mut bus);
    }
    assert_eq!(controller.status().power_w, 5000);

    controller.tick_fast(&queue, at(501), &mut bus);
    assert_eq!(controller.status().power_w, 0);
}

#[test]
/// The status surface shows whether any PCS alert flag is raised.
fn test_alert_active_status() {
    let mut controller = PcsController::new(ControllerConfig::new());
    assert!(!controller.status().alert_active);
    controller.process_entry(&RxQueueEntry::new(0x3A4, &[0x01, 0x80, 0, 0, 0, 0, 0, 0]), at(0));
    assert!(controller.status().alert_active);
    controller.process_entry(&RxQueueEntry::new(0x3A4, &[0x01, 0, 0, 0, 0, 0, 0, 0]), at(10));
    assert!(!controller.status().alert_active);
}

#[test]
/// A stale session forces Off and is reported once.
fn test_mode_frame_staleness() {
    let config = ControllerConfig::new().with_mode_timeout(Duration::from_millis(500));
    let mut controller = PcsController::new(config);
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(1, 0, 0x00), at(0));
    assert!(hundred_ms(&mut controller, at(400), &mut lines).is_empty());
    assert_eq!(controller.status().mode, OperatingMode::Run);

    let faults = hundred_ms(&mut controller, at(600), &mut lines);
    assert_eq!(faults, [PcsFault::ModeFrameStale]);
    assert_eq!(controller.status().mode, OperatingMode::Off);
    assert!(controller.status().mode_frame_stale);
    assert_eq!(lines.last, Some(LineStates::RELEASED));

    assert!(hundred_ms(&mut controller, at(700), &mut lines).is_empty());

    controller.process_entry(&mode_frame(1, 0, 0x00), at(750));
    assert!(hundred_ms(&mut controller, at(800), &mut lines).is_empty());
    assert_eq!(controller.status().mode, OperatingMode::Run);
}

#[test]
/// The power-down countdown restarts on each Off entry.
fn test_power_down_countdown() {
    let mut controller = PcsController::new(ControllerConfig::new());
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(1, 0, 0), at(0));
    hundred_ms(&mut controller, at(0), &mut lines);
    controller.process_entry(&mode_frame(0, 0, 0), at(100));
    hundred_ms(&mut controller, at(100), &mut lines);
    assert_eq!(controller.status().power_down_remaining, POWER_DOWN_TICKS);

    for step in 1..=POWER_DOWN_TICKS as u64 {
        assert!(!controller.power_down_elapsed());
        hundred_ms(&mut controller, at(100 + step * 100), &mut lines);
    }
    assert!(controller.power_down_elapsed());

    controller.process_entry(&mode_frame(1, 0, 0), at(2_000));
    hundred_ms(&mut controller, at(2_000), &mut lines);
    controller.process_entry(&mode_frame(0, 0, 0), at(2_100));
    hundred_ms(&mut controller, at(2_100), &mut lines);
    assert!(!controller.power_down_elapsed());
}

#[test]
/// Refused frames are counted and not retried.
fn test_tx_congestion() {
    let mut controller = PcsController::new(ControllerConfig::new());
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut bus = Bus {
        refuse: true,
        ..Bus::default()
    };
    let mut lines = Lines::default();

    controller.process_entry(&mode_frame(1, 0, 0), at(0));
    hundred_ms(&mut controller, at(0), &mut lines);
    for ms in 0..10 {
        controller.tick_fast(&queue, at(ms), &mut bus);
    }
    let status = controller.status();
    // Ticks 0..10: offsets 0 (2 frames) and 5 (3 frames).
    assert_eq!(status.tx_dropped, 5);
    assert_eq!(status.tx_sent, 0);
}

#[test]
/// 0x545 leaves from the 50 ms task only with the staggered cadence.
fn test_alive_task() {
    let mut lines = Lines::default();
    let mut bus = Bus::default();

    let mut staggered = PcsController::new(ControllerConfig::new());
    staggered.tick_50ms(&mut bus);
    assert!(bus.sent.is_empty());
    staggered.process_entry(&mode_frame(1, 0, 0), at(0));
    hundred_ms(&mut staggered, at(0), &mut lines);
    staggered.tick_50ms(&mut bus);
    staggered.tick_50ms(&mut bus);
    assert_eq!(bus.sent.len(), 2);
    assert_eq!(bus.sent[0].1.data[0], 0x14);
    assert_eq!(bus.sent[1].1.data[0], 0x03);

    let mut burst = PcsController::new(ControllerConfig::new().with_cadence(CadenceStrategy::Burst));
    burst.process_entry(&mode_frame(1, 0, 0), at(0));
    hundred_ms(&mut burst, at(0), &mut lines);
    bus.sent.clear();
    burst.tick_50ms(&mut bus);
    assert!(bus.sent.is_empty());
}

#[test]
/// Pin failures surface as controller errors.
fn test_line_error() {
    let mut controller = PcsController::new(ControllerConfig::new());
    let mut lines = Lines {
        broken: true,
        ..Lines::default()
    };
    let result = controller.tick_100ms(at(0), &mut lines, &mut |_fault: PcsFault| {});
    assert!(matches!(result, Err(ControllerError::EnableLines(()))));
}
