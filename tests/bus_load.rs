//! Transmit-side load: how many frames each tick queues, and what happens
//! when the transmit hardware is full.
mod helpers {
    include!("helpers/mod.rs");
}

use helpers::{at, vehicle_mode, MockCanBus, MockLines, MockReporter};
use m3_pcs::{
    config::{CadenceStrategy, ControllerConfig},
    protocol::{
        control::controller::PcsController,
        messages::{checksum, ids::CLASS_100_MS},
        transport::{rx_queue::RxQueue, RX_QUEUE_CAPACITY},
    },
};

/// Controller already in Charge, with cadence running from the next tick.
fn running(config: ControllerConfig, bus: &mut MockCanBus) -> PcsController {
    let mut controller = PcsController::new(config);
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    let mut lines = MockLines::default();
    let mut reporter = MockReporter::default();
    queue.enqueue(vehicle_mode(4, 3500, 0x0A));
    controller.tick_fast(&queue, at(0), bus);
    controller
        .tick_100ms(at(0), &mut lines, &mut reporter)
        .unwrap();
    controller
}

#[test]
/// In the staggered strategy no millisecond queues more than three frames,
/// 0x545 from the 50 ms task included.
fn test_staggered_per_tick_load() {
    let mut bus = MockCanBus::new();
    let mut controller = running(ControllerConfig::new(), &mut bus);
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();

    let mut worst = 0;
    for ms in 1..=1000u64 {
        let before = bus.len();
        controller.tick_fast(&queue, at(ms), &mut bus);
        if ms % 50 == 0 {
            controller.tick_50ms(&mut bus);
        }
        worst = worst.max(bus.len() - before);
    }
    assert_eq!(worst, 3);
    // Ten cycles: 30 + 11 frames each, plus two 0x545.
    assert_eq!(bus.len(), 10 * (30 + CLASS_100_MS.len() + 2));
    assert_eq!(controller.status().tx_dropped, 0);
}

#[test]
/// The burst strategy emits whole classes on a 10 ms tick.
fn test_burst_cycle() {
    let mut bus = MockCanBus::new();
    let config = ControllerConfig::new().with_cadence(CadenceStrategy::Burst);
    let mut controller = running(config, &mut bus);
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();

    let before = bus.len();
    controller.tick_fast(&queue, at(10), &mut bus);
    assert_eq!(bus.len() - before, 15);

    for tick in 2..=10u64 {
        controller.tick_fast(&queue, at(tick * 10), &mut bus);
        controller.tick_50ms(&mut bus);
    }
    assert_eq!(bus.frames_with_id(0x545).len(), 2);
    assert_eq!(bus.frames_with_id(0x13D).len(), 10);
    assert_eq!(bus.frames_with_id(0x20A).len(), 1);
}

#[test]
/// Refused frames are counted, dropped, and never retried.
fn test_congestion_drops_without_retry() {
    let mut bus = MockCanBus::with_capacity(5);
    let mut controller = running(ControllerConfig::new(), &mut bus);
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();

    for ms in 1..=100u64 {
        controller.tick_fast(&queue, at(ms), &mut bus);
    }
    let status = controller.status();
    assert_eq!(bus.len(), 5);
    assert_eq!(status.tx_sent, 5);
    assert_eq!(status.tx_dropped as usize, 30 + CLASS_100_MS.len() - 5);

    // Ramp and mode keep running while frames are lost.
    assert_eq!(status.power_w, 1000);
}

#[test]
/// Every emitted 0x545 and 0x13D carries a valid checksum, and the 0x545
/// counter rolls through all sixteen values.
fn test_emitted_checksums() {
    let mut bus = MockCanBus::new();
    let mut controller = running(ControllerConfig::new(), &mut bus);
    let queue: RxQueue<RX_QUEUE_CAPACITY> = RxQueue::new();
    for ms in 1..=2000u64 {
        controller.tick_fast(&queue, at(ms), &mut bus);
        if ms % 50 == 0 {
            controller.tick_50ms(&mut bus);
        }
    }
    let alive = bus.frames_with_id(0x545);
    assert_eq!(alive.len(), 40);
    for (index, frame) in alive.iter().enumerate() {
        assert!(checksum::verify(&frame.data, frame.id));
        assert_eq!(frame.data[6] >> 4, (index % 16) as u8);
    }
    for frame in bus.frames_with_id(0x13D) {
        assert!(checksum::verify(&frame.data, frame.id));
    }
}
