/// Test doubles standing in for the CAN driver, enable pins, fault sink and
/// timer during integration tests.
use embassy_time::Instant;
use m3_pcs::protocol::{
    control::{
        lines::{EnableLines, LineStates},
        monitor::{FaultReporter, PcsFault},
    },
    transport::{
        can_frame::CanFrame,
        rx_queue::RxQueueEntry,
        traits::{can_bus::BusChannel, can_bus::CanBus, pcs_timer::PcsTimer},
    },
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Recording CAN bus. Clones share the same log so a test can inspect what a
/// runner-owned instance sent.
pub struct MockCanBus {
    sent: Arc<Mutex<Vec<(BusChannel, CanFrame)>>>,
    /// Refuse every frame once this many have been accepted.
    capacity: Option<usize>,
}

#[allow(dead_code)]
impl MockCanBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus whose transmit hardware fills up after `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(BusChannel, CanFrame)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    /// Frames sent with identifier `id`, in order.
    pub fn frames_with_id(&self, id: u16) -> Vec<CanFrame> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, frame)| frame.id.raw() == id)
            .map(|(_, frame)| *frame)
            .collect()
    }
}

impl CanBus for MockCanBus {
    type Error = ();

    fn try_send(&mut self, channel: BusChannel, frame: &CanFrame) -> Result<(), Self::Error> {
        let mut sent = self.sent.lock().unwrap();
        if self.capacity.is_some_and(|capacity| sent.len() >= capacity) {
            return Err(());
        }
        sent.push((channel, *frame));
        Ok(())
    }
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Enable lines recording every state they were driven to.
pub struct MockLines {
    history: Arc<Mutex<Vec<LineStates>>>,
}

#[allow(dead_code)]
impl MockLines {
    pub fn last(&self) -> Option<LineStates> {
        self.history.lock().unwrap().last().copied()
    }

    pub fn history(&self) -> Vec<LineStates> {
        self.history.lock().unwrap().clone()
    }
}

impl EnableLines for MockLines {
    type Error = ();

    fn drive(&mut self, states: LineStates) -> Result<(), Self::Error> {
        self.history.lock().unwrap().push(states);
        Ok(())
    }
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Fault sink collecting every report.
pub struct MockReporter {
    faults: Arc<Mutex<Vec<PcsFault>>>,
}

#[allow(dead_code)]
impl MockReporter {
    pub fn faults(&self) -> Vec<PcsFault> {
        self.faults.lock().unwrap().clone()
    }
}

impl FaultReporter for MockReporter {
    fn report(&mut self, fault: PcsFault) {
        self.faults.lock().unwrap().push(fault);
    }
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Virtual clock: `delay_ms` advances time instantly and yields to tokio.
pub struct MockTimer {
    now_ms: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl MockTimer {
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

impl PcsTimer for MockTimer {
    async fn delay_ms(&mut self, millis: u32) {
        self.now_ms.fetch_add(millis as u64, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }

    fn now(&self) -> Instant {
        Instant::from_millis(self.now_ms.load(Ordering::SeqCst))
    }
}

#[allow(dead_code)]
/// Vehicle-mode frame: mode code, requested power and raw byte 7.
pub fn vehicle_mode(mode: u8, power: u16, byte7: u8) -> RxQueueEntry {
    let power = power.to_le_bytes();
    RxQueueEntry::new(
        0x109,
        &[mode, 0x90, 0x01, 0x9A, 0x01, power[0], power[1], byte7],
    )
}

#[allow(dead_code)]
pub fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}
