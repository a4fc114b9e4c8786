//! Periodic frame scheduler.
//!
//! The transmit hardware has a handful of mailboxes. The staggered strategy
//! spreads the 10 ms and 100 ms classes over a 1 ms tick so no tick queues
//! more than three frames:
//!
//! ```text
//! tick % 10 == 5 : 0x13D 0x22A 0x3B2
//! tick  0        : 0x20A 0x212
//! tick 10        : 0x21D 0x232
//! tick 20        : 0x23D 0x25D
//! tick 30        : 0x2B2 0x321
//! tick 40        : 0x333 0x3A1 0x108
//! ```
//!
//! 0x545 goes out from the separate 50 ms task. The burst strategy runs on a
//! 10 ms tick and emits whole classes back to back, 0x545 included.
use crate::config::CadenceStrategy;
use crate::protocol::messages::ids::{OutboundMessage, CLASS_100_MS, CLASS_10_MS};

/// Most frames a single slot can hold (burst tick 0: 3 + 1 + 11).
pub const MAX_SLOT_FRAMES: usize = 16;

//==================================================================================SLOT
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Frames due in one tick, in emission order.
pub struct Slot {
    frames: [OutboundMessage; MAX_SLOT_FRAMES],
    len: usize,
}

impl Slot {
    const fn empty() -> Self {
        Self {
            frames: [OutboundMessage::CpChargeStatus; MAX_SLOT_FRAMES],
            len: 0,
        }
    }

    fn push(&mut self, message: OutboundMessage) {
        if self.len < MAX_SLOT_FRAMES {
            self.frames[self.len] = message;
            self.len += 1;
        }
    }

    fn extend(&mut self, messages: &[OutboundMessage]) {
        for message in messages {
            self.push(*message);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn frames(&self) -> &[OutboundMessage] {
        &self.frames[..self.len]
    }
}

/// Frames scheduled on `tick` for `strategy`. Ticks outside the cycle are empty.
pub fn slot_for_tick(strategy: CadenceStrategy, tick: u8) -> Slot {
    let mut slot = Slot::empty();
    match strategy {
        CadenceStrategy::Staggered => {
            if tick >= 100 {
                return slot;
            }
            if tick % 10 == 5 {
                slot.extend(&CLASS_10_MS);
            }
            match tick {
                0 => slot.extend(&[OutboundMessage::HvpContactorState, OutboundMessage::BmsReady]),
                10 => slot.extend(&[
                    OutboundMessage::CpEvseStatus,
                    OutboundMessage::BmsContactorRequest,
                ]),
                20 => slot.extend(&[OutboundMessage::CpAcLimit, OutboundMessage::CpStatic]),
                30 => slot.extend(&[
                    OutboundMessage::ChargePowerRequest,
                    OutboundMessage::VcFrontSensors,
                ]),
                40 => slot.extend(&[
                    OutboundMessage::UiChargeRequest,
                    OutboundMessage::VcFrontVehicleStatus,
                    OutboundMessage::VcuHvRequest,
                ]),
                _ => {}
            }
        }
        CadenceStrategy::Burst => {
            if tick >= 10 {
                return slot;
            }
            slot.extend(&CLASS_10_MS);
            if tick == 0 || tick == 5 {
                slot.push(OutboundMessage::VcFrontAlive);
            }
            if tick == 0 {
                slot.extend(&CLASS_100_MS);
            }
        }
    }
    slot
}

//==================================================================================SCHEDULER
#[derive(Debug, Clone)]
/// Tick counter of the fast task.
pub struct CadenceScheduler {
    strategy: CadenceStrategy,
    tick: u8,
}

impl CadenceScheduler {
    pub const fn new(strategy: CadenceStrategy) -> Self {
        Self { strategy, tick: 0 }
    }

    pub fn strategy(&self) -> CadenceStrategy {
        self.strategy
    }

    /// Tick the next call will serve.
    pub fn tick(&self) -> u8 {
        self.tick
    }

    /// Frames due now, then move to the next tick. A disabled cadence emits
    /// nothing and restarts the cycle at tick 0.
    pub fn advance(&mut self, enabled: bool) -> Slot {
        if !enabled {
            self.tick = 0;
            return Slot::empty();
        }
        let slot = slot_for_tick(self.strategy, self.tick);
        self.tick = (self.tick + 1) % self.strategy.ticks_per_cycle();
        slot
    }
}
