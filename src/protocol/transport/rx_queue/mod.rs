//! Inbound frame queue decoupling the CAN receive interrupt from task context.
//!
//! The interrupt side performs a single bounded copy through
//! [`RxQueue::enqueue`]: it never blocks, never iterates, and never logs. The
//! periodic task drains the queue in arrival order and runs the decoders. Index
//! updates happen inside a critical section provided by
//! [`embassy_sync`]'s `CriticalSectionRawMutex`, so the queue can live in a
//! plain `static`.
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Sender},
};

use crate::protocol::transport::{can_frame::CanFrame, can_id::CanId};

//==================================================================================ENTRY
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Fixed-size copy of a received frame.
pub struct RxQueueEntry {
    /// Raw 11-bit identifier as reported by the driver.
    pub id: u16,
    /// Payload, zero padded past `len`.
    pub data: [u8; 8],
    /// Data length code, clamped to 8.
    pub len: u8,
}

impl RxQueueEntry {
    /// Copy a driver payload. Bytes past the eighth are dropped.
    pub fn new(id: u16, payload: &[u8]) -> Self {
        let len = payload.len().min(8);
        let mut data = [0u8; 8];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            data,
            len: len as u8,
        }
    }

    /// Identifier, if it fits the standard range.
    pub fn can_id(&self) -> Option<CanId> {
        CanId::new(self.id)
    }
}

impl From<&CanFrame> for RxQueueEntry {
    fn from(frame: &CanFrame) -> Self {
        Self {
            id: frame.id.raw(),
            data: frame.data,
            len: frame.len as u8,
        }
    }
}

//==================================================================================QUEUE
/// Bounded single-producer/single-consumer queue of received frames.
pub struct RxQueue<const CAP: usize> {
    channel: Channel<CriticalSectionRawMutex, RxQueueEntry, CAP>,
}

impl<const CAP: usize> Default for RxQueue<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> RxQueue<CAP> {
    /// Create an empty queue; usable in a `static` initializer.
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Number of entries the queue absorbs between two drains.
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Queue a received frame. Returns `false` and drops the frame when full.
    pub fn enqueue(&self, entry: RxQueueEntry) -> bool {
        self.channel.try_send(entry).is_ok()
    }

    /// Queue a frame handed over by a HAL driver.
    /// Extended identifiers are not used on the PCS buses and are refused.
    pub fn enqueue_frame<F: embedded_can::Frame>(&self, frame: &F) -> bool {
        match frame.id() {
            embedded_can::Id::Standard(id) => {
                self.enqueue(RxQueueEntry::new(id.as_raw(), frame.data()))
            }
            embedded_can::Id::Extended(_) => false,
        }
    }

    /// Handle for the receive callback.
    pub fn producer(&self) -> RxProducer<'_, CAP> {
        RxProducer {
            sender: self.channel.sender(),
        }
    }

    /// Pop the oldest entry, if any.
    pub fn dequeue(&self) -> Option<RxQueueEntry> {
        self.channel.try_receive().ok()
    }

    /// Hand every pending entry to `handler` in arrival order.
    /// Returns the number of entries processed.
    pub fn drain<F: FnMut(RxQueueEntry)>(&self, mut handler: F) -> usize {
        let mut count = 0;
        while let Some(entry) = self.dequeue() {
            handler(entry);
            count += 1;
        }
        count
    }

    /// Number of entries waiting.
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Whether no entry is waiting.
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Whether the next enqueue would be refused.
    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }
}

//==================================================================================PRODUCER
/// Enqueue handle given to the CAN receive callback.
#[derive(Clone, Copy)]
pub struct RxProducer<'a, const CAP: usize> {
    sender: Sender<'a, CriticalSectionRawMutex, RxQueueEntry, CAP>,
}

impl<'a, const CAP: usize> RxProducer<'a, CAP> {
    /// Copy `(id, payload)` into the queue. Returns `false` when full.
    pub fn enqueue(&self, id: u16, payload: &[u8]) -> bool {
        self.sender.try_send(RxQueueEntry::new(id, payload)).is_ok()
    }
}
