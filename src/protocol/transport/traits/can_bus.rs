//! Minimal abstraction for the transmit side of the CAN driver.
use crate::protocol::transport::can_frame::CanFrame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// The two buses exposed by the controller hardware.
pub enum BusChannel {
    /// Inter-processor bus wired to the PCS.
    Ipc,
    /// External bus shared with the vehicle control unit.
    Vehicle,
}

/// Contract to queue a frame for transmission without blocking.
///
/// Implementations return an error when the hardware mailboxes are full; the
/// caller drops the frame and sends it again at its next cadence slot.
pub trait CanBus {
    type Error: core::fmt::Debug;
    /// Queue `frame` on `channel`. Must not wait for bus arbitration.
    fn try_send(&mut self, channel: BusChannel, frame: &CanFrame) -> Result<(), Self::Error>;
}
