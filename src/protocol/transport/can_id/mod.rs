//! 11-bit standard CAN identifiers used on the PCS IPC bus and the vehicle bus.
use crate::error::FrameError;

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Standard CAN identifier. The wrapped value never exceeds [`CanId::MAX`].
pub struct CanId(u16);

impl CanId {
    /// Highest standard identifier.
    pub const MAX: u16 = 0x7FF;

    /// Wrap a raw identifier, rejecting values wider than 11 bits.
    pub const fn new(raw: u16) -> Option<Self> {
        if raw <= Self::MAX {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Wrap a raw identifier, discarding bits above the 11-bit range.
    /// Used for the compile-time identifier table.
    pub const fn from_masked(raw: u16) -> Self {
        Self(raw & Self::MAX)
    }

    /// Raw 11-bit value.
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Low eight bits of the identifier.
    pub const fn low_byte(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Bits 8-10 of the identifier.
    pub const fn high_byte(&self) -> u8 {
        (self.0 >> 8) as u8
    }
}

impl TryFrom<u32> for CanId {
    type Error = FrameError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        if raw > Self::MAX as u32 {
            return Err(FrameError::InvalidId { id: raw });
        }
        Ok(Self(raw as u16))
    }
}

impl From<CanId> for embedded_can::StandardId {
    fn from(id: CanId) -> Self {
        // The wrapped value is always within the standard range.
        embedded_can::StandardId::new(id.0).unwrap_or(embedded_can::StandardId::ZERO)
    }
}

impl From<embedded_can::StandardId> for CanId {
    fn from(id: embedded_can::StandardId) -> Self {
        Self(id.as_raw())
    }
}
