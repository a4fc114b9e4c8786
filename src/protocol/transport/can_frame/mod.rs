//! In-memory representation of a classic CAN frame with a standard identifier.
use crate::error::FrameError;
use crate::protocol::transport::can_id::CanId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Frame as exchanged with the CAN driver. Bytes past `len` are always zero.
pub struct CanFrame {
    /// 11-bit identifier.
    pub id: CanId,
    /// Payload buffer.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// Build a frame from a payload slice.
    pub fn new(id: CanId, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > 8 {
            return Err(FrameError::PayloadTooLong { len: payload.len() });
        }
        let mut data = [0u8; 8];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            data,
            len: payload.len(),
        })
    }

    /// Build a frame from a full payload array truncated to `len` bytes.
    /// `len` is clamped to 8 and the unused tail is zeroed.
    pub fn from_array(id: CanId, mut data: [u8; 8], len: usize) -> Self {
        let len = len.min(8);
        data[len..].fill(0);
        Self { id, data, len }
    }

    /// Build a frame from a HAL identifier. Extended identifiers are rejected.
    pub fn from_hal(id: embedded_can::Id, payload: &[u8]) -> Result<Self, FrameError> {
        match id {
            embedded_can::Id::Standard(std_id) => Self::new(std_id.into(), payload),
            embedded_can::Id::Extended(_) => Err(FrameError::ExtendedId),
        }
    }

    /// Valid payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<embedded_can::Id>, data: &[u8]) -> Option<Self> {
        Self::from_hal(id.into(), data).ok()
    }

    fn new_remote(_id: impl Into<embedded_can::Id>, _dlc: usize) -> Option<Self> {
        // The PCS never uses remote frames.
        None
    }

    fn is_extended(&self) -> bool {
        false
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> embedded_can::Id {
        embedded_can::Id::Standard(self.id.into())
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}
