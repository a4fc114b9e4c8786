//! Additive frame checksum expected by the PCS on 0x13D and 0x545.
//!
//! Byte 7 holds the low eight bits of: every payload byte (byte 7 counted as
//! zero) + the identifier + the identifier's high byte. The PCS raises a frame
//! integrity alert on any mismatch.
use crate::protocol::transport::can_id::CanId;

/// Payload byte carrying the checksum.
pub const CHECKSUM_BYTE: usize = 7;

/// Compute the checksum of `data` for `id` without modifying the payload.
pub fn compute(data: &[u8; 8], id: CanId) -> u8 {
    let payload_sum = data[..CHECKSUM_BYTE]
        .iter()
        .fold(0u16, |acc, byte| acc.wrapping_add(*byte as u16));
    let sum = payload_sum
        .wrapping_add(id.raw())
        .wrapping_add(id.high_byte() as u16);
    (sum & 0xFF) as u8
}

/// Zero the checksum byte, compute, and store the result in byte 7.
pub fn apply(data: &mut [u8; 8], id: CanId) -> u8 {
    data[CHECKSUM_BYTE] = 0;
    let checksum = compute(data, id);
    data[CHECKSUM_BYTE] = checksum;
    checksum
}

/// Whether byte 7 matches the checksum of the rest of the payload.
pub fn verify(data: &[u8; 8], id: CanId) -> bool {
    data[CHECKSUM_BYTE] == compute(data, id)
}
