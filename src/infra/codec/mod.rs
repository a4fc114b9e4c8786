//! Payload codec primitives: bit-range access over fixed CAN payloads.
pub mod bits;
