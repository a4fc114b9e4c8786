//! Vendor CAN messages: identifier table, frame checksum, decoders for the
//! frames the PCS and the vehicle send us, and encoders for the frames that
//! make up the emulated car.
//!
//! ```text
//!  vehicle bus          IPC bus
//!  0x109 ──► decode     0x204 0x224 0x264 0x2A4 0x2C4 ──► decode
//!                       0x3A4 0x424 0x504 0x76C       ──► decode
//!  0x108 ◄── encode     0x13D 0x20A 0x212 0x21D 0x22A ◄── encode
//!                       0x232 0x23D 0x25D 0x2B2 0x321 ◄── encode
//!                       0x333 0x3A1 0x3B2 0x545       ◄── encode
//! ```
pub mod checksum;
pub mod ids;
pub mod inbound;
pub mod outbound;
