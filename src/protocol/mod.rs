//! High-level components: the control layer (mode machine, ramp, cadence,
//! monitor), vendor message codecs, and CAN transport.
pub mod control;
pub mod messages;
pub mod transport;
