//! Abstraction traits for the collaborators owned by the firmware: the CAN
//! driver and the millisecond timer.
pub mod can_bus;
pub mod pcs_timer;
