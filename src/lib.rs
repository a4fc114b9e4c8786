//! `m3-pcs` library: control core for a Tesla Model 3 power-conversion system
//! (onboard charger + DC-DC) operated outside the car, in a `no_std`
//! environment. The crate emulates the vehicle CAN traffic the PCS expects,
//! decodes what it reports, and gates its enable lines and power request from
//! the operating mode requested by an external vehicle control unit.
#![no_std]
//==================================================================================
/// Controller parameters filled at start-up.
pub mod config;
/// Bit access and hardware collaborator errors.
pub mod error;
/// Bit-level payload access.
pub mod infra;
/// CAN transport, vendor messages, and the control layer.
pub mod protocol;
//==================================================================================
