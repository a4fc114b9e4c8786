//! Control layer: everything that turns decoded frames into enable lines,
//! a power request, and the periodic frame stream.
//!
//! ```text
//!  RxQueue ──► PcsController::tick_fast ──► ramp ──► cadence ──► CanBus
//!                      │
//!                      └─► session / telemetry / monitor
//!  PcsController::tick_100ms ──► mode machine ──► EnableLines
//!                            └─► monitor ──► FaultReporter
//! ```
//!
//! All state lives in [`controller::PcsController`] and is only touched from
//! task context. [`runner::ControllerRunner`] is an optional async driver that
//! calls the three task entry points at their periods.
pub mod cadence;
pub mod controller;
pub mod lines;
pub mod mode;
pub mod monitor;
pub mod ramp;
pub mod runner;
pub mod session;
pub mod telemetry;
