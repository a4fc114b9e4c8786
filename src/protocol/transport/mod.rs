//! Transport layer: standard CAN frames, the interrupt-to-task receive queue,
//! and the traits the firmware implements for its CAN driver and timer.
//!
//! ## Timing constants
//!
//! The PCS declares a sender missing-in-action (MIA) when a periodic frame
//! stops arriving. The periods below are the ones the PCS expects.

pub mod can_frame;
pub mod can_id;
pub mod rx_queue;
pub mod traits;

/// Number of received frames absorbed between two drains of the queue.
///
/// Sized for the burst observed on the IPC bus between two 1 ms tasks.
pub const RX_QUEUE_CAPACITY: usize = 20;

/// Period of the fast control task in the staggered strategy (ms).
pub const FAST_TICK_MS: u32 = 1;

/// Period of the 10 ms frame class (ms).
pub const PERIOD_10_MS: u32 = 10;

/// Period of the 50 ms frame class (ms).
pub const PERIOD_50_MS: u32 = 50;

/// Period of the 100 ms frame class and of the mode task (ms).
pub const PERIOD_100_MS: u32 = 100;
