//! Asynchronous timer abstraction used by the task runner.
use embassy_time::Instant;
use futures_util::Future;

/// Timer providing the runner's base period and the current time.
pub trait PcsTimer {
    /// Asynchronously wait for `millis` milliseconds.
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl Future<Output = ()> + 'a;

    /// Current time, used to stamp mode changes and frame arrivals.
    fn now(&self) -> Instant;
}
