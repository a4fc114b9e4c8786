//! Async driver calling the controller task entry points at their periods.
//!
//! Firmware with its own periodic scheduler can call
//! [`PcsController`]'s entry points directly. Firmware running an async
//! executor can hand everything to a [`ControllerRunner`] and spawn
//! [`ControllerRunner::drive`]. The runner waits one base period per step
//! (1 ms staggered, 10 ms burst) and derives the 50 ms and 100 ms tasks from
//! the step count, so the three tasks never run concurrently.
//!
//! The latest [`ControllerStatus`] can be published to the parameter task
//! through an optional [`Signal`] after every 100 ms evaluation.
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};

use crate::error::ControllerError;
use crate::protocol::control::{
    controller::{ControllerStatus, PcsController},
    lines::EnableLines,
    monitor::FaultReporter,
};
use crate::protocol::transport::{
    rx_queue::RxQueue,
    traits::{can_bus::CanBus, pcs_timer::PcsTimer},
    PERIOD_100_MS, PERIOD_50_MS,
};

pub type StatusSignal = Signal<CriticalSectionRawMutex, ControllerStatus>;

/// Owns the controller and its collaborators.
pub struct ControllerRunner<'a, B, T, L, R, const CAP: usize>
where
    B: CanBus,
    T: PcsTimer,
    L: EnableLines,
    R: FaultReporter,
{
    controller: PcsController,
    queue: &'a RxQueue<CAP>,
    bus: B,
    timer: T,
    lines: L,
    reporter: R,
    status: Option<&'a StatusSignal>,
    /// Position inside the 100 ms cycle, in milliseconds.
    cycle_ms: u32,
}

impl<'a, B, T, L, R, const CAP: usize> ControllerRunner<'a, B, T, L, R, CAP>
where
    B: CanBus,
    T: PcsTimer,
    L: EnableLines,
    R: FaultReporter,
{
    pub fn new(
        controller: PcsController,
        queue: &'a RxQueue<CAP>,
        bus: B,
        timer: T,
        lines: L,
        reporter: R,
    ) -> Self {
        Self {
            controller,
            queue,
            bus,
            timer,
            lines,
            reporter,
            status: None,
            cycle_ms: 0,
        }
    }

    /// Publish the status on `signal` after each 100 ms evaluation.
    pub fn with_status_signal(mut self, signal: &'a StatusSignal) -> Self {
        self.status = Some(signal);
        self
    }

    pub fn controller(&self) -> &PcsController {
        &self.controller
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Wait one base period and run the tasks due.
    pub async fn step(&mut self) -> Result<(), ControllerError<L::Error>> {
        let base = self.controller.config().cadence.base_period_ms();
        self.timer.delay_ms(base).await;
        let now = self.timer.now();

        self.controller.tick_fast(self.queue, now, &mut self.bus);

        self.cycle_ms = (self.cycle_ms + base) % PERIOD_100_MS;
        if self.cycle_ms % PERIOD_50_MS == 0 {
            self.controller.tick_50ms(&mut self.bus);
        }
        if self.cycle_ms == 0 {
            self.controller
                .tick_100ms(now, &mut self.lines, &mut self.reporter)?;
            if let Some(signal) = self.status {
                signal.signal(self.controller.status());
            }
        }
        Ok(())
    }

    /// Run `count` base steps.
    pub async fn run_ticks(&mut self, count: u32) -> Result<(), ControllerError<L::Error>> {
        for _ in 0..count {
            self.step().await?;
        }
        Ok(())
    }

    /// Run forever. Returns only when the enable lines fail.
    pub async fn drive(mut self) -> Result<(), ControllerError<L::Error>> {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "PCS controller running, base period {} ms",
            self.controller.config().cadence.base_period_ms()
        );
        loop {
            self.step().await?;
        }
    }
}
