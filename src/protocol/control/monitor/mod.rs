//! Alert and timeout monitor.
//!
//! Covers the charge-start delay, the power-down countdown after Off entry,
//! the PCS alert matrix and alert log, and the vehicle-mode staleness report.
//! Faults are handed to a [`FaultReporter`] from the 100 ms task only.
use embassy_time::{Duration, Instant};

use crate::protocol::messages::inbound::{AlertLogEntry, AlertMatrixPage};

/// Number of 100 ms evaluations between Off entry and power-down completion.
pub const POWER_DOWN_TICKS: u8 = 10;
/// Pages of the alert matrix.
pub const ALERT_PAGES: usize = 8;
/// Alert log entries buffered between two polls.
pub const ALERT_LOG_DEPTH: usize = 4;

//==================================================================================FAULTS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Fault surfaced to the firmware.
pub enum PcsFault {
    /// A flag of the alert matrix went from clear to set.
    Alert { page: u8, bit: u8 },
    /// The alert log recorded a new entry.
    AlertLogged { alert_id: u16 },
    /// The PCS flagged one of our frames as irrational.
    CanRationality { can_id: u16, rx_error: u8 },
    /// No vehicle-mode frame within the configured timeout.
    ModeFrameStale,
}

/// Sink for [`PcsFault`]s.
pub trait FaultReporter {
    fn report(&mut self, fault: PcsFault);
}

impl<F: FnMut(PcsFault)> FaultReporter for F {
    fn report(&mut self, fault: PcsFault) {
        self(fault)
    }
}

//==================================================================================CHARGE_DELAY
/// Whether the charge-start delay has run out.
///
/// Delays under a minute are treated as none. Otherwise the check passes once
/// strictly more than `delay_minutes` has elapsed since `charge_entered_at`.
pub fn charge_delay_passed(
    charge_entered_at: Option<Instant>,
    now: Instant,
    delay_minutes: u16,
) -> bool {
    let threshold_s = delay_minutes as u64 * 60;
    if threshold_s < 60 {
        return true;
    }
    let Some(entered) = charge_entered_at else {
        return false;
    };
    now.checked_duration_since(entered)
        .is_some_and(|elapsed| elapsed > Duration::from_secs(threshold_s))
}

//==================================================================================MONITOR
#[derive(Debug, Clone)]
pub struct AlertMonitor {
    power_down: u8,
    alert_flags: [u64; ALERT_PAGES],
    reported_flags: [u64; ALERT_PAGES],
    last_log: Option<AlertLogEntry>,
    pending_logs: [Option<AlertLogEntry>; ALERT_LOG_DEPTH],
    stale_reported: bool,
}

impl Default for AlertMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertMonitor {
    pub const fn new() -> Self {
        Self {
            power_down: POWER_DOWN_TICKS,
            alert_flags: [0; ALERT_PAGES],
            reported_flags: [0; ALERT_PAGES],
            last_log: None,
            pending_logs: [None; ALERT_LOG_DEPTH],
            stale_reported: false,
        }
    }

    //------------------------------------------------------------------power down
    /// Restart the countdown. Called on Off entry.
    pub fn reset_power_down(&mut self) {
        self.power_down = POWER_DOWN_TICKS;
    }

    /// One 100 ms evaluation spent in Off.
    pub fn tick_power_down(&mut self) {
        self.power_down = self.power_down.saturating_sub(1);
    }

    pub fn power_down_remaining(&self) -> u8 {
        self.power_down
    }

    pub fn power_down_elapsed(&self) -> bool {
        self.power_down == 0
    }

    //------------------------------------------------------------------alerts
    /// Store the flags of one alert matrix page.
    pub fn record_alert_page(&mut self, page: &AlertMatrixPage) {
        let index = page.page as usize % ALERT_PAGES;
        self.alert_flags[index] = page.flags;
    }

    /// Queue a log entry unless it repeats the previous one. When the buffer
    /// is full the entry is dropped.
    pub fn record_alert_log(&mut self, entry: &AlertLogEntry) {
        if self.last_log == Some(*entry) {
            return;
        }
        self.last_log = Some(*entry);
        if let Some(slot) = self.pending_logs.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(*entry);
        }
    }

    /// Current flags of `page`.
    pub fn alert_flags(&self, page: u8) -> u64 {
        self.alert_flags[page as usize % ALERT_PAGES]
    }

    /// Whether any alert flag is currently set.
    pub fn any_alert(&self) -> bool {
        self.alert_flags.iter().any(|flags| *flags != 0)
    }

    /// Track staleness. Returns `true` once when the session turns stale.
    pub fn update_staleness(&mut self, stale: bool) -> bool {
        let newly_stale = stale && !self.stale_reported;
        self.stale_reported = stale;
        newly_stale
    }

    /// Report raised alert flags and buffered log entries.
    pub fn poll<R: FaultReporter>(&mut self, reporter: &mut R) {
        for page in 0..ALERT_PAGES {
            let raised = self.alert_flags[page] & !self.reported_flags[page];
            self.reported_flags[page] = self.alert_flags[page];
            let mut remaining = raised;
            while remaining != 0 {
                let bit = remaining.trailing_zeros() as u8;
                remaining &= remaining - 1;
                #[cfg(feature = "defmt")]
                defmt::warn!("PCS alert page {} bit {}", page, bit);
                reporter.report(PcsFault::Alert {
                    page: page as u8,
                    bit,
                });
            }
        }

        for slot in self.pending_logs.iter_mut() {
            let Some(entry) = slot.take() else {
                continue;
            };
            let fault = if entry.can_id != 0 {
                PcsFault::CanRationality {
                    can_id: entry.can_id,
                    rx_error: entry.rx_error,
                }
            } else {
                PcsFault::AlertLogged {
                    alert_id: entry.alert_id,
                }
            };
            #[cfg(feature = "defmt")]
            defmt::warn!("PCS alert log: {}", fault);
            reporter.report(fault);
        }
    }
}
