//! Start-up configuration of the controller.
//!
//! The firmware's parameter store fills a [`ControllerConfig`] once at boot and
//! hands it to [`PcsController::new`](crate::protocol::control::controller::PcsController::new).
//!
//! ```
//! use embassy_time::Duration;
//! use m3_pcs::config::{CadenceStrategy, ControllerConfig, PcsVariant};
//!
//! let config = ControllerConfig::new()
//!     .with_variant(PcsVariant::Eu)
//!     .with_cadence(CadenceStrategy::Burst)
//!     .with_mode_timeout(Duration::from_millis(500));
//!
//! assert_eq!(config.variant, PcsVariant::Eu);
//! assert_eq!(config.ramp_step_w, 10);
//! ```
use embassy_time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Hardware generation of the PCS; a few keep-alive frames differ.
pub enum PcsVariant {
    Us,
    Eu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Unit of the maximum charger power carried by the vehicle-mode frame.
pub enum PowerUnit {
    Watts,
    Kilowatts,
}

impl PowerUnit {
    /// Convert a raw power field to watts, saturating at `u16::MAX`.
    #[inline]
    pub const fn to_watts(&self, raw: u16) -> u16 {
        match self {
            Self::Watts => raw,
            Self::Kilowatts => raw.saturating_mul(1000),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// How periodic frames are spread over time.
pub enum CadenceStrategy {
    /// 1 ms base tick, at most three frames per tick.
    Staggered,
    /// 10 ms base tick, whole classes emitted back to back.
    Burst,
}

impl CadenceStrategy {
    /// Period of the fast task in milliseconds.
    #[inline]
    pub const fn base_period_ms(&self) -> u32 {
        match self {
            Self::Staggered => 1,
            Self::Burst => 10,
        }
    }

    /// Number of fast ticks in one 100 ms cycle.
    #[inline]
    pub const fn ticks_per_cycle(&self) -> u8 {
        match self {
            Self::Staggered => 100,
            Self::Burst => 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Controller parameters. Every field has a usable default.
pub struct ControllerConfig {
    pub variant: PcsVariant,
    pub power_unit: PowerUnit,
    /// Ramp increment per fast tick, watts.
    pub ramp_step_w: u16,
    /// Absolute power ceiling, watts.
    pub power_ceiling_w: u16,
    /// Delay between Charge entry and ramp enable. 0 disables the delay.
    pub charge_delay_minutes: u16,
    pub cadence: CadenceStrategy,
    /// Vehicle-mode frames older than this force the Off mode.
    pub mode_timeout: Option<Duration>,
    /// Hold the ramp at zero until the charger reports its Enable state.
    pub require_charger_ready: bool,
}

impl ControllerConfig {
    #[inline]
    pub const fn new() -> Self {
        Self {
            variant: PcsVariant::Us,
            power_unit: PowerUnit::Watts,
            ramp_step_w: 10,
            power_ceiling_w: 10_000,
            charge_delay_minutes: 0,
            cadence: CadenceStrategy::Staggered,
            mode_timeout: None,
            require_charger_ready: false,
        }
    }

    #[inline]
    pub const fn with_variant(mut self, variant: PcsVariant) -> Self {
        self.variant = variant;
        self
    }

    #[inline]
    pub const fn with_power_unit(mut self, unit: PowerUnit) -> Self {
        self.power_unit = unit;
        self
    }

    #[inline]
    pub const fn with_ramp_step(mut self, watts: u16) -> Self {
        self.ramp_step_w = watts;
        self
    }

    #[inline]
    pub const fn with_power_ceiling(mut self, watts: u16) -> Self {
        self.power_ceiling_w = watts;
        self
    }

    #[inline]
    pub const fn with_charge_delay(mut self, minutes: u16) -> Self {
        self.charge_delay_minutes = minutes;
        self
    }

    #[inline]
    pub const fn with_cadence(mut self, cadence: CadenceStrategy) -> Self {
        self.cadence = cadence;
        self
    }

    /// Enable the vehicle-mode staleness check.
    #[inline]
    pub const fn with_mode_timeout(mut self, timeout: Duration) -> Self {
        self.mode_timeout = Some(timeout);
        self
    }

    #[inline]
    pub const fn with_charger_ready_gate(mut self, required: bool) -> Self {
        self.require_charger_ready = required;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}
