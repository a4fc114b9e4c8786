//! Operating-mode state machine.
//!
//! The machine is level-triggered: the 100 ms task feeds it the effective mode
//! every time and it re-derives the outputs. Only two things depend on the
//! previous mode: the Charge entry timestamp and the Off entry edge used to
//! restart the power-down countdown.
//!
//! | mode   | lines (pcs/dcdc/charger) | cadence | force zero | activation |
//! |--------|--------------------------|---------|------------|------------|
//! | Off    | - / - / -                | off     | yes        | None       |
//! | Run    | X / X / -                | on      | yes        | DcdcOnly   |
//! | Charge | X / X / X                | on      | no         | Both       |
//!
//! Precharge and unknown codes leave every output untouched.
use embassy_time::Instant;

use crate::protocol::control::{lines::LineStates, session::OperatingMode};
use crate::protocol::messages::outbound::PcsActivation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Outputs derived from the operating mode.
pub struct ModeOutputs {
    pub lines: LineStates,
    pub cadence_enabled: bool,
    /// Hold the ramp at zero.
    pub force_zero: bool,
    pub activation: PcsActivation,
}

impl ModeOutputs {
    pub const OFF: Self = Self {
        lines: LineStates::RELEASED,
        cadence_enabled: false,
        force_zero: true,
        activation: PcsActivation::None,
    };

    pub const RUN: Self = Self {
        lines: LineStates {
            pcs: true,
            dcdc: true,
            charger: false,
        },
        cadence_enabled: true,
        force_zero: true,
        activation: PcsActivation::DcdcOnly,
    };

    pub const CHARGE: Self = Self {
        lines: LineStates {
            pcs: true,
            dcdc: true,
            charger: true,
        },
        cadence_enabled: true,
        force_zero: false,
        activation: PcsActivation::Both,
    };

    /// Outputs for `mode`, `None` when the mode has no side effects.
    pub const fn for_mode(mode: OperatingMode) -> Option<Self> {
        match mode {
            OperatingMode::Off => Some(Self::OFF),
            OperatingMode::Run => Some(Self::RUN),
            OperatingMode::Charge => Some(Self::CHARGE),
            OperatingMode::Precharge | OperatingMode::Unknown(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Edges detected by one evaluation.
pub struct ModeTransition {
    pub entered_off: bool,
    pub entered_charge: bool,
}

#[derive(Debug, Clone)]
pub struct ModeMachine {
    last: Option<OperatingMode>,
    outputs: ModeOutputs,
    charge_entered_at: Option<Instant>,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeMachine {
    /// Starts with the Off outputs; the first evaluation still counts as an
    /// entry into whatever mode it carries.
    pub const fn new() -> Self {
        Self {
            last: None,
            outputs: ModeOutputs::OFF,
            charge_entered_at: None,
        }
    }

    /// Evaluate `mode` at `now`.
    pub fn apply(&mut self, mode: OperatingMode, now: Instant) -> ModeTransition {
        let entered = self.last != Some(mode);
        self.last = Some(mode);

        if let Some(outputs) = ModeOutputs::for_mode(mode) {
            self.outputs = outputs;
        }

        let transition = ModeTransition {
            entered_off: entered && mode == OperatingMode::Off,
            entered_charge: entered && mode == OperatingMode::Charge,
        };
        if transition.entered_charge {
            self.charge_entered_at = Some(now);
        }

        #[cfg(feature = "defmt")]
        if entered {
            defmt::info!("PCS mode -> {}", mode);
        }

        transition
    }

    /// Last evaluated mode, Off before the first evaluation.
    pub fn mode(&self) -> OperatingMode {
        self.last.unwrap_or(OperatingMode::Off)
    }

    pub fn outputs(&self) -> ModeOutputs {
        self.outputs
    }

    /// Time of the latest Charge entry.
    pub fn charge_entered_at(&self) -> Option<Instant> {
        self.charge_entered_at
    }
}
