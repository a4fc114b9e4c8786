//! Hardware enable lines of the PCS.
//!
//! The mode machine works with logical states (`true` = asserted).
//! [`EnableOutputs`] maps them onto three `embedded_hal` output pins with the
//! electrical polarity of the controller board: the PCS enable is active-high,
//! the DC-DC and charger enables are active-low.
use core::fmt::Debug;

use embedded_hal::digital::OutputPin;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Logical state of the three enable lines.
pub struct LineStates {
    pub pcs: bool,
    pub dcdc: bool,
    pub charger: bool,
}

impl LineStates {
    /// Every line released.
    pub const RELEASED: Self = Self {
        pcs: false,
        dcdc: false,
        charger: false,
    };
}

/// Collaborator driving the physical lines.
pub trait EnableLines {
    type Error: Debug;
    /// Apply the logical states. Called on every mode evaluation.
    fn drive(&mut self, states: LineStates) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Electrical level that asserts a line.
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

/// [`EnableLines`] over three output pins sharing one error type.
pub struct EnableOutputs<P, D, C> {
    pcs: P,
    dcdc: D,
    charger: C,
    polarity: [Polarity; 3],
}

impl<P, D, C, E> EnableOutputs<P, D, C>
where
    P: OutputPin<Error = E>,
    D: OutputPin<Error = E>,
    C: OutputPin<Error = E>,
{
    /// Pins with the board's default polarity.
    pub fn new(pcs: P, dcdc: D, charger: C) -> Self {
        Self {
            pcs,
            dcdc,
            charger,
            polarity: [Polarity::ActiveHigh, Polarity::ActiveLow, Polarity::ActiveLow],
        }
    }

    /// Override the polarity of each line (PCS, DC-DC, charger).
    pub fn with_polarity(mut self, pcs: Polarity, dcdc: Polarity, charger: Polarity) -> Self {
        self.polarity = [pcs, dcdc, charger];
        self
    }

    /// Give the pins back.
    pub fn release(self) -> (P, D, C) {
        (self.pcs, self.dcdc, self.charger)
    }
}

fn set_line<O: OutputPin>(pin: &mut O, polarity: Polarity, asserted: bool) -> Result<(), O::Error> {
    let high = match polarity {
        Polarity::ActiveHigh => asserted,
        Polarity::ActiveLow => !asserted,
    };
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

impl<P, D, C, E> EnableLines for EnableOutputs<P, D, C>
where
    P: OutputPin<Error = E>,
    D: OutputPin<Error = E>,
    C: OutputPin<Error = E>,
    E: Debug,
{
    type Error = E;

    fn drive(&mut self, states: LineStates) -> Result<(), Self::Error> {
        set_line(&mut self.pcs, self.polarity[0], states.pcs)?;
        set_line(&mut self.dcdc, self.polarity[1], states.dcdc)?;
        set_line(&mut self.charger, self.polarity[2], states.charger)
    }
}
