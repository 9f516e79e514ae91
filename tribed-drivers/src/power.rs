//! Driver enable line

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};
use tribed_core::traits::StepperPower;

use crate::infallible;

/// Enable pin shared by all three drivers
///
/// Most step/dir drivers use an active-low `EN` input.
pub struct EnablePin<P> {
    pin: P,
    active_low: bool,
    powered: bool,
}

impl<P: OutputPin<Error = Infallible>> EnablePin<P> {
    /// Create the enable line with the drivers released
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut enable = Self {
            pin,
            active_low,
            powered: false,
        };
        enable.set_powered(false);
        enable
    }
}

impl<P: OutputPin<Error = Infallible>> StepperPower for EnablePin<P> {
    fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
        infallible(self.pin.set_state(PinState::from(powered != self.active_low)));
    }

    fn is_powered(&self) -> bool {
        self.powered
    }
}
