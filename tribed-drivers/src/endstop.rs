//! External endstop output
//!
//! In external mode another controller drives the steppers and needs to
//! know when the bed touches a sensor. The latched limit state is mirrored
//! onto this line.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};

use crate::infallible;

/// Output mirroring "any limit latched"
pub struct EndstopMirror<P> {
    pin: P,
    active_low: bool,
    active: bool,
}

impl<P: OutputPin<Error = Infallible>> EndstopMirror<P> {
    /// Create the mirror in the inactive state
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut mirror = Self {
            pin,
            active_low,
            active: true,
        };
        mirror.set(false);
        mirror
    }

    /// Drive the line; writes only on change
    pub fn set(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        self.active = active;
        infallible(self.pin.set_state(PinState::from(active != self.active_low)));
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
