//! Step/direction outputs
//!
//! Drivers such as the A4988 or DRV8825 step on one edge of the step
//! line. The engine counts half-steps, so each half-step toggles the line
//! and two toggles make a full driver step.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState, StatefulOutputPin};
use tribed_core::motion::{Axis, AXIS_COUNT};
use tribed_core::traits::{Direction, StepperOutputs};

use crate::infallible;

/// Step and direction pins of the three lift drivers
pub struct StepperBank<S, D> {
    step: [S; AXIS_COUNT],
    dir: [D; AXIS_COUNT],
    dir_inverted: [bool; AXIS_COUNT],
}

impl<S, D> StepperBank<S, D>
where
    S: StatefulOutputPin<Error = Infallible>,
    D: OutputPin<Error = Infallible>,
{
    /// Create the bank with every step line low
    ///
    /// # Arguments
    /// - `step`: step pins indexed by axis
    /// - `dir`: direction pins indexed by axis
    /// - `dir_inverted`: per axis, drive the direction line low for positive travel
    pub fn new(
        step: [S; AXIS_COUNT],
        dir: [D; AXIS_COUNT],
        dir_inverted: [bool; AXIS_COUNT],
    ) -> Self {
        let mut bank = Self {
            step,
            dir,
            dir_inverted,
        };
        for pin in bank.step.iter_mut() {
            infallible(pin.set_low());
        }
        bank
    }

    /// Direction line level for `direction` on `axis`
    pub fn dir_level(&self, axis: Axis, direction: Direction) -> PinState {
        let positive = direction == Direction::Positive;
        PinState::from(positive != self.dir_inverted[axis.index()])
    }
}

impl<S, D> StepperOutputs for StepperBank<S, D>
where
    S: StatefulOutputPin<Error = Infallible>,
    D: OutputPin<Error = Infallible>,
{
    fn set_direction(&mut self, axis: Axis, direction: Direction) {
        let level = self.dir_level(axis, direction);
        infallible(self.dir[axis.index()].set_state(level));
    }

    fn half_step(&mut self, axis: Axis) {
        infallible(self.step[axis.index()].toggle());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOutput;

    fn bank(dir_inverted: [bool; AXIS_COUNT]) -> StepperBank<MockOutput, MockOutput> {
        StepperBank::new(
            [MockOutput::high(), MockOutput::high(), MockOutput::high()],
            [MockOutput::low(), MockOutput::low(), MockOutput::low()],
            dir_inverted,
        )
    }

    #[test]
    fn test_step_lines_start_low() {
        let bank = bank([false; AXIS_COUNT]);
        assert!(bank.step.iter().all(|pin| !pin.is_high()));
    }

    #[test]
    fn test_half_steps_toggle() {
        let mut bank = bank([false; AXIS_COUNT]);

        bank.half_step(Axis::Y);
        assert!(bank.step[1].is_high());
        bank.half_step(Axis::Y);
        assert!(!bank.step[1].is_high());
        assert_eq!(bank.step[1].writes(), 3);
        assert!(!bank.step[0].is_high());
    }

    #[test]
    fn test_direction_polarity() {
        let mut bank = bank([false, true, false]);

        bank.set_direction(Axis::X, Direction::Positive);
        bank.set_direction(Axis::Y, Direction::Positive);
        assert!(bank.dir[0].is_high());
        assert!(!bank.dir[1].is_high());

        bank.set_direction(Axis::Y, Direction::Negative);
        assert!(bank.dir[1].is_high());
    }
}
