//! Step/direction output traits
//!
//! The step tick drives [`StepperOutputs`] from interrupt context, so
//! implementations must not block.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::Axis;

/// Direction of travel along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Increasing position (bed moves down)
    Positive,
    /// Decreasing position (bed moves up, toward the sensors)
    Negative,
}

impl Direction {
    /// Direction needed to travel from `from` to `to`
    pub const fn of_travel(from: i32, to: i32) -> Self {
        if to < from {
            Direction::Negative
        } else {
            Direction::Positive
        }
    }

    /// Position change of one half-step in this direction
    pub const fn delta(self) -> i32 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }
}

/// Step and direction lines of the three drivers
pub trait StepperOutputs {
    /// Drive the direction line of `axis`
    ///
    /// The engine waits one tick after a change before stepping.
    fn set_direction(&mut self, axis: Axis, direction: Direction);

    /// Toggle the step line of `axis`
    ///
    /// Each edge is one half-step; two edges make one driver step.
    fn half_step(&mut self, axis: Axis);
}

/// Shared driver enable line
pub trait StepperPower {
    /// Energise or release all drivers
    fn set_powered(&mut self, powered: bool);

    fn is_powered(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_of_travel() {
        assert_eq!(Direction::of_travel(0, -10), Direction::Negative);
        assert_eq!(Direction::of_travel(0, 10), Direction::Positive);
        assert_eq!(Direction::of_travel(5, 5), Direction::Positive);
        assert_eq!(Direction::Negative.delta(), -1);
    }
}
