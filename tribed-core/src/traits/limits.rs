//! Limit sensor input trait

use crate::motion::AxisMask;

/// Instantaneous state of the three limit sensors
pub trait LimitInputs {
    /// Read the sensors, returning the axes currently in contact
    ///
    /// Input polarity is applied by the implementation.
    fn read(&mut self) -> AxisMask;
}
