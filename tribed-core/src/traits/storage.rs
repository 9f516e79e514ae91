//! Persistent storage of calibration offsets

use crate::motion::AXIS_COUNT;

/// Non-volatile home of the per-axis calibration offsets
pub trait OffsetStore {
    type Error;

    /// Load the stored offsets in millimetres
    fn load_axis_offsets(&mut self) -> Result<[f32; AXIS_COUNT], Self::Error>;

    /// Persist the offsets in millimetres
    fn save_axis_offsets(&mut self, offsets: [f32; AXIS_COUNT]) -> Result<(), Self::Error>;
}
