//! Hardware abstraction traits
//!
//! These traits define the interface between the motion core and the
//! board-specific pin drivers, delays and persistent storage.

pub mod limits;
pub mod stepper;
pub mod storage;
pub mod wait;

pub use limits::LimitInputs;
pub use stepper::{Direction, StepperOutputs, StepperPower};
pub use storage::OffsetStore;
pub use wait::{SpinDelay, Waiter};
