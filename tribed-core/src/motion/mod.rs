//! Motion control
//!
//! The [`MotionEngine`] owns the kinematic state of the three axes and is
//! ticked from a high-priority interrupt. [`Motion`] layers the blocking
//! move primitives used by the homing procedures on top of it.

pub mod axis;
pub mod engine;
pub mod guard;
pub mod orchestrator;
pub mod ramp;

pub use axis::{Axis, AxisMask, InvalidAxis, AXIS_COUNT};
pub use engine::{AxisState, MotionEngine};
pub use guard::{Mode, ScopedMode};
pub use orchestrator::{Motion, MoveError};
