//! Homing and per-axis calibration
//!
//! Procedures are sequences of blocking moves on a [`Motion`]. Seek
//! failures escalate to the hard fault; the machine must be reset and
//! re-homed afterwards.
//!
//! [`Motion`]: crate::motion::Motion

pub mod controller;
pub mod phase;

pub use controller::{HomingController, HomingError, Scope};
pub use phase::HomingPhase;
