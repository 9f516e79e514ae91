//! Board-agnostic core logic for the Tribed bed-leveling firmware
//!
//! The bed rests on three independently driven lift points. This crate
//! contains everything that does not touch a specific chip:
//!
//! - Limit monitor latching brief sensor activations
//! - Motion engine: per-axis kinematic state and the trapezoidal step tick
//! - Blocking move primitives (the orchestrator)
//! - Homing and per-axis calibration procedures
//! - The controller facade a command dispatcher drives
//! - Configuration and persisted axis offsets
//! - Hardware abstraction traits (step/dir outputs, limit inputs, storage)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[cfg(test)]
use critical_section as _;

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod homing;
pub mod motion;
pub mod safety;
pub mod traits;

#[cfg(test)]
pub(crate) mod sim;

pub use controller::{Controller, Status};
pub use motion::{Axis, AxisMask, InvalidAxis, MotionEngine};
