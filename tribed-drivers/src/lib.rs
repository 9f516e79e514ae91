//! Pin-level driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tribed-core on top of `embedded-hal` 1.0 pins:
//!
//! - Step/direction outputs for the three lift drivers
//! - Shared driver enable line
//! - Limit sensor inputs with async edge waiting
//! - Abort input and external endstop output

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
use critical_section as _;

pub mod abort;
pub mod endstop;
pub mod limits;
pub mod power;
pub mod stepper;

#[cfg(test)]
pub(crate) mod mock;

pub use abort::AbortInput;
pub use endstop::EndstopMirror;
pub use limits::LimitSwitches;
pub use power::EnablePin;
pub use stepper::StepperBank;

use core::convert::Infallible;

/// Unwrap the result of an infallible pin operation
pub(crate) fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
