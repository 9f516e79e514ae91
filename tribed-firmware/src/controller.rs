//! Request handling for the controller task
//!
//! A command dispatcher (serial parser or similar, not part of this image)
//! pushes [`Request`]s into `channels::REQUESTS` and reads the outcome from
//! `channels::RESPONSE`. Each request maps onto one call of the core
//! [`Controller`].

use embassy_rp::gpio::Output;
use embassy_time::Delay;

use tribed_core::homing::HomingError;
use tribed_core::motion::{Axis, MoveError, AXIS_COUNT};
use tribed_core::traits::SpinDelay;
use tribed_core::{Controller, Status};
use tribed_drivers::EnablePin;

use crate::config::{FlashOffsetStore, OffsetsError};

/// The core controller as wired on this board
pub type BoardController =
    Controller<'static, SpinDelay<Delay>, EnablePin<Output<'static>>, FlashOffsetStore>;

/// Operator command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    Power(bool),
    SetRelative(bool),
    SetSpeedMultiplier(f32),
    SetLimitsEnabled(bool),
    SetEnforceEndstops(bool),
    SetExternalMode(bool),
    /// Move every axis, `None` speed uses the stored multiplier
    Move { distance: f32, speed: Option<f32> },
    MoveAxis { axis: Axis, distance: f32, speed: f32 },
    Home,
    Calibrate(Axis),
    /// `None` detaches every axis
    Detach(Option<Axis>),
    /// `None` applies to every axis
    SetOrigin(Option<Axis>),
    OverridePosition { axis: Axis, position: f32 },
    Settle(Option<Axis>),
    ClearSticky(Option<Axis>),
    GetOffsets,
    SetAxisOffset { axis: Axis, offset: f32 },
    Abort,
    Reset,
    Status,
}

/// Outcome of a [`Request`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    Ok,
    Move(MoveError),
    Homing(HomingError),
    Detached(u8),
    Offsets([f32; AXIS_COUNT]),
    OffsetsNotSaved(OffsetsError),
    Status(Status),
}

impl From<Result<(), MoveError>> for Response {
    fn from(result: Result<(), MoveError>) -> Self {
        result.map_or_else(Response::Move, |()| Response::Ok)
    }
}

impl From<Result<(), HomingError>> for Response {
    fn from(result: Result<(), HomingError>) -> Self {
        result.map_or_else(Response::Homing, |()| Response::Ok)
    }
}

/// Run one request to completion
///
/// Moves, homing and calibration block until the bed stops.
pub fn handle(controller: &mut BoardController, request: Request) -> Response {
    match request {
        Request::Power(on) => {
            controller.power(on);
            Response::Ok
        }
        Request::SetRelative(relative) => {
            controller.set_relative(relative);
            Response::Ok
        }
        Request::SetSpeedMultiplier(multiplier) => {
            controller.set_speed_multiplier(multiplier);
            Response::Ok
        }
        Request::SetLimitsEnabled(enabled) => {
            controller.set_limits_enabled(enabled);
            Response::Ok
        }
        Request::SetEnforceEndstops(enforce) => {
            controller.set_enforce_endstops(enforce);
            Response::Ok
        }
        Request::SetExternalMode(external) => {
            controller.set_external_mode(external);
            Response::Ok
        }
        Request::Move { distance, speed } => match speed {
            Some(speed) => controller.move_modal(distance, speed).into(),
            None => controller.go(distance).into(),
        },
        Request::MoveAxis {
            axis,
            distance,
            speed,
        } => controller.move_modal_axis(axis, distance, speed).into(),
        Request::Home => controller.home().into(),
        Request::Calibrate(axis) => controller.calibrate(axis).into(),
        Request::Detach(scope) => {
            let result = match scope {
                Some(axis) => controller.detach_axis(axis),
                None => controller.detach(),
            };
            match result {
                Ok(passes) => Response::Detached(passes),
                Err(e) => Response::Homing(e),
            }
        }
        Request::SetOrigin(scope) => {
            match scope {
                Some(axis) => controller.set_origin_axis(axis),
                None => controller.set_origin(),
            }
            Response::Ok
        }
        Request::OverridePosition { axis, position } => {
            controller.override_position(axis, position);
            Response::Ok
        }
        Request::Settle(scope) => {
            match scope {
                Some(axis) => controller.settle_axis(axis),
                None => controller.settle(),
            }
            Response::Ok
        }
        Request::ClearSticky(scope) => {
            match scope {
                Some(axis) => controller.clear_sticky(axis),
                None => controller.clear_sticky_all(),
            }
            Response::Ok
        }
        Request::GetOffsets => Response::Offsets(controller.axis_offsets()),
        Request::SetAxisOffset { axis, offset } => {
            match controller.set_axis_offset(axis, offset) {
                Ok(()) => Response::Offsets(controller.axis_offsets()),
                Err(e) => Response::OffsetsNotSaved(e),
            }
        }
        Request::Abort => {
            controller.abort();
            Response::Ok
        }
        Request::Reset => {
            controller.reset();
            Response::Ok
        }
        Request::Status => Response::Status(controller.status()),
    }
}
