//! Pin assignment of the reference board
//!
//! Raspberry Pi Pico on the lift carrier:
//!
//! | Signal            | GPIO          |
//! |-------------------|---------------|
//! | X/Y/Z step        | 2 / 4 / 6     |
//! | X/Y/Z direction   | 3 / 5 / 7     |
//! | Driver enable     | 8             |
//! | X/Y/Z limit       | 10 / 11 / 12  |
//! | Abort input       | 13            |
//! | External endstop  | 14            |

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;

use tribed_core::config::IoConfig;
use tribed_core::motion::AXIS_COUNT;
use tribed_drivers::{AbortInput, EnablePin, EndstopMirror, LimitSwitches, StepperBank};

pub type Steppers = StepperBank<Output<'static>, Output<'static>>;
pub type Limits = LimitSwitches<Input<'static>>;
pub type Abort = AbortInput<Input<'static>>;
pub type Endstop = EndstopMirror<Output<'static>>;
pub type Enable = EnablePin<Output<'static>>;

/// Raw pins, taken from the peripherals in `main`
pub struct BoardPins {
    pub step: [Peri<'static, AnyPin>; AXIS_COUNT],
    pub dir: [Peri<'static, AnyPin>; AXIS_COUNT],
    pub enable: Peri<'static, AnyPin>,
    pub limits: [Peri<'static, AnyPin>; AXIS_COUNT],
    pub abort: Peri<'static, AnyPin>,
    pub ext_endstop: Peri<'static, AnyPin>,
}

/// Drivers for every signal of the board
pub struct Board {
    pub steppers: Steppers,
    pub enable: Enable,
    pub limits: Limits,
    pub abort: Abort,
    pub endstop: Endstop,
}

impl Board {
    /// Configure the pins with the polarity from `io`
    ///
    /// Drivers start released and the endstop output inactive.
    pub fn new(pins: BoardPins, io: &IoConfig) -> Self {
        let steppers = StepperBank::new(
            pins.step.map(|pin| Output::new(pin, Level::Low)),
            pins.dir.map(|pin| Output::new(pin, Level::Low)),
            io.dir_inverted,
        );

        let enable = EnablePin::new(
            Output::new(pins.enable, inactive_level(io.enable_active_low)),
            io.enable_active_low,
        );

        let limits = LimitSwitches::new(
            pins.limits.map(|pin| Input::new(pin, idle_pull(io.limits_active_low))),
            io.limits_active_low,
        );

        let abort = AbortInput::new(
            Input::new(pins.abort, idle_pull(io.abort_active_low)),
            io.abort_active_low,
        );

        let endstop = EndstopMirror::new(
            Output::new(pins.ext_endstop, inactive_level(io.ext_endstop_active_low)),
            io.ext_endstop_active_low,
        );

        Self {
            steppers,
            enable,
            limits,
            abort,
            endstop,
        }
    }
}

fn inactive_level(active_low: bool) -> Level {
    if active_low {
        Level::High
    } else {
        Level::Low
    }
}

/// Pull towards the released level of an input
fn idle_pull(active_low: bool) -> Pull {
    if active_low {
        Pull::Up
    } else {
        Pull::Down
    }
}
