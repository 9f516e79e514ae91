//! Limit sensor inputs
//!
//! One digital input per lift point. Pressure sensor boards usually pull
//! the line low on contact.

use core::convert::Infallible;

use embassy_futures::select::{select3, Either3};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use tribed_core::motion::{Axis, AxisMask, AXIS_COUNT};
use tribed_core::safety::LimitMonitor;
use tribed_core::traits::LimitInputs;

use crate::infallible;

/// The three limit inputs with their polarity
pub struct LimitSwitches<I> {
    inputs: [I; AXIS_COUNT],
    active_low: bool,
}

impl<I: InputPin<Error = Infallible>> LimitSwitches<I> {
    pub fn new(inputs: [I; AXIS_COUNT], active_low: bool) -> Self {
        Self { inputs, active_low }
    }

    /// Sample the inputs and latch them into `monitor`
    ///
    /// Returns the sticky mask. Polling this catches a press held across
    /// an edge that was never observed.
    pub fn latch(&mut self, monitor: &LimitMonitor) -> AxisMask {
        monitor.on_edge(self.read())
    }
}

impl<I: InputPin<Error = Infallible> + Wait> LimitSwitches<I> {
    /// Wait for an edge on any input, then return the new levels
    pub async fn wait_for_change(&mut self) -> AxisMask {
        let [x, y, z] = &mut self.inputs;
        let edge = select3(
            x.wait_for_any_edge(),
            y.wait_for_any_edge(),
            z.wait_for_any_edge(),
        )
        .await;
        match edge {
            Either3::First(r) | Either3::Second(r) | Either3::Third(r) => infallible(r),
        }
        self.read()
    }
}

impl<I: InputPin<Error = Infallible>> LimitInputs for LimitSwitches<I> {
    fn read(&mut self) -> AxisMask {
        let mut levels = AxisMask::EMPTY;
        for axis in Axis::ALL {
            let high = infallible(self.inputs[axis.index()].is_high());
            if high != self.active_low {
                levels.insert(axis);
            }
        }
        levels
    }
}
