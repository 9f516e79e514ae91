//! Simulated bed for host tests
//!
//! [`Bed`] counts step edges into a physical position per axis and models
//! one pressure sensor per axis that reads pressed at or above a contact
//! height. [`SimWaiter`] stands in for the timer interrupt: every poll of a
//! busy-wait runs one engine tick and delivers sensor edges to the limit
//! monitor.

use crate::motion::{Axis, AxisMask, MotionEngine, AXIS_COUNT};
use crate::traits::{Direction, LimitInputs, StepperOutputs, Waiter};

/// Three lift points with their sensors
#[derive(Debug, Clone, Default)]
pub struct Bed {
    physical: [i32; AXIS_COUNT],
    direction: [Option<Direction>; AXIS_COUNT],
    pulses: [u32; AXIS_COUNT],
    contact: [Option<i32>; AXIS_COUNT],
    sticks: [bool; AXIS_COUNT],
    stuck: [bool; AXIS_COUNT],
}

impl Bed {
    /// Bed with no sensor ever triggering
    pub fn new() -> Self {
        Self::default()
    }

    /// Sensor of `axis` reads pressed at physical positions <= `at`
    pub fn with_contact(mut self, axis: Axis, at: i32) -> Self {
        self.contact[axis.index()] = Some(at);
        self
    }

    pub fn with_contact_all(mut self, at: i32) -> Self {
        self.contact = [Some(at); AXIS_COUNT];
        self
    }

    /// Sensor of `axis` stays pressed once it has triggered
    pub fn with_stuck(mut self, axis: Axis) -> Self {
        self.sticks[axis.index()] = true;
        self
    }

    /// Half-steps actually travelled from power-on
    pub fn physical(&self, axis: Axis) -> i32 {
        self.physical[axis.index()]
    }

    pub fn pulses(&self, axis: Axis) -> u32 {
        self.pulses[axis.index()]
    }

    /// Last direction written, `None` before the first write
    pub fn direction(&self, axis: Axis) -> Option<Direction> {
        self.direction[axis.index()]
    }
}

impl StepperOutputs for Bed {
    fn set_direction(&mut self, axis: Axis, direction: Direction) {
        self.direction[axis.index()] = Some(direction);
    }

    fn half_step(&mut self, axis: Axis) {
        let i = axis.index();
        let direction = self.direction[i].unwrap_or(Direction::Positive);
        self.physical[i] += direction.delta();
        self.pulses[i] += 1;
    }
}

impl LimitInputs for Bed {
    fn read(&mut self) -> AxisMask {
        let mut levels = AxisMask::EMPTY;
        for axis in Axis::ALL {
            let i = axis.index();
            let touching = self.contact[i].is_some_and(|at| self.physical[i] <= at);
            if touching && self.sticks[i] {
                self.stuck[i] = true;
            }
            if touching || self.stuck[i] {
                levels.insert(axis);
            }
        }
        levels
    }
}

/// Ticks per simulated millisecond at the default 32 µs period
const TICKS_PER_MS: u32 = 31;

/// Upper bound on simulated ticks, so a broken procedure fails the test
/// instead of hanging it
const MAX_TICKS: u64 = 50_000_000;

/// Busy-wait hook that runs the tick and the limit-edge interrupt inline
pub struct SimWaiter<'a> {
    engine: &'a MotionEngine,
    bed: Bed,
    levels: AxisMask,
    ticks: u64,
    fault_at: Option<u64>,
}

impl<'a> SimWaiter<'a> {
    pub fn new(engine: &'a MotionEngine, bed: Bed) -> Self {
        Self {
            engine,
            bed,
            levels: AxisMask::EMPTY,
            ticks: 0,
            fault_at: None,
        }
    }

    /// Raise the hard fault after `ticks` simulated ticks
    pub fn raise_fault_after(mut self, ticks: u64) -> Self {
        self.fault_at = Some(ticks);
        self
    }

    pub fn bed(&self) -> &Bed {
        &self.bed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn step(&mut self) {
        self.engine.tick(&mut self.bed);

        let levels = self.bed.read();
        if levels != self.levels {
            self.levels = levels;
            self.engine.limits().on_edge(levels);
        }

        self.ticks += 1;
        if self.fault_at == Some(self.ticks) {
            self.engine.fault().raise();
        }
        assert!(self.ticks < MAX_TICKS, "simulation did not settle");
    }
}

impl Waiter for SimWaiter<'_> {
    fn spin(&mut self) {
        self.step();
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms * TICKS_PER_MS {
            self.step();
        }
    }
}
