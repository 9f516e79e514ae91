//! Interrupt-driven step generation
//!
//! The engine is a `const`-constructible aggregate meant to live in a
//! `static`. Axis state is only touched inside a critical section; mode
//! flags and the speed multiplier are lock-free atomics so the main
//! context and the tick interrupt never observe a half-updated move.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use super::axis::{Axis, AxisMask, AXIS_COUNT};
use super::guard::{Mode, ScopedMode};
use super::orchestrator::MoveError;
use super::ramp;
use crate::config::MotionConfig;
use crate::safety::{HardFault, LimitMonitor};
use crate::traits::{Direction, StepperOutputs};

/// Bit pattern of `1.0f32`
const UNIT_MULTIPLIER_BITS: u32 = 0x3F80_0000;

/// Speed factor used by [`MotionEngine::resume_slow`]
const RESUME_SPEED: f32 = 0.5;

/// Kinematic state of one axis, in half-steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisState {
    /// Position at the start of the current move
    pub source: i32,
    /// Current position
    pub position: i32,
    /// Destination of the current move
    pub target: i32,
    /// Acceleration and deceleration zone length
    pub ramp_length: u32,
    /// Cruise speed of the current move
    pub speed: u32,
    /// Fixed-point step accumulator
    pub accumulator: u32,
    /// Direction of the current move
    pub direction: Direction,
    /// Direction line not yet written for the current move
    pub direction_pending: bool,
}

impl AxisState {
    /// Zeroed axis with the direction line still to be written
    pub const IDLE: Self = Self {
        source: 0,
        position: 0,
        target: 0,
        ramp_length: 0,
        speed: 0,
        accumulator: 0,
        direction: Direction::Positive,
        direction_pending: true,
    };

    pub const fn is_moving(&self) -> bool {
        self.target != self.position
    }

    pub const fn steps_to_dest(&self) -> u32 {
        self.target.abs_diff(self.position)
    }

    pub const fn steps_from_source(&self) -> u32 {
        self.position.abs_diff(self.source)
    }

    fn program(&mut self, target: i32, speed: u32, max_ramp: u32) {
        let direction = Direction::of_travel(self.position, target);
        if direction != self.direction {
            self.direction = direction;
            self.direction_pending = true;
        }
        self.source = self.position;
        self.target = target;
        self.ramp_length = ramp::ramp_length(max_ramp, target.abs_diff(self.position));
        self.speed = speed;
    }

    fn zero(&mut self) {
        self.source = 0;
        self.position = 0;
        self.target = 0;
        self.ramp_length = 0;
        self.accumulator = 0;
    }

    fn settle(&mut self) {
        self.target = self.position;
    }
}

/// Step generator for the three bed axes
pub struct MotionEngine {
    config: MotionConfig,
    axes: CriticalSectionMutex<RefCell<[AxisState; AXIS_COUNT]>>,
    limits: LimitMonitor,
    fault: HardFault,
    enforce_endstops: AtomicBool,
    relative: AtomicBool,
    external: AtomicBool,
    speed_multiplier: AtomicU32,
}

impl MotionEngine {
    /// Engine at rest: absolute mode, endstops enforced, latching enabled
    pub const fn new(config: MotionConfig) -> Self {
        Self {
            config,
            axes: CriticalSectionMutex::new(RefCell::new([AxisState::IDLE; AXIS_COUNT])),
            limits: LimitMonitor::new(),
            fault: HardFault::new(),
            enforce_endstops: AtomicBool::new(true),
            relative: AtomicBool::new(false),
            external: AtomicBool::new(false),
            speed_multiplier: AtomicU32::new(UNIT_MULTIPLIER_BITS),
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn limits(&self) -> &LimitMonitor {
        &self.limits
    }

    pub fn fault(&self) -> &HardFault {
        &self.fault
    }

    // ---- Modes ----

    pub fn set_relative(&self, relative: bool) {
        self.relative.store(relative, Ordering::Release);
    }

    pub fn is_relative(&self) -> bool {
        self.relative.load(Ordering::Acquire)
    }

    /// Halt on latched limits (true) or step through them (false)
    pub fn set_enforce_endstops(&self, enforce: bool) {
        self.enforce_endstops.store(enforce, Ordering::Release);
    }

    pub fn enforces_endstops(&self) -> bool {
        self.enforce_endstops.load(Ordering::Acquire)
    }

    /// Hand the drivers to an external step source
    ///
    /// While active the tick does nothing and new targets are rejected.
    pub fn set_external_mode(&self, external: bool) {
        self.external.store(external, Ordering::Release);
    }

    pub fn is_external_mode(&self) -> bool {
        self.external.load(Ordering::Acquire)
    }

    /// Override a mode until the returned guard is dropped
    pub fn override_mode(&self, mode: Mode, value: bool) -> ScopedMode<'_> {
        ScopedMode::new(self, mode, value)
    }

    pub(crate) fn mode(&self, mode: Mode) -> bool {
        match mode {
            Mode::Relative => self.is_relative(),
            Mode::EnforceEndstops => self.enforces_endstops(),
        }
    }

    pub(crate) fn set_mode(&self, mode: Mode, value: bool) {
        match mode {
            Mode::Relative => self.set_relative(value),
            Mode::EnforceEndstops => self.set_enforce_endstops(value),
        }
    }

    /// Speed factor used by moves that do not pass one
    pub fn speed_multiplier(&self) -> f32 {
        f32::from_bits(self.speed_multiplier.load(Ordering::Acquire))
    }

    pub fn set_speed_multiplier(&self, multiplier: f32) {
        self.speed_multiplier
            .store(multiplier.to_bits(), Ordering::Release);
    }

    /// Any latched limit, for mirroring to an external controller
    pub fn external_endstop_active(&self) -> bool {
        self.limits.sticky().any()
    }

    // ---- Targets ----

    fn cruise_speed(&self, speed_factor: f32) -> u32 {
        let speed = self.config.max_speed as f32 * speed_factor;
        if speed >= 1.0 {
            speed as u32
        } else {
            1
        }
    }

    /// Program a move of one axis
    ///
    /// `position_mm` is absolute, or a distance in relative mode.
    pub fn set_target(
        &self,
        axis: Axis,
        position_mm: f32,
        speed_factor: f32,
    ) -> Result<(), MoveError> {
        self.set_targets_masked(AxisMask::single(axis), position_mm, speed_factor)
    }

    /// Program the same move on all three axes atomically
    pub fn set_targets(&self, position_mm: f32, speed_factor: f32) -> Result<(), MoveError> {
        self.set_targets_masked(AxisMask::ALL, position_mm, speed_factor)
    }

    fn set_targets_masked(
        &self,
        mask: AxisMask,
        position_mm: f32,
        speed_factor: f32,
    ) -> Result<(), MoveError> {
        if self.is_external_mode() {
            return Err(MoveError::ExternalMode);
        }

        let steps = self.config.mm_to_half_steps(position_mm);
        let speed = self.cruise_speed(speed_factor);
        let relative = self.is_relative();

        self.axes.lock(|axes| {
            let mut axes = axes.borrow_mut();
            for axis in mask.iter() {
                let state = &mut axes[axis.index()];
                let target = if relative {
                    state.position.saturating_add(steps)
                } else {
                    steps
                };
                state.program(target, speed, self.config.max_ramp);
            }
        });
        Ok(())
    }

    /// Restart every axis toward its current target at low speed
    ///
    /// Used after a limit stop so stepping resumes from the bottom of the
    /// ramp instead of at the speed it was halted at.
    pub fn resume_slow(&self) {
        if self.is_external_mode() {
            return;
        }
        let speed = self.cruise_speed(RESUME_SPEED);
        self.axes.lock(|axes| {
            let mut axes = axes.borrow_mut();
            for state in axes.iter_mut() {
                let target = state.target;
                state.program(target, speed, self.config.max_ramp);
            }
        });
    }

    // ---- State queries ----

    fn halted(&self, axis: Axis) -> bool {
        self.enforces_endstops() && self.config.halt_scope.halts(axis, self.limits.sticky())
    }

    /// True while the axis still has distance to cover and may step
    pub fn is_moving(&self, axis: Axis) -> bool {
        if self.fault.is_set() || self.is_external_mode() || self.halted(axis) {
            return false;
        }
        self.axes.lock(|axes| axes.borrow()[axis.index()].is_moving())
    }

    /// True while any axis is moving
    pub fn are_moving(&self) -> bool {
        Axis::ALL.iter().any(|axis| self.is_moving(*axis))
    }

    /// Snapshot of one axis
    pub fn axis_state(&self, axis: Axis) -> AxisState {
        self.axes.lock(|axes| axes.borrow()[axis.index()])
    }

    /// Current position in half-steps
    pub fn position_steps(&self, axis: Axis) -> i32 {
        self.axis_state(axis).position
    }

    /// Current position in millimetres
    pub fn get_position(&self, axis: Axis) -> f32 {
        self.config.half_steps_to_mm(self.position_steps(axis))
    }

    /// Positions of all axes in millimetres
    pub fn positions(&self) -> [f32; AXIS_COUNT] {
        Axis::ALL.map(|axis| self.get_position(axis))
    }

    // ---- State changes ----

    fn with_axes<R>(&self, f: impl FnOnce(&mut [AxisState; AXIS_COUNT]) -> R) -> R {
        self.axes.lock(|axes| f(&mut axes.borrow_mut()))
    }

    /// Redefine the current position and drop any pending move
    pub fn override_position(&self, axis: Axis, position_mm: f32) {
        let steps = self.config.mm_to_half_steps(position_mm);
        self.with_axes(|axes| {
            let state = &mut axes[axis.index()];
            state.position = steps;
            state.source = steps;
            state.settle();
        });
    }

    /// Stop where the axis is
    pub fn settle(&self, axis: Axis) {
        self.with_axes(|axes| axes[axis.index()].settle());
    }

    pub fn settle_all(&self) {
        self.with_axes(|axes| axes.iter_mut().for_each(AxisState::settle));
    }

    /// Clear the kinematic state of one axis
    pub fn zero(&self, axis: Axis) {
        self.with_axes(|axes| axes[axis.index()].zero());
    }

    pub fn zero_all(&self) {
        self.with_axes(|axes| axes.iter_mut().for_each(AxisState::zero));
    }

    /// Make the current position the origin of every axis and forget all
    /// latched limits
    pub fn set_origin(&self) {
        self.with_axes(|axes| {
            axes.iter_mut().for_each(AxisState::zero);
            self.limits.clear_all();
        });
    }

    /// Make the current position the origin of one axis and forget its
    /// latched limit
    pub fn set_origin_axis(&self, axis: Axis) {
        self.with_axes(|axes| {
            axes[axis.index()].zero();
            self.limits.clear(axis);
        });
    }

    /// Return to the power-on state
    ///
    /// Clears the hard fault, re-enables latching and restores absolute
    /// mode with endstops enforced.
    pub fn reset(&self) {
        self.set_external_mode(false);
        self.set_relative(false);
        self.set_enforce_endstops(true);
        self.limits.enable();
        self.set_origin();
        self.fault.clear();
    }

    // ---- Tick ----

    /// Advance all axes by one tick
    ///
    /// Called from the high-priority timer interrupt at
    /// `config.tick_period_us`.
    pub fn tick<O: StepperOutputs>(&self, outputs: &mut O) {
        if self.fault.is_set() || self.is_external_mode() {
            return;
        }

        let sticky = self.limits.sticky();
        let enforce = self.enforces_endstops();
        let overflow = self.config.accumulator_overflow;

        self.with_axes(|axes| {
            for axis in Axis::ALL {
                if enforce && self.config.halt_scope.halts(axis, sticky) {
                    continue;
                }

                let state = &mut axes[axis.index()];

                // Direction setup time: rest for the tick the line changes
                if state.direction_pending {
                    outputs.set_direction(axis, state.direction);
                    state.direction_pending = false;
                    continue;
                }

                if !state.is_moving() {
                    continue;
                }

                let speed = ramp::profile_speed(
                    &self.config,
                    state.speed,
                    state.ramp_length,
                    state.steps_from_source(),
                    state.steps_to_dest(),
                );

                let delta = Direction::of_travel(state.position, state.target).delta();
                state.accumulator = state.accumulator.saturating_add(speed);
                while state.accumulator >= overflow && state.position != state.target {
                    state.position += delta;
                    outputs.half_step(axis);
                    state.accumulator -= overflow;
                }

                if !state.is_moving() {
                    state.accumulator = 0;
                }
            }
        });
    }
}
