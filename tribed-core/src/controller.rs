//! Controller facade
//!
//! Everything a command dispatcher needs, gathered over one engine: modes,
//! blocking moves, homing, calibration offsets and the reset path. The
//! dispatcher itself (parsing, replies) lives outside this crate.

use crate::config::{AxisOffsets, HomingConfig};
use crate::homing::{HomingController, HomingError, HomingPhase, Scope};
use crate::motion::{Axis, AxisMask, Motion, MotionEngine, MoveError, AXIS_COUNT};
use crate::traits::{OffsetStore, StepperPower, Waiter};

/// Snapshot of the machine state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub powered: bool,
    pub external_mode: bool,
    pub limits_enabled: bool,
    pub relative: bool,
    pub enforce_endstops: bool,
    pub sticky: AxisMask,
    pub realtime: AxisMask,
    pub positions: [f32; AXIS_COUNT],
    pub faulted: bool,
    pub phase: HomingPhase,
}

/// Dispatcher-facing surface of the firmware core
pub struct Controller<'a, W, P, S> {
    motion: Motion<'a, W>,
    homing: HomingController,
    power: P,
    store: S,
    offsets: AxisOffsets,
}

impl<'a, W, P, S> Controller<'a, W, P, S>
where
    W: Waiter,
    P: StepperPower,
    S: OffsetStore,
{
    /// Build the controller and load the stored axis offsets
    ///
    /// Offsets that fail to load fall back to zero.
    pub fn new(
        engine: &'a MotionEngine,
        homing: HomingConfig,
        waiter: W,
        power: P,
        mut store: S,
    ) -> Self {
        let offsets = match store.load_axis_offsets() {
            Ok(mm) => AxisOffsets::from_mm(mm),
            Err(_) => {
                warn!("offsets: none stored, using zero");
                AxisOffsets::new()
            }
        };

        Self {
            motion: Motion::new(engine, waiter),
            homing: HomingController::new(homing),
            power,
            store,
            offsets,
        }
    }

    pub fn engine(&self) -> &'a MotionEngine {
        self.motion.engine()
    }

    pub fn homing(&self) -> &HomingController {
        &self.homing
    }

    // ---- Power and modes ----

    pub fn power(&mut self, on: bool) {
        self.power.set_powered(on);
    }

    pub fn is_powered(&self) -> bool {
        self.power.is_powered()
    }

    pub fn set_relative(&mut self, relative: bool) {
        self.engine().set_relative(relative);
    }

    pub fn is_relative(&self) -> bool {
        self.engine().is_relative()
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.engine().set_speed_multiplier(multiplier);
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.engine().speed_multiplier()
    }

    /// Turn limit latching on or off; off also forgets latched limits
    pub fn set_limits_enabled(&mut self, enabled: bool) {
        let limits = self.engine().limits();
        if enabled {
            limits.enable();
        } else {
            limits.disable();
        }
    }

    pub fn set_enforce_endstops(&mut self, enforce: bool) {
        self.engine().set_enforce_endstops(enforce);
    }

    /// Hand the drivers to (or take them back from) an external controller
    ///
    /// The drivers are powered on entry so the external step source can
    /// move them.
    pub fn set_external_mode(&mut self, external: bool) {
        info!("external mode: {}", external);
        if external {
            self.power(true);
        }
        self.engine().set_external_mode(external);
    }

    // ---- Moves ----

    pub fn move_modal(&mut self, distance: f32, speed_factor: f32) -> Result<(), MoveError> {
        self.motion.move_modal(distance, speed_factor)
    }

    pub fn move_modal_axis(
        &mut self,
        axis: Axis,
        distance: f32,
        speed_factor: f32,
    ) -> Result<(), MoveError> {
        self.motion.move_modal_axis(axis, distance, speed_factor)
    }

    /// Move every axis at the stored speed multiplier
    ///
    /// Refused while the drivers are unpowered.
    pub fn go(&mut self, distance: f32) -> Result<(), MoveError> {
        if !self.is_powered() {
            return Err(MoveError::Unpowered);
        }
        self.motion.go(distance)
    }

    // ---- Homing ----

    /// Home the whole bed, powering the drivers first
    pub fn home(&mut self) -> Result<(), HomingError> {
        self.power(true);
        self.homing.home(&mut self.motion)
    }

    /// Calibrate one axis with its stored offset
    pub fn calibrate(&mut self, axis: Axis) -> Result<(), HomingError> {
        self.power(true);
        let offset = self.offsets.get(axis);
        self.homing.calibrate(&mut self.motion, axis, offset)
    }

    /// Lower the whole bed off its sensors
    pub fn detach(&mut self) -> Result<u8, HomingError> {
        self.detach_scope(Scope::All)
    }

    /// Lower one axis off its sensor
    pub fn detach_axis(&mut self, axis: Axis) -> Result<u8, HomingError> {
        self.detach_scope(Scope::Single(axis))
    }

    fn detach_scope(&mut self, scope: Scope) -> Result<u8, HomingError> {
        if !self.is_powered() {
            return Err(HomingError::Unpowered);
        }
        self.homing.detach(&mut self.motion, scope)
    }

    // ---- Position ----

    pub fn set_origin(&mut self) {
        self.engine().set_origin();
    }

    pub fn set_origin_axis(&mut self, axis: Axis) {
        self.engine().set_origin_axis(axis);
    }

    pub fn override_position(&mut self, axis: Axis, position_mm: f32) {
        self.engine().override_position(axis, position_mm);
    }

    pub fn settle(&mut self) {
        self.engine().settle_all();
    }

    pub fn settle_axis(&mut self, axis: Axis) {
        self.engine().settle(axis);
    }

    pub fn get_position(&self, axis: Axis) -> f32 {
        self.engine().get_position(axis)
    }

    // ---- Limits ----

    pub fn get_sticky_state(&self) -> AxisMask {
        self.engine().limits().sticky()
    }

    pub fn get_realtime_state(&self) -> AxisMask {
        self.engine().limits().realtime()
    }

    /// Forget one latched limit and resume motion slowly
    pub fn clear_sticky(&mut self, axis: Axis) {
        self.engine().limits().clear(axis);
        self.engine().resume_slow();
    }

    /// Forget every latched limit and resume motion slowly
    pub fn clear_sticky_all(&mut self) {
        self.engine().limits().clear_all();
        self.engine().resume_slow();
    }

    // ---- Offsets ----

    /// Calibration offsets in millimetres
    pub fn axis_offsets(&self) -> [f32; AXIS_COUNT] {
        self.offsets.to_mm()
    }

    /// Change one calibration offset and persist the table
    pub fn set_axis_offset(&mut self, axis: Axis, offset_mm: f32) -> Result<(), S::Error> {
        self.offsets.set(axis, offset_mm);
        self.store.save_axis_offsets(self.offsets.to_mm())
    }

    // ---- Safety ----

    /// Emergency stop
    pub fn abort(&self) {
        self.engine().fault().raise();
    }

    /// Leave a fault: stop, clear all state and release the drivers
    ///
    /// The bed must be homed again before positions mean anything.
    pub fn reset(&mut self) {
        warn!("controller: reset");
        let engine = self.engine();
        engine.fault().raise();
        engine.reset();
        self.homing.reset();
        self.power(false);
    }

    pub fn status(&self) -> Status {
        let engine = self.engine();
        Status {
            powered: self.is_powered(),
            external_mode: engine.is_external_mode(),
            limits_enabled: engine.limits().is_enabled(),
            relative: engine.is_relative(),
            enforce_endstops: engine.enforces_endstops(),
            sticky: engine.limits().sticky(),
            realtime: engine.limits().realtime(),
            positions: engine.positions(),
            faulted: engine.fault().is_set(),
            phase: self.homing.phase(),
        }
    }
}
