//! Blocking move primitives
//!
//! Each primitive programs the engine, then polls from the main context
//! until the move completes or the hard fault is raised. There is no
//! timeout on motion; the fault flag is the only way out of a wait.

use super::axis::{Axis, AxisMask};
use super::engine::MotionEngine;
use crate::traits::Waiter;

/// Why a blocking move did not complete cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveError {
    /// The hard fault was raised during or before the move
    Faulted,
    /// Limits were latched when the move ended
    LimitHit(AxisMask),
    /// The drivers belong to an external controller
    ExternalMode,
    /// The drivers are not powered
    Unpowered,
}

/// Move primitives over a shared engine
pub struct Motion<'a, W> {
    engine: &'a MotionEngine,
    waiter: W,
}

impl<'a, W: Waiter> Motion<'a, W> {
    pub fn new(engine: &'a MotionEngine, waiter: W) -> Self {
        Self { engine, waiter }
    }

    pub fn engine(&self) -> &'a MotionEngine {
        self.engine
    }

    pub fn waiter_mut(&mut self) -> &mut W {
        &mut self.waiter
    }

    /// Move all axes and wait
    ///
    /// `distance` is a position in absolute mode or an offset in relative
    /// mode. Succeeds only if no fault is raised and no limit is latched.
    pub fn move_modal(&mut self, distance: f32, speed_factor: f32) -> Result<(), MoveError> {
        self.check_fault()?;
        self.engine.set_targets(distance, speed_factor)?;
        self.wait_while(|engine| engine.are_moving());
        self.outcome()
    }

    /// Move one axis and wait
    pub fn move_modal_axis(
        &mut self,
        axis: Axis,
        distance: f32,
        speed_factor: f32,
    ) -> Result<(), MoveError> {
        self.check_fault()?;
        self.engine.set_target(axis, distance, speed_factor)?;
        self.wait_while(|engine| engine.is_moving(axis));
        self.outcome()
    }

    /// [`Self::move_modal`] at the engine's speed multiplier
    pub fn go(&mut self, distance: f32) -> Result<(), MoveError> {
        self.move_modal(distance, self.engine.speed_multiplier())
    }

    /// Let the sensors settle
    pub fn delay_ms(&mut self, ms: u32) {
        self.waiter.delay_ms(ms);
    }

    fn wait_while(&mut self, moving: impl Fn(&MotionEngine) -> bool) {
        while !self.engine.fault().is_set() && moving(self.engine) {
            self.waiter.spin();
        }
    }

    fn check_fault(&self) -> Result<(), MoveError> {
        if self.engine.fault().is_set() {
            Err(MoveError::Faulted)
        } else {
            Ok(())
        }
    }

    fn outcome(&self) -> Result<(), MoveError> {
        self.check_fault()?;
        let sticky = self.engine.limits().sticky();
        if sticky.any() {
            return Err(MoveError::LimitHit(sticky));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionConfig;
    use crate::sim::{Bed, SimWaiter};

    #[test]
    fn test_move_modal_completes() {
        let engine = MotionEngine::new(MotionConfig::DEFAULT);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, Bed::new()));

        assert_eq!(motion.move_modal(1.0, 1.0), Ok(()));
        assert_eq!(engine.positions(), [1.0; 3]);
    }

    #[test]
    fn test_move_modal_axis_moves_one() {
        let engine = MotionEngine::new(MotionConfig::DEFAULT);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, Bed::new()));

        assert_eq!(motion.move_modal_axis(Axis::Z, 0.5, 1.0), Ok(()));
        assert_eq!(engine.positions(), [0.0, 0.0, 0.5]);
        assert_eq!(motion.waiter_mut().bed().pulses(Axis::X), 0);
    }

    #[test]
    fn test_limit_hit_stops_group() {
        let engine = MotionEngine::new(MotionConfig::DEFAULT);
        let bed = Bed::new().with_contact(Axis::Y, -400);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed));

        let result = motion.move_modal(-2.0, 1.0);
        assert_eq!(result, Err(MoveError::LimitHit(AxisMask::single(Axis::Y))));

        // Every axis stopped on the shared halt
        let y = engine.position_steps(Axis::Y);
        assert!(y <= -400 && y > -1600);
        assert_eq!(engine.position_steps(Axis::X), y);
    }

    #[test]
    fn test_latched_limit_fails_even_when_ignored() {
        let engine = MotionEngine::new(MotionConfig::DEFAULT);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, Bed::new()));

        engine.limits().on_edge(AxisMask::single(Axis::X));
        engine.limits().on_edge(AxisMask::EMPTY);
        engine.set_enforce_endstops(false);

        let result = motion.move_modal(0.25, 1.0);
        assert_eq!(result, Err(MoveError::LimitHit(AxisMask::single(Axis::X))));
        assert_eq!(engine.positions(), [0.25; 3]);
    }

    #[test]
    fn test_fault_aborts_wait() {
        let engine = MotionEngine::new(MotionConfig::DEFAULT);
        let waiter = SimWaiter::new(&engine, Bed::new()).raise_fault_after(500);
        let mut motion = Motion::new(&engine, waiter);

        assert_eq!(motion.move_modal(10.0, 1.0), Err(MoveError::Faulted));
        assert!(engine.get_position(Axis::X) < 10.0);

        // Later moves refuse to start
        assert_eq!(motion.move_modal_axis(Axis::X, 1.0, 1.0), Err(MoveError::Faulted));
    }

    #[test]
    fn test_go_uses_multiplier() {
        let engine = MotionEngine::new(MotionConfig::DEFAULT);
        engine.set_speed_multiplier(0.5);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, Bed::new()));

        assert_eq!(motion.go(0.5), Ok(()));
        assert_eq!(engine.axis_state(Axis::X).speed, 70);
        assert_eq!(engine.positions(), [0.5; 3]);
    }

    #[test]
    fn test_external_mode_rejected() {
        let engine = MotionEngine::new(MotionConfig::DEFAULT);
        engine.set_external_mode(true);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, Bed::new()));

        assert_eq!(motion.move_modal(1.0, 1.0), Err(MoveError::ExternalMode));
    }
}
