//! Homing and calibration procedures
//!
//! Whole-bed homing finds the plane where the bed touches all sensors and
//! makes it the origin. Calibration does the same for a single axis against
//! the reference axis, then applies the stored mechanical offset.
//!
//! Both procedures run with relative addressing and enforced endstops,
//! overriding them per move where the bed must travel through a pressed
//! sensor.

use heapless::Vec;

use super::phase::HomingPhase;
use crate::config::HomingConfig;
use crate::motion::{Axis, AxisMask, Mode, Motion, MotionEngine, MoveError};
use crate::traits::Waiter;

/// Phases remembered per procedure
pub const TRACE_CAPACITY: usize = 16;

/// Why a procedure stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingError {
    /// No sensor triggered during the coarse seek
    CoarseSeekFailed,
    /// The sensor did not trigger during the fine seek
    FineSeekFailed,
    /// A sensor stayed pressed through every detach pass
    DetachFailed,
    /// The hard fault was raised while moving
    Aborted,
    /// The machine is faulted and must be reset first
    Faulted,
    /// The drivers belong to an external controller
    ExternalMode,
    /// The drivers are not powered
    Unpowered,
}

/// Axes a procedure step acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scope {
    /// The whole bed
    All,
    /// One lift point
    Single(Axis),
}

impl Scope {
    pub const fn mask(self) -> AxisMask {
        match self {
            Scope::All => AxisMask::ALL,
            Scope::Single(axis) => AxisMask::single(axis),
        }
    }
}

/// Sequencer of the homing and calibration procedures
pub struct HomingController {
    config: HomingConfig,
    phase: HomingPhase,
    trace: Vec<HomingPhase, TRACE_CAPACITY>,
    detach_passes: u8,
}

impl HomingController {
    pub const fn new(config: HomingConfig) -> Self {
        Self {
            config,
            phase: HomingPhase::Idle,
            trace: Vec::new(),
            detach_passes: 0,
        }
    }

    pub fn config(&self) -> &HomingConfig {
        &self.config
    }

    /// Current phase
    pub fn phase(&self) -> HomingPhase {
        self.phase
    }

    /// Phases visited by the last procedure
    pub fn trace(&self) -> &[HomingPhase] {
        &self.trace
    }

    /// Passes used by the last detach
    pub fn detach_passes(&self) -> u8 {
        self.detach_passes
    }

    /// Leave a terminal phase after the machine has been reset
    pub fn reset(&mut self) {
        self.phase = HomingPhase::Idle;
        self.trace.clear();
        self.detach_passes = 0;
    }

    /// Home the whole bed and make the contact plane the origin
    pub fn home<W: Waiter>(&mut self, motion: &mut Motion<'_, W>) -> Result<(), HomingError> {
        let engine = motion.engine();
        self.begin(engine)?;
        info!("homing: start");

        engine.limits().enable();
        engine.limits().clear_all();
        let _relative = engine.override_mode(Mode::Relative, true);
        let _enforce = engine.override_mode(Mode::EnforceEndstops, true);

        let result = self.run_home(motion);
        self.finish(engine, result)
    }

    /// Calibrate one axis against the reference axis
    ///
    /// The axis ends at position zero after moving `offset_mm` past the
    /// plane where its sensor triggers. Calibrating the reference axis is
    /// whole-bed homing.
    pub fn calibrate<W: Waiter>(
        &mut self,
        motion: &mut Motion<'_, W>,
        axis: Axis,
        offset_mm: f32,
    ) -> Result<(), HomingError> {
        if axis == Axis::REFERENCE {
            return self.home(motion);
        }

        let engine = motion.engine();
        self.begin(engine)?;
        info!("calibrate {}: start, offset {} mm", axis, offset_mm);

        engine.limits().enable();
        engine.limits().clear_all();
        let origin_mm = engine.get_position(axis);
        let _relative = engine.override_mode(Mode::Relative, true);
        let _enforce = engine.override_mode(Mode::EnforceEndstops, true);

        let result = self.run_calibrate(motion, axis, offset_mm, origin_mm);
        self.finish(engine, result)
    }

    /// Lower the bed until the sensors in `scope` read clear
    ///
    /// Returns the number of passes used. A failure is reported but does
    /// not raise the hard fault.
    pub fn detach<W: Waiter>(
        &mut self,
        motion: &mut Motion<'_, W>,
        scope: Scope,
    ) -> Result<u8, HomingError> {
        let engine = motion.engine();
        if engine.fault().is_set() {
            return Err(HomingError::Faulted);
        }
        if engine.is_external_mode() {
            return Err(HomingError::ExternalMode);
        }
        self.run_detach(motion, scope)
    }

    fn run_home<W: Waiter>(&mut self, motion: &mut Motion<'_, W>) -> Result<(), HomingError> {
        let engine = motion.engine();

        if self.config.safe_pre_seek {
            self.pre_seek(motion)?;
        }
        self.coarse_seek(motion)?;
        engine.zero_all();

        self.retract(motion, Scope::All)?;
        if !self.fine_seek(motion, Scope::All)? {
            return Err(HomingError::FineSeekFailed);
        }
        engine.zero_all();

        self.enter(HomingPhase::Detach);
        self.run_detach(motion, Scope::All)?;

        engine.set_origin();
        motion.delay_ms(self.config.origin_settle_ms);
        // The bed can spring back onto a sensor while settling
        engine.limits().clear_all();
        Ok(())
    }

    fn run_calibrate<W: Waiter>(
        &mut self,
        motion: &mut Motion<'_, W>,
        axis: Axis,
        offset_mm: f32,
        origin_mm: f32,
    ) -> Result<(), HomingError> {
        let engine = motion.engine();

        if self.config.safe_pre_seek {
            self.pre_seek(motion)?;
        }
        self.coarse_seek(motion)?;
        self.enter(HomingPhase::Detach);
        self.run_detach(motion, Scope::All)?;

        self.retract(motion, Scope::Single(axis))?;
        if !self.fine_seek(motion, Scope::Single(axis))? {
            self.restore(motion, axis, origin_mm);
            return Err(HomingError::FineSeekFailed);
        }

        self.enter(HomingPhase::Detach);
        self.run_detach(motion, Scope::Single(axis))?;

        if offset_mm != 0.0 {
            let _ignore = engine.override_mode(Mode::EnforceEndstops, false);
            lenient(motion.move_modal_axis(axis, offset_mm, self.config.offset_speed))?;
        }

        engine.set_origin_axis(axis);
        Ok(())
    }

    fn begin(&mut self, engine: &MotionEngine) -> Result<(), HomingError> {
        if self.phase == HomingPhase::Faulted || engine.fault().is_set() {
            return Err(HomingError::Faulted);
        }
        if engine.is_external_mode() {
            return Err(HomingError::ExternalMode);
        }
        self.reset();
        let _ = self.trace.push(HomingPhase::Idle);
        Ok(())
    }

    fn finish(
        &mut self,
        engine: &MotionEngine,
        result: Result<(), HomingError>,
    ) -> Result<(), HomingError> {
        match result {
            Ok(()) => {
                self.enter(HomingPhase::Done);
                info!("homing: done");
                Ok(())
            }
            Err(err) => {
                engine.fault().raise();
                self.enter(HomingPhase::Faulted);
                error!("homing: failed in {}: {}", self.prev_phase(), err);
                Err(err)
            }
        }
    }

    fn prev_phase(&self) -> HomingPhase {
        let len = self.trace.len();
        if len >= 2 {
            self.trace[len - 2]
        } else {
            HomingPhase::Idle
        }
    }

    fn enter(&mut self, next: HomingPhase) {
        debug_assert!(self.phase.allows(next));
        debug!("homing: {} -> {}", self.phase, next);
        self.phase = next;
        let _ = self.trace.push(next);
    }

    fn pre_seek<W: Waiter>(&mut self, motion: &mut Motion<'_, W>) -> Result<(), HomingError> {
        self.enter(HomingPhase::PreSeek);
        let engine = motion.engine();
        {
            let _ignore = engine.override_mode(Mode::EnforceEndstops, false);
            lenient(motion.move_modal(self.config.pre_seek_mm, self.config.retract_speed))?;
        }
        motion.delay_ms(self.config.settle_ms);
        Ok(())
    }

    fn coarse_seek<W: Waiter>(&mut self, motion: &mut Motion<'_, W>) -> Result<(), HomingError> {
        self.enter(HomingPhase::CoarseSeek);
        let (mm, speed) = (self.config.seek_up_mm, self.config.coarse_speed);
        let hit = self.seek_up(motion, Scope::All, mm, speed)?;
        if hit.is_empty() {
            warn!("homing: no sensor within {} mm", self.config.seek_up_mm);
            return Err(HomingError::CoarseSeekFailed);
        }
        debug!("homing: coarse contact {}", hit);
        Ok(())
    }

    fn retract<W: Waiter>(
        &mut self,
        motion: &mut Motion<'_, W>,
        scope: Scope,
    ) -> Result<(), HomingError> {
        self.enter(HomingPhase::Retract);
        {
            let _ignore = motion.engine().override_mode(Mode::EnforceEndstops, false);
            lower(motion, scope, self.config.retract_mm, self.config.retract_speed)?;
        }
        motion.delay_ms(self.config.settle_ms);
        Ok(())
    }

    /// Returns whether the sensors of `scope` triggered
    fn fine_seek<W: Waiter>(
        &mut self,
        motion: &mut Motion<'_, W>,
        scope: Scope,
    ) -> Result<bool, HomingError> {
        self.enter(HomingPhase::FineSeek);
        let (mm, speed) = (self.config.fine_seek_mm(), self.config.fine_speed);
        let hit = self.seek_up(motion, scope, mm, speed)?;
        let found = match scope {
            Scope::All => hit.any(),
            Scope::Single(axis) => hit.contains(axis),
        };
        if !found {
            warn!("homing: fine seek found no contact in {}", scope);
        }
        Ok(found)
    }

    /// Raise the bed by `mm` with endstops enforced, returning the latched
    /// limits
    fn seek_up<W: Waiter>(
        &mut self,
        motion: &mut Motion<'_, W>,
        scope: Scope,
        mm: f32,
        speed: f32,
    ) -> Result<AxisMask, HomingError> {
        motion.engine().limits().clear_all();
        let result = match scope {
            Scope::All => motion.move_modal(-mm, speed),
            Scope::Single(axis) => motion.move_modal_axis(axis, -mm, speed),
        };
        match result {
            Ok(()) => Ok(AxisMask::EMPTY),
            Err(MoveError::LimitHit(hit)) => Ok(hit),
            Err(err) => Err(err.into()),
        }
    }

    fn run_detach<W: Waiter>(
        &mut self,
        motion: &mut Motion<'_, W>,
        scope: Scope,
    ) -> Result<u8, HomingError> {
        let engine = motion.engine();
        let limits = engine.limits();
        let watched = scope.mask();
        let _relative = engine.override_mode(Mode::Relative, true);
        let _ignore = engine.override_mode(Mode::EnforceEndstops, false);

        self.detach_passes = 0;
        for pass in 1..=self.config.detach_passes {
            self.detach_passes = pass;
            watched.iter().for_each(|axis| limits.clear(axis));

            lower(motion, scope, self.config.detach_mm, self.config.detach_speed)?;
            motion.delay_ms(self.config.detach_settle_ms);

            let contact = limits.sticky() | limits.realtime();
            if !contact.intersects(watched) {
                debug!("detach: clear after {} passes", pass);
                return Ok(pass);
            }
        }

        warn!("detach: sensors still pressed: {}", limits.sticky() | limits.realtime());
        Err(HomingError::DetachFailed)
    }

    /// Return a failed axis to where calibration found it
    fn restore<W: Waiter>(&mut self, motion: &mut Motion<'_, W>, axis: Axis, origin_mm: f32) {
        let engine = motion.engine();
        let _absolute = engine.override_mode(Mode::Relative, false);
        let _ignore = engine.override_mode(Mode::EnforceEndstops, false);
        let result = motion.move_modal_axis(axis, origin_mm, self.config.retract_speed);
        if result == Err(MoveError::Faulted) {
            warn!("calibrate {}: restore aborted", axis);
        }
    }
}

impl From<MoveError> for HomingError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::Faulted => HomingError::Aborted,
            MoveError::ExternalMode => HomingError::ExternalMode,
            MoveError::Unpowered => HomingError::Unpowered,
            // Callers decide what a latched limit means
            MoveError::LimitHit(_) => HomingError::Aborted,
        }
    }
}

/// Move down, treating latched limits as success
fn lower<W: Waiter>(
    motion: &mut Motion<'_, W>,
    scope: Scope,
    mm: f32,
    speed: f32,
) -> Result<(), HomingError> {
    let result = match scope {
        Scope::All => motion.move_modal(mm, speed),
        Scope::Single(axis) => motion.move_modal_axis(axis, mm, speed),
    };
    lenient(result)
}

/// Accept a move that ended with latched limits
fn lenient(result: Result<(), MoveError>) -> Result<(), HomingError> {
    match result {
        Ok(()) | Err(MoveError::LimitHit(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionConfig;
    use crate::sim::{Bed, SimWaiter};

    const CONTACT: i32 = -1600;

    fn engine() -> MotionEngine {
        MotionEngine::new(MotionConfig::DEFAULT)
    }

    fn bed() -> Bed {
        Bed::new().with_contact_all(CONTACT)
    }

    #[test]
    fn test_home_success() {
        let engine = engine();
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed()));
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        assert_eq!(homing.home(&mut motion), Ok(()));

        assert_eq!(engine.positions(), [0.0; 3]);
        assert!(engine.limits().sticky().is_empty());
        assert!(!engine.fault().is_set());
        assert_eq!(homing.phase(), HomingPhase::Done);
        assert_eq!(homing.detach_passes(), 1);
        assert_eq!(
            homing.trace(),
            &[
                HomingPhase::Idle,
                HomingPhase::CoarseSeek,
                HomingPhase::Retract,
                HomingPhase::FineSeek,
                HomingPhase::Detach,
                HomingPhase::Done,
            ]
        );

        // Origin sits one detach step below the contact plane
        let bed = motion.waiter_mut().bed();
        for axis in Axis::ALL {
            assert_eq!(bed.physical(axis), CONTACT + 80);
        }

        // Modes restored
        assert!(!engine.is_relative());
        assert!(engine.enforces_endstops());
    }

    #[test]
    fn test_home_with_pre_seek() {
        let engine = engine();
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed()));
        let config = HomingConfig {
            safe_pre_seek: true,
            ..HomingConfig::DEFAULT
        };
        let mut homing = HomingController::new(config);

        assert_eq!(homing.home(&mut motion), Ok(()));
        assert_eq!(homing.trace()[1], HomingPhase::PreSeek);
        assert_eq!(engine.positions(), [0.0; 3]);
    }

    #[test]
    fn test_home_fails_without_contact() {
        let engine = engine();
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, Bed::new()));
        let config = HomingConfig {
            seek_up_mm: 5.0,
            ..HomingConfig::DEFAULT
        };
        let mut homing = HomingController::new(config);

        assert_eq!(homing.home(&mut motion), Err(HomingError::CoarseSeekFailed));
        assert!(engine.fault().is_set());
        assert_eq!(homing.phase(), HomingPhase::Faulted);
        assert_eq!(engine.get_position(Axis::Y), -5.0);

        // Faulted is left only through reset
        assert_eq!(homing.home(&mut motion), Err(HomingError::Faulted));
    }

    #[test]
    fn test_calibrate_applies_offset() {
        let engine = engine();
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed()));
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        assert_eq!(homing.calibrate(&mut motion, Axis::Y, 0.4), Ok(()));

        assert_eq!(engine.get_position(Axis::Y), 0.0);
        assert!(!engine.limits().is_hit(Axis::Y));
        assert_eq!(homing.phase(), HomingPhase::Done);

        // 0.4 mm of extra travel relative to the reference axis
        let bed = motion.waiter_mut().bed();
        assert_eq!(bed.physical(Axis::Y) - bed.physical(Axis::X), 320);
        assert_eq!(bed.physical(Axis::Y), CONTACT + 80 + 320);
    }

    #[test]
    fn test_calibrate_reference_axis_homes() {
        let engine = engine();
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed()));
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        assert_eq!(homing.calibrate(&mut motion, Axis::X, 0.4), Ok(()));
        assert_eq!(engine.positions(), [0.0; 3]);
        assert_eq!(homing.trace()[2], HomingPhase::Retract);
    }

    #[test]
    fn test_calibrate_fine_seek_failure_restores_axis() {
        let engine = engine();
        let bed = Bed::new()
            .with_contact(Axis::X, CONTACT)
            .with_contact(Axis::Z, CONTACT);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed));
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        engine.override_position(Axis::Y, 0.0);
        assert_eq!(
            homing.calibrate(&mut motion, Axis::Y, 0.0),
            Err(HomingError::FineSeekFailed)
        );

        assert!(engine.fault().is_set());
        assert_eq!(homing.phase(), HomingPhase::Faulted);
        assert_eq!(engine.position_steps(Axis::Y), 0);
        assert_eq!(motion.waiter_mut().bed().physical(Axis::Y), 0);
    }

    #[test]
    fn test_stuck_sensor_fails_detach() {
        let engine = engine();
        let bed = bed().with_stuck(Axis::X);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed));
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        assert_eq!(homing.home(&mut motion), Err(HomingError::DetachFailed));
        assert_eq!(homing.detach_passes(), 3);
        assert!(engine.fault().is_set());

        let bed = motion.waiter_mut().bed();
        assert_eq!(bed.physical(Axis::X), CONTACT + 3 * 80);
    }

    #[test]
    fn test_standalone_detach_does_not_fault() {
        let engine = engine();
        let bed = bed().with_stuck(Axis::Z);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed));
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        // Press Z onto its sensor first
        motion.move_modal_axis(Axis::Z, -2.0, 1.0).unwrap_err();
        assert!(engine.limits().is_hit(Axis::Z));

        assert_eq!(
            homing.detach(&mut motion, Scope::Single(Axis::Z)),
            Err(HomingError::DetachFailed)
        );
        assert!(!engine.fault().is_set());
        assert_eq!(homing.phase(), HomingPhase::Idle);
    }

    #[test]
    fn test_standalone_detach_single_axis() {
        let engine = engine();
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed()));
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        motion.move_modal_axis(Axis::Y, -2.0, 1.0).unwrap_err();
        assert_eq!(homing.detach(&mut motion, Scope::Single(Axis::Y)), Ok(1));
        assert_eq!(engine.position_steps(Axis::Y), CONTACT + 80);
        assert_eq!(engine.position_steps(Axis::X), 0);
        assert!(engine.limits().sticky().is_empty());
    }

    #[test]
    fn test_abort_mid_seek() {
        let engine = engine();
        let waiter = SimWaiter::new(&engine, bed()).raise_fault_after(1_000);
        let mut motion = Motion::new(&engine, waiter);
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        assert_eq!(homing.home(&mut motion), Err(HomingError::Aborted));
        assert_eq!(homing.phase(), HomingPhase::Faulted);
        assert_eq!(
            homing.trace(),
            &[HomingPhase::Idle, HomingPhase::CoarseSeek, HomingPhase::Faulted]
        );
    }

    #[test]
    fn test_reset_allows_rehoming() {
        let engine = engine();
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed()));
        let mut homing = HomingController::new(HomingConfig {
            seek_up_mm: 1.0,
            ..HomingConfig::DEFAULT
        });

        assert!(homing.home(&mut motion).is_err());
        engine.reset();
        homing.reset();

        let mut homing = HomingController::new(HomingConfig::DEFAULT);
        assert_eq!(homing.home(&mut motion), Ok(()));
    }

    #[test]
    fn test_refuses_external_mode() {
        let engine = engine();
        engine.set_external_mode(true);
        let mut motion = Motion::new(&engine, SimWaiter::new(&engine, bed()));
        let mut homing = HomingController::new(HomingConfig::DEFAULT);

        assert_eq!(homing.home(&mut motion), Err(HomingError::ExternalMode));
        assert_eq!(homing.phase(), HomingPhase::Idle);
        assert!(!engine.fault().is_set());
    }
}
