//! Scoped mode overrides
//!
//! Homing temporarily switches addressing and endstop handling. A
//! [`ScopedMode`] restores the previous setting when dropped, including on
//! early returns through `?`.

use super::engine::MotionEngine;

/// Engine mode that can be overridden for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Relative (true) or absolute (false) addressing
    Relative,
    /// Halt on latched limits (true) or ignore them (false)
    EnforceEndstops,
}

/// Restores a mode on drop
#[must_use = "the override ends when the guard is dropped"]
pub struct ScopedMode<'a> {
    engine: &'a MotionEngine,
    mode: Mode,
    previous: bool,
}

impl<'a> ScopedMode<'a> {
    pub(crate) fn new(engine: &'a MotionEngine, mode: Mode, value: bool) -> Self {
        let previous = engine.mode(mode);
        engine.set_mode(mode, value);
        Self {
            engine,
            mode,
            previous,
        }
    }
}

impl Drop for ScopedMode<'_> {
    fn drop(&mut self) {
        self.engine.set_mode(self.mode, self.previous);
    }
}
