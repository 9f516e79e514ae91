//! Busy-wait support for the blocking move primitives
//!
//! The orchestrator polls the engine from the main context while the tick
//! interrupt does the stepping. [`Waiter`] is what it does between polls.

use embedded_hal::delay::DelayNs;

/// Relax and delay hooks of a busy-wait loop
pub trait Waiter {
    /// Called once per poll iteration
    fn spin(&mut self);

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// [`Waiter`] built on any blocking `embedded-hal` delay
pub struct SpinDelay<D> {
    delay: D,
    spin_us: u32,
}

impl<D: DelayNs> SpinDelay<D> {
    /// Relax for `spin_us` microseconds per poll
    pub const fn new(delay: D, spin_us: u32) -> Self {
        Self { delay, spin_us }
    }
}

impl<D: DelayNs> Waiter for SpinDelay<D> {
    fn spin(&mut self) {
        if self.spin_us > 0 {
            self.delay.delay_us(self.spin_us);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
