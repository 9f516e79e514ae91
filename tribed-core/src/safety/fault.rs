//! Global emergency-stop flag

use portable_atomic::{AtomicBool, Ordering};

/// Emergency stop latch
///
/// Goes from idle to set only. Every busy-wait and the step tick check it;
/// the controller's reset path is the only place that clears it.
#[derive(Debug)]
pub struct HardFault(AtomicBool);

impl Default for HardFault {
    fn default() -> Self {
        Self::new()
    }
}

impl HardFault {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Stop all motion. Safe to call from any context.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True once raised
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_and_clear() {
        let fault = HardFault::new();
        assert!(!fault.is_set());

        fault.raise();
        fault.raise();
        assert!(fault.is_set());

        fault.clear();
        assert!(!fault.is_set());
    }
}
