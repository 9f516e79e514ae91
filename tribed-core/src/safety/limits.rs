//! Sticky limit latch
//!
//! Pressure sensors only report contact for as long as they are pressed.
//! The monitor remembers every activation seen by the edge interrupt until
//! the main context explicitly clears it, so a brief contact cannot be
//! missed by a busy-wait that checks later.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::motion::{Axis, AxisMask};

/// Realtime and latched sensor state
#[derive(Debug)]
pub struct LimitMonitor {
    sticky: AtomicU8,
    realtime: AtomicU8,
    enabled: AtomicBool,
}

impl Default for LimitMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl LimitMonitor {
    /// Monitor with latching enabled and nothing latched
    pub const fn new() -> Self {
        Self {
            sticky: AtomicU8::new(0),
            realtime: AtomicU8::new(0),
            enabled: AtomicBool::new(true),
        }
    }

    /// Record a level change from the limit-edge interrupt
    ///
    /// `levels` holds the instantaneous per-axis contact state with the
    /// input polarity already applied. Returns the sticky mask after the
    /// update so the caller can mirror it onto an output.
    pub fn on_edge(&self, levels: AxisMask) -> AxisMask {
        self.realtime.store(levels.bits(), Ordering::Release);
        if self.enabled.load(Ordering::Acquire) && levels.any() {
            let prev = self.sticky.fetch_or(levels.bits(), Ordering::AcqRel);
            return AxisMask::from_bits(prev | levels.bits());
        }
        self.sticky()
    }

    /// Resume latching
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    /// Stop latching and forget what was latched
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
        self.sticky.store(0, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Levels seen at the last edge, without latching
    pub fn realtime(&self) -> AxisMask {
        AxisMask::from_bits(self.realtime.load(Ordering::Acquire))
    }

    /// Latched activations since the last clear
    pub fn sticky(&self) -> AxisMask {
        AxisMask::from_bits(self.sticky.load(Ordering::Acquire))
    }

    pub fn is_hit(&self, axis: Axis) -> bool {
        self.sticky().contains(axis)
    }

    /// Forget the latched activation of one axis
    pub fn clear(&self, axis: Axis) {
        self.sticky.fetch_and(!axis.bit(), Ordering::AcqRel);
    }

    /// Forget every latched activation
    pub fn clear_all(&self) {
        self.sticky.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_edge_latches() {
        let monitor = LimitMonitor::new();
        let sticky = monitor.on_edge(AxisMask::single(Axis::Y));
        assert_eq!(sticky, AxisMask::single(Axis::Y));

        // Sensor released: realtime drops, sticky stays
        let sticky = monitor.on_edge(AxisMask::EMPTY);
        assert_eq!(sticky, AxisMask::single(Axis::Y));
        assert!(monitor.realtime().is_empty());
        assert!(monitor.is_hit(Axis::Y));
        assert!(!monitor.is_hit(Axis::X));
    }

    #[test]
    fn test_disabled_does_not_latch() {
        let monitor = LimitMonitor::new();
        monitor.on_edge(AxisMask::single(Axis::X));
        monitor.disable();
        assert!(monitor.sticky().is_empty());

        monitor.on_edge(AxisMask::ALL);
        assert!(monitor.sticky().is_empty());
        assert_eq!(monitor.realtime(), AxisMask::ALL);

        monitor.enable();
        monitor.on_edge(AxisMask::single(Axis::Z));
        assert_eq!(monitor.sticky(), AxisMask::single(Axis::Z));
    }

    #[test]
    fn test_clear_single_axis() {
        let monitor = LimitMonitor::new();
        monitor.on_edge(AxisMask::ALL);
        monitor.clear(Axis::Y);
        assert_eq!(
            monitor.sticky(),
            AxisMask::single(Axis::X) | AxisMask::single(Axis::Z)
        );

        monitor.clear_all();
        assert!(monitor.sticky().is_empty());
    }

    proptest! {
        #[test]
        fn sticky_is_monotonic_between_clears(edges in proptest::collection::vec(0u8..8, 1..64)) {
            let monitor = LimitMonitor::new();
            let mut seen = AxisMask::EMPTY;

            for bits in edges {
                let before = monitor.sticky();
                let levels = AxisMask::from_bits(bits);
                let after = monitor.on_edge(levels);
                seen = seen | levels;

                prop_assert_eq!(after.bits() & before.bits(), before.bits());
                prop_assert_eq!(after, seen);
            }
        }
    }
}
