//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware stores them as
//! postcard binary data and builds its defaults from `machine.toml`.

pub mod homing;
pub mod machine;
pub mod motion;
pub mod offsets;

pub use homing::HomingConfig;
pub use machine::{IoConfig, MachineConfig};
pub use motion::{HaltScope, MotionConfig};
pub use offsets::{AxisOffsets, OFFSETS_MAGIC, OFFSETS_VERSION};

/// Configuration validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `steps_per_mm` must be non-zero
    ZeroStepsPerMm,
    /// Accumulator overflow threshold must be non-zero
    ZeroOverflow,
    /// Ramp length must be non-zero
    ZeroRamp,
    /// Minimum speed exceeds maximum speed
    SpeedOrder,
    /// Tick period must be non-zero
    ZeroTickPeriod,
    /// A speed factor is zero, negative or not finite
    InvalidSpeed,
    /// A travel distance is zero, negative or not finite
    InvalidDistance,
    /// Detach needs at least one pass
    ZeroDetachPasses,
}
