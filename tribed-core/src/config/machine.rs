//! Complete machine configuration
//!
//! Built from `machine.toml` at compile time and optionally overridden
//! from flash.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ConfigError, HomingConfig, MotionConfig};
use crate::motion::{Axis, AXIS_COUNT};

/// Pin polarity of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IoConfig {
    /// Invert the direction line per axis
    pub dir_inverted: [bool; AXIS_COUNT],
    /// Driver enable line is active low
    pub enable_active_low: bool,
    /// Limit switch inputs read low when pressed
    pub limits_active_low: bool,
    /// External endstop output is driven low when active
    pub ext_endstop_active_low: bool,
    /// Abort input reads low when asserted
    pub abort_active_low: bool,
}

impl IoConfig {
    /// Polarity of the reference board
    pub const DEFAULT: Self = Self {
        dir_inverted: [false; AXIS_COUNT],
        enable_active_low: true,
        limits_active_low: true,
        ext_endstop_active_low: true,
        abort_active_low: true,
    };

    /// Whether the direction line of `axis` is inverted
    pub const fn dir_inverted(&self, axis: Axis) -> bool {
        self.dir_inverted[axis.index()]
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Motion, homing and pin configuration of one machine
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MachineConfig {
    pub motion: MotionConfig,
    pub homing: HomingConfig,
    pub io: IoConfig,
}

impl MachineConfig {
    pub const DEFAULT: Self = Self {
        motion: MotionConfig::DEFAULT,
        homing: HomingConfig::DEFAULT,
        io: IoConfig::DEFAULT,
    };

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.homing.validate()
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
