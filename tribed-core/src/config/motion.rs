//! Motion engine configuration
//!
//! Speeds are expressed as accumulator increments per tick: a half-step is
//! emitted each time the accumulator crosses `accumulator_overflow`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::motion::{Axis, AxisMask};

/// Which latched limits stop which axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HaltScope {
    /// Any latched limit halts all three axes (the bed is mechanically coupled)
    #[default]
    Shared,
    /// Each axis only halts on its own latched limit
    PerAxis,
}

impl HaltScope {
    /// Check whether `axis` must hold still given the latched limits
    pub const fn halts(self, axis: Axis, sticky: AxisMask) -> bool {
        match self {
            HaltScope::Shared => sticky.any(),
            HaltScope::PerAxis => sticky.contains(axis),
        }
    }
}

/// Step generation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Driver steps per millimetre of lift (the engine counts half-steps)
    pub steps_per_mm: u32,
    /// Longest acceleration/deceleration zone, in half-steps
    pub max_ramp: u32,
    /// Speed safe for an abrupt start or stop
    pub min_speed: u32,
    /// Full speed, scaled by the per-move speed factor
    pub max_speed: u32,
    /// Accumulator value at which a half-step is taken
    pub accumulator_overflow: u32,
    /// Period of the step tick in microseconds
    pub tick_period_us: u32,
    /// Limit halt policy
    pub halt_scope: HaltScope,
}

impl MotionConfig {
    /// Defaults for a 400 steps/mm lead screw ticked at 31.25 kHz
    pub const DEFAULT: Self = Self {
        steps_per_mm: 400,
        max_ramp: 1024,
        min_speed: 30,
        max_speed: 140,
        accumulator_overflow: 256,
        tick_period_us: 32,
        halt_scope: HaltScope::Shared,
    };

    /// Half-steps (step line edges) per millimetre
    pub const fn half_steps_per_mm(&self) -> u32 {
        self.steps_per_mm * 2
    }

    /// Tick rate in Hz
    pub const fn tick_hz(&self) -> u32 {
        1_000_000 / self.tick_period_us
    }

    /// Convert millimetres to the nearest half-step count
    pub fn mm_to_half_steps(&self, mm: f32) -> i32 {
        let steps = mm * self.half_steps_per_mm() as f32;
        let rounded = if steps >= 0.0 { steps + 0.5 } else { steps - 0.5 };
        // float-to-int casts saturate and map NaN to 0
        rounded as i32
    }

    /// Convert half-steps to millimetres
    pub fn half_steps_to_mm(&self, half_steps: i32) -> f32 {
        half_steps as f32 / self.half_steps_per_mm() as f32
    }

    /// Check the parameters for values the tick cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_mm == 0 {
            return Err(ConfigError::ZeroStepsPerMm);
        }
        if self.accumulator_overflow == 0 {
            return Err(ConfigError::ZeroOverflow);
        }
        if self.max_ramp == 0 {
            return Err(ConfigError::ZeroRamp);
        }
        if self.min_speed > self.max_speed {
            return Err(ConfigError::SpeedOrder);
        }
        if self.tick_period_us == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        Ok(())
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
