//! Homing and calibration configuration
//!
//! Distances are millimetres, speeds are fractions of the motion
//! `max_speed` and delays are milliseconds.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Parameters of the homing and per-axis calibration procedures
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HomingConfig {
    /// Maximum upward travel while looking for the sensors
    pub seek_up_mm: f32,
    /// Speed factor of the coarse seek
    pub coarse_speed: f32,
    /// Speed factor of the fine seek
    pub fine_speed: f32,
    /// Distance backed off after the coarse seek
    pub retract_mm: f32,
    /// Speed factor of the retract move
    pub retract_speed: f32,
    /// Sensor settling time after a retract
    pub settle_ms: u32,
    /// Travel past the coarse contact point allowed during the fine seek
    pub overshoot_mm: f32,
    /// Distance lowered per detach pass
    pub detach_mm: f32,
    /// Speed factor of a detach pass
    pub detach_speed: f32,
    /// Maximum number of detach passes
    pub detach_passes: u8,
    /// Sensor settling time after each detach pass
    pub detach_settle_ms: u32,
    /// Lower the bed before seeking in case it starts on the sensors
    pub safe_pre_seek: bool,
    /// Distance of the safe pre-seek
    pub pre_seek_mm: f32,
    /// Settling time after the final origin is set
    pub origin_settle_ms: u32,
    /// Speed factor of the calibration offset move
    pub offset_speed: f32,
}

impl HomingConfig {
    /// Defaults tuned for pressure sensors under a 400 steps/mm lift
    pub const DEFAULT: Self = Self {
        seek_up_mm: 400.0,
        coarse_speed: 0.4,
        fine_speed: 0.1,
        retract_mm: 1.0,
        retract_speed: 0.8,
        settle_ms: 400,
        overshoot_mm: 1.0,
        detach_mm: 0.1,
        detach_speed: 0.1,
        detach_passes: 3,
        detach_settle_ms: 100,
        safe_pre_seek: false,
        pre_seek_mm: 2.0,
        origin_settle_ms: 50,
        offset_speed: 0.1,
    };

    /// Total upward travel of the fine seek
    pub fn fine_seek_mm(&self) -> f32 {
        self.retract_mm + self.overshoot_mm
    }

    /// Check for speeds and distances the procedures cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        let speeds = [
            self.coarse_speed,
            self.fine_speed,
            self.retract_speed,
            self.detach_speed,
            self.offset_speed,
        ];
        if speeds.iter().any(|s| !positive(*s)) {
            return Err(ConfigError::InvalidSpeed);
        }

        let distances = [
            self.seek_up_mm,
            self.retract_mm,
            self.overshoot_mm,
            self.detach_mm,
            self.pre_seek_mm,
        ];
        if distances.iter().any(|d| !positive(*d)) {
            return Err(ConfigError::InvalidDistance);
        }

        if self.detach_passes == 0 {
            return Err(ConfigError::ZeroDetachPasses);
        }
        Ok(())
    }
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(HomingConfig::default().validate(), Ok(()));
        assert_eq!(HomingConfig::DEFAULT.fine_seek_mm(), 2.0);
    }

    #[test]
    fn test_rejects_zero_speed() {
        let config = HomingConfig {
            fine_speed: 0.0,
            ..HomingConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpeed));
    }

    #[test]
    fn test_rejects_nan_distance() {
        let config = HomingConfig {
            retract_mm: f32::NAN,
            ..HomingConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidDistance));
    }

    #[test]
    fn test_rejects_zero_passes() {
        let config = HomingConfig {
            detach_passes: 0,
            ..HomingConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDetachPasses));
    }
}
