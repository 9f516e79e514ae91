//! Machine configuration loading
//!
//! Order of preference: a postcard-encoded override in flash, the
//! `machine.toml` encoded into the image by `build.rs`, the compiled
//! defaults.

use defmt::*;

use tribed_core::config::{ConfigError as ValidationError, MachineConfig};
use tribed_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use tribed_hal_rp2040::FlashStorageTrait;

/// `machine.toml` as validated and encoded at build time
static EMBEDDED_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/machine.bin"));

/// Maximum serialized config size
const MAX_CONFIG_SIZE: usize = 512;

/// Configuration loading errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Decoded values are out of range
    Invalid(ValidationError),
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

impl From<ValidationError> for ConfigError {
    fn from(e: ValidationError) -> Self {
        ConfigError::Invalid(e)
    }
}

/// Load the machine configuration, never failing
pub async fn load_machine_config(storage: &mut Rp2040FlashStorage<'_>) -> MachineConfig {
    match load_from_flash(storage).await {
        Ok(config) => {
            info!("Loaded machine config override from flash");
            log_config_summary(&config);
            return config;
        }
        Err(ConfigError::Flash(FlashError::NotFound)) => {
            debug!("No config override in flash, using embedded machine.toml");
        }
        Err(e) => {
            warn!("Failed to load config from flash: {:?}, using embedded", e);
        }
    }

    match decode(EMBEDDED_CONFIG) {
        Ok(config) => {
            log_config_summary(&config);
            config
        }
        Err(e) => {
            error!("Embedded config unusable: {:?}, using defaults", e);
            MachineConfig::DEFAULT
        }
    }
}

async fn load_from_flash(
    storage: &mut Rp2040FlashStorage<'_>,
) -> Result<MachineConfig, ConfigError> {
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let len = storage
        .read(StorageKey::MachineConfig, &mut buffer)
        .await?;

    debug!("Read {} bytes of config from flash", len);
    decode(&buffer[..len])
}

fn decode(bytes: &[u8]) -> Result<MachineConfig, ConfigError> {
    let config: MachineConfig =
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
    config.validate()?;
    Ok(config)
}

fn log_config_summary(config: &MachineConfig) {
    info!(
        "Motion: {} steps/mm, speed {}..{}, ramp {}, tick {}us",
        config.motion.steps_per_mm,
        config.motion.min_speed,
        config.motion.max_speed,
        config.motion.max_ramp,
        config.motion.tick_period_us
    );
    debug!(
        "Homing: seek {}mm, retract {}mm, {} detach passes",
        config.homing.seek_up_mm, config.homing.retract_mm, config.homing.detach_passes
    );
}
