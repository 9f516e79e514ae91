//! RP2040-specific HAL for the bed-leveling firmware
//!
//! Implements the shared `tribed-hal` traits on RP2040 peripherals:
//!
//! - Flash storage driver (implements `tribed_hal::FlashStorage`)

#![no_std]

pub mod flash;

// Re-export shared traits from tribed-hal for convenience
pub use tribed_hal::{FlashStorage as FlashStorageTrait, StorageKey};
