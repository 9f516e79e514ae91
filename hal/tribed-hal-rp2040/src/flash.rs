//! RP2040 flash backend
//!
//! A sequential-storage map over the top 64KB of the 2MB QSPI flash.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use tribed_hal::flash::{FlashError, StorageKey};

pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
pub const PARTITION_SIZE: usize = 64 * 1024;

/// Largest stored item; the machine config override is the biggest
pub const MAX_ITEM_SIZE: usize = 512;

/// Byte range of the storage partition, excluded from the image by `memory.x`
pub const PARTITION: core::ops::Range<u32> =
    ((FLASH_SIZE - PARTITION_SIZE) as u32)..(FLASH_SIZE as u32);

/// Config and offset storage on the on-board flash
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    async fn fetch<'b>(
        &mut self,
        key: StorageKey,
        scratch: &'b mut [u8; MAX_ITEM_SIZE],
    ) -> Result<Option<&'b [u8]>, FlashError> {
        map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            PARTITION,
            &mut NoCache::new(),
            scratch,
            &key,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }
}

impl<'d> tribed_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut scratch = [0u8; MAX_ITEM_SIZE];

        match self.fetch(key, &mut scratch).await? {
            Some(data) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            None => Err(FlashError::NotFound),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if data.len() > MAX_ITEM_SIZE {
            return Err(FlashError::BufferTooSmall);
        }
        let mut scratch = [0u8; MAX_ITEM_SIZE];

        map::store_item(
            &mut self.flash,
            PARTITION,
            &mut NoCache::new(),
            &mut scratch,
            &key,
            &data,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => FlashError::Full,
            sequential_storage::Error::Corrupted { .. } => FlashError::Corrupted,
            _ => FlashError::Storage,
        })
    }
}
