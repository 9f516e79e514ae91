//! Axis offset persistence
//!
//! The controller runs blocking in thread mode, so [`FlashOffsetStore`]
//! drives the async flash calls to completion in place and hands the
//! result straight back.

use defmt::*;
use embassy_futures::block_on;

use tribed_core::config::AxisOffsets;
use tribed_core::motion::AXIS_COUNT;
use tribed_core::traits::OffsetStore;
use tribed_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use tribed_hal_rp2040::FlashStorageTrait;

/// Maximum serialized offsets size
const MAX_OFFSETS_SIZE: usize = 64;

/// Offset persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OffsetsError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
}

impl From<FlashError> for OffsetsError {
    fn from(e: FlashError) -> Self {
        OffsetsError::Flash(e)
    }
}

/// Load the stored axis offsets
async fn load_offsets(
    storage: &mut Rp2040FlashStorage<'_>,
) -> Result<AxisOffsets, OffsetsError> {
    let mut buffer = [0u8; MAX_OFFSETS_SIZE];
    let len = storage.read(StorageKey::AxisOffsets, &mut buffer).await?;

    debug!("Read {} bytes of offsets from flash", len);

    let offsets: AxisOffsets =
        postcard::from_bytes(&buffer[..len]).map_err(|_| OffsetsError::Deserialize)?;

    if !offsets.is_valid() {
        return Err(OffsetsError::InvalidFormat);
    }

    if !offsets.verify_crc() {
        warn!("Axis offsets CRC mismatch");
        return Err(OffsetsError::CrcMismatch);
    }

    Ok(offsets)
}

/// Save axis offsets, refreshing the CRC first
async fn save_offsets(
    storage: &mut Rp2040FlashStorage<'_>,
    offsets: &mut AxisOffsets,
) -> Result<(), OffsetsError> {
    offsets.update_crc();

    let mut buffer = [0u8; MAX_OFFSETS_SIZE];
    let bytes = postcard::to_slice(offsets, &mut buffer).map_err(|_| OffsetsError::Serialize)?;

    storage.write(StorageKey::AxisOffsets, bytes).await?;

    info!("Saved axis offsets ({} bytes)", bytes.len());
    Ok(())
}

/// [`OffsetStore`] for the controller, backed by the config partition
pub struct FlashOffsetStore {
    storage: Rp2040FlashStorage<'static>,
}

impl FlashOffsetStore {
    pub fn new(storage: Rp2040FlashStorage<'static>) -> Self {
        Self { storage }
    }
}

impl OffsetStore for FlashOffsetStore {
    type Error = OffsetsError;

    fn load_axis_offsets(&mut self) -> Result<[f32; AXIS_COUNT], OffsetsError> {
        match block_on(load_offsets(&mut self.storage)) {
            Ok(offsets) => {
                info!("Loaded axis offsets: {:?}", offsets.to_mm());
                Ok(offsets.to_mm())
            }
            Err(e) => {
                warn!("No usable axis offsets ({:?}), using zero", e);
                Err(e)
            }
        }
    }

    fn save_axis_offsets(&mut self, offsets: [f32; AXIS_COUNT]) -> Result<(), OffsetsError> {
        let mut offsets = AxisOffsets::from_mm(offsets);
        block_on(save_offsets(&mut self.storage, &mut offsets)).inspect_err(|e| {
            error!("Failed to save axis offsets: {:?}", e);
        })
    }
}
