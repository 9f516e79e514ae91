//! Persistent storage for the machine config override and axis offsets

/// Stored item, encoded as a single byte on flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Machine configuration override (binary postcard format)
    MachineConfig = 0,
    /// Per-axis calibration offsets (binary postcard format)
    AxisOffsets = 1,
}

impl StorageKey {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::MachineConfig),
            1 => Some(StorageKey::AxisOffsets),
            _ => None,
        }
    }
}

/// Storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The map layer reported an error it does not classify
    Storage,
    /// Nothing stored under the key
    NotFound,
    /// The value does not fit the caller's buffer or the item limit
    BufferTooSmall,
    /// The partition failed its consistency checks
    Corrupted,
    /// No room left after garbage collection
    Full,
}

/// Keyed persistent storage
///
/// Each key holds at most one value; a write replaces the previous one.
pub trait FlashStorage {
    /// Copy the value stored under `key` into `buffer`, returning its length
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Replace the value stored under `key`
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "sequential-storage")]
    fn test_key_encoding() {
        use sequential_storage::map::{Key, SerializationError};

        let mut buffer = [0xFFu8; 4];
        assert!(matches!(
            StorageKey::AxisOffsets.serialize_into(&mut buffer),
            Ok(1)
        ));
        assert_eq!(buffer[0], 1);
        assert!(matches!(
            StorageKey::deserialize_from(&buffer),
            Ok((StorageKey::AxisOffsets, 1))
        ));

        assert!(matches!(
            StorageKey::MachineConfig.serialize_into(&mut []),
            Err(SerializationError::BufferTooSmall)
        ));
        assert!(matches!(
            StorageKey::deserialize_from(&[7]),
            Err(SerializationError::InvalidFormat)
        ));
    }

    #[test]
    fn test_key_byte_mapping() {
        for key in [StorageKey::MachineConfig, StorageKey::AxisOffsets] {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(StorageKey::from_u8(2), None);
    }
}
