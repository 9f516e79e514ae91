//! Persisted per-axis calibration offsets
//!
//! Offsets are applied as a corrective move at the end of an axis
//! calibration. They are stored in micrometres so the CRC does not depend
//! on float formatting.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::{Axis, AXIS_COUNT};

/// Magic number to identify valid offset data
pub const OFFSETS_MAGIC: u32 = 0x4F465354; // "OFST"

/// Current offset data version
pub const OFFSETS_VERSION: u8 = 1;

/// Offset table stored in flash
///
/// This struct is serialized to flash using postcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisOffsets {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Offset per axis in micrometres, positive lowers the axis
    pub offsets_um: [i32; AXIS_COUNT],
    /// CRC32 checksum (calculated over magic..offsets_um)
    pub crc: u32,
}

impl Default for AxisOffsets {
    fn default() -> Self {
        Self::new()
    }
}

impl AxisOffsets {
    /// All offsets zero, with a valid CRC
    pub const fn new() -> Self {
        Self {
            magic: OFFSETS_MAGIC,
            version: OFFSETS_VERSION,
            offsets_um: [0; AXIS_COUNT],
            crc: 0,
        }
        .with_crc()
    }

    /// Build a table from millimetre values
    pub fn from_mm(offsets_mm: [f32; AXIS_COUNT]) -> Self {
        let mut offsets = Self::new();
        for axis in Axis::ALL {
            offsets.offsets_um[axis.index()] = mm_to_um(offsets_mm[axis.index()]);
        }
        offsets.update_crc();
        offsets
    }

    /// Check if the header matches (magic and version)
    pub fn is_valid(&self) -> bool {
        self.magic == OFFSETS_MAGIC && self.version == OFFSETS_VERSION
    }

    /// Offset of one axis in millimetres
    pub fn get(&self, axis: Axis) -> f32 {
        self.offsets_um[axis.index()] as f32 / 1000.0
    }

    /// Set the offset of one axis and refresh the CRC
    pub fn set(&mut self, axis: Axis, offset_mm: f32) {
        self.offsets_um[axis.index()] = mm_to_um(offset_mm);
        self.update_crc();
    }

    /// All offsets in millimetres, indexed by axis
    pub fn to_mm(&self) -> [f32; AXIS_COUNT] {
        Axis::ALL.map(|axis| self.get(axis))
    }

    /// Calculate CRC32 of the data (excluding the crc field)
    pub const fn calculate_crc(&self) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        let mut i = 0;
        while i < AXIS_COUNT {
            crc = crc32_update(crc, &self.offsets_um[i].to_le_bytes());
            i += 1;
        }
        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    const fn with_crc(mut self) -> Self {
        self.crc = self.calculate_crc();
        self
    }
}

fn mm_to_um(mm: f32) -> i32 {
    let um = mm * 1000.0;
    let rounded = if um >= 0.0 { um + 0.5 } else { um - 0.5 };
    rounded as i32
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
const fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;
    let mut i = 0;

    while i < data.len() {
        crc ^= data[i] as u32;
        let mut bit = 0;
        while bit < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        i += 1;
    }

    crc
}
