//! Axis identifiers and per-axis bitmasks

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of lift points under the bed
pub const AXIS_COUNT: usize = 3;

/// One of the three vertical lift points of the bed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Axis {
    /// Reference lift point (homing defines its zero)
    X = 0,
    /// Second lift point
    Y = 1,
    /// Third lift point
    Z = 2,
}

impl Axis {
    /// All axes in index order
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::X, Axis::Y, Axis::Z];

    /// Axis every other axis is reconciled against during calibration
    pub const REFERENCE: Axis = Axis::X;

    /// Index into per-axis arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit of this axis in an [`AxisMask`]
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Look up an axis by index, `None` outside 0..=2
    pub const fn from_index(index: u8) -> Option<Axis> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }
}

/// Axis index outside the 0..=2 range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidAxis(pub u8);

impl TryFrom<u8> for Axis {
    type Error = InvalidAxis;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Axis::from_index(index).ok_or(InvalidAxis(index))
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Set of axes packed into the low three bits of a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisMask(u8);

impl AxisMask {
    const VALID_BITS: u8 = 0b111;

    /// No axis
    pub const EMPTY: AxisMask = AxisMask(0);
    /// Every axis
    pub const ALL: AxisMask = AxisMask(Self::VALID_BITS);

    /// Build a mask from raw bits, ignoring bits above axis 2
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::VALID_BITS)
    }

    /// Mask holding a single axis
    pub const fn single(axis: Axis) -> Self {
        Self(axis.bit())
    }

    /// Raw bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no axis is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when at least one axis is set
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    /// Check whether `axis` is in the mask
    pub const fn contains(self, axis: Axis) -> bool {
        self.0 & axis.bit() != 0
    }

    /// True when the two masks share an axis
    pub const fn intersects(self, other: AxisMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Add an axis
    pub fn insert(&mut self, axis: Axis) {
        self.0 |= axis.bit();
    }

    /// Remove an axis
    pub fn remove(&mut self, axis: Axis) {
        self.0 &= !axis.bit();
    }

    /// Union of both masks
    pub const fn union(self, other: AxisMask) -> Self {
        Self(self.0 | other.0)
    }

    /// Axes set in this mask, in index order
    pub fn iter(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}

impl From<Axis> for AxisMask {
    fn from(axis: Axis) -> Self {
        AxisMask::single(axis)
    }
}

impl core::ops::BitOr for AxisMask {
    type Output = AxisMask;

    fn bitor(self, rhs: AxisMask) -> AxisMask {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_try_from() {
        assert_eq!(Axis::try_from(0), Ok(Axis::X));
        assert_eq!(Axis::try_from(1), Ok(Axis::Y));
        assert_eq!(Axis::try_from(2), Ok(Axis::Z));
        assert_eq!(Axis::try_from(3), Err(InvalidAxis(3)));
        assert_eq!(Axis::try_from(255), Err(InvalidAxis(255)));
    }

    #[test]
    fn test_axis_index_and_bit() {
        for (i, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
            assert_eq!(axis.bit(), 1 << i);
        }
    }

    #[test]
    fn test_mask_ops() {
        let mut mask = AxisMask::EMPTY;
        assert!(mask.is_empty());

        mask.insert(Axis::Y);
        assert!(mask.contains(Axis::Y));
        assert!(!mask.contains(Axis::X));
        assert_eq!(mask.bits(), 0b010);

        mask.insert(Axis::Z);
        mask.remove(Axis::Y);
        assert_eq!(mask, AxisMask::single(Axis::Z));
        assert!(mask.intersects(AxisMask::ALL));
        assert!(!mask.intersects(AxisMask::single(Axis::X)));
    }

    #[test]
    fn test_mask_ignores_stray_bits() {
        assert_eq!(AxisMask::from_bits(0xFF), AxisMask::ALL);
        assert_eq!(AxisMask::from_bits(0b1000), AxisMask::EMPTY);
    }

    #[test]
    fn test_mask_iter_order() {
        let mask = AxisMask::single(Axis::Z) | AxisMask::single(Axis::X);
        let mut it = mask.iter();
        assert_eq!(it.next(), Some(Axis::X));
        assert_eq!(it.next(), Some(Axis::Z));
        assert_eq!(it.next(), None);
    }
}
