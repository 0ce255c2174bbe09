//! Display rotation

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Quarter-turn display rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rotation {
    /// Native orientation
    #[default]
    Deg0,
    /// 90° clockwise
    Deg90,
    /// 180°
    Deg180,
    /// 270° clockwise
    Deg270,
}

impl Rotation {
    /// Build a rotation from a controller-style index (only the low two bits count)
    pub const fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    /// Controller-style index (0-3)
    pub const fn index(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Whether width and height are swapped relative to the native orientation
    pub const fn is_transposed(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Logical (width, height) for a panel with the given native size
    pub const fn apply(self, native_width: u16, native_height: u16) -> (u16, u16) {
        if self.is_transposed() {
            (native_height, native_width)
        } else {
            (native_width, native_height)
        }
    }
}
