//! Physical display device trait
//!
//! Defines the interface the renderer flushes into. Implementations handle
//! the bus transfer (SPI, I2C, parallel) for a specific controller.

use core::fmt;

use crate::rotation::Rotation;

/// Display device errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Canvas buffer does not match the device dimensions
    BufferMismatch,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Communication => f.write_str("display communication failed"),
            DisplayError::BufferMismatch => f.write_str("pixel buffer size mismatch"),
        }
    }
}

/// Physical display device
///
/// Width and height always describe the current orientation, so they swap
/// when the rotation changes between portrait and landscape.
pub trait Device {
    /// Width in pixels for the current rotation
    fn width(&self) -> u16;

    /// Height in pixels for the current rotation
    fn height(&self) -> u16;

    /// Current rotation
    fn rotation(&self) -> Rotation;

    /// Change the rotation
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError>;

    /// Invert (or restore) the display colors in hardware
    fn invert_display(&mut self, invert: bool) -> Result<(), DisplayError>;

    /// Transfer a row-major RGB565 bitmap with its top-left corner at (x, y)
    ///
    /// `pixels` holds `width * height` raw 16-bit color values.
    fn blit(
        &mut self,
        x: i16,
        y: i16,
        pixels: &[u16],
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError>;
}

impl<D: Device + ?Sized> Device for &mut D {
    fn width(&self) -> u16 {
        (**self).width()
    }

    fn height(&self) -> u16 {
        (**self).height()
    }

    fn rotation(&self) -> Rotation {
        (**self).rotation()
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        (**self).set_rotation(rotation)
    }

    fn invert_display(&mut self, invert: bool) -> Result<(), DisplayError> {
        (**self).invert_display(invert)
    }

    fn blit(
        &mut self,
        x: i16,
        y: i16,
        pixels: &[u16],
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError> {
        (**self).blit(x, y, pixels, width, height)
    }
}
