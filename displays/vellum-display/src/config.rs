//! Renderer configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rotation::Rotation;

/// Start-up settings applied by [`Renderer::with_config`](crate::Renderer::with_config)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RendererConfig {
    /// Initial rotation
    pub rotation: Rotation,
    /// Start with inverted colors
    pub inverted: bool,
}

impl RendererConfig {
    /// Configuration with a given rotation and normal colors
    pub const fn rotated(rotation: Rotation) -> Self {
        Self {
            rotation,
            inverted: false,
        }
    }
}
