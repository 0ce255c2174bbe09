//! Double-buffered drawing surface for small displays
//!
//! This crate provides:
//! - `Surface` trait: the drawing-primitive capability set (pixels, lines,
//!   rectangles, text) shared by canvases and the renderer
//! - `Canvas` trait and the `Canvas16` RGB565 off-screen buffer
//! - `Device` trait for the physical panel (rotation, inversion, bitmap blit)
//! - `Renderer`: forwards every primitive to its canvas and flushes the
//!   canvas to the device when a write transaction ends
//!
//! # Architecture
//!
//! ```text
//! layer code ──► Renderer ──► Canvas16 (off-screen, owned)
//!                   │
//!                   └── end_write / update ──► Device::blit
//! ```
//!
//! The renderer also implements `embedded_graphics::draw_target::DrawTarget`,
//! so any `embedded-graphics` drawable can be rendered through it.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod log;

pub mod canvas;
pub mod config;
pub mod device;
pub mod renderer;
pub mod rotation;
pub mod surface;

// Re-export key types
pub use canvas::{Canvas, Canvas16};
pub use config::RendererConfig;
pub use device::{Device, DisplayError};
pub use renderer::Renderer;
pub use rotation::Rotation;
pub use surface::{Surface, TextState, DEFAULT_FONT};
