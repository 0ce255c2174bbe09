//! Double-buffered renderer
//!
//! Every drawing primitive lands in an owned off-screen canvas; the device
//! is only touched when the canvas is flushed. A flush happens on
//! [`Renderer::update`] and at the end of every write transaction.
//!
//! The canvas is never rotated in place: rotating a buffer that already holds
//! a rendered frame corrupts the output, so a rotation change discards the
//! canvas and allocates a fresh one at the new dimensions.

use core::convert::Infallible;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::canvas::Canvas;
use crate::config::RendererConfig;
use crate::device::{Device, DisplayError};
use crate::rotation::Rotation;
use crate::surface::{Surface, TextState};

/// Drawing surface that buffers into a canvas and flushes to a device
pub struct Renderer<D, C> {
    device: D,
    canvas: C,
    rotation: Rotation,
    width: u16,
    height: u16,
    transaction: bool,
    /// Mirror of the canvas text attributes
    text: TextState,
}

impl<D: Device, C: Canvas> Renderer<D, C> {
    /// Bind a renderer to a device, allocating a canvas of the device's size
    pub fn new(device: D) -> Self {
        let (width, height) = (device.width(), device.height());
        let rotation = device.rotation();
        info!("Renderer init {}x{} (rotation {})", width, height, rotation.index());

        Self {
            device,
            canvas: C::with_size(width, height),
            rotation,
            width,
            height,
            transaction: false,
            text: TextState::new(),
        }
    }

    /// Bind a renderer and apply start-up settings
    pub fn with_config(device: D, config: RendererConfig) -> Result<Self, DisplayError> {
        let mut renderer = Self::new(device);
        if config.rotation != renderer.rotation {
            renderer.set_rotation(config.rotation)?;
        }
        if config.inverted {
            renderer.invert_display(true)?;
        }
        Ok(renderer)
    }

    /// Flush the canvas to the device
    ///
    /// Re-applies the tracked rotation first if the device has drifted from it.
    /// Fails with [`DisplayError::BufferMismatch`] without touching the device
    /// if the canvas no longer matches the device dimensions.
    pub fn update(&mut self) -> Result<(), DisplayError> {
        if self.device.rotation() != self.rotation {
            warn!(
                "Device rotation {} differs from renderer {}, restoring",
                self.device.rotation().index(),
                self.rotation.index()
            );
            self.device.set_rotation(self.rotation)?;
        }

        let pixels = self.canvas.buffer();
        let expected = usize::from(self.width) * usize::from(self.height);
        if pixels.len() != expected
            || (self.device.width(), self.device.height()) != (self.width, self.height)
        {
            warn!(
                "Canvas holds {} pixels, device expects {}x{}",
                pixels.len(),
                self.device.width(),
                self.device.height()
            );
            return Err(DisplayError::BufferMismatch);
        }

        trace!("Flushing {}x{} canvas", self.width, self.height);
        self.device.blit(0, 0, pixels, self.width, self.height)
    }

    /// Whether a write transaction is open
    pub fn in_transaction(&self) -> bool {
        self.transaction
    }

    /// The off-screen canvas
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// The bound device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the bound device
    ///
    /// Changing the device rotation through this handle does not resize the
    /// canvas; the next flush restores the renderer's rotation.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Unbind and return the device
    pub fn release(self) -> D {
        self.device
    }
}

impl<D: Device, C: Canvas> Surface for Renderer<D, C> {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        self.device.set_rotation(rotation)?;
        self.rotation = rotation;
        self.width = self.device.width();
        self.height = self.device.height();

        // Anything drawn but not yet flushed is lost here
        self.canvas = C::with_size(self.width, self.height);
        *self.canvas.text_mut() = self.text;

        info!(
            "Rotation {} -> canvas {}x{}",
            rotation.index(),
            self.width,
            self.height
        );
        Ok(())
    }

    fn invert_display(&mut self, invert: bool) -> Result<(), DisplayError> {
        self.device.invert_display(invert)
    }

    fn draw_pixel(&mut self, x: i16, y: i16, color: Rgb565) {
        self.canvas.draw_pixel(x, y, color);
    }

    fn draw_fast_hline(&mut self, x: i16, y: i16, w: i16, color: Rgb565) {
        self.canvas.draw_fast_hline(x, y, w, color);
    }

    fn draw_fast_vline(&mut self, x: i16, y: i16, h: i16, color: Rgb565) {
        self.canvas.draw_fast_vline(x, y, h, color);
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: Rgb565) {
        self.canvas.fill_rect(x, y, w, h, color);
    }

    fn draw_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: Rgb565) {
        self.canvas.draw_rect(x, y, w, h, color);
    }

    fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, color: Rgb565) {
        self.canvas.draw_line(x0, y0, x1, y1, color);
    }

    fn fill_screen(&mut self, color: Rgb565) {
        self.canvas.fill_screen(color);
    }

    fn start_write(&mut self) {
        self.transaction = true;
    }

    fn end_write(&mut self) -> Result<(), DisplayError> {
        self.transaction = false;
        self.update()
    }

    fn write_pixel(&mut self, x: i16, y: i16, color: Rgb565) {
        self.canvas.write_pixel(x, y, color);
    }

    fn write_fast_hline(&mut self, x: i16, y: i16, w: i16, color: Rgb565) {
        self.canvas.write_fast_hline(x, y, w, color);
    }

    fn write_fast_vline(&mut self, x: i16, y: i16, h: i16, color: Rgb565) {
        self.canvas.write_fast_vline(x, y, h, color);
    }

    fn write_fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: Rgb565) {
        self.canvas.write_fill_rect(x, y, w, h, color);
    }

    fn write_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, color: Rgb565) {
        self.canvas.write_line(x0, y0, x1, y1, color);
    }

    fn text(&self) -> &TextState {
        &self.text
    }

    /// The renderer's own copy of the text attributes
    ///
    /// Edits made here do not reach the canvas; use the `set_*` methods.
    fn text_mut(&mut self) -> &mut TextState {
        &mut self.text
    }

    fn write(&mut self, byte: u8) -> usize {
        let written = self.canvas.write(byte);
        self.text.cursor = self.canvas.cursor();
        written
    }

    // Text setters must reach both the canvas, which renders, and the
    // renderer's own state, which callers inspect.

    fn set_cursor(&mut self, x: i16, y: i16) {
        self.canvas.set_cursor(x, y);
        self.text.set_cursor(x, y);
    }

    fn set_text_color(&mut self, color: Rgb565) {
        self.canvas.set_text_color(color);
        self.text.set_color(color);
    }

    fn set_text_color_bg(&mut self, color: Rgb565, background: Rgb565) {
        self.canvas.set_text_color_bg(color, background);
        self.text.set_color_bg(color, background);
    }

    fn set_text_size(&mut self, size: u8) {
        self.canvas.set_text_size(size);
        self.text.set_size(size, size);
    }

    fn set_text_size_xy(&mut self, size_x: u8, size_y: u8) {
        self.canvas.set_text_size_xy(size_x, size_y);
        self.text.set_size(size_x, size_y);
    }

    fn set_font(&mut self, font: Option<&'static MonoFont<'static>>) {
        self.canvas.set_font(font);
        self.text.font = font;
    }

    fn set_text_wrap(&mut self, wrap: bool) {
        self.canvas.set_text_wrap(wrap);
        self.text.wrap = wrap;
    }
}

impl<D: Device, C: Canvas> OriginDimensions for Renderer<D, C> {
    fn size(&self) -> Size {
        Size::new(self.width.into(), self.height.into())
    }
}

impl<D: Device, C: Canvas> DrawTarget for Renderer<D, C> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.canvas.draw_iter(pixels)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.canvas.fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.canvas.fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.canvas.clear(color)
    }
}
