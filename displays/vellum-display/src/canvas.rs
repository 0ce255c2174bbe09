//! Off-screen canvas
//!
//! The renderer draws everything into a canvas and blits the finished buffer
//! to the device. [`Canvas16`] keeps one raw RGB565 value per pixel, row-major,
//! which is the layout [`Device::blit`](crate::Device::blit) expects.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PointsIter, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::device::DisplayError;
use crate::rotation::Rotation;
use crate::surface::{Surface, TextState};

/// An off-screen pixel buffer the renderer can own and flush
pub trait Canvas: Surface + DrawTarget<Color = Rgb565, Error = Infallible> {
    /// Allocate a fresh, zeroed canvas
    fn with_size(width: u16, height: u16) -> Self
    where
        Self: Sized;

    /// Raw row-major RGB565 pixels in native orientation
    fn buffer(&self) -> &[u16];
}

/// Heap-backed 16-bit color canvas
pub struct Canvas16 {
    buffer: Vec<u16>,
    native_width: u16,
    native_height: u16,
    rotation: Rotation,
    text: TextState,
}

impl Canvas16 {
    /// Create a black canvas of the given native size
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: vec![0; usize::from(width) * usize::from(height)],
            native_width: width,
            native_height: height,
            rotation: Rotation::Deg0,
            text: TextState::new(),
        }
    }

    /// Read back a pixel in logical coordinates
    pub fn pixel(&self, x: i16, y: i16) -> Option<Rgb565> {
        self.index(Point::new(x.into(), y.into()))
            .map(|i| Rgb565::from(RawU16::new(self.buffer[i])))
    }

    /// Map a logical point to a buffer index, or `None` when clipped
    fn index(&self, point: Point) -> Option<usize> {
        let (width, height) = (i32::from(self.width()), i32::from(self.height()));
        if point.x < 0 || point.y < 0 || point.x >= width || point.y >= height {
            return None;
        }

        let native_w = i32::from(self.native_width);
        let native_h = i32::from(self.native_height);
        let (x, y) = match self.rotation {
            Rotation::Deg0 => (point.x, point.y),
            Rotation::Deg90 => (native_w - 1 - point.y, point.x),
            Rotation::Deg180 => (native_w - 1 - point.x, native_h - 1 - point.y),
            Rotation::Deg270 => (point.y, native_h - 1 - point.x),
        };

        Some(y as usize * self.native_width as usize + x as usize)
    }

    fn set(&mut self, point: Point, color: Rgb565) {
        if let Some(i) = self.index(point) {
            self.buffer[i] = color.into_storage();
        }
    }

    fn fill_area(&mut self, area: Rectangle, color: Rgb565) {
        let area = area.intersection(&self.bounding_box());
        for point in area.points() {
            self.set(point, color);
        }
    }

    fn newline(&mut self) {
        self.text.cursor.x = 0;
        self.text.cursor.y += self.text.line_height();
    }

    fn draw_glyph(&mut self, byte: u8) {
        let text = self.text;
        let mut style = MonoTextStyleBuilder::new()
            .font(text.font())
            .text_color(text.color);
        if let Some(background) = text.background {
            style = style.background_color(background);
        }

        let mut utf8 = [0u8; 4];
        let glyph = char::from(byte).encode_utf8(&mut utf8);
        let mut target = Scaled {
            canvas: self,
            origin: text.cursor,
            size_x: u32::from(text.size_x),
            size_y: u32::from(text.size_y),
        };
        let _ = Text::with_baseline(glyph, Point::zero(), style.build(), Baseline::Top)
            .draw(&mut target);
    }
}

/// Normalise a signed span the way the classic GFX API does: a negative
/// length extends towards smaller coordinates.
fn span(start: i16, len: i16) -> (i32, u32) {
    let (start, len) = (i32::from(start), i32::from(len));
    if len < 0 {
        (start + len + 1, len.unsigned_abs())
    } else {
        (start, len as u32)
    }
}

impl Canvas for Canvas16 {
    fn with_size(width: u16, height: u16) -> Self {
        Canvas16::new(width, height)
    }

    fn buffer(&self) -> &[u16] {
        &self.buffer
    }
}

impl OriginDimensions for Canvas16 {
    fn size(&self) -> Size {
        Size::new(self.width().into(), self.height().into())
    }
}

impl DrawTarget for Canvas16 {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set(point, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_area(*area, color);
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buffer.fill(color.into_storage());
        Ok(())
    }
}

impl Surface for Canvas16 {
    fn width(&self) -> u16 {
        self.rotation.apply(self.native_width, self.native_height).0
    }

    fn height(&self) -> u16 {
        self.rotation.apply(self.native_width, self.native_height).1
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        self.rotation = rotation;
        Ok(())
    }

    fn draw_pixel(&mut self, x: i16, y: i16, color: Rgb565) {
        self.set(Point::new(x.into(), y.into()), color);
    }

    fn draw_fast_hline(&mut self, x: i16, y: i16, w: i16, color: Rgb565) {
        let (x, w) = span(x, w);
        self.fill_area(Rectangle::new(Point::new(x, y.into()), Size::new(w, 1)), color);
    }

    fn draw_fast_vline(&mut self, x: i16, y: i16, h: i16, color: Rgb565) {
        let (y, h) = span(y, h);
        self.fill_area(Rectangle::new(Point::new(x.into(), y), Size::new(1, h)), color);
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: Rgb565) {
        let (x, w) = span(x, w);
        let (y, h) = span(y, h);
        self.fill_area(Rectangle::new(Point::new(x, y), Size::new(w, h)), color);
    }

    fn draw_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: Rgb565) {
        if w == 0 || h == 0 {
            return;
        }
        let right = x.saturating_add(w).saturating_sub(w.signum());
        let bottom = y.saturating_add(h).saturating_sub(h.signum());
        self.draw_fast_hline(x, y, w, color);
        self.draw_fast_hline(x, bottom, w, color);
        self.draw_fast_vline(x, y, h, color);
        self.draw_fast_vline(right, y, h, color);
    }

    fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, color: Rgb565) {
        let _ = Line::new(Point::new(x0.into(), y0.into()), Point::new(x1.into(), y1.into()))
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self);
    }

    fn fill_screen(&mut self, color: Rgb565) {
        self.buffer.fill(color.into_storage());
    }

    fn text(&self) -> &TextState {
        &self.text
    }

    fn text_mut(&mut self) -> &mut TextState {
        &mut self.text
    }

    fn write(&mut self, byte: u8) -> usize {
        match byte {
            b'\n' => self.newline(),
            b'\r' => {}
            _ => {
                let advance = self.text.advance();
                if self.text.wrap && self.text.cursor.x + advance > i32::from(self.width()) {
                    self.newline();
                }
                self.draw_glyph(byte);
                self.text.cursor.x += advance;
            }
        }
        1
    }
}

/// Draw target that magnifies every pixel into a `size_x` x `size_y` block
struct Scaled<'c> {
    canvas: &'c mut Canvas16,
    origin: Point,
    size_x: u32,
    size_y: u32,
}

impl OriginDimensions for Scaled<'_> {
    fn size(&self) -> Size {
        self.canvas.size()
    }
}

impl DrawTarget for Scaled<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let top_left = self.origin
                + Point::new(point.x * self.size_x as i32, point.y * self.size_y as i32);
            self.canvas
                .fill_area(Rectangle::new(top_left, Size::new(self.size_x, self.size_y)), color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(canvas: &Canvas16) -> usize {
        canvas.buffer().iter().filter(|&&raw| raw != 0).count()
    }

    #[test]
    fn test_new_canvas_is_black() {
        let canvas = Canvas16::new(8, 4);
        assert_eq!(canvas.buffer().len(), 32);
        assert_eq!(lit(&canvas), 0);
    }

    #[test]
    fn test_out_of_bounds_pixels_are_clipped() {
        let mut canvas = Canvas16::new(8, 4);
        canvas.draw_pixel(-1, 0, Rgb565::RED);
        canvas.draw_pixel(8, 0, Rgb565::RED);
        canvas.draw_pixel(0, 4, Rgb565::RED);
        assert_eq!(lit(&canvas), 0);

        canvas.draw_pixel(7, 3, Rgb565::RED);
        assert_eq!(canvas.pixel(7, 3), Some(Rgb565::RED));
        assert_eq!(canvas.buffer()[31], Rgb565::RED.into_storage());
    }

    #[test]
    fn test_negative_width_hline_extends_left() {
        let mut canvas = Canvas16::new(8, 4);
        canvas.draw_fast_hline(5, 1, -3, Rgb565::GREEN);
        for x in 3..=5 {
            assert_eq!(canvas.pixel(x, 1), Some(Rgb565::GREEN));
        }
        assert_eq!(lit(&canvas), 3);
    }

    #[test]
    fn test_fill_rect_clips_to_canvas() {
        let mut canvas = Canvas16::new(8, 4);
        canvas.fill_rect(6, 2, 10, 10, Rgb565::BLUE);
        assert_eq!(lit(&canvas), 4);
    }

    #[test]
    fn test_draw_rect_leaves_interior() {
        let mut canvas = Canvas16::new(8, 8);
        canvas.draw_rect(1, 1, 4, 4, Rgb565::WHITE);
        assert_eq!(canvas.pixel(1, 1), Some(Rgb565::WHITE));
        assert_eq!(canvas.pixel(4, 4), Some(Rgb565::WHITE));
        assert_eq!(canvas.pixel(2, 2), Some(Rgb565::BLACK));
        assert_eq!(lit(&canvas), 12);
    }

    #[test]
    fn test_draw_line_hits_both_endpoints() {
        let mut canvas = Canvas16::new(8, 8);
        canvas.draw_line(0, 0, 7, 7, Rgb565::WHITE);
        assert_eq!(canvas.pixel(0, 0), Some(Rgb565::WHITE));
        assert_eq!(canvas.pixel(7, 7), Some(Rgb565::WHITE));
        assert_eq!(lit(&canvas), 8);
    }

    #[test]
    fn test_rotated_canvas_maps_to_native_buffer() {
        let mut canvas = Canvas16::new(4, 2);
        canvas.set_rotation(Rotation::Deg90).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (2, 4));

        canvas.draw_pixel(0, 0, Rgb565::RED);
        // Logical origin lands in the native top-right corner
        assert_eq!(canvas.buffer()[3], Rgb565::RED.into_storage());
    }

    #[test]
    fn test_write_advances_cursor_and_draws() {
        let mut canvas = Canvas16::new(64, 32);
        let advance = canvas.text().advance();
        assert_eq!(canvas.write(b'A'), 1);
        assert_eq!(canvas.cursor(), Point::new(advance, 0));
        assert!(lit(&canvas) > 0);
    }

    #[test]
    fn test_newline_and_carriage_return() {
        let mut canvas = Canvas16::new(64, 32);
        let line = canvas.text().line_height();
        canvas.set_cursor(10, 0);
        canvas.write(b'\r');
        assert_eq!(canvas.cursor(), Point::new(10, 0));
        canvas.write(b'\n');
        assert_eq!(canvas.cursor(), Point::new(0, line));
    }

    #[test]
    fn test_wrap_moves_to_next_line() {
        let mut canvas = Canvas16::new(16, 32);
        let advance = canvas.text().advance();
        let line = canvas.text().line_height();
        canvas.print("abc");
        // Two glyphs fit in 16px, the third wraps
        assert_eq!(canvas.cursor(), Point::new(advance, line));

        let mut canvas = Canvas16::new(16, 32);
        canvas.set_text_wrap(false);
        canvas.print("abc");
        assert_eq!(canvas.cursor(), Point::new(advance * 3, 0));
    }

    #[test]
    fn test_text_size_scales_glyphs() {
        let mut small = Canvas16::new(64, 64);
        small.write(b'H');
        let mut large = Canvas16::new(64, 64);
        large.set_text_size(2);
        large.write(b'H');
        assert_eq!(lit(&large), lit(&small) * 4);
    }

    #[test]
    fn test_opaque_background_fills_cell() {
        let mut canvas = Canvas16::new(64, 64);
        canvas.set_text_color_bg(Rgb565::WHITE, Rgb565::BLUE);
        canvas.write(b' ');
        let font = canvas.text().font();
        let cell = (font.character_size.width * font.character_size.height) as usize;
        assert!(lit(&canvas) >= cell);
    }
}
