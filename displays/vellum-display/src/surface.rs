//! Drawing-primitive surface
//!
//! The capability set shared by the off-screen canvas and the renderer that
//! wraps it. Coordinates are signed so callers may draw partially off-screen;
//! clipping is the implementation's job.

use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoFont};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor};

use crate::device::DisplayError;
use crate::rotation::Rotation;

/// Font used when no font has been selected
pub static DEFAULT_FONT: MonoFont<'static> = FONT_6X10;

/// Text rendering attributes
#[derive(Clone, Copy)]
pub struct TextState {
    /// Top-left corner of the next glyph
    pub cursor: Point,
    /// Glyph color
    pub color: Rgb565,
    /// Glyph cell background (`None` = transparent)
    pub background: Option<Rgb565>,
    /// Horizontal magnification (>= 1)
    pub size_x: u8,
    /// Vertical magnification (>= 1)
    pub size_y: u8,
    /// Selected font (`None` = [`DEFAULT_FONT`])
    pub font: Option<&'static MonoFont<'static>>,
    /// Wrap to the next line at the right edge
    pub wrap: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextState {
    /// Create the power-on text state
    pub const fn new() -> Self {
        Self {
            cursor: Point::zero(),
            color: Rgb565::WHITE,
            background: None,
            size_x: 1,
            size_y: 1,
            font: None,
            wrap: true,
        }
    }

    /// Move the cursor
    pub fn set_cursor(&mut self, x: i16, y: i16) {
        self.cursor = Point::new(x.into(), y.into());
    }

    /// Set a transparent-background text color
    pub fn set_color(&mut self, color: Rgb565) {
        self.color = color;
        self.background = None;
    }

    /// Set text color with an opaque background
    pub fn set_color_bg(&mut self, color: Rgb565, background: Rgb565) {
        self.color = color;
        self.background = Some(background);
    }

    /// Set the magnification, clamping zero to one
    pub fn set_size(&mut self, size_x: u8, size_y: u8) {
        self.size_x = size_x.max(1);
        self.size_y = size_y.max(1);
    }

    /// The active font
    pub fn font(&self) -> &'static MonoFont<'static> {
        self.font.unwrap_or(&DEFAULT_FONT)
    }

    /// Horizontal distance between glyph origins, in pixels
    pub fn advance(&self) -> i32 {
        let font = self.font();
        (font.character_size.width + font.character_spacing) as i32 * i32::from(self.size_x)
    }

    /// Distance between text lines, in pixels
    pub fn line_height(&self) -> i32 {
        self.font().character_size.height as i32 * i32::from(self.size_y)
    }
}

/// Drawing-primitive capability set
///
/// `write_*` variants are the transaction-batched forms. They default to the
/// plain `draw_*` primitives; implementations may specialise them.
pub trait Surface {
    /// Logical width for the current rotation
    fn width(&self) -> u16;

    /// Logical height for the current rotation
    fn height(&self) -> u16;

    /// Current rotation
    fn rotation(&self) -> Rotation;

    /// Change the rotation
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError>;

    /// Invert the display colors
    fn invert_display(&mut self, _invert: bool) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Set a single pixel
    fn draw_pixel(&mut self, x: i16, y: i16, color: Rgb565);

    /// Horizontal line of `w` pixels starting at (x, y)
    fn draw_fast_hline(&mut self, x: i16, y: i16, w: i16, color: Rgb565);

    /// Vertical line of `h` pixels starting at (x, y)
    fn draw_fast_vline(&mut self, x: i16, y: i16, h: i16, color: Rgb565);

    /// Filled rectangle
    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: Rgb565);

    /// Rectangle outline
    fn draw_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: Rgb565);

    /// Arbitrary line between two points, inclusive
    fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, color: Rgb565);

    /// Fill the whole surface
    fn fill_screen(&mut self, color: Rgb565);

    /// Begin a batch of `write_*` calls
    fn start_write(&mut self) {}

    /// End a batch of `write_*` calls
    fn end_write(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Batched `draw_pixel`, for use between `start_write` and `end_write`
    fn write_pixel(&mut self, x: i16, y: i16, color: Rgb565) {
        self.draw_pixel(x, y, color);
    }

    /// Batched `draw_fast_hline`
    fn write_fast_hline(&mut self, x: i16, y: i16, w: i16, color: Rgb565) {
        self.draw_fast_hline(x, y, w, color);
    }

    /// Batched `draw_fast_vline`
    fn write_fast_vline(&mut self, x: i16, y: i16, h: i16, color: Rgb565) {
        self.draw_fast_vline(x, y, h, color);
    }

    /// Batched `fill_rect`
    fn write_fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: Rgb565) {
        self.fill_rect(x, y, w, h, color);
    }

    /// Batched `draw_line`
    fn write_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, color: Rgb565) {
        self.draw_line(x0, y0, x1, y1, color);
    }

    /// Current text attributes
    fn text(&self) -> &TextState;

    /// Mutable text attributes
    fn text_mut(&mut self) -> &mut TextState;

    /// Render one byte of text at the cursor, returning the number of bytes consumed
    fn write(&mut self, byte: u8) -> usize;

    /// Render a string byte by byte
    fn print(&mut self, text: &str) -> usize {
        text.bytes().map(|byte| self.write(byte)).sum()
    }

    /// Cursor position
    fn cursor(&self) -> Point {
        self.text().cursor
    }

    /// Move the text cursor (top-left of the next glyph)
    fn set_cursor(&mut self, x: i16, y: i16) {
        self.text_mut().set_cursor(x, y);
    }

    /// Draw text with a transparent background
    fn set_text_color(&mut self, color: Rgb565) {
        self.text_mut().set_color(color);
    }

    /// Draw text over an opaque background
    fn set_text_color_bg(&mut self, color: Rgb565, background: Rgb565) {
        self.text_mut().set_color_bg(color, background);
    }

    /// Scale glyphs uniformly (values below 1 clamp to 1)
    fn set_text_size(&mut self, size: u8) {
        self.set_text_size_xy(size, size);
    }

    /// Scale glyphs per axis (values below 1 clamp to 1)
    fn set_text_size_xy(&mut self, size_x: u8, size_y: u8) {
        self.text_mut().set_size(size_x, size_y);
    }

    /// Select a font (`None` restores the default)
    fn set_font(&mut self, font: Option<&'static MonoFont<'static>>) {
        self.text_mut().font = font;
    }

    /// Wrap to the next line when a glyph would cross the right edge
    fn set_text_wrap(&mut self, wrap: bool) {
        self.text_mut().wrap = wrap;
    }
}
