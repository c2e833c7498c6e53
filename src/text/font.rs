//! Glyph rasterization.
//!
//! Text is laid out on a fixed 8 x 8 cell grid: every character advances the
//! pen by [`CELL_SIZE`] pixels and occupies [`CELL_SIZE`] rows.

use embedded_graphics::{
    Drawable,
    draw_target::DrawTarget,
    geometry::Point,
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_5X8},
    pixelcolor::BinaryColor,
    text::{Baseline, Text},
};

/// Width and height of one character cell in pixels
pub const CELL_SIZE: u32 = 8;

/// Something that can draw a single line of text onto an 8-row raster
pub trait GlyphRasterizer {
    /// Draw `line` in `BinaryColor::On`, one cell per character, with the
    /// top-left corner of the first cell at `origin`
    fn draw_line<D>(&self, line: &str, origin: Point, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>;
}

/// Monospace bitmap font placed on the 8 x 8 cell grid
///
/// Fonts narrower than a cell are centred horizontally inside it.
#[derive(Debug, Clone, Copy)]
pub struct CellFont {
    font: &'static MonoFont<'static>,
}

impl CellFont {
    pub fn new(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }
}

impl Default for CellFont {
    fn default() -> Self {
        Self::new(&FONT_5X8)
    }
}

impl GlyphRasterizer for CellFont {
    fn draw_line<D>(&self, line: &str, origin: Point, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let inset = (CELL_SIZE.saturating_sub(self.font.character_size.width) / 2) as i32;
        let mut glyph = [0u8; 4];

        for (i, c) in line.chars().enumerate() {
            let x = origin.x + (i as u32 * CELL_SIZE) as i32 + inset;
            Text::with_baseline(
                c.encode_utf8(&mut glyph),
                Point::new(x, origin.y),
                style,
                Baseline::Top,
            )
            .draw(target)?;
        }
        Ok(())
    }
}
