//! Adaptive text layout.
//!
//! Picks the largest integer scale of the 8 x 8 cell font at which greedily
//! word-wrapped text fits a pixel box, then paints it by expanding every
//! glyph pixel into a `scale` x `scale` block.

use super::font::{CELL_SIZE, GlyphRasterizer};
use crate::canvas::{Color, Orientation, PixelBuffer};
use embedded_graphics::geometry::Point;

/// Scale used when no scale yields a valid wrap
pub const FALLBACK_SCALE: u32 = 3;

/// Options for [`TextLayout::auto_fit_text`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FitOptions {
    /// Upper bound on the scale
    pub max_scale: Option<u32>,
    /// Centre each line horizontally within the fit width
    pub center: bool,
    /// Centre the block vertically within the target buffer
    pub center_vertical: bool,
}

/// Text as it was laid out and drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub scale: u32,
    /// Top-left corner of the first line before horizontal centring
    pub origin: (i32, i32),
    pub color: Color,
}

/// Greedy word wrap of `input_lines` at `scale`
///
/// Returns `None` when a single word is wider than a line, or when the
/// wrapped text has more lines than fit into `height`. Empty input lines are
/// kept.
pub fn wrap_for_scale(input_lines: &[&str], scale: u32, width: u32, height: u32) -> Option<Vec<String>> {
    let cell = CELL_SIZE * scale;
    let max_chars = (width / cell) as usize;
    let max_lines = (height / cell) as usize;
    if max_chars == 0 || max_lines == 0 {
        return None;
    }

    let mut lines = Vec::new();
    for input in input_lines {
        if input.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0;
        for word in input.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > max_chars {
                return None;
            }
            if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    (lines.len() <= max_lines).then_some(lines)
}

/// Text renderer bound to a fit box, usually the panel's nominal size
pub struct TextLayout<R> {
    rasterizer: R,
    width: u32,
    height: u32,
}

impl<R: GlyphRasterizer> TextLayout<R> {
    /// `width` x `height` is the box text is fitted into
    pub fn new(rasterizer: R, width: u32, height: u32) -> Self {
        Self {
            rasterizer,
            width,
            height,
        }
    }

    /// Largest scale that can possibly fit, before any word wrapping
    pub fn max_possible_scale(&self, cap: Option<u32>) -> u32 {
        let mut max = (self.width / CELL_SIZE).min(self.height / CELL_SIZE).max(1);
        if let Some(cap) = cap {
            max = max.min(cap);
        }
        max
    }

    /// Choose a scale and wrap `text` for it
    ///
    /// Falls back to [`FALLBACK_SCALE`] with the unwrapped input as a single
    /// line when nothing fits.
    pub fn fit(&self, text: &str, max_scale: Option<u32>) -> (u32, Vec<String>) {
        let input_lines: Vec<&str> = text.split('\n').map(str::trim).collect();

        for scale in (1..=self.max_possible_scale(max_scale)).rev() {
            if let Some(lines) = wrap_for_scale(&input_lines, scale, self.width, self.height) {
                return (scale, lines);
            }
        }

        tracing::debug!("No scale fits {:?}, falling back to scale {}", text, FALLBACK_SCALE);
        (FALLBACK_SCALE, vec![text.to_string()])
    }

    /// Draw `text` with every font pixel expanded to a `scale` x `scale` block
    ///
    /// Lines are split on `\n` and stacked 8 x `scale` pixels apart; empty
    /// lines only advance the pen. A scale of 0 is treated as 1, and a scale
    /// beyond the target's larger side is clamped to it.
    pub fn scaled_text_blit(
        &self,
        target: &mut PixelBuffer,
        text: &str,
        x: i32,
        y: i32,
        scale: u32,
        color: Color,
    ) {
        // No block needs to be larger than the target
        let limit = target.width().max(target.height()).max(1);
        let scale = scale.clamp(1, limit) as i32;
        let cell = CELL_SIZE as i32;

        for (li, line) in text.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }

            let raster = self.rasterize(line);
            for sy in 0..cell {
                for sx in 0..raster.width() as i32 {
                    if raster.pixel(sx, sy) == Some(Color::Ink) {
                        let dst_x = x.saturating_add(sx.saturating_mul(scale));
                        let row = (li as i32).saturating_mul(cell).saturating_add(sy);
                        let dst_y = y.saturating_add(row.saturating_mul(scale));
                        target.fill_rect(dst_x, dst_y, scale, scale, color);
                    }
                }
            }
        }
    }

    /// Draw `text` at the largest scale that fits the layout box
    pub fn auto_fit_text(
        &self,
        target: &mut PixelBuffer,
        text: &str,
        x: i32,
        y: i32,
        color: Color,
        options: FitOptions,
    ) -> TextBlock {
        let (scale, lines) = self.fit(text, options.max_scale);
        let line_height = (CELL_SIZE * scale) as i32;

        let mut y = y;
        if options.center_vertical {
            let block_height = lines.len() as i32 * line_height;
            y = (target.height() as i32 - block_height).div_euclid(2);
        }

        for (li, line) in lines.iter().enumerate() {
            let xoff = if options.center {
                let text_width = line.chars().count() as i32 * line_height;
                x + (self.width as i32 - text_width).div_euclid(2)
            } else {
                x
            };
            let yoff = y + li as i32 * line_height;
            self.scaled_text_blit(target, line, xoff, yoff, scale, color);
        }

        tracing::debug!("Drew {} line(s) at scale {}", lines.len(), scale);
        TextBlock {
            lines,
            scale,
            origin: (x, y),
            color,
        }
    }

    /// Render one line at 1x into a fresh raster, background everywhere else
    fn rasterize(&self, line: &str) -> PixelBuffer {
        let width = line.chars().count() as u32 * CELL_SIZE;
        let mut raster = PixelBuffer::new(Orientation::Portrait, width, CELL_SIZE);
        raster.fill(Color::Background);
        self.rasterizer
            .draw_line(line, Point::zero(), &mut raster)
            .unwrap_or_else(|never| match never {});
        raster
    }
}
