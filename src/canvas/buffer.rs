//! Bit-packed pixel storage.
//!
//! Two packings are supported, matching how the panel is viewed:
//! - Landscape: each byte is a vertical run of 8 pixels, LSB on top. Bytes are
//!   laid out page by page (8 rows per page), left to right within a page.
//! - Portrait: each byte is a horizontal run of 8 pixels, MSB on the left.
//!   Rows are padded to whole bytes.

use super::{Color, FrameError};
use embedded_graphics::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
};
use std::convert::Infallible;

/// Bit packing of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Vertical bytes, LSB at the top
    Landscape,
    /// Horizontal bytes, MSB at the left
    Portrait,
}

/// A 1-bit frame buffer owning its bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    orientation: Orientation,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a buffer filled with ink (all bits clear)
    pub fn new(orientation: Orientation, width: u32, height: u32) -> Self {
        let len = match orientation {
            Orientation::Landscape => width as usize * height.div_ceil(8) as usize,
            Orientation::Portrait => width.div_ceil(8) as usize * height as usize,
        };
        Self {
            orientation,
            width,
            height,
            data: vec![0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Raw packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Byte index and bit mask of an in-bounds pixel
    fn locate(&self, x: u32, y: u32) -> (usize, u8) {
        match self.orientation {
            Orientation::Landscape => {
                let index = (y / 8) as usize * self.width as usize + x as usize;
                (index, 1 << (y % 8))
            }
            Orientation::Portrait => {
                let stride = self.width.div_ceil(8) as usize;
                let index = y as usize * stride + (x / 8) as usize;
                (index, 0x80 >> (x % 8))
            }
        }
    }

    fn put(&mut self, x: u32, y: u32, color: Color) {
        let (index, mask) = self.locate(x, y);
        match color {
            Color::Ink => self.data[index] &= !mask,
            Color::Background => self.data[index] |= mask,
        }
    }

    /// Set a single pixel; coordinates outside the buffer are rejected
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), FrameError> {
        if !self.contains(x, y) {
            return Err(FrameError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.put(x as u32, y as u32, color);
        Ok(())
    }

    /// Read a pixel, `None` outside the buffer
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.contains(x, y) {
            return None;
        }
        let (index, mask) = self.locate(x as u32, y as u32);
        Some(if self.data[index] & mask == 0 {
            Color::Ink
        } else {
            Color::Background
        })
    }

    /// Set every pixel
    pub fn fill(&mut self, color: Color) {
        self.data.fill(color.fill_byte());
    }

    /// Fill a rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px as u32, py as u32, color);
            }
        }
    }

    /// Draw a one pixel wide rectangle outline, clipped to the buffer
    pub fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.fill_rect(x, y, w, 1, color);
        self.fill_rect(x, y + h - 1, w, 1, color);
        self.fill_rect(x, y, 1, h, color);
        self.fill_rect(x + w - 1, y, 1, h, color);
    }

    /// Copy a `width` x `height` image given as a color lookup to `(dst_x, dst_y)`
    ///
    /// Source pixels that land outside the buffer are skipped.
    pub fn blit<F>(&mut self, mut source: F, dst_x: i32, dst_y: i32, width: u32, height: u32)
    where
        F: FnMut(u32, u32) -> Color,
    {
        for sy in 0..height {
            for sx in 0..width {
                let x = dst_x + sx as i32;
                let y = dst_y + sy as i32;
                if self.contains(x, y) {
                    self.put(x as u32, y as u32, source(sx, sy));
                }
            }
        }
    }
}

/// Glyph and primitive rendering through embedded-graphics; `On` is ink
impl DrawTarget for PixelBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if self.contains(point.x, point.y) {
                let color = match color {
                    BinaryColor::On => Color::Ink,
                    BinaryColor::Off => Color::Background,
                };
                self.put(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for PixelBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// The two views of one panel
///
/// Both buffers describe the same glass rotated by 90 degrees but never
/// share storage; the landscape one is streamed with
/// [`crate::display::landscape_to_native`].
#[derive(Debug, Clone)]
pub struct FramePair {
    pub landscape: PixelBuffer,
    pub portrait: PixelBuffer,
}

impl FramePair {
    /// Buffers for a panel `width` x `height` pixels in its native (portrait) orientation
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            landscape: PixelBuffer::new(Orientation::Landscape, height, width),
            portrait: PixelBuffer::new(Orientation::Portrait, width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle},
    };

    #[test]
    fn pair_sizes_match_panel() {
        let pair = FramePair::new(152, 296);
        assert_eq!(pair.landscape.width(), 296);
        assert_eq!(pair.landscape.height(), 152);
        assert_eq!(pair.landscape.as_bytes().len(), 152 * 296 / 8);
        assert_eq!(pair.portrait.as_bytes().len(), 152 * 296 / 8);
    }

    #[test]
    fn pair_buffers_are_independent() {
        let mut pair = FramePair::new(152, 296);
        pair.landscape.fill(Color::Background);
        assert!(pair.portrait.as_bytes().iter().all(|&b| b == 0x00));
    }

    #[test]
    fn single_ink_pixel_round_trip() {
        for orientation in [Orientation::Landscape, Orientation::Portrait] {
            let mut buf = PixelBuffer::new(orientation, 40, 24);
            buf.fill(Color::Background);
            buf.set_pixel(13, 9, Color::Ink).unwrap();

            for y in 0..24 {
                for x in 0..40 {
                    let expected = if (x, y) == (13, 9) {
                        Color::Ink
                    } else {
                        Color::Background
                    };
                    assert_eq!(buf.pixel(x, y), Some(expected), "{:?} ({}, {})", orientation, x, y);
                }
            }
        }
    }

    #[test]
    fn landscape_packs_vertically_lsb_first() {
        let mut buf = PixelBuffer::new(Orientation::Landscape, 16, 16);
        buf.fill(Color::Background);
        buf.set_pixel(3, 0, Color::Ink).unwrap();
        buf.set_pixel(3, 9, Color::Ink).unwrap();
        assert_eq!(buf.as_bytes()[3], 0xFE);
        assert_eq!(buf.as_bytes()[16 + 3], 0xFD);
    }

    #[test]
    fn portrait_packs_horizontally_msb_first() {
        let mut buf = PixelBuffer::new(Orientation::Portrait, 12, 2);
        assert_eq!(buf.as_bytes().len(), 4);
        buf.fill(Color::Background);
        buf.set_pixel(0, 0, Color::Ink).unwrap();
        buf.set_pixel(9, 1, Color::Ink).unwrap();
        assert_eq!(buf.as_bytes(), &[0x7F, 0xFF, 0xFF, 0xBF]);
    }

    #[test]
    fn out_of_bounds_pixel_rejected() {
        let mut buf = PixelBuffer::new(Orientation::Portrait, 8, 8);
        assert_eq!(
            buf.set_pixel(8, 0, Color::Ink),
            Err(FrameError::OutOfBounds {
                x: 8,
                y: 0,
                width: 8,
                height: 8
            })
        );
        assert!(buf.set_pixel(-1, 3, Color::Ink).is_err());
        assert_eq!(buf.pixel(0, 8), None);
    }

    #[test]
    fn fill_rect_clips_at_edges() {
        let mut buf = PixelBuffer::new(Orientation::Landscape, 10, 10);
        buf.fill(Color::Background);
        buf.fill_rect(-2, 8, 4, 5, Color::Ink);

        assert_eq!(buf.pixel(0, 8), Some(Color::Ink));
        assert_eq!(buf.pixel(1, 9), Some(Color::Ink));
        assert_eq!(buf.pixel(2, 9), Some(Color::Background));
        assert_eq!(buf.pixel(0, 7), Some(Color::Background));
    }

    #[test]
    fn rect_draws_outline_only() {
        let mut buf = PixelBuffer::new(Orientation::Portrait, 10, 10);
        buf.fill(Color::Background);
        buf.rect(1, 1, 5, 4, Color::Ink);

        assert_eq!(buf.pixel(1, 1), Some(Color::Ink));
        assert_eq!(buf.pixel(5, 4), Some(Color::Ink));
        assert_eq!(buf.pixel(3, 4), Some(Color::Ink));
        assert_eq!(buf.pixel(3, 2), Some(Color::Background));
        assert_eq!(buf.pixel(6, 1), Some(Color::Background));
    }

    #[test]
    fn blit_copies_and_clips() {
        let mut buf = PixelBuffer::new(Orientation::Landscape, 8, 8);
        buf.fill(Color::Background);
        buf.blit(
            |x, y| if (x + y) % 2 == 0 { Color::Ink } else { Color::Background },
            6,
            6,
            4,
            4,
        );

        assert_eq!(buf.pixel(6, 6), Some(Color::Ink));
        assert_eq!(buf.pixel(7, 6), Some(Color::Background));
        assert_eq!(buf.pixel(7, 7), Some(Color::Ink));
        assert_eq!(buf.pixel(5, 5), Some(Color::Background));
    }

    #[test]
    fn draw_target_maps_on_to_ink() {
        let mut buf = PixelBuffer::new(Orientation::Portrait, 16, 16);
        buf.fill(Color::Background);
        Rectangle::new(Point::new(2, 2), Size::new(3, 3))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut buf)
            .unwrap();

        assert_eq!(buf.pixel(2, 2), Some(Color::Ink));
        assert_eq!(buf.pixel(4, 4), Some(Color::Ink));
        assert_eq!(buf.pixel(5, 5), Some(Color::Background));
    }
}
