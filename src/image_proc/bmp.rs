//! Windows bitmap loading into a frame buffer.
//!
//! Artwork is uploaded to the badge as plain BMP files, either 1-bit or
//! 24-bit. The header is checked before decoding so that an unexpected depth
//! fails without touching the buffer.

use crate::canvas::{Color, PixelBuffer};
use image::{ImageFormat, RgbImage};
use std::path::Path;
use thiserror::Error;

/// Channel sum above which a pixel is drawn as ink
pub const INK_THRESHOLD: u16 = 384;

/// Bit depths accepted by [`load_bmp_into`]
pub const SUPPORTED_DEPTHS: [u16; 2] = [1, 24];

const BPP_OFFSET: usize = 28;
const INFO_HEADER_OFFSET: usize = 14;
/// Header size of the old OS/2 layout, whose palette entries have no pad byte
const CORE_HEADER_SIZE: usize = 12;

/// Bitmap loading errors
#[derive(Error, Debug)]
pub enum BmpError {
    #[error("Failed to read bitmap: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a BMP")]
    NotBmp,

    #[error("Unsupported BMP depth: {0} bits per pixel")]
    UnsupportedDepth(u16),

    #[error("Failed to decode bitmap: {0}")]
    Decode(#[from] image::ImageError),
}

/// Check the signature and bit depth of a BMP file image
pub fn check_header(bytes: &[u8]) -> Result<u16, BmpError> {
    if bytes.len() < BPP_OFFSET + 2 || !bytes.starts_with(b"BM") {
        return Err(BmpError::NotBmp);
    }

    let bpp = u16::from_le_bytes([bytes[BPP_OFFSET], bytes[BPP_OFFSET + 1]]);
    if !SUPPORTED_DEPTHS.contains(&bpp) {
        return Err(BmpError::UnsupportedDepth(bpp));
    }
    Ok(bpp)
}

/// Decode a 1-bit or 24-bit BMP to RGB, top row first
pub fn decode_bmp(bytes: &[u8]) -> Result<RgbImage, BmpError> {
    let bpp = check_header(bytes)?;
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Bmp)?.to_rgb8();
    tracing::debug!("Decoded {}x{} bitmap at {} bpp", img.width(), img.height(), bpp);
    Ok(img)
}

/// RGB value of palette entry 1, the color of a set bit in a 1-bit image
pub fn set_bit_rgb(bytes: &[u8]) -> Result<[u8; 3], BmpError> {
    let size_bytes = bytes
        .get(INFO_HEADER_OFFSET..INFO_HEADER_OFFSET + 4)
        .ok_or(BmpError::NotBmp)?;
    let header_size = u32::from_le_bytes([size_bytes[0], size_bytes[1], size_bytes[2], size_bytes[3]]) as usize;
    let entry_size = if header_size == CORE_HEADER_SIZE { 3 } else { 4 };

    let entry = INFO_HEADER_OFFSET
        .checked_add(header_size)
        .and_then(|palette| palette.checked_add(entry_size))
        .ok_or(BmpError::NotBmp)?;
    match bytes.get(entry..).and_then(|rest| rest.get(..3)) {
        Some(&[b, g, r]) => Ok([r, g, b]),
        _ => Err(BmpError::NotBmp),
    }
}

/// Map an RGB pixel to a panel color
pub fn pixel_color(rgb: [u8; 3]) -> Color {
    let sum: u16 = rgb.iter().map(|&c| c as u16).sum();
    if sum > INK_THRESHOLD {
        Color::Ink
    } else {
        Color::Background
    }
}

/// Draw a bitmap into `buffer` with its top-left corner at `(x0, y0)`
///
/// In a 1-bit image every set bit is ink, whatever its palette color. 24-bit
/// pixels go through [`pixel_color`].
///
/// At most `max_w` x `max_h` pixels from the top-left of the bitmap are
/// drawn, so a taller image loses its bottom rows; anything beyond the
/// buffer edge is dropped.
pub fn load_bmp_into<P: AsRef<Path>>(
    path: P,
    buffer: &mut PixelBuffer,
    x0: i32,
    y0: i32,
    max_w: u32,
    max_h: u32,
) -> Result<(), BmpError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let set_bit = match check_header(&bytes)? {
        1 => Some(set_bit_rgb(&bytes)?),
        _ => None,
    };
    let img = decode_bmp(&bytes)?;

    let w = img.width().min(max_w);
    let h = img.height().min(max_h);
    buffer.blit(
        |x, y| {
            let rgb = img.get_pixel(x, y).0;
            match set_bit {
                Some(ink) if rgb == ink => Color::Ink,
                Some(_) => Color::Background,
                None => pixel_color(rgb),
            }
        },
        x0,
        y0,
        w,
        h,
    );

    tracing::debug!("Drew {} ({}x{}) at ({}, {})", path.display(), w, h, x0, y0);
    Ok(())
}
