//! In-memory 1-bit frame buffers.
//!
//! Provides the landscape/portrait buffer pair the badge draws into before a
//! frame is streamed to the panel.

pub mod buffer;

pub use buffer::{FramePair, Orientation, PixelBuffer};

use thiserror::Error;

/// Pixel color as stored in the panel RAM
///
/// A cleared bit is ink (dark), a set bit is background (light).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Ink = 0,
    Background = 1,
}

impl Color {
    /// Color of a raw bit value
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 { Color::Ink } else { Color::Background }
    }

    /// A byte with all eight pixels set to this color
    pub fn fill_byte(self) -> u8 {
        match self {
            Color::Ink => 0x00,
            Color::Background => 0xFF,
        }
    }
}

/// Frame buffer errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("Pixel ({x}, {y}) outside {width}x{height} buffer")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}
