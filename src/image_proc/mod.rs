//! Image loading module.
//!
//! Decodes the badge artwork bitmaps into the landscape frame buffer.

pub mod bmp;

pub use bmp::{BmpError, load_bmp_into};
