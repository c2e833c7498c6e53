//! Scaled bitmap text on the 8 x 8 cell grid.

pub mod font;
pub mod layout;

pub use font::{CELL_SIZE, CellFont, GlyphRasterizer};
pub use layout::{FALLBACK_SCALE, FitOptions, TextBlock, TextLayout, wrap_for_scale};
