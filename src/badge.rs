//! Badge screen composition.
//!
//! Draws the artwork, the owner's details (or the "Configuration Missing"
//! notice) into the landscape buffer.

use crate::canvas::{Color, PixelBuffer};
use crate::config::BadgeIdentity;
use crate::image_proc::{BmpError, load_bmp_into};
use crate::text::{CellFont, FitOptions, GlyphRasterizer, TextBlock, TextLayout};
use std::path::{Path, PathBuf};

/// Background artwork, drawn full screen
pub const BACKGROUND_BMP: &str = "overglade.bmp";

/// Owner's picture, drawn inside the frame
pub const PORTRAIT_BMP: &str = "image.bmp";

/// Placement of a bitmap on the landscape buffer
struct Placement {
    file: &'static str,
    x: i32,
    y: i32,
    max_w: u32,
    max_h: u32,
}

const ARTWORK: [Placement; 2] = [
    Placement {
        file: BACKGROUND_BMP,
        x: 0,
        y: 0,
        max_w: 296,
        max_h: 152,
    },
    Placement {
        file: PORTRAIT_BMP,
        x: 15,
        y: 25,
        max_w: 80,
        max_h: 80,
    },
];

/// Frame around the portrait: x, y, w, h
pub const PORTRAIT_FRAME: (i32, i32, i32, i32) = (10, 20, 90, 90);

/// Left edge of the text column
pub const TEXT_X: i32 = 105;

/// Lays out the badge screen
pub struct BadgeRenderer<R = CellFont> {
    font: R,
    assets: PathBuf,
}

impl BadgeRenderer<CellFont> {
    /// Renderer using the built-in font, reading artwork from `assets`
    pub fn new<P: Into<PathBuf>>(assets: P) -> Self {
        Self::with_font(CellFont::default(), assets)
    }
}

impl<R: GlyphRasterizer + Clone> BadgeRenderer<R> {
    pub fn with_font<P: Into<PathBuf>>(font: R, assets: P) -> Self {
        Self {
            font,
            assets: assets.into(),
        }
    }

    pub fn assets(&self) -> &Path {
        &self.assets
    }

    fn layout_for(&self, buffer: &PixelBuffer) -> TextLayout<R> {
        TextLayout::new(self.font.clone(), buffer.width(), buffer.height())
    }

    /// Draw the artwork bitmaps that exist in the assets directory
    ///
    /// A missing file is skipped; a malformed one is logged and skipped.
    pub fn draw_artwork(&self, buffer: &mut PixelBuffer) {
        for art in &ARTWORK {
            let path = self.assets.join(art.file);
            match load_bmp_into(&path, buffer, art.x, art.y, art.max_w, art.max_h) {
                Ok(()) => {}
                Err(BmpError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("No {} in {}", art.file, self.assets.display());
                }
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }
    }

    /// Draw the complete badge screen
    ///
    /// `None` draws the "Configuration Missing" notice instead of the
    /// owner's details.
    pub fn render(&self, buffer: &mut PixelBuffer, identity: Option<&BadgeIdentity>) {
        buffer.fill(Color::Background);
        self.draw_artwork(buffer);

        let layout = self.layout_for(buffer);
        match identity {
            Some(id) => {
                let (x, y, w, h) = PORTRAIT_FRAME;
                buffer.rect(x, y, w, h, Color::Ink);

                layout.scaled_text_blit(buffer, &id.name, TEXT_X, 40, id.name_scale, Color::Ink);
                let affiliation = if id.is_staff {
                    "Staff".to_string()
                } else {
                    format!("Party {}", id.party)
                };
                layout.scaled_text_blit(buffer, &affiliation, TEXT_X, 64, 2, Color::Ink);
                layout.scaled_text_blit(buffer, &format!("({})", id.pronouns), TEXT_X, 112, 1, Color::Ink);
                layout.scaled_text_blit(buffer, &format!("@{}", id.handle), TEXT_X, 120, 1, Color::Ink);
                tracing::info!("Rendered badge for {}", id.name);
            }
            None => {
                layout.scaled_text_blit(buffer, "Configuration", 10, 13, 2, Color::Ink);
                layout.scaled_text_blit(buffer, "Missing", 10, 32, 2, Color::Ink);
                tracing::warn!("Badge is not configured");
            }
        }
    }

    /// Draw `text` as large as it fits, centred on a blank screen
    pub fn render_text(&self, buffer: &mut PixelBuffer, text: &str) -> TextBlock {
        buffer.fill(Color::Background);
        let options = FitOptions {
            max_scale: None,
            center: true,
            center_vertical: true,
        };
        self.layout_for(buffer)
            .auto_fit_text(buffer, text, 0, 0, Color::Ink, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::FramePair;
    use crate::config::PartyNumber;
    use crate::image_proc::bmp::tests::one_bit_bmp;
    use tempfile::TempDir;

    fn identity(is_staff: bool) -> BadgeIdentity {
        BadgeIdentity {
            name: "Ada".to_string(),
            pronouns: "she/her".to_string(),
            handle: "ada".to_string(),
            party: PartyNumber::Number(7),
            name_scale: 3,
            is_staff,
        }
    }

    fn landscape() -> PixelBuffer {
        FramePair::new(152, 296).landscape
    }

    fn has_ink(buf: &PixelBuffer, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
        (y0..y1).any(|y| (x0..x1).any(|x| buf.pixel(x, y) == Some(Color::Ink)))
    }

    #[test]
    fn fallback_screen_without_identity() {
        let dir = TempDir::new().unwrap();
        let mut buf = landscape();
        BadgeRenderer::new(dir.path()).render(&mut buf, None);

        assert!(has_ink(&buf, 10, 13, 10 + 13 * 16, 29));
        assert!(has_ink(&buf, 10, 32, 10 + 7 * 16, 48));
        assert!(!has_ink(&buf, 0, 50, 296, 152));
        assert_eq!(buf.pixel(10, 20), Some(Color::Background));
    }

    #[test]
    fn configured_screen_draws_frame_and_details() {
        let dir = TempDir::new().unwrap();
        let mut buf = landscape();
        BadgeRenderer::new(dir.path()).render(&mut buf, Some(&identity(false)));

        for (x, y) in [(10, 20), (99, 20), (10, 109), (99, 109)] {
            assert_eq!(buf.pixel(x, y), Some(Color::Ink), "frame corner ({}, {})", x, y);
        }
        assert_eq!(buf.pixel(50, 60), Some(Color::Background));

        assert!(has_ink(&buf, TEXT_X, 40, 296, 64));
        assert!(has_ink(&buf, TEXT_X, 64, 296, 80));
        assert!(has_ink(&buf, TEXT_X, 112, 296, 120));
        assert!(has_ink(&buf, TEXT_X, 120, 296, 128));
        assert!(!has_ink(&buf, TEXT_X, 128, 296, 152));
    }

    #[test]
    fn staff_replaces_party_line() {
        let dir = TempDir::new().unwrap();
        let renderer = BadgeRenderer::new(dir.path());

        let mut party = landscape();
        renderer.render(&mut party, Some(&identity(false)));
        let mut staff = landscape();
        renderer.render(&mut staff, Some(&identity(true)));

        // "Party 7" is seven cells wide at scale 2, "Staff" only five
        assert!(has_ink(&party, TEXT_X + 5 * 16, 64, TEXT_X + 7 * 16, 80));
        assert!(!has_ink(&staff, TEXT_X + 5 * 16, 64, TEXT_X + 7 * 16, 80));
    }

    #[test]
    fn portrait_artwork_is_drawn_inside_frame() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PORTRAIT_BMP), one_bit_bmp(80, 80, |_, _| true)).unwrap();

        let mut buf = landscape();
        BadgeRenderer::new(dir.path()).render(&mut buf, Some(&identity(false)));

        assert_eq!(buf.pixel(15, 25), Some(Color::Ink));
        assert_eq!(buf.pixel(94, 104), Some(Color::Ink));
        assert_eq!(buf.pixel(95, 104), Some(Color::Background));
        assert_eq!(buf.pixel(14, 25), Some(Color::Background));
    }

    #[test]
    fn malformed_artwork_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(BACKGROUND_BMP), b"not a bitmap").unwrap();

        let mut buf = landscape();
        BadgeRenderer::new(dir.path()).render(&mut buf, None);
        assert_eq!(buf.pixel(0, 0), Some(Color::Background));
    }

    #[test]
    fn free_text_is_centred() {
        let dir = TempDir::new().unwrap();
        let mut buf = landscape();
        let block = BadgeRenderer::new(dir.path()).render_text(&mut buf, "HI");

        assert_eq!(block.lines, vec!["HI".to_string()]);
        assert!(block.scale > 1);
        let line = (8 * block.scale) as i32;
        assert_eq!(block.origin.1, (152 - line) / 2);
        assert!(has_ink(&buf, 0, block.origin.1, 296, block.origin.1 + line));
        assert!(!has_ink(&buf, 0, 0, 296, block.origin.1));
    }
}
