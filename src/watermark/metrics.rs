//! Text measurement.
//!
//! Widths come from the font's own advances and kerning pairs so anchor
//! placement lines up with the rendered glyphs.

use super::font::{FontFace, ResolvedFont};
use ab_glyph::{Font, GlyphId, ScaleFont};

/// Pixel size of a line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    pub width: u32,
    pub height: u32,
}

impl TextMetrics {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Measure `text` as rendered with `font`.
///
/// Width is the sum of horizontal advances plus kerning; height is the
/// font's ascent minus descent. Empty text measures `{0, 0}`.
pub fn measure(text: &str, font: &ResolvedFont) -> TextMetrics {
    if text.is_empty() {
        return TextMetrics::default();
    }

    match font.face() {
        FontFace::Outline(outline) => {
            let scaled = outline.as_scaled(font.scale());

            let mut width = 0.0f32;
            let mut prev_glyph: Option<GlyphId> = None;

            for c in text.chars() {
                let glyph_id = scaled.glyph_id(c);

                if let Some(prev) = prev_glyph {
                    width += scaled.kern(prev, glyph_id);
                }

                width += scaled.h_advance(glyph_id);
                prev_glyph = Some(glyph_id);
            }

            let height = scaled.ascent() - scaled.descent();
            TextMetrics::new(width.max(0.0).ceil() as u32, height.max(0.0).ceil() as u32)
        }
        FontFace::Bitmap(bitmap) => {
            let (width, height) = bitmap.measure(text);
            TextMetrics::new(width, height)
        }
    }
}
