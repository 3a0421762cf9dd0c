//! Text rendering onto a transparent watermark layer.
//!
//! Glyphs are painted with coverage interpolation: a fully covered pixel
//! takes the ink color and alpha exactly, partially covered pixels move
//! toward the ink by their coverage. Overlapping strokes of the same ink
//! therefore never build up more alpha than requested.

use super::color::Color;
use super::font::{FontFace, ResolvedFont};
use super::position::PlacementPosition;
use super::WatermarkError;
use ab_glyph::{point, Font, GlyphId, ScaleFont};
use image::{Rgba, RgbaImage};

/// Offset of the drop shadow from the text.
pub const SHADOW_OFFSET: (i32, i32) = (2, 2);

/// The 8 neighbouring offsets used to stroke an outline.
pub const OUTLINE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Color, alpha and effects of the watermark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Color,
    pub alpha: u8,
    pub shadow: bool,
    pub outline: Option<Color>,
}

/// Draw the watermark text with its effects at `pos`.
///
/// Stacking from bottom to top: shadow, outline, main text.
pub fn draw_styled_text(
    layer: &mut RgbaImage,
    text: &str,
    font: &ResolvedFont,
    pos: PlacementPosition,
    style: &TextStyle,
) -> Result<(), WatermarkError> {
    if style.shadow {
        let ink = Color::black().with_alpha(style.alpha / 2);
        draw_text(
            layer,
            text,
            font,
            pos.x + SHADOW_OFFSET.0,
            pos.y + SHADOW_OFFSET.1,
            ink,
        )?;
    }

    if let Some(outline_color) = style.outline {
        let ink = outline_color.with_alpha(style.alpha);
        for (dx, dy) in OUTLINE_OFFSETS {
            draw_text(layer, text, font, pos.x + dx, pos.y + dy, ink)?;
        }
    }

    draw_text(layer, text, font, pos.x, pos.y, style.color.with_alpha(style.alpha))
}

/// Draw one pass of `text` with its top-left corner at `(x, y)`.
///
/// Pixels falling outside the layer are skipped.
pub fn draw_text(
    layer: &mut RgbaImage,
    text: &str,
    font: &ResolvedFont,
    x: i32,
    y: i32,
    ink: Rgba<u8>,
) -> Result<(), WatermarkError> {
    let size = font.size_px();
    if !size.is_finite() || size <= 0.0 {
        return Err(WatermarkError::CompositingFailure(format!(
            "invalid font size {}",
            size
        )));
    }

    match font.face() {
        FontFace::Outline(outline) => {
            let scale = font.scale();
            let scaled = outline.as_scaled(scale);
            let baseline_y = y as f32 + scaled.ascent();

            let mut cursor_x = x as f32;
            let mut prev_glyph: Option<GlyphId> = None;

            for c in text.chars() {
                let glyph_id = scaled.glyph_id(c);

                if let Some(prev) = prev_glyph {
                    cursor_x += scaled.kern(prev, glyph_id);
                }

                let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));

                if let Some(outlined) = outline.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    if !bounds.min.x.is_finite() || !bounds.min.y.is_finite() {
                        return Err(WatermarkError::CompositingFailure(format!(
                            "glyph bounds for '{}' are not finite",
                            c
                        )));
                    }

                    outlined.draw(|px, py, coverage| {
                        let gx = px as i32 + bounds.min.x as i32;
                        let gy = py as i32 + bounds.min.y as i32;
                        paint(layer, gx, gy, ink, coverage);
                    });
                }

                cursor_x += scaled.h_advance(glyph_id);
                prev_glyph = Some(glyph_id);
            }
        }
        FontFace::Bitmap(bitmap) => {
            bitmap.for_each_pixel(text, |px, py| paint(layer, x + px, y + py, ink, 1.0));
        }
    }

    Ok(())
}

/// Move the pixel at `(x, y)` toward `ink` by `coverage`.
fn paint(layer: &mut RgbaImage, x: i32, y: i32, ink: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= layer.width() as i32 || y >= layer.height() as i32 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    if coverage <= 0.0 {
        return;
    }

    let existing = layer.get_pixel(x as u32, y as u32);
    let painted = lerp_pixels(*existing, ink, coverage);
    layer.put_pixel(x as u32, y as u32, painted);
}

/// Interpolate alpha linearly and color weighted by alpha, so painting over
/// a transparent pixel keeps the ink color.
fn lerp_pixels(from: Rgba<u8>, to: Rgba<u8>, t: f32) -> Rgba<u8> {
    let from_weight = from[3] as f32 * (1.0 - t);
    let to_weight = to[3] as f32 * t;
    let total = from_weight + to_weight;

    let channel = |a: u8, b: u8| -> u8 {
        if total <= 0.0 {
            return b;
        }
        ((a as f32 * from_weight + b as f32 * to_weight) / total)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    let alpha = (from[3] as f32 + (to[3] as f32 - from[3] as f32) * t)
        .round()
        .clamp(0.0, 255.0) as u8;

    Rgba([
        channel(from[0], to[0]),
        channel(from[1], to[1]),
        channel(from[2], to[2]),
        alpha,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::bitmap_font::BitmapFont;

    fn layer(w: u32, h: u32) -> RgbaImage {
        RgbaImage::new(w, h)
    }

    fn style(alpha: u8) -> TextStyle {
        TextStyle {
            color: Color::white(),
            alpha,
            shadow: false,
            outline: None,
        }
    }

    fn lit(text: &str) -> Vec<(i32, i32)> {
        let mut pixels = Vec::new();
        BitmapFont.for_each_pixel(text, |x, y| pixels.push((x, y)));
        pixels
    }

    #[test]
    fn test_lerp_pixels() {
        let clear = Rgba([0, 0, 0, 0]);
        let ink = Rgba([200, 100, 50, 128]);
        assert_eq!(lerp_pixels(clear, ink, 1.0), ink);
        // Transparent pixels take the ink color, alpha follows coverage
        assert_eq!(lerp_pixels(clear, ink, 0.5), Rgba([200, 100, 50, 64]));

        let opaque = Rgba([10, 20, 30, 255]);
        assert_eq!(lerp_pixels(opaque, ink, 0.0), opaque);
        assert_eq!(lerp_pixels(opaque, ink, 1.0), ink);

        // Equal alphas interpolate color linearly
        let red = Rgba([255, 0, 0, 255]);
        let blue = Rgba([0, 0, 255, 255]);
        assert_eq!(lerp_pixels(red, blue, 0.5), Rgba([128, 0, 128, 255]));
    }

    #[test]
    fn test_main_text_has_exact_alpha() {
        let font = ResolvedFont::builtin();
        let mut img = layer(100, 30);
        draw_styled_text(&mut img, "H", &font, PlacementPosition::new(5, 5), &style(128))
            .unwrap();

        for (x, y) in lit("H") {
            assert_eq!(*img.get_pixel((x + 5) as u32, (y + 5) as u32), Rgba([255, 255, 255, 128]));
        }
        // Untouched pixels stay transparent
        assert_eq!(img.get_pixel(99, 29)[3], 0);
    }

    #[test]
    fn test_shadow_offset_and_alpha() {
        let font = ResolvedFont::builtin();
        let mut img = layer(60, 40);
        let mut s = style(200);
        s.shadow = true;
        draw_styled_text(&mut img, "_", &font, PlacementPosition::new(0, 0), &s).unwrap();

        // '_' is a single row at the bottom of the glyph (rows 12..14 at 2x)
        // Shadow rows land 2px lower, below the main stroke
        assert_eq!(*img.get_pixel(0, 12), Rgba([255, 255, 255, 200]));
        assert_eq!(*img.get_pixel(2, 15), Rgba([0, 0, 0, 100]));
    }

    #[test]
    fn test_outline_drawn_below_main_text() {
        let font = ResolvedFont::builtin();
        let mut img = layer(60, 40);
        let mut s = style(255);
        s.outline = Some(Color::new(255, 0, 0));
        draw_styled_text(&mut img, "|", &font, PlacementPosition::new(10, 10), &s).unwrap();

        // Main stroke covers x = 14..=15, outline shows one pixel to each side
        assert_eq!(*img.get_pixel(14, 12), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(13, 12), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(16, 12), Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(18, 12)[3], 0);
    }

    #[test]
    fn test_overlapping_outline_does_not_accumulate_alpha() {
        let font = ResolvedFont::builtin();
        let mut img = layer(60, 40);
        let mut s = style(100);
        s.outline = Some(Color::black());
        draw_styled_text(&mut img, "|", &font, PlacementPosition::new(10, 10), &s).unwrap();

        let max_alpha = img.pixels().map(|p| p[3]).max().unwrap();
        assert_eq!(max_alpha, 100);
    }

    #[test]
    fn test_text_clipped_at_layer_edges() {
        let font = ResolvedFont::builtin();
        let mut img = layer(10, 10);
        draw_text(&mut img, "WWWW", &font, -6, -6, Rgba([1, 2, 3, 255])).unwrap();
        draw_text(&mut img, "WWWW", &font, 100, 100, Rgba([1, 2, 3, 255])).unwrap();
        assert!(img.pixels().any(|p| p[3] == 255));
    }

    #[test]
    #[ignore = "requires DejaVuSans.ttf under /usr/share/fonts/truetype/dejavu"]
    fn test_outline_font_draws_pixels() {
        let data = crate::watermark::font::tests::system_test_font();
        let resolver = crate::watermark::font::FontResolver::new(std::sync::Arc::new(
            crate::watermark::font::MemoryFontCatalog::new().with_font("dejavusans.ttf", data),
        ));
        let font = resolver.resolve(&crate::watermark::font::FontRequest::new(
            "DejaVu Sans",
            false,
            false,
            32,
        ));

        let mut img = layer(200, 60);
        draw_text(&mut img, "Mark", &font, 10, 10, Rgba([255, 0, 0, 255])).unwrap();
        let painted = img.pixels().filter(|p| p[3] > 0).count();
        assert!(painted > 50);
        assert!(img.pixels().all(|p| p[3] == 0 || p[0] == 255));
    }
}
