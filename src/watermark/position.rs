//! Anchor resolution for watermark placement.
//!
//! Maps an [`Anchor`] plus text and image dimensions to the top-left pixel
//! of the watermark.
//!
//! # Example
//!
//! ```ignore
//! use watermarker::watermark::position::{place, ImageDimensions, TextDimensions};
//! use watermarker::watermark::Anchor;
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! let text = TextDimensions { width: 100, height: 50 };
//!
//! let pos = place(Anchor::BottomRight, 0, 0, &text, &image, 10);
//! assert_eq!((pos.x, pos.y), (690, 540)); // 800 - 100 - 10, 600 - 50 - 10
//! ```

use super::metrics::TextMetrics;
use super::spec::Anchor;

/// Margin between corner-anchored text and the image edges.
pub const DEFAULT_MARGIN: u32 = 10;

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Dimensions of the rendered text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDimensions {
    pub width: u32,
    pub height: u32,
}

impl From<TextMetrics> for TextDimensions {
    fn from(metrics: TextMetrics) -> Self {
        Self {
            width: metrics.width,
            height: metrics.height,
        }
    }
}

/// Top-left pixel of the watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Calculate the top-left position for an anchor.
///
/// Corner anchors sit `margin` pixels in from their edges. `Center` centers
/// with integer truncation toward zero. `Custom` clamps `(custom_x, custom_y)`
/// into the image.
///
/// Corner and center results are not clamped and may be negative when the
/// text is larger than the image; see [`clamp_to_bounds`].
pub fn place(
    anchor: Anchor,
    custom_x: i32,
    custom_y: i32,
    text: &TextDimensions,
    image: &ImageDimensions,
    margin: u32,
) -> PlacementPosition {
    let img_w = image.width as i32;
    let img_h = image.height as i32;
    let txt_w = text.width as i32;
    let txt_h = text.height as i32;
    let m = margin as i32;

    match anchor {
        Anchor::TopLeft => PlacementPosition::new(m, m),
        Anchor::TopRight => PlacementPosition::new(img_w - txt_w - m, m),
        Anchor::BottomLeft => PlacementPosition::new(m, img_h - txt_h - m),
        Anchor::BottomRight => PlacementPosition::new(img_w - txt_w - m, img_h - txt_h - m),
        Anchor::Center => PlacementPosition::new((img_w - txt_w) / 2, (img_h - txt_h) / 2),
        Anchor::Custom => clamp_to_bounds(PlacementPosition::new(custom_x, custom_y), image, text),
    }
}

/// Clamp a position so the text box stays within the image.
///
/// When the text is larger than the image along an axis, that coordinate
/// degenerates to 0.
pub fn clamp_to_bounds(
    pos: PlacementPosition,
    image: &ImageDimensions,
    text: &TextDimensions,
) -> PlacementPosition {
    let max_x = (image.width as i32 - text.width as i32).max(0);
    let max_y = (image.height as i32 - text.height as i32).max(0);

    PlacementPosition::new(pos.x.clamp(0, max_x), pos.y.clamp(0, max_y))
}

/// Check whether the whole text box lies inside the image.
pub fn is_contained(
    pos: &PlacementPosition,
    image: &ImageDimensions,
    text: &TextDimensions,
) -> bool {
    pos.x >= 0
        && pos.y >= 0
        && pos.x + text.width as i32 <= image.width as i32
        && pos.y + text.height as i32 <= image.height as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn image(w: u32, h: u32) -> ImageDimensions {
        ImageDimensions::new(w, h)
    }

    fn text(w: u32, h: u32) -> TextDimensions {
        TextDimensions {
            width: w,
            height: h,
        }
    }

    // Test: every anchor on an 800x600 image with a 100x50 text box
    #[rstest]
    #[case(Anchor::TopLeft, 10, 10)]
    #[case(Anchor::TopRight, 690, 10)]
    #[case(Anchor::BottomLeft, 10, 540)]
    #[case(Anchor::BottomRight, 690, 540)]
    #[case(Anchor::Center, 350, 275)]
    fn test_place_anchor(#[case] anchor: Anchor, #[case] x: i32, #[case] y: i32) {
        let pos = place(anchor, 0, 0, &text(100, 50), &image(800, 600), 10);
        assert_eq!(pos, PlacementPosition::new(x, y));
    }

    #[test]
    fn test_center_truncates_toward_zero() {
        // (801 - 100) / 2 = 350.5 -> 350, (600 - 51) / 2 = 274.5 -> 274
        let pos = place(Anchor::Center, 0, 0, &text(100, 51), &image(801, 600), 10);
        assert_eq!(pos, PlacementPosition::new(350, 274));

        // Text wider than the image: (100 - 131) / 2 = -15.5 -> -15
        let pos = place(Anchor::Center, 0, 0, &text(131, 10), &image(100, 100), 10);
        assert_eq!(pos.x, -15);
    }

    #[test]
    fn test_margin_zero() {
        let pos = place(Anchor::BottomRight, 0, 0, &text(100, 50), &image(800, 600), 0);
        assert_eq!(pos, PlacementPosition::new(700, 550));
    }

    #[test]
    fn test_custom_clamped() {
        let img = image(800, 600);
        let txt = text(100, 50);
        assert_eq!(
            place(Anchor::Custom, 200, 200, &txt, &img, 10),
            PlacementPosition::new(200, 200)
        );
        assert_eq!(
            place(Anchor::Custom, 750, -20, &txt, &img, 10),
            PlacementPosition::new(700, 0)
        );
        // Custom ignores the margin
        assert_eq!(
            place(Anchor::Custom, 0, 0, &txt, &img, 10),
            PlacementPosition::new(0, 0)
        );
    }

    #[test]
    fn test_custom_text_larger_than_image() {
        let pos = place(Anchor::Custom, 40, 40, &text(900, 700), &image(800, 600), 10);
        assert_eq!(pos, PlacementPosition::new(0, 0));
    }

    #[test]
    fn test_corner_anchors_stay_inside_when_text_fits() {
        let img = image(320, 240);
        for w in [1u32, 50, 150, 299] {
            for h in [1u32, 30, 100, 219] {
                let txt = text(w, h);
                for anchor in [
                    Anchor::TopLeft,
                    Anchor::TopRight,
                    Anchor::BottomLeft,
                    Anchor::BottomRight,
                ] {
                    let pos = place(anchor, 0, 0, &txt, &img, DEFAULT_MARGIN);
                    assert!(
                        is_contained(&pos, &img, &txt),
                        "{:?} with {}x{} left the image at {:?}",
                        anchor,
                        w,
                        h,
                        pos
                    );
                }
            }
        }
    }

    #[test]
    fn test_clamp_to_bounds() {
        let img = image(800, 600);
        let txt = text(100, 50);
        assert_eq!(
            clamp_to_bounds(PlacementPosition::new(-10, -20), &img, &txt),
            PlacementPosition::new(0, 0)
        );
        assert_eq!(
            clamp_to_bounds(PlacementPosition::new(750, 580), &img, &txt),
            PlacementPosition::new(700, 550)
        );
        assert_eq!(
            clamp_to_bounds(PlacementPosition::new(-50, -50), &img, &text(1000, 800)),
            PlacementPosition::new(0, 0)
        );
    }

    #[test]
    fn test_is_contained() {
        let img = image(100, 100);
        let txt = text(20, 20);
        assert!(is_contained(&PlacementPosition::new(0, 0), &img, &txt));
        assert!(is_contained(&PlacementPosition::new(80, 80), &img, &txt));
        assert!(!is_contained(&PlacementPosition::new(81, 0), &img, &txt));
        assert!(!is_contained(&PlacementPosition::new(-1, 0), &img, &txt));
    }
}
