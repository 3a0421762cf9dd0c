//! Watermark compositor.
//!
//! Resolves the font, measures and places the text, draws it on a
//! transparent layer the size of the base image, then alpha-blends the
//! layer over the base.
//!
//! # Example
//!
//! ```ignore
//! use watermarker::watermark::{WatermarkCompositor, WatermarkSpec};
//!
//! let compositor = WatermarkCompositor::builtin();
//! let spec = WatermarkSpec::with_text("SAMPLE");
//! let output = compositor.render(&base, &spec);
//! ```

use super::font::{FontResolver, ResolvedFont};
use super::metrics::{measure, TextMetrics};
use super::position::{
    clamp_to_bounds, place, ImageDimensions, PlacementPosition, TextDimensions, DEFAULT_MARGIN,
};
use super::spec::WatermarkSpec;
use super::text_renderer::{draw_styled_text, TextStyle};
use super::WatermarkError;
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::Arc;

/// Where the watermark lands on a given image.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Top-left pixel, always inside the image.
    pub position: PlacementPosition,
    pub text: TextMetrics,
    /// Set when the anchor placement left the canvas and was clamped.
    pub adjusted: Option<WatermarkError>,
}

/// Renders [`WatermarkSpec`]s onto images.
///
/// Holds no per-render state, so identical inputs always give identical
/// output.
#[derive(Debug, Clone)]
pub struct WatermarkCompositor {
    resolver: Arc<FontResolver>,
    margin: u32,
}

impl WatermarkCompositor {
    pub fn new(resolver: Arc<FontResolver>) -> Self {
        Self {
            resolver,
            margin: DEFAULT_MARGIN,
        }
    }

    /// Compositor that renders with the built-in bitmap font only.
    pub fn builtin() -> Self {
        Self::new(Arc::new(FontResolver::builtin()))
    }

    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    pub fn resolver(&self) -> &FontResolver {
        &self.resolver
    }

    /// Font used to draw `spec.text`.
    pub fn resolve_font(&self, spec: &WatermarkSpec) -> ResolvedFont {
        self.resolver
            .resolve_for_text(&spec.font_request(), &spec.text)
    }

    /// Size of the rendered text box.
    pub fn measure(&self, spec: &WatermarkSpec) -> TextMetrics {
        if !spec.is_enabled() {
            return TextMetrics::default();
        }
        measure(&spec.text, &self.resolve_font(spec))
    }

    /// Placement of the watermark on an image of `image_size`.
    pub fn placement(&self, spec: &WatermarkSpec, image_size: (u32, u32)) -> Placement {
        let font = self.resolve_font(spec);
        self.place_with_font(spec, &font, image_size)
    }

    fn place_with_font(
        &self,
        spec: &WatermarkSpec,
        font: &ResolvedFont,
        image_size: (u32, u32),
    ) -> Placement {
        let metrics = measure(&spec.text, font);
        let image = ImageDimensions::new(image_size.0, image_size.1);
        let text = TextDimensions::from(metrics);

        let requested = place(
            spec.anchor,
            spec.custom_x,
            spec.custom_y,
            &text,
            &image,
            self.margin,
        );
        let position = clamp_to_bounds(requested, &image, &text);

        let adjusted = (position != requested).then(|| {
            let condition = WatermarkError::InvalidWatermarkGeometry {
                requested: (requested.x, requested.y),
                clamped: (position.x, position.y),
            };
            tracing::debug!(anchor = %spec.anchor, "{}", condition);
            condition
        });

        Placement {
            position,
            text: metrics,
            adjusted,
        }
    }

    /// Composite `spec` onto `base`.
    ///
    /// Never fails: on a compositing failure the error is logged and `base`
    /// is returned unchanged.
    pub fn render(&self, base: &DynamicImage, spec: &WatermarkSpec) -> DynamicImage {
        match self.try_render(base, spec) {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(error = %e, "Watermark skipped, returning base image");
                base.clone()
            }
        }
    }

    /// Composite `spec` onto `base`, reporting failures.
    ///
    /// Empty text returns `base` unchanged. 3-channel RGB input comes back
    /// as RGB of the same sample type; every other input comes back as RGBA.
    pub fn try_render(
        &self,
        base: &DynamicImage,
        spec: &WatermarkSpec,
    ) -> Result<DynamicImage, WatermarkError> {
        if !spec.is_enabled() || base.width() == 0 || base.height() == 0 {
            return Ok(base.clone());
        }

        let spec = spec.normalized();
        let font = self.resolve_font(&spec);
        let placement = self.place_with_font(&spec, &font, (base.width(), base.height()));

        let style = TextStyle {
            color: spec.color,
            alpha: spec.alpha(),
            shadow: spec.shadow,
            outline: spec.outline.then_some(spec.outline_color),
        };

        let mut layer = RgbaImage::new(base.width(), base.height());
        draw_styled_text(&mut layer, &spec.text, &font, placement.position, &style)?;

        let mut target = base.to_rgba8();
        blend_layer(&mut target, &layer)?;

        let target = DynamicImage::ImageRgba8(target);
        Ok(match base {
            DynamicImage::ImageRgb8(_) => DynamicImage::ImageRgb8(target.to_rgb8()),
            DynamicImage::ImageRgb16(_) => DynamicImage::ImageRgb16(target.to_rgb16()),
            DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb32F(target.to_rgb32f()),
            _ => target,
        })
    }
}

/// Blend a full-size layer over the target image.
fn blend_layer(target: &mut RgbaImage, layer: &RgbaImage) -> Result<(), WatermarkError> {
    if target.dimensions() != layer.dimensions() {
        return Err(WatermarkError::CompositingFailure(format!(
            "layer is {:?}, image is {:?}",
            layer.dimensions(),
            target.dimensions()
        )));
    }

    for (bg, fg) in target.pixels_mut().zip(layer.pixels()) {
        if fg[3] == 0 {
            continue;
        }
        *bg = blend_pixels(*bg, *fg);
    }

    Ok(())
}

/// Blend two pixels with the Porter-Duff "over" operator:
/// result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
