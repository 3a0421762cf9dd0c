//! Declarative watermark descriptor.
//!
//! One [`WatermarkSpec`] belongs to each image in the working set. It is a
//! plain value: the caller mutates it and then asks for a re-render, nothing
//! observes it implicitly.

use super::color::Color;
use super::font::FontRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

// Default values
fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_font_size() -> u32 {
    36
}

fn default_opacity() -> u8 {
    50
}

/// Symbolic placement of the watermark's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
    /// Free-form position taken from `custom_x` / `custom_y`.
    Custom,
}

impl Anchor {
    pub const ALL: [Anchor; 6] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::Center,
        Anchor::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
            Self::Custom => "custom",
        }
    }

    /// Parse an anchor name. Unknown names fall back to `BottomRight`.
    pub fn parse_lenient(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "top-left" | "topleft" => Self::TopLeft,
            "top-right" | "topright" => Self::TopRight,
            "bottom-left" | "bottomleft" => Self::BottomLeft,
            "bottom-right" | "bottomright" => Self::BottomRight,
            "center" | "centre" => Self::Center,
            "custom" => Self::Custom,
            other => {
                tracing::debug!(anchor = other, "Unknown anchor, using bottom-right");
                Self::BottomRight
            }
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Anchor {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.as_str().to_string()
    }
}

/// Full description of one image's watermark appearance and position.
///
/// An empty `text` disables the watermark. `custom_x` / `custom_y` keep
/// their values while another anchor is active, so switching back to
/// `Custom` restores the last free-form position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSpec {
    pub text: String,

    /// Font family name (default: "Arial")
    pub font_family: String,
    pub bold: bool,
    pub italic: bool,

    /// Font size in points, at least 1 (default: 36)
    pub font_size_pt: u32,

    /// Text color (default: white)
    pub color: Color,

    /// Opacity from 0 to 100 percent (default: 50)
    pub opacity_percent: u8,

    pub shadow: bool,
    pub outline: bool,
    pub outline_color: Color,

    pub anchor: Anchor,

    /// Image-space position used when `anchor` is `Custom`
    pub custom_x: i32,
    pub custom_y: i32,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: default_font_family(),
            bold: false,
            italic: false,
            font_size_pt: default_font_size(),
            color: Color::white(),
            opacity_percent: default_opacity(),
            shadow: false,
            outline: false,
            outline_color: Color::black(),
            anchor: Anchor::default(),
            custom_x: 0,
            custom_y: 0,
        }
    }
}

impl WatermarkSpec {
    /// Spec with the given text and default styling.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether anything will be drawn.
    pub fn is_enabled(&self) -> bool {
        !self.text.is_empty()
    }

    /// Layer alpha for the configured opacity.
    pub fn alpha(&self) -> u8 {
        opacity_to_alpha(self.opacity_percent)
    }

    /// Font parameters of this spec.
    pub fn font_request(&self) -> FontRequest {
        FontRequest {
            family: self.font_family.clone(),
            bold: self.bold,
            italic: self.italic,
            size_pt: self.font_size_pt.max(1),
        }
    }

    /// Switch to free-form placement at the given image-space position.
    ///
    /// The position is clamped so a `text_size` box stays inside
    /// `image_size`, degenerating to 0 when the text is larger than the image.
    pub fn place_custom(&mut self, x: i32, y: i32, text_size: (u32, u32), image_size: (u32, u32)) {
        let max_x = (image_size.0 as i64 - text_size.0 as i64).max(0) as i32;
        let max_y = (image_size.1 as i64 - text_size.1 as i64).max(0) as i32;
        self.anchor = Anchor::Custom;
        self.custom_x = x.clamp(0, max_x);
        self.custom_y = y.clamp(0, max_y);
    }

    /// Copy with out-of-range values pulled back into their domains.
    pub fn normalized(&self) -> Self {
        let mut spec = self.clone();
        spec.font_size_pt = spec.font_size_pt.max(1);
        spec.opacity_percent = spec.opacity_percent.min(100);
        spec
    }
}

/// Convert an opacity percentage to an 8-bit alpha.
///
/// Integer round-half-up of `percent * 2.55`, so 50% maps to 128 and 100%
/// to 255. Values above 100 are clamped.
pub fn opacity_to_alpha(percent: u8) -> u8 {
    let percent = percent.min(100) as u32;
    ((percent * 255 + 50) / 100) as u8
}
