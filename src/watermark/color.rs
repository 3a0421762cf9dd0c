//! RGB colors for watermark text, outline and shadow.
//!
//! Colors are stored as three bytes and serialized as `#RRGGBB` strings so
//! templates and YAML configuration stay readable.

use super::WatermarkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Pixel with the given alpha.
    pub fn with_alpha(&self, alpha: u8) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, alpha])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = WatermarkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_hex_color(&value)
    }
}

impl From<[u8; 3]> for Color {
    fn from(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats.
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let digits = hex
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::InvalidColor(format!("'{}' must start with '#'", hex)))?;

    let component = |s: &str| {
        u8::from_str_radix(s, 16)
            .map_err(|_| WatermarkError::InvalidColor(format!("invalid hex digit in '{}'", hex)))
    };

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WatermarkError::InvalidColor(format!(
            "invalid hex digit in '{}'",
            hex
        )));
    }

    match digits.len() {
        3 => {
            // Double each component: 0xF -> 0xFF, 0xA -> 0xAA
            let r = component(&digits[0..1])?;
            let g = component(&digits[1..2])?;
            let b = component(&digits[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::new(
            component(&digits[0..2])?,
            component(&digits[2..4])?,
            component(&digits[4..6])?,
        )),
        n => Err(WatermarkError::InvalidColor(format!(
            "'{}' must be #RGB or #RRGGBB, got {} digits",
            hex, n
        ))),
    }
}
