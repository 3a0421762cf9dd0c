//! Watermark error types.
//!
//! Only `CompositingFailure` and `ExportIOFailure` ever reach a caller as an
//! `Err`. The other variants describe conditions that are resolved in place
//! (fallback font, clamped placement) and are surfaced through logging and
//! through [`WatermarkError::is_recoverable`].

use std::fmt;

/// Errors and degraded conditions of the watermark engine.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkError {
    /// Requested font or style unavailable; a fallback from the chain was used.
    FontResolutionDegraded { requested: String, resolved: String },

    /// Computed placement left the canvas and was clamped back into it.
    InvalidWatermarkGeometry {
        requested: (i32, i32),
        clamped: (i32, i32),
    },

    /// Unexpected failure while rendering or blending the watermark layer.
    CompositingFailure(String),

    /// The save primitive failed while exporting.
    ExportIOFailure(String),

    /// Color string could not be parsed.
    InvalidColor(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontResolutionDegraded {
                requested,
                resolved,
            } => write!(
                f,
                "Font '{}' unavailable, rendering with '{}'",
                requested, resolved
            ),
            Self::InvalidWatermarkGeometry { requested, clamped } => write!(
                f,
                "Watermark placement ({}, {}) is off-canvas, clamped to ({}, {})",
                requested.0, requested.1, clamped.0, clamped.1
            ),
            Self::CompositingFailure(msg) => write!(f, "Failed to composite watermark: {}", msg),
            Self::ExportIOFailure(msg) => write!(f, "Failed to export image: {}", msg),
            Self::InvalidColor(msg) => write!(f, "Invalid color: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}

impl WatermarkError {
    /// Whether the condition was already resolved by the engine and only
    /// needs to be reported.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FontResolutionDegraded { .. } | Self::InvalidWatermarkGeometry { .. }
        )
    }
}
