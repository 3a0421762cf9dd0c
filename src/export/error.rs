//! Export error types

use crate::watermark::WatermarkError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an export. Nothing is left under the output name when
/// one of these is returned.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode to {format}: {message}")]
    Encode { format: String, message: String },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid output size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Compositing(#[from] WatermarkError),
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            format: format.into(),
            message: message.into(),
        }
    }

    /// The watermark taxonomy entry for this failure.
    pub fn to_watermark_error(&self) -> WatermarkError {
        match self {
            Self::Compositing(e) => e.clone(),
            other => WatermarkError::ExportIOFailure(other.to_string()),
        }
    }
}
