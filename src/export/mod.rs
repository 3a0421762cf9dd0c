//! Watermarked image export.
//!
//! [`export`] renders the watermark, optionally resizes, encodes, and hands
//! the bytes to an [`ImageSink`]. [`FileSink`] writes through a temporary
//! file in the target directory and renames it into place, so a failed
//! export never leaves a partial file under the output name.

pub mod encoder;
pub mod error;
pub mod format;

pub use encoder::{EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use error::ExportError;
pub use format::{FormatHint, OutputFormat};

use crate::watermark::{WatermarkCompositor, WatermarkSpec};
use image::imageops::FilterType;
use image::DynamicImage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: FormatHint,
    /// 1-100, only used by lossy formats.
    pub quality: u8,
    /// Exact output size, applied after the watermark is composited.
    pub resize: Option<(u32, u32)>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: FormatHint::SameAsPath,
            quality: DEFAULT_QUALITY,
            resize: None,
        }
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub bytes_written: usize,
    pub dimensions: (u32, u32),
}

/// Destination for encoded bytes.
pub trait ImageSink: Send + Sync {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ExportError>;
}

/// Writes to the filesystem atomically.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl ImageSink for FileSink {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ExportError::io(path, e))?;
        tmp.write_all(bytes).map_err(|e| ExportError::io(path, e))?;
        tmp.flush().map_err(|e| ExportError::io(path, e))?;
        tmp.persist(path).map_err(|e| ExportError::io(path, e.error))?;

        Ok(())
    }
}

/// Keeps exported files in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

impl ImageSink for MemorySink {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
        self.files.lock().insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

/// How an exported file is named after its source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamingRule {
    /// Keep the source file stem.
    #[default]
    Original,
    Prefix(String),
    Suffix(String),
}

impl NamingRule {
    pub fn apply(&self, stem: &str) -> String {
        match self {
            Self::Original => stem.to_string(),
            Self::Prefix(prefix) => format!("{}{}", prefix, stem),
            Self::Suffix(suffix) => format!("{}{}", stem, suffix),
        }
    }
}

/// Sub-directory next to the source used when exports must not overwrite
/// originals.
pub const EXPORT_SUBDIR: &str = "export";

/// Export directory for `source` when none is chosen: an `export`
/// directory beside the source file.
pub fn default_export_dir(source: &Path) -> PathBuf {
    source
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(EXPORT_SUBDIR)
}

/// Output path for exporting `source` into `dir`.
///
/// With [`FormatHint::SameAsPath`] the source extension is kept and must
/// be one we can encode.
pub fn output_path_for(
    source: &Path,
    dir: &Path,
    rule: &NamingRule,
    format: FormatHint,
) -> Result<PathBuf, ExportError> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let extension = match format {
        FormatHint::Explicit(format) => format.extension().to_string(),
        FormatHint::SameAsPath => {
            FormatHint::SameAsPath.resolve(source)?;
            source
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default()
        }
    };

    Ok(dir.join(format!("{}.{}", rule.apply(&stem), extension)))
}

/// Composite `spec` onto `image` and write the result to `output_path`.
///
/// A compositing failure aborts the export rather than writing an
/// unwatermarked image.
pub fn export(
    compositor: &WatermarkCompositor,
    image: &DynamicImage,
    spec: &WatermarkSpec,
    output_path: &Path,
    options: &ExportOptions,
    sink: &dyn ImageSink,
) -> Result<ExportReport, ExportError> {
    let result = export_inner(compositor, image, spec, output_path, options, sink);

    match &result {
        Ok(report) => tracing::info!(
            path = %report.path.display(),
            format = %report.format,
            bytes = report.bytes_written,
            width = report.dimensions.0,
            height = report.dimensions.1,
            "Image exported"
        ),
        Err(e) => tracing::error!(
            path = %output_path.display(),
            error = %e,
            "Export failed"
        ),
    }

    result
}

fn export_inner(
    compositor: &WatermarkCompositor,
    image: &DynamicImage,
    spec: &WatermarkSpec,
    output_path: &Path,
    options: &ExportOptions,
    sink: &dyn ImageSink,
) -> Result<ExportReport, ExportError> {
    let format = options.format.resolve(output_path)?;

    let mut rendered = compositor.try_render(image, spec)?;

    if let Some((width, height)) = options.resize {
        if width == 0 || height == 0 {
            return Err(ExportError::InvalidDimensions { width, height });
        }
        if (width, height) != (rendered.width(), rendered.height()) {
            rendered = rendered.resize_exact(width, height, FilterType::Lanczos3);
        }
    }

    let encoded = EncoderFactory::create(format)
        .encode(&rendered, EncoderQuality::with_quality(options.quality))?;

    sink.write(output_path, &encoded.data)?;

    Ok(ExportReport {
        path: output_path.to_path_buf(),
        format,
        bytes_written: encoded.data.len(),
        dimensions: (rendered.width(), rendered.height()),
    })
}
