//! One image in the working set.

use crate::adjust::{self, Filter};
use crate::watermark::WatermarkSpec;
use image::DynamicImage;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// A loaded image with its adjustment state and watermark.
///
/// `original` is never modified. `processed` is the adjusted image the
/// watermark is drawn on; `previous` holds the state before the last
/// change for a single-step undo.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub id: Uuid,
    /// Source file, `None` for images added from memory.
    pub path: Option<PathBuf>,
    pub name: String,
    pub spec: WatermarkSpec,
    /// Size of the source file in bytes.
    pub file_size: u64,
    original: DynamicImage,
    processed: DynamicImage,
    previous: Option<DynamicImage>,
}

impl ImageEntry {
    pub fn new(name: impl Into<String>, image: DynamicImage, spec: WatermarkSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: None,
            name: name.into(),
            spec,
            file_size: 0,
            processed: image.clone(),
            original: image,
            previous: None,
        }
    }

    pub fn with_path(mut self, path: PathBuf, file_size: u64) -> Self {
        self.path = Some(path);
        self.file_size = file_size;
        self
    }

    pub fn original(&self) -> &DynamicImage {
        &self.original
    }

    pub fn processed(&self) -> &DynamicImage {
        &self.processed
    }

    pub fn can_undo(&self) -> bool {
        self.previous.is_some()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.processed.width(), self.processed.height())
    }

    fn replace_processed(&mut self, image: DynamicImage) {
        let old = std::mem::replace(&mut self.processed, image);
        self.previous = Some(old);
    }

    /// Brightness of the original. Replaces earlier adjustments.
    pub fn set_brightness(&mut self, factor: f32) {
        let image = adjust::brightness(&self.original, factor);
        self.replace_processed(image);
    }

    /// Contrast of the original. Replaces earlier adjustments.
    pub fn set_contrast(&mut self, factor: f32) {
        let image = adjust::contrast(&self.original, factor);
        self.replace_processed(image);
    }

    /// Brightness then contrast of the original, as one change.
    pub fn set_brightness_contrast(&mut self, brightness: f32, contrast: f32) {
        let brightened = adjust::brightness(&self.original, brightness);
        let image = adjust::contrast(&brightened, contrast);
        self.replace_processed(image);
    }

    /// Filter the current processed image, stacking on earlier filters.
    pub fn apply_filter(&mut self, filter: Filter) {
        let image = adjust::apply_filter(&self.processed, filter);
        self.replace_processed(image);
    }

    pub fn reset(&mut self) {
        let image = self.original.clone();
        self.replace_processed(image);
    }

    /// Swap back to the state before the last change. Undoing twice redoes.
    pub fn undo(&mut self) -> bool {
        match self.previous.as_mut() {
            Some(previous) => {
                std::mem::swap(&mut self.processed, previous);
                true
            }
            None => false,
        }
    }
}

/// Summary shown for the current image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub file_size_label: String,
    /// 1-based position in the working set.
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}px, {}, image {}/{}",
            self.width, self.height, self.file_size_label, self.position, self.total
        )
    }
}

/// Human readable size with one decimal: "512.0 B", "1.5 KB", "2.0 MB".
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}
