//! In-memory working set of images.
//!
//! A [`Workspace`] holds the imported images, which one is current, and
//! the compositor used to render and preview them. Every image carries its
//! own [`WatermarkSpec`], seeded from the workspace default when added.

pub mod entry;

pub use entry::{format_file_size, ImageEntry, ImageInfo};

use crate::adjust::Filter;
use crate::export::{self, ExportError, ExportOptions, ExportReport, ImageSink};
use crate::preview::{PlacementContext, PreviewTransform, DEFAULT_BOX_HEIGHT, DEFAULT_BOX_WIDTH};
use crate::watermark::{WatermarkCompositor, WatermarkSpec};
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;
use walkdir::WalkDir;

/// File extensions picked up when importing a directory.
pub const IMPORT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif", "webp"];

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image selected")]
    NoImageSelected,

    #[error("Image index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Outcome of importing a batch of paths.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub added: Vec<Uuid>,
    /// Paths already in the working set.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<SessionError>,
}

/// Rendered image scaled to fit a display box.
#[derive(Debug, Clone)]
pub struct Preview {
    pub image: DynamicImage,
    pub transform: PreviewTransform,
}

#[derive(Debug)]
pub struct Workspace {
    entries: Vec<ImageEntry>,
    current: Option<usize>,
    compositor: WatermarkCompositor,
    default_spec: WatermarkSpec,
    default_box: (u32, u32),
}

impl Workspace {
    pub fn new(compositor: WatermarkCompositor, default_spec: WatermarkSpec) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            compositor,
            default_spec,
            default_box: (DEFAULT_BOX_WIDTH, DEFAULT_BOX_HEIGHT),
        }
    }

    /// Display box used when the preview box is not laid out yet.
    pub fn with_default_box(mut self, width: u32, height: u32) -> Self {
        self.default_box = (width, height);
        self
    }

    pub fn compositor(&self) -> &WatermarkCompositor {
        &self.compositor
    }

    pub fn default_spec(&self) -> &WatermarkSpec {
        &self.default_spec
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&ImageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&ImageEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn current_mut(&mut self) -> Option<&mut ImageEntry> {
        match self.current {
            Some(i) => self.entries.get_mut(i),
            None => None,
        }
    }

    fn current_or_err(&mut self) -> Result<&mut ImageEntry, SessionError> {
        self.current_mut().ok_or(SessionError::NoImageSelected)
    }

    fn contains_path(&self, path: &Path) -> bool {
        self.entries
            .iter()
            .any(|e| e.path.as_deref() == Some(path))
    }

    /// Add a decoded image. The first image added becomes current.
    pub fn add_image(&mut self, name: impl Into<String>, image: DynamicImage) -> Uuid {
        self.push(ImageEntry::new(name, image, self.default_spec.clone()))
    }

    fn push(&mut self, entry: ImageEntry) -> Uuid {
        let id = entry.id;
        self.entries.push(entry);
        if self.current.is_none() {
            self.current = Some(self.entries.len() - 1);
        }
        id
    }

    /// Load image files. Paths already present are skipped and load
    /// failures are collected without stopping the batch.
    pub fn add_paths<I, P>(&mut self, paths: I) -> ImportReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = ImportReport::default();

        for path in paths {
            let path = path.as_ref();
            if self.contains_path(path) {
                report.skipped.push(path.to_path_buf());
                continue;
            }

            match load_entry(path, &self.default_spec) {
                Ok(entry) => {
                    tracing::debug!(path = %path.display(), id = %entry.id, "Image added");
                    report.added.push(self.push(entry));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping image");
                    report.failed.push(e);
                }
            }
        }

        tracing::info!(
            added = report.added.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Images imported"
        );
        report
    }

    /// Import every supported image file directly inside `dir`, in name
    /// order.
    pub fn add_directory(&mut self, dir: &Path) -> ImportReport {
        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_importable(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            tracing::info!(dir = %dir.display(), "No supported images in directory");
        }
        self.add_paths(paths)
    }

    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.entries.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.current = Some(index);
        Ok(())
    }

    /// Remove an image together with its watermark spec.
    pub fn remove(&mut self, id: Uuid) -> Option<ImageEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let removed = self.entries.remove(index);

        self.current = match self.current {
            _ if self.entries.is_empty() => None,
            Some(current) if current > index => Some(current - 1),
            Some(current) => Some(current.min(self.entries.len() - 1)),
            None => None,
        };

        Some(removed)
    }

    pub fn set_brightness(&mut self, factor: f32) -> Result<(), SessionError> {
        self.current_or_err()?.set_brightness(factor);
        Ok(())
    }

    pub fn set_contrast(&mut self, factor: f32) -> Result<(), SessionError> {
        self.current_or_err()?.set_contrast(factor);
        Ok(())
    }

    pub fn set_brightness_contrast(
        &mut self,
        brightness: f32,
        contrast: f32,
    ) -> Result<(), SessionError> {
        self.current_or_err()?.set_brightness_contrast(brightness, contrast);
        Ok(())
    }

    pub fn apply_filter(&mut self, filter: Filter) -> Result<(), SessionError> {
        self.current_or_err()?.apply_filter(filter);
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.current_or_err()?.reset();
        Ok(())
    }

    /// Returns whether there was anything to undo.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        Ok(self.current_or_err()?.undo())
    }

    pub fn info(&self) -> Option<ImageInfo> {
        let index = self.current?;
        let entry = self.entries.get(index)?;
        let (width, height) = entry.dimensions();
        Some(ImageInfo {
            width,
            height,
            file_size_label: format_file_size(entry.file_size),
            position: index + 1,
            total: self.entries.len(),
        })
    }

    /// Current image with its watermark, at full resolution.
    pub fn render_current(&self) -> Option<DynamicImage> {
        let entry = self.current()?;
        Some(self.compositor.render(entry.processed(), &entry.spec))
    }

    fn transform_for(&self, entry: &ImageEntry, box_width: u32, box_height: u32) -> PreviewTransform {
        PreviewTransform::fit_with_default(
            entry.dimensions(),
            (box_width, box_height),
            self.default_box,
        )
    }

    /// Current image rendered and scaled down to fit the display box.
    pub fn preview(&self, box_width: u32, box_height: u32) -> Option<Preview> {
        let entry = self.current()?;
        let transform = self.transform_for(entry, box_width, box_height);
        let rendered = self.compositor.render(entry.processed(), &entry.spec);

        let (width, height) = transform.display_size();
        let image = if (width, height) == transform.image_size() || width == 0 || height == 0 {
            rendered
        } else {
            rendered.resize_exact(width, height, FilterType::Lanczos3)
        };

        Some(Preview { image, transform })
    }

    /// Geometry for dragging the current watermark in a display box.
    pub fn placement_context(&self, box_width: u32, box_height: u32) -> Option<PlacementContext> {
        let entry = self.current()?;
        let transform = self.transform_for(entry, box_width, box_height);
        let text = self.compositor.measure(&entry.spec);
        Some(PlacementContext::new(transform, text.as_tuple()))
    }

    /// Export the current image with its watermark.
    pub fn export_current(
        &self,
        output_path: &Path,
        options: &ExportOptions,
        sink: &dyn ImageSink,
    ) -> Result<ExportReport, SessionError> {
        let entry = self.current().ok_or(SessionError::NoImageSelected)?;
        let report = export::export(
            &self.compositor,
            entry.processed(),
            &entry.spec,
            output_path,
            options,
            sink,
        )?;
        Ok(report)
    }
}

fn is_importable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMPORT_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn load_entry(path: &Path, spec: &WatermarkSpec) -> Result<ImageEntry, SessionError> {
    let image = image::open(path).map_err(|source| SessionError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImageEntry::new(name, image, spec.clone()).with_path(path.to_path_buf(), file_size))
}
