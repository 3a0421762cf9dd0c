//! Named watermark templates persisted as a JSON document.
//!
//! The document is a single object mapping template names to
//! [`WatermarkSpec`] values. A missing or unreadable document reads as an
//! empty store; only writes can fail.

use crate::watermark::WatermarkSpec;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Default location of the template document.
pub const DEFAULT_TEMPLATE_PATH: &str = "watermark_templates.json";

pub type Templates = BTreeMap<String, WatermarkSpec>;

#[derive(Error, Debug)]
pub enum TemplateStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
}

impl TemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored template. Never fails: a missing document is an empty
    /// store, and a corrupt one is logged and treated as empty.
    pub fn load_all(&self) -> Templates {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No template store yet");
                return Templates::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Template store unreadable, using empty set"
                );
                return Templates::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(templates) => templates,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Template store corrupt, using empty set"
                );
                Templates::new()
            }
        }
    }

    /// Replace the stored document with `templates`.
    pub fn save_all(&self, templates: &Templates) -> Result<(), TemplateStoreError> {
        let json = serde_json::to_string_pretty(templates)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!(
            path = %self.path.display(),
            count = templates.len(),
            "Templates saved"
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<WatermarkSpec> {
        self.load_all().remove(name)
    }

    /// Insert or replace one template.
    pub fn put(&self, name: &str, spec: WatermarkSpec) -> Result<(), TemplateStoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TemplateStoreError::EmptyName);
        }
        let mut templates = self.load_all();
        templates.insert(name.to_string(), spec);
        self.save_all(&templates)
    }

    /// Returns whether the template existed.
    pub fn delete(&self, name: &str) -> Result<bool, TemplateStoreError> {
        let mut templates = self.load_all();
        if templates.remove(name).is_none() {
            return Ok(false);
        }
        self.save_all(&templates)?;
        Ok(true)
    }

    pub fn names(&self) -> Vec<String> {
        self.load_all().into_keys().collect()
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_PATH)
    }
}
