// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::export::{ExportOptions, FormatHint, DEFAULT_QUALITY};
use crate::preview::{DEFAULT_BOX_HEIGHT, DEFAULT_BOX_WIDTH};
use crate::session::Workspace;
use crate::templates::{TemplateStore, DEFAULT_TEMPLATE_PATH};
use crate::watermark::font::DEFAULT_FALLBACK_FONTS;
use crate::watermark::{
    DirectoryFontCatalog, FontResolver, WatermarkCompositor, WatermarkSpec, DEFAULT_MARGIN,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fonts: FontConfig,
    pub preview: PreviewConfig,
    pub watermark: WatermarkConfig,
    pub export: ExportConfig,
    pub templates: TemplateConfig,
    pub logging: LoggingConfig,
}

fn default_fallback_fonts() -> Vec<String> {
    DEFAULT_FALLBACK_FONTS.iter().map(|s| s.to_string()).collect()
}

/// Font discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Directories scanned for font files (empty: platform defaults)
    pub directories: Vec<PathBuf>,

    /// Wide-coverage fonts tried when the requested font cannot render the
    /// text, in order
    pub fallback_fonts: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            fallback_fonts: default_fallback_fonts(),
        }
    }
}

/// Preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Display box used before the real one is laid out (default: 600x400)
    pub default_box_width: u32,
    pub default_box_height: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            default_box_width: DEFAULT_BOX_WIDTH,
            default_box_height: DEFAULT_BOX_HEIGHT,
        }
    }
}

/// Watermark defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Distance from the image edge for corner anchors in pixels (default: 10)
    pub margin: u32,

    /// Spec given to newly added images
    pub defaults: WatermarkSpec,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            defaults: WatermarkSpec::default(),
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// JPEG quality 1-100 (default: 95)
    pub default_quality: u8,

    /// Output format: same, jpeg, png, webp, bmp, gif or tiff (default: same)
    pub default_format: FormatHint,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            default_format: FormatHint::SameAsPath,
        }
    }
}

/// Template store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub path: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by RUST_LOG (default: info)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // Every referenced variable must be set
        let mut values = HashMap::new();
        for caps in re.captures_iter(yaml) {
            let var_name = caps[1].to_string();
            let value = std::env::var(&var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
            values.insert(var_name, value);
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        });

        // An empty document is a valid, all-default config
        if substituted.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.preview.default_box_width == 0 || self.preview.default_box_height == 0 {
            return Err(format!(
                "Preview default box must be non-zero, got {}x{}",
                self.preview.default_box_width, self.preview.default_box_height
            ));
        }

        if !(1..=100).contains(&self.export.default_quality) {
            return Err(format!(
                "Export quality must be between 1 and 100, got {}",
                self.export.default_quality
            ));
        }

        if self.templates.path.as_os_str().is_empty() {
            return Err("Template store path cannot be empty".to_string());
        }

        if let Some(index) = self
            .fonts
            .fallback_fonts
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(format!("Fallback font #{} has an empty name", index + 1));
        }

        if self.watermark.defaults.opacity_percent > 100 {
            return Err(format!(
                "Default watermark opacity must be at most 100, got {}",
                self.watermark.defaults.opacity_percent
            ));
        }

        Ok(())
    }

    /// Font resolver over the configured font directories.
    pub fn font_resolver(&self) -> FontResolver {
        let catalog = if self.fonts.directories.is_empty() {
            DirectoryFontCatalog::system()
        } else {
            DirectoryFontCatalog::scan(&self.fonts.directories)
        };
        FontResolver::new(Arc::new(catalog)).with_fallback_fonts(self.fonts.fallback_fonts.clone())
    }

    pub fn compositor(&self) -> WatermarkCompositor {
        WatermarkCompositor::new(Arc::new(self.font_resolver())).with_margin(self.watermark.margin)
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.compositor(), self.watermark.defaults.clone()).with_default_box(
            self.preview.default_box_width,
            self.preview.default_box_height,
        )
    }

    pub fn template_store(&self) -> TemplateStore {
        TemplateStore::new(self.templates.path.clone())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            format: self.export.default_format,
            quality: self.export.default_quality,
            resize: None,
        }
    }
}
