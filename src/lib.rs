// Watermarker library
//
// Text watermark compositing with font resolution, anchor placement,
// preview coordinate mapping and drag-to-place.

pub mod adjust;
pub mod config;
pub mod export;
pub mod logging;
pub mod preview;
pub mod session;
pub mod templates;
pub mod watermark;

pub use config::AppConfig;
pub use export::{export, ExportError, ExportOptions, ExportReport};
pub use preview::{PlacementController, PreviewTransform};
pub use session::Workspace;
pub use templates::TemplateStore;
pub use watermark::{Anchor, Color, WatermarkCompositor, WatermarkError, WatermarkSpec};
