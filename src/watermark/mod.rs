//! Text watermark compositing.
//!
//! Takes a base image plus a declarative [`WatermarkSpec`] (text, font,
//! color, opacity, effects, anchor or free-form position) and produces the
//! composited image.
//!
//! # Pipeline
//!
//! 1. [`FontResolver`] maps the requested family/style/size to a font,
//!    falling back down to the built-in bitmap font
//! 2. [`measure`] sizes the text from real glyph metrics
//! 3. [`place`] turns the anchor into a top-left pixel
//! 4. [`WatermarkCompositor`] draws shadow, outline and text on a
//!    transparent layer and blends it over the base
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   margin: 10
//!   defaults:
//!     text: "Sample"
//!     font_family: "Arial"
//!     font_size_pt: 36
//!     color: "#FFFFFF"
//!     opacity_percent: 50
//!     outline: true
//!     outline_color: "#000000"
//!     anchor: bottom-right
//! ```

pub mod bitmap_font;
pub mod color;
pub mod compositor;
pub mod error;
pub mod font;
pub mod metrics;
pub mod position;
pub mod spec;
pub mod text_renderer;

// Re-export main types for convenience
pub use bitmap_font::BitmapFont;
pub use color::{parse_hex_color, Color};
pub use compositor::{Placement, WatermarkCompositor};
pub use error::WatermarkError;
pub use font::{
    DirectoryFontCatalog, EmptyCatalog, FontCatalog, FontFace, FontRequest, FontResolver,
    FontSource, MemoryFontCatalog, ResolvedFont,
};
pub use metrics::{measure, TextMetrics};
pub use position::{
    clamp_to_bounds, is_contained, place, ImageDimensions, PlacementPosition, TextDimensions,
    DEFAULT_MARGIN,
};
pub use spec::{opacity_to_alpha, Anchor, WatermarkSpec};
pub use text_renderer::{draw_styled_text, draw_text, TextStyle};
