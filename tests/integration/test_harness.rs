// Shared fixtures for integration tests

use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;
use watermarker::watermark::{FontResolver, MemoryFontCatalog, WatermarkCompositor};

const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// Deterministic 3-channel test image.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

pub fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
}

/// Compositor that always draws with the built-in bitmap font.
pub fn builtin_compositor() -> WatermarkCompositor {
    WatermarkCompositor::builtin()
}

/// DejaVu Sans from the host. Tests using it are `#[ignore]`d.
pub fn system_font() -> Vec<u8> {
    std::fs::read(SYSTEM_FONT).expect("DejaVuSans.ttf is not installed")
}

/// Compositor whose only font is `data`, registered under `file_name`.
pub fn compositor_with_font(file_name: &str, data: Vec<u8>) -> WatermarkCompositor {
    let catalog = MemoryFontCatalog::new().with_font(file_name, data);
    WatermarkCompositor::new(Arc::new(FontResolver::new(Arc::new(catalog))))
}
