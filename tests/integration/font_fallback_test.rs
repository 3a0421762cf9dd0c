// Font resolution chain end to end

use super::test_harness::{solid, system_font};
use std::sync::Arc;
use watermarker::watermark::{
    EmptyCatalog, FontRequest, FontResolver, FontSource, MemoryFontCatalog, WatermarkCompositor,
    WatermarkSpec,
};

#[test]
fn test_no_fonts_still_renders() {
    let resolver = Arc::new(FontResolver::new(Arc::new(EmptyCatalog)));
    let font = resolver.resolve(&FontRequest::new("Arial", true, false, 36));
    assert_eq!(font.source(), &FontSource::BuiltinBitmap);
    assert!(font.is_degraded());

    let compositor = WatermarkCompositor::new(resolver);
    let base = solid(200, 100, 0);
    let output = compositor.render(&base, &WatermarkSpec::with_text("OK"));
    assert_ne!(output, base);
}

#[test]
#[ignore = "requires DejaVuSans.ttf under /usr/share/fonts/truetype/dejavu"]
fn test_resolution_steps_in_order() {
    let font = system_font();

    let catalog = MemoryFontCatalog::new()
        .with_font("arialbd.ttf", font.clone())
        .with_font("Georgia-Italic.ttf", font.clone())
        .with_font("DejaVuSans.ttf", font);
    let resolver = FontResolver::new(Arc::new(catalog))
        .with_fallback_fonts(vec!["DejaVuSans.ttf".to_string()]);

    let bold = resolver.resolve(&FontRequest::new("Arial", true, false, 24));
    assert_eq!(bold.source(), &FontSource::StyledFile);
    assert!(!bold.is_degraded());

    let italic = resolver.resolve(&FontRequest::new("Georgia", false, true, 24));
    assert_eq!(italic.source(), &FontSource::HyphenatedFile);

    // No "dejavusansbd.ttf" or "DejaVuSans-Bold.ttf", so the family lookup wins
    let family = resolver.resolve(&FontRequest::new("DejaVu Sans", true, false, 24));
    assert_eq!(family.source(), &FontSource::SystemFamily);

    let missing = resolver.resolve(&FontRequest::new("Comic Sans MS", false, false, 24));
    assert_eq!(
        missing.source(),
        &FontSource::Fallback("DejaVuSans.ttf".to_string())
    );
    assert!(missing.is_degraded());
}

#[test]
fn test_resolution_is_cached_per_request() {
    let resolver = FontResolver::new(Arc::new(EmptyCatalog));
    let request = FontRequest::new("Arial", false, false, 20);

    resolver.resolve(&request);
    resolver.resolve(&request);
    assert_eq!(resolver.cached_len(), 1);

    resolver.resolve(&FontRequest::new("Arial", false, false, 21));
    assert_eq!(resolver.cached_len(), 2);

    resolver.clear_cache();
    assert_eq!(resolver.cached_len(), 0);
}
