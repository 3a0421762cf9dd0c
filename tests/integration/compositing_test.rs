// Compositing properties over the public API

use super::test_harness::{builtin_compositor, compositor_with_font, gradient, solid, system_font};
use image::{DynamicImage, GrayImage, Luma, Rgb};
use rstest::rstest;
use watermarker::watermark::{opacity_to_alpha, Anchor, Color, WatermarkSpec};

fn spec(text: &str) -> WatermarkSpec {
    WatermarkSpec::with_text(text)
}

// Test: empty text returns the base pixel for pixel, for every layout
#[test]
fn test_empty_text_is_identity() {
    let compositor = builtin_compositor();
    let empty = spec("");

    let rgb = gradient(120, 80);
    assert_eq!(compositor.render(&rgb, &empty), rgb);

    let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(30, 30, Luma([77])));
    assert_eq!(compositor.render(&gray, &empty), gray);

    let rgba = DynamicImage::ImageRgba8(gradient(40, 40).to_rgba8());
    assert_eq!(compositor.render(&rgba, &empty), rgba);
}

#[test]
fn test_empty_text_render_is_idempotent() {
    let compositor = builtin_compositor();
    let base = gradient(64, 64);
    let empty = spec("");

    let once = compositor.render(&base, &empty);
    let twice = compositor.render(&once, &empty);
    assert_eq!(twice, base);
}

// Test: sample scenario from an 800x600 image at bottom-right
#[test]
fn test_bottom_right_scenario() {
    let compositor = builtin_compositor();
    let mut s = spec("SAMPLE");
    s.font_size_pt = 20;
    s.opacity_percent = 50;

    let placement = compositor.placement(&s, (800, 600));
    assert_eq!(placement.position.x, 800 - placement.text.width as i32 - 10);
    assert_eq!(placement.position.y, 600 - placement.text.height as i32 - 10);
    assert_eq!(s.alpha(), 128);

    let output = compositor.render(&solid(800, 600, 0), &s).to_rgb8();
    // First lit pixel of the 'S'
    let (x, y) = (placement.position.x as u32, placement.position.y as u32 + 2);
    assert_eq!(*output.get_pixel(x, y), Rgb([128, 128, 128]));
}

#[test]
#[ignore = "requires DejaVuSans.ttf under /usr/share/fonts/truetype/dejavu"]
fn test_bottom_right_scenario_with_outline_font() {
    let font = system_font();
    let compositor = compositor_with_font("arial.ttf", font);
    let mut s = spec("SAMPLE");
    s.font_size_pt = 20;

    let placement = compositor.placement(&s, (800, 600));
    assert!(placement.text.width > 0 && placement.text.height > 0);
    assert_eq!(placement.position.x, 800 - placement.text.width as i32 - 10);
    assert_eq!(placement.position.y, 600 - placement.text.height as i32 - 10);

    let base = solid(800, 600, 0);
    let output = compositor.render(&base, &s).to_rgb8();
    assert_eq!(*output.get_pixel(0, 0), Rgb([0, 0, 0]));

    // All ink lands inside the text box
    let (x0, y0) = (placement.position.x as u32, placement.position.y as u32);
    let (x1, y1) = (x0 + placement.text.width, y0 + placement.text.height);
    let mut lit = 0;
    for (x, y, px) in output.enumerate_pixels() {
        if px[0] > 0 {
            lit += 1;
            assert!(x >= x0.saturating_sub(1) && x <= x1 + 1, "ink at x={}", x);
            assert!(y >= y0.saturating_sub(1) && y <= y1 + 1, "ink at y={}", y);
        }
    }
    assert!(lit > 0);
}

// Test: corner anchors keep the text inside the image
#[rstest]
#[case(Anchor::TopLeft)]
#[case(Anchor::TopRight)]
#[case(Anchor::BottomLeft)]
#[case(Anchor::BottomRight)]
#[case(Anchor::Center)]
fn test_anchor_keeps_text_inside(#[case] anchor: Anchor) {
    let compositor = builtin_compositor();
    for (w, h) in [(800u32, 600u32), (200, 60), (97, 41)] {
        let mut s = spec("MARK");
        s.anchor = anchor;
        let p = compositor.placement(&s, (w, h));

        assert!(p.position.x >= 0 && p.position.y >= 0);
        assert!(p.position.x as u32 + p.text.width <= w, "{:?} in {}x{}", anchor, w, h);
        assert!(p.position.y as u32 + p.text.height <= h, "{:?} in {}x{}", anchor, w, h);
    }
}

// Test: the watermark contribution grows strictly with opacity
#[test]
fn test_opacity_monotonic() {
    let compositor = builtin_compositor();
    let base = solid(200, 100, 0);
    let mut s = spec("SAMPLE");
    s.color = Color::white();

    // Bottom-right: (200 - 72 - 10, 100 - 16 - 10)
    let probe = (118, 76);

    let mut last: Option<u8> = None;
    for opacity in 0..=100u8 {
        s.opacity_percent = opacity;
        let value = compositor.render(&base, &s).to_rgb8().get_pixel(probe.0, probe.1)[0];
        assert_eq!(value, opacity_to_alpha(opacity));
        if let Some(prev) = last {
            assert!(value > prev, "opacity {} gave {} after {}", opacity, value, prev);
        }
        last = Some(value);
    }

    assert_eq!(opacity_to_alpha(0), 0);
    assert_eq!(opacity_to_alpha(100), 255);
}

#[test]
fn test_effects_only_add_ink_near_text() {
    let compositor = builtin_compositor();
    let base = solid(300, 200, 60);
    let mut s = spec("FX");
    s.shadow = true;
    s.outline = true;
    s.outline_color = Color::new(255, 0, 0);
    s.anchor = Anchor::Center;

    let plain = compositor.render(&base, &spec("FX"));
    let styled = compositor.render(&base, &s);
    assert_ne!(plain, styled);

    let p = compositor.placement(&s, (300, 200));
    let styled = styled.to_rgb8();
    for (x, y, px) in styled.enumerate_pixels() {
        let near_x = (x as i32) >= p.position.x - 1 && (x as i32) <= p.position.x + p.text.width as i32 + 2;
        let near_y = (y as i32) >= p.position.y - 1 && (y as i32) <= p.position.y + p.text.height as i32 + 2;
        if !(near_x && near_y) {
            assert_eq!(*px, Rgb([60, 60, 60]), "stray ink at ({}, {})", x, y);
        }
    }
}
