// Preview mapping and drag-to-place scenarios

use super::test_harness::{builtin_compositor, solid};
use watermarker::preview::{DragState, PlacementContext, PlacementController, PlacementOutcome};
use watermarker::watermark::{Anchor, WatermarkSpec};
use watermarker::PreviewTransform;

// Test: to_image(to_display(p)) stays within one pixel of p
#[test]
fn test_round_trip_within_one_pixel() {
    let cases = [
        ((800u32, 600u32), (400u32, 300u32)),
        ((4000, 3000), (600, 400)),
        ((123, 457), (300, 300)),
        ((640, 480), (1024, 768)),
    ];
    for (image, display_box) in cases {
        let t = PreviewTransform::fit(image.0, image.1, display_box.0, display_box.1);
        for x in (0..image.0 as i32).step_by(13) {
            for y in (0..image.1 as i32).step_by(17) {
                let (dx, dy) = t.to_display(x, y);
                let (ix, iy) = t.to_image(dx, dy);
                let tolerance = (1.0 / t.scale()).ceil() as i32;
                assert!(
                    (ix - x).abs() <= tolerance.max(1) && (iy - y).abs() <= tolerance.max(1),
                    "{:?} -> ({}, {}) -> ({}, {})",
                    image,
                    dx,
                    dy,
                    ix,
                    iy
                );
            }
        }
    }
}

#[test]
fn test_unlaid_out_box_uses_default() {
    let t = PreviewTransform::fit(1200, 800, 1, 1);
    assert!(t.scale().is_finite());
    assert_eq!(t.scale(), 0.5);
    assert_eq!(t.display_size(), (600, 400));
    assert_eq!(t.offset(), (0, 0));
}

// Test: drag scenario from a 400x300 preview of an 800x600 image
#[test]
fn test_drag_scenario() {
    let compositor = builtin_compositor();
    let mut spec = WatermarkSpec::with_text("SAMPLE");
    assert_eq!(spec.anchor, Anchor::BottomRight);

    let transform = PreviewTransform::fit(800, 600, 400, 300);
    assert_eq!(transform.scale(), 0.5);
    assert_eq!(transform.offset(), (0, 0));

    let ctx = PlacementContext::new(transform, compositor.measure(&spec).as_tuple());
    let mut controller = PlacementController::new();

    let outcome = controller.pointer_down(&mut spec, &ctx, 100, 100);
    assert_eq!(outcome, PlacementOutcome::Rerender { x: 200, y: 200 });
    assert_eq!(controller.state(), DragState::Dragging);
    assert_eq!(spec.anchor, Anchor::Custom);
    assert_eq!((spec.custom_x, spec.custom_y), (200, 200));

    controller.pointer_up();
    assert_eq!(controller.state(), DragState::Idle);

    // The re-render draws where the drag left the watermark
    let placement = compositor.placement(&spec, (800, 600));
    assert_eq!((placement.position.x, placement.position.y), (200, 200));

    let output = compositor.render(&solid(800, 600, 0), &spec).to_rgb8();
    assert_ne!(output.get_pixel(200, 202)[0], 0);
}

#[test]
fn test_drag_on_letterboxed_preview() {
    let mut spec = WatermarkSpec::with_text("SAMPLE");
    // 800x600 in a 600x600 box: scale 0.75, 600x450 shown, offset (0, 75)
    let transform = PreviewTransform::fit(800, 600, 600, 600);
    assert_eq!(transform.offset(), (0, 75));

    let ctx = PlacementContext::new(transform, (72, 16));
    let mut controller = PlacementController::new();
    controller.pointer_down(&mut spec, &ctx, 300, 75 + 225);
    assert_eq!((spec.custom_x, spec.custom_y), (400, 300));

    // Pointer in the letterbox band maps to the image edge
    controller.pointer_move(&mut spec, &ctx, 300, 10);
    assert_eq!((spec.custom_x, spec.custom_y), (400, 0));
    controller.pointer_up();
}
