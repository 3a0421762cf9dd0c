//! Preview coordinate mapping.
//!
//! A preview shows the image fitted, never upscaled, and centered inside a
//! display box. [`PreviewTransform`] captures that fit and converts points
//! in both directions between image space and display space.

pub mod placement;

pub use placement::{DragState, PlacementContext, PlacementController, PlacementOutcome};

/// Display box used when the reported box is not laid out yet (≤ 1 px).
pub const DEFAULT_BOX_WIDTH: u32 = 600;
pub const DEFAULT_BOX_HEIGHT: u32 = 400;

/// Fit of an image into a display box.
///
/// `scale` is in `(0, 1]`; the displayed size is the image size times
/// `scale`, rounded down, and the offsets center it in the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    scale: f64,
    offset_x: i32,
    offset_y: i32,
    image_width: u32,
    image_height: u32,
    display_width: u32,
    display_height: u32,
}

impl PreviewTransform {
    /// Fit an image into a display box, using the default box for any
    /// dimension reported as ≤ 1.
    pub fn fit(image_width: u32, image_height: u32, box_width: u32, box_height: u32) -> Self {
        Self::fit_with_default(
            (image_width, image_height),
            (box_width, box_height),
            (DEFAULT_BOX_WIDTH, DEFAULT_BOX_HEIGHT),
        )
    }

    /// Like [`PreviewTransform::fit`] with a caller-chosen default box.
    pub fn fit_with_default(image: (u32, u32), display_box: (u32, u32), default_box: (u32, u32)) -> Self {
        let box_w = if display_box.0 <= 1 {
            default_box.0.max(1)
        } else {
            display_box.0
        };
        let box_h = if display_box.1 <= 1 {
            default_box.1.max(1)
        } else {
            display_box.1
        };
        if box_w != display_box.0 || box_h != display_box.1 {
            tracing::debug!(
                reported_width = display_box.0,
                reported_height = display_box.1,
                width = box_w,
                height = box_h,
                "Display box not laid out, using default box"
            );
        }

        let (image_w, image_h) = image;
        let scale = if image_w == 0 || image_h == 0 {
            1.0
        } else {
            (box_w as f64 / image_w as f64)
                .min(box_h as f64 / image_h as f64)
                .min(1.0)
        };

        let display_w = displayed_length(image_w, scale);
        let display_h = displayed_length(image_h, scale);

        Self {
            scale,
            offset_x: (box_w as i32 - display_w as i32) / 2,
            offset_y: (box_h as i32 - display_h as i32) / 2,
            image_width: image_w,
            image_height: image_h,
            display_width: display_w,
            display_height: display_h,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Size of the image as shown in the box.
    pub fn display_size(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    /// Image point to display point: `p * scale + offset`.
    pub fn to_display(&self, x: i32, y: i32) -> (i32, i32) {
        (
            (x as f64 * self.scale).round() as i32 + self.offset_x,
            (y as f64 * self.scale).round() as i32 + self.offset_y,
        )
    }

    /// Display point to image point: `(p - offset) / scale`, clamped into
    /// the image.
    pub fn to_image(&self, x: i32, y: i32) -> (i32, i32) {
        let max_x = self.image_width.saturating_sub(1) as i32;
        let max_y = self.image_height.saturating_sub(1) as i32;

        let ix = ((x - self.offset_x) as f64 / self.scale).floor() as i32;
        let iy = ((y - self.offset_y) as f64 / self.scale).floor() as i32;

        (ix.clamp(0, max_x), iy.clamp(0, max_y))
    }

    /// Whether a display point falls on the shown image.
    pub fn contains_display_point(&self, x: i32, y: i32) -> bool {
        x >= self.offset_x
            && y >= self.offset_y
            && x < self.offset_x + self.display_width as i32
            && y < self.offset_y + self.display_height as i32
    }
}

fn displayed_length(length: u32, scale: f64) -> u32 {
    if length == 0 {
        return 0;
    }
    // Epsilon absorbs float error when scale is exactly box / length
    ((length as f64 * scale + 1e-9).floor() as u32).max(1)
}
