//! Drag-to-place state machine.
//!
//! ```text
//! Idle --pointer_down--> Dragging --pointer_move--> Dragging
//!   ^                        |
//!   +-------pointer_up-------+
//! ```
//!
//! Every pointer position is mapped into image space and written into the
//! watermark's custom coordinates. The controller never renders itself: it
//! returns [`PlacementOutcome::Rerender`] and the caller re-renders.

use super::PreviewTransform;
use crate::watermark::WatermarkSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// What the caller should do after a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The watermark moved to this image-space position; re-render.
    Rerender { x: i32, y: i32 },
    /// Nothing changed.
    Ignored,
}

/// Geometry needed to turn a pointer position into a watermark position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementContext {
    pub transform: PreviewTransform,
    /// Rendered text box, used to keep the watermark inside the image.
    pub text_size: (u32, u32),
}

impl PlacementContext {
    pub fn new(transform: PreviewTransform, text_size: (u32, u32)) -> Self {
        Self {
            transform,
            text_size,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacementController {
    state: DragState,
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Start a drag. Switches the watermark to `Custom` placement at the pointer.
    pub fn pointer_down(
        &mut self,
        spec: &mut WatermarkSpec,
        ctx: &PlacementContext,
        display_x: i32,
        display_y: i32,
    ) -> PlacementOutcome {
        self.state = DragState::Dragging;
        tracing::debug!(display_x, display_y, "Watermark drag started");
        move_to(spec, ctx, display_x, display_y)
    }

    /// Follow the pointer while dragging. Ignored when idle.
    pub fn pointer_move(
        &mut self,
        spec: &mut WatermarkSpec,
        ctx: &PlacementContext,
        display_x: i32,
        display_y: i32,
    ) -> PlacementOutcome {
        match self.state {
            DragState::Idle => PlacementOutcome::Ignored,
            DragState::Dragging => move_to(spec, ctx, display_x, display_y),
        }
    }

    /// End the drag wherever the pointer is released. The last position
    /// stays in the watermark settings.
    pub fn pointer_up(&mut self) -> PlacementOutcome {
        if self.state == DragState::Dragging {
            tracing::debug!("Watermark drag finished");
        }
        self.state = DragState::Idle;
        PlacementOutcome::Ignored
    }
}

fn move_to(
    spec: &mut WatermarkSpec,
    ctx: &PlacementContext,
    display_x: i32,
    display_y: i32,
) -> PlacementOutcome {
    let (x, y) = ctx.transform.to_image(display_x, display_y);
    spec.place_custom(x, y, ctx.text_size, ctx.transform.image_size());

    PlacementOutcome::Rerender {
        x: spec.custom_x,
        y: spec.custom_y,
    }
}
