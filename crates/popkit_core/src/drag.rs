//! Drag-to-dismiss.
//!
//! `DragController` tracks one pointer drag against the popup's exit
//! direction. While active, the content follows the finger on the dismissal
//! axis only, and only outward; inward motion clamps to the resolved
//! position. On release the travel on that axis is compared against the
//! threshold and the drag either dismisses or snaps back.
//!
//! `ScrollPull` is the sub-mode for scrollable sheets: pans scroll the inner
//! content first, and only the overscroll past the top counts as pull-down
//! travel.

use tracing::debug;

use crate::geometry::{Point, Size};
use crate::params::AppearAnimation;

/// Result of releasing a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Travel exceeded the threshold (or a deferred autohide was pending).
    Dismiss,
    /// Animate back to the resolved position.
    SnapBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Inactive,
    Dragging {
        translation: Point,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    /// Autohide fired mid-drag; applied on release.
    deferred_dismiss: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Track pointer movement. Raw translation is stored; filtering to the
    /// dismissal axis happens in `offset`.
    pub fn update(&mut self, translation: Point) {
        self.state = DragState::Dragging { translation };
    }

    /// Flag a dismissal to be applied as soon as the current drag ends.
    pub fn defer_dismiss(&mut self) {
        if self.is_dragging() {
            debug!("deferring dismissal until drag ends");
            self.deferred_dismiss = true;
        }
    }

    /// Live content offset for the current drag: the translation component
    /// on the dismissal axis, outward only. Non-slide directions never
    /// follow the finger.
    pub fn offset(&self, direction: AppearAnimation) -> Point {
        let DragState::Dragging { translation } = self.state else {
            return Point::ZERO;
        };
        match direction {
            AppearAnimation::TopSlide => Point::new(0.0, translation.y.min(0.0)),
            AppearAnimation::BottomSlide => Point::new(0.0, translation.y.max(0.0)),
            AppearAnimation::LeftSlide => Point::new(translation.x.min(0.0), 0.0),
            AppearAnimation::RightSlide => Point::new(translation.x.max(0.0), 0.0),
            AppearAnimation::CenterScale | AppearAnimation::None => Point::ZERO,
        }
    }

    /// Release the drag. Travel strictly greater than the threshold
    /// dismisses; anything at or below it snaps back. The threshold is the
    /// configured override, or a third of the content extent on the
    /// dismissal axis.
    pub fn end(
        &mut self,
        translation: Point,
        direction: AppearAnimation,
        content_size: Size,
        threshold_override: Option<f32>,
    ) -> DragOutcome {
        self.state = DragState::Inactive;
        let deferred = std::mem::take(&mut self.deferred_dismiss);

        let travel = match direction {
            AppearAnimation::TopSlide => -translation.y,
            AppearAnimation::BottomSlide => translation.y,
            AppearAnimation::LeftSlide => -translation.x,
            AppearAnimation::RightSlide => translation.x,
            AppearAnimation::CenterScale | AppearAnimation::None => {
                return if deferred {
                    DragOutcome::Dismiss
                } else {
                    DragOutcome::SnapBack
                };
            }
        };

        let extent = match direction {
            AppearAnimation::LeftSlide | AppearAnimation::RightSlide => content_size.width,
            _ => content_size.height,
        };
        let threshold = threshold_override.unwrap_or(extent / 3.0);

        if deferred || travel > threshold {
            debug!(travel, threshold, deferred, "drag released past threshold");
            DragOutcome::Dismiss
        } else {
            DragOutcome::SnapBack
        }
    }
}

// ====== Scroll pull ======

/// Pull-to-dismiss for scrollable sheet content.
///
/// Pan deltas scroll the inner content until it reaches the top; further
/// pulling accumulates overscroll, which is the travel compared against the
/// threshold on release.
#[derive(Debug, Clone, Default)]
pub struct ScrollPull {
    content_offset: f32,
    max_offset: f32,
    overscroll: f32,
}

impl ScrollPull {
    pub fn new(content_height: f32, visible_height: f32) -> Self {
        Self {
            content_offset: 0.0,
            max_offset: (content_height - visible_height).max(0.0),
            overscroll: 0.0,
        }
    }

    /// Re-measure after a content or viewport size change. Clamps the
    /// current scroll position into the new range.
    pub fn set_extents(&mut self, content_height: f32, visible_height: f32) {
        self.max_offset = (content_height - visible_height).max(0.0);
        self.content_offset = self.content_offset.min(self.max_offset);
    }

    /// Inner scroll position, `0.0` at the top.
    pub fn content_offset(&self) -> f32 {
        self.content_offset
    }

    /// Downward pull accumulated past the top, `>= 0`.
    pub fn overscroll(&self) -> f32 {
        self.overscroll
    }

    /// Apply one pan delta. Positive `delta` is a downward finger movement.
    pub fn pan(&mut self, delta: f32) {
        let target = self.content_offset - delta;
        if target >= 0.0 {
            self.content_offset = target.min(self.max_offset);
            self.overscroll = 0.0;
        } else {
            self.content_offset = 0.0;
            self.overscroll = -target;
        }
    }

    /// Release the pull. Overscroll reaching the threshold dismisses;
    /// otherwise the sheet snaps back and the overscroll resets.
    pub fn release(&mut self, threshold: f32) -> DragOutcome {
        let overscroll = std::mem::take(&mut self.overscroll);
        if overscroll >= threshold && overscroll > 0.0 {
            DragOutcome::Dismiss
        } else {
            DragOutcome::SnapBack
        }
    }
}
