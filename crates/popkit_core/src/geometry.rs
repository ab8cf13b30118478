//! Popup geometry resolution.
//!
//! Pure functions from a measured `GeometrySnapshot` plus configuration to
//! the two offsets every presentation needs: where the content sits while
//! displayed, and where it parks while hidden. All coordinates are local to
//! the presenter; `(0, 0)` is its top-leading corner.
//!
//! Until the content has been measured the hidden offset is a far-away
//! sentinel so nothing flashes at the origin on the first frame.

use crate::params::{AppearAnimation, PopupParams};

// ====== Primitives ======

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Safe-area insets of the presenter, in its own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub leading: f32,
    pub bottom: f32,
    pub trailing: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        leading: 0.0,
        bottom: 0.0,
        trailing: 0.0,
    };

    pub const fn new(top: f32, leading: f32, bottom: f32, trailing: f32) -> Self {
        Self {
            top,
            leading,
            bottom,
            trailing,
        }
    }
}

// ====== Snapshot ======

/// Everything the resolver needs to know about the world, captured at
/// measurement time. The presenter pushes updates whenever any input moves.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometrySnapshot {
    /// Presenter frame in its parent's coordinates. Only the size and the
    /// vertical origin participate in the formulas.
    pub presenter_rect: Rect,
    /// Most recent measured content size. Zero until the first layout pass.
    pub content_size: Size,
    pub safe_area: EdgeInsets,
    /// Height of the software keyboard currently overlapping the presenter.
    pub keyboard_height: f32,
}

impl GeometrySnapshot {
    pub fn new(presenter_rect: Rect) -> Self {
        Self {
            presenter_rect,
            ..Default::default()
        }
    }

    pub fn is_measured(&self) -> bool {
        !self.content_size.is_empty()
    }

    /// Parking spot used before the content has been measured. Far enough
    /// outside the presenter that no entry animation can show it.
    pub fn far_away_point(&self) -> Point {
        Point::new(
            2.0 * self.presenter_rect.width,
            2.0 * self.presenter_rect.height,
        )
    }
}

// ====== Resolution ======

/// Both channels of one resolved placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOffsets {
    pub displayed: Point,
    pub hidden: Point,
    pub displayed_scale: f32,
    pub hidden_scale: f32,
}

/// Offset of the content's top-leading corner while fully displayed.
///
/// Each axis is classified independently from the nine-point anchor, so a
/// `BottomTrailing` popup combines the bottom formula with the trailing one.
pub fn displayed_offset(snapshot: &GeometrySnapshot, params: &PopupParams) -> Point {
    let position = params.resolved_position();
    let insets = snapshot.safe_area;
    let container = snapshot.presenter_rect.size();
    let content = snapshot.content_size;
    let pad_v = params.vertical_padding();
    let pad_h = params.horizontal_padding();
    let use_safe_area = params.use_safe_area_inset();

    let y = if position.is_top() {
        pad_v + if use_safe_area { 0.0 } else { -insets.top }
    } else if position.is_vertical_center() {
        (container.height - content.height) / 2.0 - insets.top
    } else {
        let keyboard = if params.use_keyboard_safe_area {
            snapshot.keyboard_height
        } else {
            0.0
        };
        container.height
            - content.height
            - pad_v
            - if use_safe_area { insets.bottom } else { 0.0 }
            - keyboard
    };

    let x = if position.is_leading() {
        pad_h + if use_safe_area { insets.leading } else { 0.0 }
    } else if position.is_horizontal_center() {
        (container.width - content.width) / 2.0 - insets.leading
    } else {
        container.width
            - content.width
            - pad_h
            - if use_safe_area { insets.trailing } else { 0.0 }
    };

    Point::new(x, y)
}

/// Offset where the content parks while hidden, for one slide direction.
///
/// Slide directions replace one axis of the displayed offset with an
/// off-container coordinate; `CenterScale` and `None` keep the displayed
/// point and let the scale channel carry the transition.
pub fn hidden_offset(
    snapshot: &GeometrySnapshot,
    params: &PopupParams,
    direction: AppearAnimation,
) -> Point {
    if !snapshot.is_measured() {
        return snapshot.far_away_point();
    }
    let displayed = displayed_offset(snapshot, params);
    let container = snapshot.presenter_rect.size();
    match direction {
        AppearAnimation::TopSlide => Point::new(
            displayed.x,
            -(snapshot.presenter_rect.min_y()
                + snapshot.safe_area.top
                + snapshot.content_size.height),
        ),
        AppearAnimation::BottomSlide => Point::new(displayed.x, container.height),
        AppearAnimation::LeftSlide => Point::new(-container.width, displayed.y),
        AppearAnimation::RightSlide => Point::new(container.width, displayed.y),
        AppearAnimation::CenterScale | AppearAnimation::None => displayed,
    }
}

/// Scale while hidden. Only `CenterScale` animates the scale channel;
/// translation and scale are never conflated.
pub fn hidden_scale(direction: AppearAnimation) -> f32 {
    match direction {
        AppearAnimation::CenterScale => 0.0,
        _ => 1.0,
    }
}

/// Resolve both placements in one pass, using the exit direction for the
/// hidden point.
pub fn resolve(snapshot: &GeometrySnapshot, params: &PopupParams) -> ResolvedOffsets {
    let direction = params.resolved_disappear_to();
    ResolvedOffsets {
        displayed: displayed_offset(snapshot, params),
        hidden: hidden_offset(snapshot, params, direction),
        displayed_scale: 1.0,
        hidden_scale: hidden_scale(direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{PopupType, Position};

    fn snapshot(container: Size, content: Size) -> GeometrySnapshot {
        GeometrySnapshot {
            presenter_rect: Rect::from_size(container),
            content_size: content,
            safe_area: EdgeInsets::ZERO,
            keyboard_height: 0.0,
        }
    }

    #[test]
    fn bottom_anchor_accounts_for_padding_and_safe_area() {
        let mut snap = snapshot(Size::new(400.0, 800.0), Size::new(300.0, 100.0));
        snap.safe_area = EdgeInsets::new(0.0, 0.0, 10.0, 0.0);
        let params = PopupParams::new()
            .popup_type(PopupType::Floater {
                vertical_padding: 20.0,
                horizontal_padding: 0.0,
                use_safe_area_inset: true,
            })
            .position(Position::Bottom);
        let offset = displayed_offset(&snap, &params);
        assert_eq!(offset.y, 670.0);
    }

    #[test]
    fn bottom_anchor_ignores_safe_area_when_disabled() {
        let mut snap = snapshot(Size::new(400.0, 800.0), Size::new(300.0, 100.0));
        snap.safe_area = EdgeInsets::new(0.0, 0.0, 10.0, 0.0);
        let params = PopupParams::new()
            .popup_type(PopupType::Floater {
                vertical_padding: 20.0,
                horizontal_padding: 0.0,
                use_safe_area_inset: false,
            })
            .position(Position::Bottom);
        assert_eq!(displayed_offset(&snap, &params).y, 680.0);
    }

    #[test]
    fn center_anchor_halves_remaining_space() {
        let snap = snapshot(Size::new(400.0, 800.0), Size::new(200.0, 200.0));
        let params = PopupParams::new().position(Position::Center);
        let offset = displayed_offset(&snap, &params);
        assert_eq!(offset.y, 300.0);
        assert_eq!(offset.x, 100.0);
    }

    #[test]
    fn keyboard_lifts_bottom_anchored_content() {
        let mut snap = snapshot(Size::new(400.0, 800.0), Size::new(300.0, 100.0));
        snap.keyboard_height = 250.0;
        let params = PopupParams::toast().use_keyboard_safe_area(true);
        assert_eq!(displayed_offset(&snap, &params).y, 450.0);

        let ignoring = PopupParams::toast();
        assert_eq!(displayed_offset(&snap, &ignoring).y, 700.0);
    }

    #[test]
    fn horizontal_axis_classified_independently() {
        let snap = snapshot(Size::new(400.0, 800.0), Size::new(100.0, 50.0));
        let params = PopupParams::new()
            .popup_type(PopupType::Floater {
                vertical_padding: 0.0,
                horizontal_padding: 12.0,
                use_safe_area_inset: false,
            })
            .position(Position::BottomTrailing);
        let offset = displayed_offset(&snap, &params);
        assert_eq!(offset.x, 400.0 - 100.0 - 12.0);
        assert_eq!(offset.y, 750.0);

        let leading = params.clone().position(Position::TopLeading);
        assert_eq!(displayed_offset(&snap, &leading).x, 12.0);
    }

    #[test]
    fn hidden_offset_parks_off_container() {
        let snap = snapshot(Size::new(400.0, 800.0), Size::new(200.0, 100.0));
        let params = PopupParams::toast();
        let displayed = displayed_offset(&snap, &params);

        let bottom = hidden_offset(&snap, &params, AppearAnimation::BottomSlide);
        assert_eq!(bottom, Point::new(displayed.x, 800.0));

        let top = hidden_offset(&snap, &params, AppearAnimation::TopSlide);
        assert_eq!(top, Point::new(displayed.x, -100.0));

        let left = hidden_offset(&snap, &params, AppearAnimation::LeftSlide);
        assert_eq!(left, Point::new(-400.0, displayed.y));

        let right = hidden_offset(&snap, &params, AppearAnimation::RightSlide);
        assert_eq!(right, Point::new(400.0, displayed.y));
    }

    #[test]
    fn center_scale_hides_through_scale_channel() {
        let snap = snapshot(Size::new(400.0, 800.0), Size::new(200.0, 100.0));
        let params = PopupParams::new().appear_from(AppearAnimation::CenterScale);
        let displayed = displayed_offset(&snap, &params);
        assert_eq!(
            hidden_offset(&snap, &params, AppearAnimation::CenterScale),
            displayed
        );
        assert_eq!(hidden_scale(AppearAnimation::CenterScale), 0.0);
        assert_eq!(hidden_scale(AppearAnimation::BottomSlide), 1.0);
    }

    #[test]
    fn resolve_pairs_offset_and_scale_channels() {
        let snap = snapshot(Size::new(400.0, 800.0), Size::new(200.0, 100.0));
        let params = PopupParams::toast();
        let resolved = resolve(&snap, &params);
        assert_eq!(resolved.displayed, displayed_offset(&snap, &params));
        assert_eq!(
            resolved.hidden,
            hidden_offset(&snap, &params, AppearAnimation::BottomSlide)
        );
        assert_eq!(resolved.displayed_scale, 1.0);
        assert_eq!(resolved.hidden_scale, 1.0);

        let scaling = PopupParams::new().appear_from(AppearAnimation::CenterScale);
        let resolved = resolve(&snap, &scaling);
        assert_eq!(resolved.hidden, resolved.displayed);
        assert_eq!(resolved.hidden_scale, 0.0);
    }

    #[test]
    fn unmeasured_content_uses_far_away_sentinel() {
        let snap = snapshot(Size::new(400.0, 800.0), Size::ZERO);
        let params = PopupParams::toast();
        let hidden = hidden_offset(&snap, &params, AppearAnimation::BottomSlide);
        assert_eq!(hidden, Point::new(800.0, 1600.0));
    }
}
