//! Popup configuration.
//!
//! `PopupParams` is an immutable bag of presentation options built with the
//! consuming-builder pattern. Several options are *derived* rather than
//! stored: the anchor position and paddings default per popup type, and the
//! slide directions default per anchor, so most callers configure only the
//! type and leave the rest alone.

use std::fmt;
use std::sync::Arc;

use crate::animation::AnimationSpec;
use crate::dismiss::{DismissCallback, DismissSource};

// ====== Color ======

/// RGBA color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= f32::EPSILON
    }
}

/// Scrim behind the popup content.
///
/// `Custom` means the host supplies its own scrim view; the controller still
/// drives it through the same fade signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundStyle {
    Color(Color),
    Custom,
}

impl BackgroundStyle {
    pub fn is_visible(&self) -> bool {
        match self {
            BackgroundStyle::Color(c) => !c.is_transparent(),
            BackgroundStyle::Custom => true,
        }
    }
}

// ====== Popup type ======

/// High-level popup style. Each type carries its own anchoring defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopupType {
    /// Centered modal.
    Default,
    /// Edge-anchored, flush against the container edge.
    Toast,
    /// Edge-anchored with configurable padding and safe-area behavior.
    Floater {
        vertical_padding: f32,
        horizontal_padding: f32,
        use_safe_area_inset: bool,
    },
    /// Bottom sheet whose content scrolls internally before pull-to-dismiss
    /// engages. The sticky header view, like all views, is composed by the
    /// host around the built content.
    Scroll,
}

impl PopupType {
    pub fn floater() -> Self {
        PopupType::Floater {
            vertical_padding: 10.0,
            horizontal_padding: 10.0,
            use_safe_area_inset: true,
        }
    }

    pub fn default_position(&self) -> Position {
        match self {
            PopupType::Default => Position::Center,
            _ => Position::Bottom,
        }
    }

    pub fn vertical_padding(&self) -> f32 {
        match self {
            PopupType::Floater {
                vertical_padding, ..
            } => *vertical_padding,
            _ => 0.0,
        }
    }

    pub fn horizontal_padding(&self) -> f32 {
        match self {
            PopupType::Floater {
                horizontal_padding, ..
            } => *horizontal_padding,
            _ => 0.0,
        }
    }

    pub fn use_safe_area_inset(&self) -> bool {
        match self {
            PopupType::Floater {
                use_safe_area_inset,
                ..
            } => *use_safe_area_inset,
            _ => false,
        }
    }
}

// ====== Display mode ======

/// Which presentation surface hosts the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Inline layer stacked over the presenter's own subtree.
    Overlay,
    /// Full-screen modal cover. Touches never pass through.
    Sheet,
    /// Detached top-level window with hit-test delegation.
    Window,
}

// ====== Position ======

/// Nine-point anchor grid inside the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    TopLeading,
    Top,
    TopTrailing,
    Leading,
    Center,
    Trailing,
    BottomLeading,
    Bottom,
    BottomTrailing,
}

impl Position {
    pub fn is_top(&self) -> bool {
        matches!(
            self,
            Position::TopLeading | Position::Top | Position::TopTrailing
        )
    }

    pub fn is_vertical_center(&self) -> bool {
        matches!(
            self,
            Position::Leading | Position::Center | Position::Trailing
        )
    }

    pub fn is_bottom(&self) -> bool {
        matches!(
            self,
            Position::BottomLeading | Position::Bottom | Position::BottomTrailing
        )
    }

    pub fn is_leading(&self) -> bool {
        matches!(
            self,
            Position::TopLeading | Position::Leading | Position::BottomLeading
        )
    }

    pub fn is_horizontal_center(&self) -> bool {
        matches!(self, Position::Top | Position::Center | Position::Bottom)
    }

    pub fn is_trailing(&self) -> bool {
        matches!(
            self,
            Position::TopTrailing | Position::Trailing | Position::BottomTrailing
        )
    }
}

// ====== Appear / disappear animation ======

/// Entry/exit transition. Slide variants also select which drag axis can
/// dismiss the popup; `CenterScale` and `None` disable drag-to-dismiss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppearAnimation {
    TopSlide,
    BottomSlide,
    LeftSlide,
    RightSlide,
    CenterScale,
    None,
}

impl AppearAnimation {
    pub fn is_slide(&self) -> bool {
        matches!(
            self,
            AppearAnimation::TopSlide
                | AppearAnimation::BottomSlide
                | AppearAnimation::LeftSlide
                | AppearAnimation::RightSlide
        )
    }
}

// ====== Params ======

/// Immutable popup configuration.
///
/// `position`, `appear_from` and `disappear_to` left at `None` fall back to
/// type- and anchor-derived defaults via the `resolved_*` accessors.
#[derive(Clone)]
pub struct PopupParams {
    pub popup_type: PopupType,
    pub display_mode: DisplayMode,
    pub position: Option<Position>,
    pub appear_from: Option<AppearAnimation>,
    pub disappear_to: Option<AppearAnimation>,
    pub animation: AnimationSpec,
    pub background_fade: AnimationSpec,
    pub autohide_after_ms: Option<u32>,
    pub dismissible_after_ms: Option<u32>,
    pub drag_to_dismiss: bool,
    pub drag_to_dismiss_distance: Option<f32>,
    pub close_on_tap: bool,
    pub close_on_tap_outside: bool,
    pub allow_tap_through_bg: bool,
    pub background: BackgroundStyle,
    pub use_keyboard_safe_area: bool,
    pub will_dismiss: Option<DismissCallback>,
    pub on_dismiss: Option<DismissCallback>,
}

impl fmt::Debug for PopupParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupParams")
            .field("popup_type", &self.popup_type)
            .field("display_mode", &self.display_mode)
            .field("position", &self.resolved_position())
            .field("appear_from", &self.resolved_appear_from())
            .field("disappear_to", &self.resolved_disappear_to())
            .field("autohide_after_ms", &self.autohide_after_ms)
            .field("dismissible_after_ms", &self.dismissible_after_ms)
            .field("drag_to_dismiss", &self.drag_to_dismiss)
            .field("close_on_tap", &self.close_on_tap)
            .field("close_on_tap_outside", &self.close_on_tap_outside)
            .field("allow_tap_through_bg", &self.allow_tap_through_bg)
            .finish()
    }
}

impl Default for PopupParams {
    fn default() -> Self {
        Self {
            popup_type: PopupType::Default,
            display_mode: DisplayMode::Window,
            position: None,
            appear_from: None,
            disappear_to: None,
            animation: AnimationSpec::default(),
            background_fade: AnimationSpec::background_fade(),
            autohide_after_ms: None,
            dismissible_after_ms: None,
            drag_to_dismiss: true,
            drag_to_dismiss_distance: None,
            close_on_tap: true,
            close_on_tap_outside: false,
            allow_tap_through_bg: true,
            background: BackgroundStyle::Color(Color::TRANSPARENT),
            use_keyboard_safe_area: false,
            will_dismiss: None,
            on_dismiss: None,
        }
    }
}

impl PopupParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edge-anchored toast preset.
    pub fn toast() -> Self {
        Self::new().popup_type(PopupType::Toast)
    }

    /// Padded floater preset.
    pub fn floater() -> Self {
        Self::new().popup_type(PopupType::floater())
    }

    // ------ builder ------

    pub fn popup_type(mut self, popup_type: PopupType) -> Self {
        self.popup_type = popup_type;
        self
    }

    pub fn display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn appear_from(mut self, animation: AppearAnimation) -> Self {
        self.appear_from = Some(animation);
        self
    }

    pub fn disappear_to(mut self, animation: AppearAnimation) -> Self {
        self.disappear_to = Some(animation);
        self
    }

    pub fn animation(mut self, spec: AnimationSpec) -> Self {
        self.animation = spec;
        self
    }

    pub fn background_fade(mut self, spec: AnimationSpec) -> Self {
        self.background_fade = spec;
        self
    }

    pub fn autohide_after_ms(mut self, ms: u32) -> Self {
        self.autohide_after_ms = Some(ms);
        self
    }

    /// Minimum time the popup must stay on screen before any dismissal
    /// trigger is honored.
    pub fn dismissible_after_ms(mut self, ms: u32) -> Self {
        self.dismissible_after_ms = Some(ms);
        self
    }

    pub fn drag_to_dismiss(mut self, enabled: bool) -> Self {
        self.drag_to_dismiss = enabled;
        self
    }

    /// Override the release threshold (default is a third of the content
    /// extent on the drag axis).
    pub fn drag_to_dismiss_distance(mut self, distance: f32) -> Self {
        self.drag_to_dismiss_distance = Some(distance);
        self
    }

    pub fn close_on_tap(mut self, enabled: bool) -> Self {
        self.close_on_tap = enabled;
        self
    }

    pub fn close_on_tap_outside(mut self, enabled: bool) -> Self {
        self.close_on_tap_outside = enabled;
        self
    }

    pub fn allow_tap_through_bg(mut self, enabled: bool) -> Self {
        self.allow_tap_through_bg = enabled;
        self
    }

    pub fn background(mut self, background: BackgroundStyle) -> Self {
        self.background = background;
        self
    }

    pub fn background_color(self, color: Color) -> Self {
        self.background(BackgroundStyle::Color(color))
    }

    pub fn use_keyboard_safe_area(mut self, enabled: bool) -> Self {
        self.use_keyboard_safe_area = enabled;
        self
    }

    /// Fired synchronously when a dismissal is accepted, before the hide
    /// animation starts.
    pub fn will_dismiss(
        mut self,
        callback: impl Fn(DismissSource) + Send + Sync + 'static,
    ) -> Self {
        self.will_dismiss = Some(Arc::new(callback));
        self
    }

    /// Fired after the popup has fully unmounted.
    pub fn on_dismiss(mut self, callback: impl Fn(DismissSource) + Send + Sync + 'static) -> Self {
        self.on_dismiss = Some(Arc::new(callback));
        self
    }

    // ------ derived accessors ------

    /// Anchor position, falling back to the type default.
    pub fn resolved_position(&self) -> Position {
        self.position.unwrap_or(self.popup_type.default_position())
    }

    /// Entry direction. Explicit override wins; otherwise derived from the
    /// anchor (leading edge slides from the left, trailing from the right,
    /// top anchors slide down, everything else slides up).
    pub fn resolved_appear_from(&self) -> AppearAnimation {
        if let Some(appear) = self.appear_from {
            return appear;
        }
        let position = self.resolved_position();
        if position.is_leading() {
            AppearAnimation::LeftSlide
        } else if position.is_trailing() {
            AppearAnimation::RightSlide
        } else if position.is_top() {
            AppearAnimation::TopSlide
        } else {
            AppearAnimation::BottomSlide
        }
    }

    /// Exit direction. Falls back to the effective entry direction.
    pub fn resolved_disappear_to(&self) -> AppearAnimation {
        self.disappear_to
            .unwrap_or_else(|| self.resolved_appear_from())
    }

    /// Sheets always swallow outside touches regardless of configuration.
    pub fn allows_tap_through(&self) -> bool {
        match self.display_mode {
            DisplayMode::Sheet => false,
            _ => self.allow_tap_through_bg,
        }
    }

    pub fn vertical_padding(&self) -> f32 {
        self.popup_type.vertical_padding()
    }

    pub fn horizontal_padding(&self) -> f32 {
        self.popup_type.horizontal_padding()
    }

    pub fn use_safe_area_inset(&self) -> bool {
        self.popup_type.use_safe_area_inset()
    }
}
