//! Popkit core primitives.
//!
//! Leaf components of the popup presentation controller:
//!
//! - **Geometry**: pure offset/scale resolution from content size, safe area,
//!   keyboard height and anchor configuration
//! - **Parameters**: immutable builder-style popup configuration
//! - **Dismissal**: the intent resolver that unifies tap/drag/timer/binding
//!   triggers into one ordered dismissal protocol
//! - **Timers**: cancelable, generation-guarded countdowns for autohide and
//!   minimum-visible-time
//! - **Drag**: the drag-to-dismiss controller and its scroll-pull sub-mode
//!
//! Everything here is deterministic: no wall-clock reads, no threads. Time
//! flows in as `now_ms` pushed by the host on each tick, which is what makes
//! the timer and animation logic testable.

pub mod animation;
pub mod dismiss;
pub mod drag;
pub mod geometry;
pub mod params;
pub mod timer;

pub use animation::{AnimationSpec, Easing};
pub use dismiss::{DismissCallback, DismissResolver, DismissSource};
pub use drag::{DragController, DragOutcome, DragState, ScrollPull};
pub use geometry::{EdgeInsets, GeometrySnapshot, Point, Rect, ResolvedOffsets, Size};
pub use params::{
    AppearAnimation, BackgroundStyle, Color, DisplayMode, PopupParams, PopupType, Position,
};
pub use timer::Countdown;
