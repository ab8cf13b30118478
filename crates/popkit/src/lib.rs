//! Popkit: a renderer-agnostic popup presentation controller.
//!
//! Popkit decides *when* and *where* popup content appears; the host UI
//! framework decides *how* it is drawn. The host pushes inputs in
//! (presence bindings, layout measurements, gestures, clock ticks) and
//! reads committed animation targets back out each frame.
//!
//! # Architecture
//!
//! - [`binding`]: observable presence cells (`Binding<bool>` or
//!   `Binding<Option<T>>`) that remain the host's single source of truth
//! - [`presenter`]: the lifecycle state machine driving one popup from
//!   mount through reveal, countdowns, and dismissal back to unmount
//! - [`surface`]: overlay/sheet/window strategies and the top-level window
//!   registry with hit-test delegation
//! - [`context`]: a scoped dismiss capability so popup content can close
//!   its own popup without a controller reference
//!
//! Geometry, configuration, timers, and drag handling live in
//! [`popkit_core`] and are re-exported here.
//!
//! # Example
//!
//! ```
//! use popkit::prelude::*;
//!
//! let presented = Binding::new(false);
//! let popup = Popup::new(
//!     presented.clone(),
//!     PopupParams::toast()
//!         .display_mode(DisplayMode::Overlay)
//!         .autohide_after_ms(3_000),
//!     || "popup content",
//! );
//!
//! popup.presenter_changed(Rect::new(0.0, 0.0, 400.0, 800.0), EdgeInsets::ZERO);
//! presented.set(true);
//! popup.content_measured(Size::new(300.0, 100.0));
//! assert_eq!(popup.phase(), PopupPhase::Visible);
//! ```

pub mod binding;
pub mod context;
pub mod presenter;
pub mod surface;

pub use binding::{Binding, PresentationRequest, SubscriptionId};
pub use context::{current_dismiss, with_dismiss, DismissProxy};
pub use presenter::{PhaseEvent, Popup, PopupPhase, RenderSignals};
pub use surface::{
    active_window_count, hit_test_windows, SurfaceError, SurfaceStrategy, WindowId,
};

pub use popkit_core::animation::{AnimationSpec, Easing};
pub use popkit_core::dismiss::{DismissCallback, DismissResolver, DismissSource};
pub use popkit_core::drag::{DragController, DragOutcome, ScrollPull};
pub use popkit_core::geometry::{EdgeInsets, GeometrySnapshot, Point, Rect, Size};
pub use popkit_core::params::{
    AppearAnimation, BackgroundStyle, Color, DisplayMode, PopupParams, PopupType, Position,
};
pub use popkit_core::timer::Countdown;

/// Common imports for hosts embedding popups.
pub mod prelude {
    pub use crate::binding::Binding;
    pub use crate::context::{current_dismiss, DismissProxy};
    pub use crate::presenter::{Popup, PopupPhase, RenderSignals};
    pub use popkit_core::animation::{AnimationSpec, Easing};
    pub use popkit_core::dismiss::DismissSource;
    pub use popkit_core::geometry::{EdgeInsets, Point, Rect, Size};
    pub use popkit_core::params::{
        AppearAnimation, Color, DisplayMode, PopupParams, PopupType, Position,
    };
}
