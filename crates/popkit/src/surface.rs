//! Presentation surfaces.
//!
//! The controller decides *when* to mount; a `SurfaceStrategy` decides
//! *where* and owns the surface's lifecycle hooks and touch routing. Three
//! strategies mirror the display modes: an inline overlay over the
//! presenter, a full-screen sheet, and a detached top-level window tracked
//! in a process-wide registry.
//!
//! Hit testing answers one question per touch: does this surface consume
//! the point, or does it fall through to whatever sits underneath?

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

use popkit_core::geometry::{Point, Rect};
use popkit_core::params::{DisplayMode, PopupParams};

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface is already mounted")]
    AlreadyMounted,
    #[error("window {0:?} is not registered")]
    UnknownWindow(WindowId),
}

/// Lifecycle and touch routing for one popup's surface.
pub trait SurfaceStrategy: Send {
    /// The popup is about to render. Overlay/sheet surfaces flip host
    /// flags; window surfaces register a new window.
    fn mount(&mut self) -> Result<(), SurfaceError>;

    /// The hide animation is starting. The surface stays alive so the exit
    /// transition has somewhere to render.
    fn prepare_unmount(&mut self);

    /// The hide animation finished; tear the surface down.
    fn unmount(&mut self);

    /// Update the measured content frame used for hit testing.
    fn set_content_frame(&mut self, frame: Rect);

    /// Whether the surface consumes a touch at `point`. A `false` return
    /// lets the touch reach the UI underneath.
    fn hit_test(&self, point: Point) -> bool;
}

/// Build the strategy for a configuration.
pub fn for_params(params: &PopupParams) -> Box<dyn SurfaceStrategy> {
    match params.display_mode {
        DisplayMode::Overlay => Box::new(OverlaySurface::new(params.allows_tap_through())),
        DisplayMode::Sheet => Box::new(SheetSurface::new()),
        DisplayMode::Window => Box::new(WindowSurface::new(params.allows_tap_through())),
    }
}

// ====== Overlay ======

/// Inline layer stacked over the presenter's subtree.
pub struct OverlaySurface {
    tap_through: bool,
    content_frame: Rect,
    mounted: bool,
}

impl OverlaySurface {
    pub fn new(tap_through: bool) -> Self {
        Self {
            tap_through,
            content_frame: Rect::default(),
            mounted: false,
        }
    }
}

impl SurfaceStrategy for OverlaySurface {
    fn mount(&mut self) -> Result<(), SurfaceError> {
        if self.mounted {
            return Err(SurfaceError::AlreadyMounted);
        }
        self.mounted = true;
        Ok(())
    }

    fn prepare_unmount(&mut self) {}

    fn unmount(&mut self) {
        self.mounted = false;
    }

    fn set_content_frame(&mut self, frame: Rect) {
        self.content_frame = frame;
    }

    fn hit_test(&self, point: Point) -> bool {
        if !self.mounted {
            return false;
        }
        if self.tap_through {
            self.content_frame.contains(point)
        } else {
            true
        }
    }
}

// ====== Sheet ======

/// Full-screen modal cover. Always consumes touches.
pub struct SheetSurface {
    mounted: bool,
}

impl SheetSurface {
    pub fn new() -> Self {
        Self { mounted: false }
    }
}

impl Default for SheetSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceStrategy for SheetSurface {
    fn mount(&mut self) -> Result<(), SurfaceError> {
        if self.mounted {
            return Err(SurfaceError::AlreadyMounted);
        }
        self.mounted = true;
        Ok(())
    }

    fn prepare_unmount(&mut self) {}

    fn unmount(&mut self) {
        self.mounted = false;
    }

    fn set_content_frame(&mut self, _frame: Rect) {}

    fn hit_test(&self, _point: Point) -> bool {
        self.mounted
    }
}

// ====== Window ======

/// Identifier of one registered top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(u64);

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct WindowEntry {
    content_frame: Rect,
    tap_through: bool,
}

fn registry() -> &'static Mutex<IndexMap<WindowId, WindowEntry>> {
    static REGISTRY: OnceLock<Mutex<IndexMap<WindowId, WindowEntry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(IndexMap::new()))
}

fn with_registry<R>(f: impl FnOnce(&mut IndexMap<WindowId, WindowEntry>) -> R) -> R {
    let mut guard = match registry().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(&mut guard)
}

/// Number of popup windows currently registered.
pub fn active_window_count() -> usize {
    with_registry(|windows| windows.len())
}

/// Route a touch through every registered window, topmost first. Returns
/// the window that consumed it, if any.
pub fn hit_test_windows(point: Point) -> Option<WindowId> {
    with_registry(|windows| {
        windows
            .iter()
            .rev()
            .find(|(_, entry)| !entry.tap_through || entry.content_frame.contains(point))
            .map(|(id, _)| *id)
    })
}

/// Detached top-level window with registry-backed hit-test delegation.
pub struct WindowSurface {
    tap_through: bool,
    content_frame: Rect,
    window: Option<WindowId>,
}

impl WindowSurface {
    pub fn new(tap_through: bool) -> Self {
        Self {
            tap_through,
            content_frame: Rect::default(),
            window: None,
        }
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.window
    }
}

impl SurfaceStrategy for WindowSurface {
    fn mount(&mut self) -> Result<(), SurfaceError> {
        if self.window.is_some() {
            return Err(SurfaceError::AlreadyMounted);
        }
        let id = WindowId(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed));
        with_registry(|windows| {
            windows.insert(
                id,
                WindowEntry {
                    content_frame: self.content_frame,
                    tap_through: self.tap_through,
                },
            );
        });
        debug!(?id, "popup window registered");
        self.window = Some(id);
        Ok(())
    }

    fn prepare_unmount(&mut self) {}

    fn unmount(&mut self) {
        if let Some(id) = self.window.take() {
            let removed = with_registry(|windows| windows.shift_remove(&id).is_some());
            if !removed {
                warn!(?id, "popup window was already unregistered");
            }
        }
    }

    fn set_content_frame(&mut self, frame: Rect) {
        self.content_frame = frame;
        if let Some(id) = self.window {
            with_registry(|windows| {
                if let Some(entry) = windows.get_mut(&id) {
                    entry.content_frame = frame;
                }
            });
        }
    }

    fn hit_test(&self, point: Point) -> bool {
        let Some(id) = self.window else {
            return false;
        };
        with_registry(|windows| match windows.get(&id) {
            Some(entry) => !entry.tap_through || entry.content_frame.contains(point),
            None => false,
        })
    }
}

impl Drop for WindowSurface {
    fn drop(&mut self) {
        // Dropping a mounted surface must not leak a registry entry.
        self.unmount();
    }
}
