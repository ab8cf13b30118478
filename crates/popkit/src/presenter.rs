//! Popup lifecycle.
//!
//! `Popup` owns one popup's full presentation lifecycle: it observes the
//! host's presence binding, mounts a surface, waits for the content to be
//! measured, commits animation targets, runs the autohide and
//! minimum-visible-time countdowns, and funnels every dismissal trigger
//! through the intent resolver.
//!
//! The phase machine is deliberately small:
//!
//! ```text
//! Idle -> Mounting -> Visible -> Dismissing -> Idle
//! ```
//!
//! `Mounting` exists because the entry animation cannot start until the
//! content has been measured; until then the content parks at a far-away
//! sentinel. Presence flips arriving while a transition is animating are
//! queued FIFO and applied one at a time, so a show/hide/show burst settles
//! to the final requested state without overlapping animations.
//!
//! Time is pushed: the host calls `update(now_ms)` every frame with a
//! monotonic clock, and every countdown and completion fallback derives
//! from those ticks. Nothing here reads the wall clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use popkit_core::animation::AnimationSpec;
use popkit_core::dismiss::{DismissResolver, DismissSource};
use popkit_core::drag::{DragController, DragOutcome, ScrollPull};
use popkit_core::geometry::{self, EdgeInsets, GeometrySnapshot, Point, Rect, Size};
use popkit_core::params::{PopupParams, PopupType};
use popkit_core::timer::Countdown;

use crate::binding::{Binding, PresentationRequest};
use crate::context::{self, DismissProxy};
use crate::surface::{self, SurfaceStrategy};

// ====== Phase machine ======

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupPhase {
    /// Nothing mounted.
    Idle,
    /// Surface mounted, content not yet measured. The popup is invisible.
    Mounting,
    /// Content measured and displayed.
    Visible,
    /// Hide animation running; content still renders until it finishes.
    Dismissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Present,
    PositionCalculated,
    Dismiss,
    HideFinished,
}

impl PopupPhase {
    /// Legal transitions; everything else is ignored by the caller.
    pub fn on_event(self, event: PhaseEvent) -> Option<PopupPhase> {
        match (self, event) {
            (PopupPhase::Idle, PhaseEvent::Present) => Some(PopupPhase::Mounting),
            (PopupPhase::Mounting, PhaseEvent::PositionCalculated) => Some(PopupPhase::Visible),
            (PopupPhase::Mounting, PhaseEvent::Dismiss) => Some(PopupPhase::Dismissing),
            (PopupPhase::Visible, PhaseEvent::Dismiss) => Some(PopupPhase::Dismissing),
            (PopupPhase::Dismissing, PhaseEvent::HideFinished) => Some(PopupPhase::Idle),
            _ => None,
        }
    }
}

// ====== Render signals ======

/// Everything the host's render layer needs each frame. Offsets and
/// opacity are committed *targets*; the host's animation engine moves
/// toward them using the attached specs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSignals {
    /// Keep the popup in the tree at all (true from mount to unmount).
    pub mounted: bool,
    /// Content at its displayed position rather than parked off screen.
    pub content_visible: bool,
    pub target_offset: Point,
    pub target_scale: f32,
    /// Live finger-follow offset, additive on top of `target_offset`.
    /// Snaps to zero (animated) when a drag releases below threshold.
    pub drag_offset: Point,
    /// Scrim opacity target.
    pub background_opacity: f32,
    pub animation: AnimationSpec,
    pub background_fade: AnimationSpec,
}

// ====== Content builder ======

enum ContentBuilder<T, C> {
    View(Arc<dyn Fn() -> C + Send + Sync>),
    Item(Arc<dyn Fn(&T) -> C + Send + Sync>),
}

impl<T, C> Clone for ContentBuilder<T, C> {
    fn clone(&self) -> Self {
        match self {
            ContentBuilder::View(f) => ContentBuilder::View(Arc::clone(f)),
            ContentBuilder::Item(f) => ContentBuilder::Item(Arc::clone(f)),
        }
    }
}

// ====== Inner state ======

struct PopupInner<T, C> {
    params: PopupParams,
    request: PresentationRequest<T>,
    builder: ContentBuilder<T, C>,
    surface: Box<dyn SurfaceStrategy>,

    phase: PopupPhase,
    should_show_content: bool,
    closing_in_progress: bool,
    /// Presence flips waiting for the current transition to finish.
    pending_presence: VecDeque<bool>,
    transition_in_flight: bool,

    resolver: DismissResolver,
    drag: DragController,
    scroll: ScrollPull,
    autohide: Countdown,
    dismissible: Countdown,
    /// Fallback deadline for the running show/hide transition, armed with
    /// the configured animation duration in case the host never reports
    /// completion.
    completion: Countdown,

    geometry: GeometrySnapshot,
    measured_this_presentation: bool,
    now_ms: u64,

    target_offset: Point,
    target_scale: f32,
    background_opacity: f32,

    /// Copy of the most recent non-empty item, refreshed on every item
    /// change so the content builder tracks replacements, and kept through
    /// the hide animation so the outgoing content renders after the
    /// binding clears.
    retained_item: Option<T>,
}

fn lock_inner<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<T: Clone + Send + 'static, C> PopupInner<T, C> {
    // ------ presence queue ------

    fn presence_changed(&mut self, presented: bool) {
        self.pending_presence.push_back(presented);
        self.pump();
    }

    fn pump(&mut self) {
        while !self.transition_in_flight {
            let Some(presented) = self.pending_presence.pop_front() else {
                break;
            };
            if presented {
                self.begin_present();
            } else {
                self.begin_dismiss();
            }
        }
    }

    fn begin_present(&mut self) {
        let Some(next) = self.phase.on_event(PhaseEvent::Present) else {
            debug!(phase = ?self.phase, "ignoring redundant present request");
            return;
        };
        self.closing_in_progress = false;
        self.resolver.reset();
        self.retained_item = self.request.item_value();
        self.measured_this_presentation = false;
        self.should_show_content = false;
        self.target_offset = self.geometry.far_away_point();
        self.target_scale = geometry::hidden_scale(self.params.resolved_appear_from());
        self.background_opacity = 0.0;
        if let Err(err) = self.surface.mount() {
            warn!(%err, "surface mount failed");
        }
        self.phase = next;
        debug!(phase = ?self.phase, "popup mounting");
        self.arm_completion(self.params.animation.duration_ms);
    }

    fn begin_dismiss(&mut self) {
        let Some(next) = self.phase.on_event(PhaseEvent::Dismiss) else {
            debug!(phase = ?self.phase, "ignoring redundant dismiss request");
            return;
        };
        self.resolver.record(DismissSource::Binding);
        let source = self
            .resolver
            .accepted()
            .unwrap_or(DismissSource::Binding);
        self.closing_in_progress = true;
        if let Some(callback) = self.params.will_dismiss.clone() {
            callback(source);
        }
        self.autohide.cancel();
        self.dismissible.cancel();
        self.drag = DragController::new();
        self.should_show_content = false;
        self.background_opacity = 0.0;
        let resolved = geometry::resolve(&self.geometry, &self.params);
        self.target_offset = resolved.hidden;
        self.target_scale = resolved.hidden_scale;
        self.surface.prepare_unmount();
        self.phase = next;
        debug!(phase = ?self.phase, ?source, "popup dismissing");
        let duration = self
            .params
            .animation
            .duration_ms
            .max(self.params.background_fade.duration_ms);
        self.arm_completion(duration);
    }

    fn arm_completion(&mut self, duration_ms: u32) {
        self.transition_in_flight = true;
        self.completion.schedule(self.now_ms, duration_ms);
    }

    /// Show or hide transition finished, via host report or the fallback
    /// deadline.
    fn transition_finished(&mut self) {
        if !self.transition_in_flight {
            return;
        }
        if self.phase == PopupPhase::Dismissing {
            self.finish_hide();
        } else {
            self.transition_in_flight = false;
            self.pump();
        }
    }

    fn finish_hide(&mut self) {
        let source = self
            .resolver
            .accepted()
            .unwrap_or(DismissSource::Binding);
        if let Some(next) = self.phase.on_event(PhaseEvent::HideFinished) {
            self.phase = next;
        }
        self.surface.unmount();
        self.retained_item = None;
        self.closing_in_progress = false;
        self.resolver.reset();
        debug!(?source, "popup unmounted");
        if let Some(callback) = self.params.on_dismiss.clone() {
            callback(source);
        }
        self.transition_in_flight = false;
        self.pump();
    }

    // ------ geometry ------

    fn content_measured(&mut self, size: Size) {
        if size.is_empty() {
            debug!("ignoring empty content measurement");
            return;
        }
        self.geometry.content_size = size;
        if self.params.popup_type == PopupType::Scroll {
            self.scroll
                .set_extents(size.height, self.geometry.presenter_rect.height);
        }
        let first = !self.measured_this_presentation;
        self.measured_this_presentation = true;

        if first && self.phase == PopupPhase::Mounting && !self.closing_in_progress {
            self.position_calculated();
        } else {
            self.reanchor();
        }
    }

    /// First measurement of this presentation: reveal the content and start
    /// the countdowns.
    fn position_calculated(&mut self) {
        let Some(next) = self.phase.on_event(PhaseEvent::PositionCalculated) else {
            return;
        };
        self.phase = next;
        self.should_show_content = true;
        self.background_opacity = 1.0;
        self.commit_displayed_target();
        if let Some(ms) = self.params.autohide_after_ms {
            self.autohide.schedule(self.now_ms, ms);
        }
        if let Some(ms) = self.params.dismissible_after_ms {
            self.dismissible.schedule(self.now_ms, ms);
        }
        debug!(phase = ?self.phase, offset = ?self.target_offset, "popup visible");
    }

    fn presenter_changed(&mut self, rect: Rect, safe_area: EdgeInsets) {
        self.geometry.presenter_rect = rect;
        self.geometry.safe_area = safe_area;
        if self.params.popup_type == PopupType::Scroll {
            self.scroll
                .set_extents(self.geometry.content_size.height, rect.height);
        }
        self.reanchor();
    }

    fn keyboard_changed(&mut self, height: f32) {
        self.geometry.keyboard_height = height;
        self.reanchor();
    }

    /// Re-commit the displayed target after any geometry input moved.
    fn reanchor(&mut self) {
        if self.should_show_content {
            self.commit_displayed_target();
        }
    }

    fn commit_displayed_target(&mut self) {
        let offset = geometry::displayed_offset(&self.geometry, &self.params);
        self.target_offset = offset;
        self.target_scale = 1.0;
        self.surface.set_content_frame(Rect::new(
            offset.x,
            offset.y,
            self.geometry.content_size.width,
            self.geometry.content_size.height,
        ));
    }

    // ------ time ------

    /// Advance all countdowns. Returns a source when an accepted dismissal
    /// needs the presence binding cleared (done by the caller outside the
    /// lock).
    fn tick(&mut self, now_ms: u64) -> Option<DismissSource> {
        self.now_ms = now_ms;
        let mut clear_presence = None;

        if self.dismissible.fire(now_ms) {
            self.resolver.mark_dismissible();
        }
        if self.autohide.fire(now_ms) {
            if self.drag.is_dragging() {
                self.drag.defer_dismiss();
            } else if self.phase == PopupPhase::Visible
                && self.resolver.resolve(DismissSource::Autohide)
            {
                clear_presence = Some(DismissSource::Autohide);
            }
        }
        if self.completion.fire(now_ms) {
            self.transition_finished();
        }
        clear_presence
    }

    // ------ signals ------

    fn render_signals(&self) -> RenderSignals {
        RenderSignals {
            mounted: self.phase != PopupPhase::Idle,
            content_visible: self.should_show_content,
            target_offset: self.target_offset,
            target_scale: self.target_scale,
            drag_offset: self.drag.offset(self.params.resolved_disappear_to()),
            background_opacity: self.background_opacity,
            animation: self.params.animation,
            background_fade: self.params.background_fade,
        }
    }
}

// ====== Public handle ======

/// Shared handle to one popup controller.
///
/// Construction wires a subscription to the presence binding; all other
/// inputs (ticks, measurements, gestures) are pushed through this handle by
/// the host.
pub struct Popup<T = (), C = ()> {
    inner: Arc<Mutex<PopupInner<T, C>>>,
}

impl<T, C> Clone for Popup<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: 'static> Popup<(), C> {
    /// Flag-driven popup: visible while `presented` is `true`.
    pub fn new(
        presented: Binding<bool>,
        params: PopupParams,
        view: impl Fn() -> C + Send + Sync + 'static,
    ) -> Self {
        let request = PresentationRequest::Flag(presented.clone());
        let popup = Self::build(request, params, ContentBuilder::View(Arc::new(view)));
        let weak = Arc::downgrade(&popup.inner);
        presented.subscribe(move |value| {
            if let Some(inner) = weak.upgrade() {
                lock_inner(&inner).presence_changed(*value);
            }
        });
        popup.sync_initial_presence();
        popup
    }
}

impl<T: Clone + Send + 'static, C: 'static> Popup<T, C> {
    /// Item-driven popup: visible while `item` is `Some`. The item feeds
    /// the content builder and is retained for the hide animation.
    pub fn with_item(
        item: Binding<Option<T>>,
        params: PopupParams,
        view: impl Fn(&T) -> C + Send + Sync + 'static,
    ) -> Self {
        let request = PresentationRequest::Item(item.clone());
        let popup = Self::build(request, params, ContentBuilder::Item(Arc::new(view)));
        let weak = Arc::downgrade(&popup.inner);
        item.subscribe(move |value| {
            if let Some(inner) = weak.upgrade() {
                let mut inner = lock_inner(&inner);
                // Replacing the item while presented swaps the content in
                // place; the retained copy only outlives the binding during
                // the hide animation.
                if let Some(value) = value {
                    inner.retained_item = Some(value.clone());
                }
                inner.presence_changed(value.is_some());
            }
        });
        popup.sync_initial_presence();
        popup
    }

    fn build(
        request: PresentationRequest<T>,
        params: PopupParams,
        builder: ContentBuilder<T, C>,
    ) -> Self {
        let resolver = DismissResolver::new(
            params.close_on_tap,
            params.close_on_tap_outside,
            params.dismissible_after_ms.is_some(),
        );
        let surface = surface::for_params(&params);
        let inner = PopupInner {
            params,
            request,
            builder,
            surface,
            phase: PopupPhase::Idle,
            should_show_content: false,
            closing_in_progress: false,
            pending_presence: VecDeque::new(),
            transition_in_flight: false,
            resolver,
            drag: DragController::new(),
            scroll: ScrollPull::default(),
            autohide: Countdown::new(),
            dismissible: Countdown::new(),
            completion: Countdown::new(),
            geometry: GeometrySnapshot::default(),
            measured_this_presentation: false,
            now_ms: 0,
            target_offset: Point::ZERO,
            target_scale: 1.0,
            background_opacity: 0.0,
            retained_item: None,
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn sync_initial_presence(&self) {
        let mut inner = self.lock();
        if inner.request.is_presented() {
            inner.presence_changed(true);
        }
    }

    fn lock(&self) -> MutexGuard<'_, PopupInner<T, C>> {
        lock_inner(&self.inner)
    }

    // ------ host inputs ------

    /// Advance timers. Call every frame with a monotonic millisecond clock.
    pub fn update(&self, now_ms: u64) {
        let cleared = {
            let mut inner = self.lock();
            inner.tick(now_ms).map(|_| inner.request.clone())
        };
        if let Some(request) = cleared {
            request.clear();
        }
    }

    /// The host's animation engine finished the current show/hide
    /// transition. Preferred over waiting for the fallback deadline.
    pub fn animation_completed(&self) {
        let mut inner = self.lock();
        inner.completion.cancel();
        inner.transition_finished();
    }

    /// New content measurement from the host's layout pass.
    pub fn content_measured(&self, size: Size) {
        self.lock().content_measured(size);
    }

    /// Presenter frame or safe area changed.
    pub fn presenter_changed(&self, rect: Rect, safe_area: EdgeInsets) {
        self.lock().presenter_changed(rect, safe_area);
    }

    /// Software keyboard height over the presenter changed.
    pub fn keyboard_changed(&self, height: f32) {
        self.lock().keyboard_changed(height);
    }

    pub fn tap_inside(&self) {
        self.resolve_and_clear(DismissSource::TapInside);
    }

    pub fn tap_outside(&self) {
        self.resolve_and_clear(DismissSource::TapOutside);
    }

    /// Pointer moved during a drag. Ignored unless drag-to-dismiss is on
    /// and the popup is visible.
    pub fn drag_changed(&self, translation: Point) {
        let mut inner = self.lock();
        if inner.params.drag_to_dismiss && inner.phase == PopupPhase::Visible {
            inner.drag.update(translation);
        }
    }

    /// Drag released. Either dismisses through the resolver or snaps the
    /// content back.
    pub fn drag_ended(&self, translation: Point) {
        let cleared = {
            let mut inner = self.lock();
            if !inner.params.drag_to_dismiss || inner.phase != PopupPhase::Visible {
                None
            } else {
                let direction = inner.params.resolved_disappear_to();
                let content = inner.geometry.content_size;
                let threshold = inner.params.drag_to_dismiss_distance;
                match inner.drag.end(translation, direction, content, threshold) {
                    DragOutcome::Dismiss if inner.resolver.resolve(DismissSource::Drag) => {
                        Some(inner.request.clone())
                    }
                    _ => None,
                }
            }
        };
        if let Some(request) = cleared {
            request.clear();
        }
    }

    /// Pan delta inside scrollable sheet content. Positive deltas are
    /// downward finger movement.
    pub fn scroll_pan(&self, delta: f32) {
        let mut inner = self.lock();
        if inner.phase == PopupPhase::Visible {
            inner.scroll.pan(delta);
        }
    }

    /// Scroll pan released; overscroll past the threshold dismisses.
    pub fn scroll_released(&self) {
        let cleared = {
            let mut inner = self.lock();
            if inner.phase != PopupPhase::Visible {
                None
            } else {
                let threshold = inner
                    .params
                    .drag_to_dismiss_distance
                    .unwrap_or(inner.geometry.content_size.height / 3.0);
                match inner.scroll.release(threshold) {
                    DragOutcome::Dismiss if inner.resolver.resolve(DismissSource::Drag) => {
                        Some(inner.request.clone())
                    }
                    _ => None,
                }
            }
        };
        if let Some(request) = cleared {
            request.clear();
        }
    }

    // ------ host outputs ------

    pub fn phase(&self) -> PopupPhase {
        self.lock().phase
    }

    pub fn signals(&self) -> RenderSignals {
        self.lock().render_signals()
    }

    /// Inner scroll offset for scrollable sheet content.
    pub fn scroll_offset(&self) -> f32 {
        self.lock().scroll.content_offset()
    }

    /// Whether the surface consumes a touch at `point`, in presenter
    /// coordinates.
    pub fn hit_test(&self, point: Point) -> bool {
        self.lock().surface.hit_test(point)
    }

    /// Build the popup content, or `None` while unmounted. The build runs
    /// inside a dismiss scope, so content can close its own popup via
    /// [`crate::context::current_dismiss`]. Item-driven popups build from
    /// the retained item, keeping the outgoing content alive through the
    /// hide animation.
    pub fn build_content(&self) -> Option<C> {
        let (mounted, item, builder) = {
            let inner = self.lock();
            (
                inner.phase != PopupPhase::Idle,
                inner.retained_item.clone(),
                inner.builder.clone(),
            )
        };
        if !mounted {
            return None;
        }
        context::with_dismiss(self.dismiss_proxy(), || match &builder {
            ContentBuilder::View(build) => Some(build()),
            ContentBuilder::Item(build) => item.as_ref().map(|value| build(value)),
        })
    }

    /// Capability to dismiss this popup programmatically. Bypasses the tap
    /// policy and the minimum-visible-time gate, exactly like clearing the
    /// presence binding directly.
    pub fn dismiss_proxy(&self) -> DismissProxy {
        let weak = Arc::downgrade(&self.inner);
        DismissProxy::new(move |source| {
            let cleared = weak.upgrade().and_then(|inner| {
                let mut inner = lock_inner(&inner);
                if inner.phase == PopupPhase::Idle {
                    return None;
                }
                inner.resolver.record(source);
                Some(inner.request.clone())
            });
            if let Some(request) = cleared {
                request.clear();
            }
        })
    }

    fn resolve_and_clear(&self, source: DismissSource) {
        let cleared = {
            let mut inner = self.lock();
            if inner.phase == PopupPhase::Visible && inner.resolver.resolve(source) {
                Some(inner.request.clone())
            } else {
                None
            }
        };
        if let Some(request) = cleared {
            request.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popkit_core::params::DisplayMode;

    const PRESENTER: Rect = Rect::new(0.0, 0.0, 400.0, 800.0);

    fn flag_popup(params: PopupParams) -> (Binding<bool>, Popup<(), &'static str>) {
        let flag = Binding::new(false);
        // Overlay keeps unit tests off the process-global window registry.
        let popup = Popup::new(
            flag.clone(),
            params.display_mode(DisplayMode::Overlay),
            || "content",
        );
        popup.presenter_changed(PRESENTER, EdgeInsets::ZERO);
        popup.update(1_000);
        (flag, popup)
    }

    #[test]
    fn phase_machine_rejects_illegal_transitions() {
        assert_eq!(
            PopupPhase::Idle.on_event(PhaseEvent::Present),
            Some(PopupPhase::Mounting)
        );
        assert_eq!(PopupPhase::Idle.on_event(PhaseEvent::Dismiss), None);
        assert_eq!(
            PopupPhase::Mounting.on_event(PhaseEvent::Dismiss),
            Some(PopupPhase::Dismissing)
        );
        assert_eq!(PopupPhase::Visible.on_event(PhaseEvent::Present), None);
        assert_eq!(
            PopupPhase::Dismissing.on_event(PhaseEvent::HideFinished),
            Some(PopupPhase::Idle)
        );
    }

    #[test]
    fn mounting_parks_content_until_measured() {
        let (flag, popup) = flag_popup(PopupParams::toast());
        flag.set(true);

        assert_eq!(popup.phase(), PopupPhase::Mounting);
        let signals = popup.signals();
        assert!(signals.mounted);
        assert!(!signals.content_visible);
        assert_eq!(signals.target_offset, Point::new(800.0, 1600.0));

        popup.content_measured(Size::new(300.0, 100.0));
        assert_eq!(popup.phase(), PopupPhase::Visible);
        let signals = popup.signals();
        assert!(signals.content_visible);
        assert_eq!(signals.target_offset, Point::new(50.0, 700.0));
        assert_eq!(signals.background_opacity, 1.0);
    }

    #[test]
    fn zero_size_measurement_is_ignored() {
        let (flag, popup) = flag_popup(PopupParams::toast());
        flag.set(true);
        popup.content_measured(Size::ZERO);
        assert_eq!(popup.phase(), PopupPhase::Mounting);
    }

    #[test]
    fn tap_inside_dismisses_when_enabled() {
        let (flag, popup) = flag_popup(PopupParams::toast());
        flag.set(true);
        popup.content_measured(Size::new(300.0, 100.0));
        popup.animation_completed();

        popup.tap_inside();
        assert_eq!(popup.phase(), PopupPhase::Dismissing);
        assert!(!flag.get());
        assert!(!popup.signals().content_visible);

        popup.animation_completed();
        assert_eq!(popup.phase(), PopupPhase::Idle);
        assert!(!popup.signals().mounted);
    }

    #[test]
    fn tap_policy_is_enforced() {
        let (flag, popup) = flag_popup(PopupParams::toast().close_on_tap(false));
        flag.set(true);
        popup.content_measured(Size::new(300.0, 100.0));

        popup.tap_inside();
        popup.tap_outside();
        assert_eq!(popup.phase(), PopupPhase::Visible);
        assert!(flag.get());
    }

    #[test]
    fn dismissal_during_mounting_skips_reveal() {
        let (flag, popup) = flag_popup(PopupParams::toast());
        flag.set(true);
        flag.set(false);

        // The hide is queued behind the in-flight show transition.
        assert_eq!(popup.phase(), PopupPhase::Mounting);
        popup.update(1_300);
        assert_eq!(popup.phase(), PopupPhase::Dismissing);

        // A measurement arriving now must not re-reveal the content.
        popup.content_measured(Size::new(300.0, 100.0));
        assert!(!popup.signals().content_visible);

        popup.animation_completed();
        assert_eq!(popup.phase(), PopupPhase::Idle);
    }

    #[test]
    fn autohide_fires_through_update() {
        let (flag, popup) = flag_popup(PopupParams::toast().autohide_after_ms(2_000));
        flag.set(true);
        popup.content_measured(Size::new(300.0, 100.0));
        popup.animation_completed();

        popup.update(2_999);
        assert_eq!(popup.phase(), PopupPhase::Visible);
        popup.update(3_000);
        assert_eq!(popup.phase(), PopupPhase::Dismissing);
        assert!(!flag.get());
    }

    #[test]
    fn fallback_deadline_completes_the_hide() {
        let (flag, popup) = flag_popup(PopupParams::toast());
        flag.set(true);
        popup.content_measured(Size::new(300.0, 100.0));
        popup.animation_completed();
        popup.update(5_000);

        flag.set(false);
        assert_eq!(popup.phase(), PopupPhase::Dismissing);
        // Host never reports completion; the armed deadline takes over.
        popup.update(5_299);
        assert_eq!(popup.phase(), PopupPhase::Dismissing);
        popup.update(5_300);
        assert_eq!(popup.phase(), PopupPhase::Idle);
    }

    #[test]
    fn keyboard_reanchors_visible_content() {
        let (flag, popup) = flag_popup(PopupParams::toast().use_keyboard_safe_area(true));
        flag.set(true);
        popup.content_measured(Size::new(300.0, 100.0));
        assert_eq!(popup.signals().target_offset.y, 700.0);

        popup.keyboard_changed(250.0);
        assert_eq!(popup.signals().target_offset.y, 450.0);
        popup.keyboard_changed(0.0);
        assert_eq!(popup.signals().target_offset.y, 700.0);
    }

    #[test]
    fn drag_below_threshold_snaps_back() {
        let (flag, popup) = flag_popup(PopupParams::toast());
        flag.set(true);
        popup.content_measured(Size::new(300.0, 150.0));

        popup.drag_changed(Point::new(0.0, 30.0));
        assert_eq!(popup.signals().drag_offset, Point::new(0.0, 30.0));

        popup.drag_ended(Point::new(0.0, 49.0));
        assert_eq!(popup.phase(), PopupPhase::Visible);
        assert_eq!(popup.signals().drag_offset, Point::ZERO);
        assert!(flag.get());
    }

    #[test]
    fn drag_past_threshold_dismisses() {
        let (flag, popup) = flag_popup(PopupParams::toast());
        flag.set(true);
        popup.content_measured(Size::new(300.0, 150.0));
        popup.animation_completed();

        popup.drag_changed(Point::new(0.0, 51.0));
        popup.drag_ended(Point::new(0.0, 51.0));
        assert_eq!(popup.phase(), PopupPhase::Dismissing);
        assert!(!flag.get());
    }

    #[test]
    fn item_mode_retains_content_through_hide() {
        let item: Binding<Option<String>> = Binding::new(None);
        let popup = Popup::with_item(
            item.clone(),
            PopupParams::toast().display_mode(DisplayMode::Overlay),
            |value: &String| value.clone(),
        );
        popup.presenter_changed(PRESENTER, EdgeInsets::ZERO);
        popup.update(1_000);

        item.set(Some("first".to_string()));
        popup.content_measured(Size::new(300.0, 100.0));
        popup.animation_completed();
        assert_eq!(popup.build_content().as_deref(), Some("first"));

        item.set(None);
        assert_eq!(popup.phase(), PopupPhase::Dismissing);
        // The binding is empty, yet the outgoing content keeps rendering.
        assert_eq!(popup.build_content().as_deref(), Some("first"));

        popup.animation_completed();
        assert!(popup.build_content().is_none());
    }

    #[test]
    fn item_replacement_swaps_content_in_place() {
        let item: Binding<Option<String>> = Binding::new(None);
        let popup = Popup::with_item(
            item.clone(),
            PopupParams::toast().display_mode(DisplayMode::Overlay),
            |value: &String| value.clone(),
        );
        popup.presenter_changed(PRESENTER, EdgeInsets::ZERO);
        popup.update(1_000);

        item.set(Some("first".to_string()));
        popup.content_measured(Size::new(300.0, 100.0));
        popup.animation_completed();
        assert_eq!(popup.build_content().as_deref(), Some("first"));

        // Replacing the item while visible is not a new presentation; the
        // builder must see the new value immediately.
        item.set(Some("second".to_string()));
        assert_eq!(popup.phase(), PopupPhase::Visible);
        assert_eq!(popup.build_content().as_deref(), Some("second"));

        // And the replacement is what the hide animation retains.
        item.set(None);
        assert_eq!(popup.build_content().as_deref(), Some("second"));
    }

    #[test]
    fn content_can_dismiss_itself_through_the_scope() {
        let (flag, popup) = flag_popup(PopupParams::toast());
        flag.set(true);
        popup.content_measured(Size::new(300.0, 100.0));
        popup.animation_completed();

        let proxy = popup.dismiss_proxy();
        proxy.dismiss();
        assert_eq!(popup.phase(), PopupPhase::Dismissing);
        assert!(!flag.get());
    }
}
