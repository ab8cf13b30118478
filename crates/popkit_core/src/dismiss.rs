//! Dismissal intent resolution.
//!
//! Every way a popup can close funnels through `DismissResolver`, which
//! applies configuration policy and the minimum-visible-time gate, and
//! records the first accepted trigger. The recorded source is what the
//! host's `will_dismiss`/`on_dismiss` callbacks receive, so it is set at
//! acceptance time and never inferred later.

use std::sync::Arc;

use tracing::debug;

/// What triggered a dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissSource {
    /// The presence binding was cleared programmatically.
    Binding,
    /// Tap on the popup content.
    TapInside,
    /// Tap on the scrim or outside the content.
    TapOutside,
    /// Drag released past the dismissal threshold.
    Drag,
    /// The autohide countdown fired.
    Autohide,
}

/// Callback invoked around a dismissal, receiving the accepted source.
pub type DismissCallback = Arc<dyn Fn(DismissSource) + Send + Sync>;

/// Policy gate for dismissal triggers.
///
/// Exactly one trigger is accepted per presentation; everything after the
/// first acceptance is dropped. `reset` re-arms the resolver when a new
/// presentation begins.
#[derive(Debug, Clone)]
pub struct DismissResolver {
    close_on_tap: bool,
    close_on_tap_outside: bool,
    has_grace_period: bool,
    dismiss_enabled: bool,
    accepted: Option<DismissSource>,
}

impl DismissResolver {
    /// `grace_period` delays *all* triggers until `mark_dismissible` is
    /// called, typically from the minimum-visible-time countdown.
    pub fn new(close_on_tap: bool, close_on_tap_outside: bool, grace_period: bool) -> Self {
        Self {
            close_on_tap,
            close_on_tap_outside,
            has_grace_period: grace_period,
            dismiss_enabled: !grace_period,
            accepted: None,
        }
    }

    /// Re-arm for a new presentation.
    pub fn reset(&mut self) {
        self.dismiss_enabled = !self.has_grace_period;
        self.accepted = None;
    }

    /// Called when the minimum-visible-time countdown elapses.
    pub fn mark_dismissible(&mut self) {
        self.dismiss_enabled = true;
    }

    pub fn is_dismissible(&self) -> bool {
        self.dismiss_enabled
    }

    /// The trigger that won this presentation, if any.
    pub fn accepted(&self) -> Option<DismissSource> {
        self.accepted
    }

    /// Apply policy to one trigger. Returns `true` exactly once per
    /// presentation, for the first trigger that passes every gate.
    pub fn resolve(&mut self, source: DismissSource) -> bool {
        if self.accepted.is_some() {
            debug!(?source, "dismissal already resolved, dropping trigger");
            return false;
        }
        match source {
            DismissSource::TapInside if !self.close_on_tap => return false,
            DismissSource::TapOutside if !self.close_on_tap_outside => return false,
            _ => {}
        }
        if !self.dismiss_enabled {
            debug!(?source, "dismissal gated by minimum visible time");
            return false;
        }
        self.accepted = Some(source);
        debug!(?source, "dismissal accepted");
        true
    }

    /// Record a source for a dismissal that bypasses policy (the presence
    /// binding clearing). No-op once a source has been accepted.
    pub fn record(&mut self, source: DismissSource) {
        if self.accepted.is_none() {
            self.accepted = Some(source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trigger_wins() {
        let mut resolver = DismissResolver::new(true, true, false);
        assert!(resolver.resolve(DismissSource::TapInside));
        assert!(!resolver.resolve(DismissSource::Autohide));
        assert_eq!(resolver.accepted(), Some(DismissSource::TapInside));
    }

    #[test]
    fn tap_policy_filters_triggers() {
        let mut resolver = DismissResolver::new(false, false, false);
        assert!(!resolver.resolve(DismissSource::TapInside));
        assert!(!resolver.resolve(DismissSource::TapOutside));
        assert!(resolver.resolve(DismissSource::Drag));
    }

    #[test]
    fn grace_period_gates_until_marked() {
        let mut resolver = DismissResolver::new(true, true, true);
        assert!(!resolver.resolve(DismissSource::TapInside));
        assert!(resolver.accepted().is_none());
        resolver.mark_dismissible();
        assert!(resolver.resolve(DismissSource::TapInside));
    }

    #[test]
    fn rejected_triggers_are_dropped_not_queued() {
        let mut resolver = DismissResolver::new(true, true, true);
        assert!(!resolver.resolve(DismissSource::Autohide));
        resolver.mark_dismissible();
        // The earlier rejection left no pending state behind.
        assert!(resolver.accepted().is_none());
    }

    #[test]
    fn reset_rearms_the_gate() {
        let mut resolver = DismissResolver::new(true, true, true);
        resolver.mark_dismissible();
        assert!(resolver.resolve(DismissSource::Drag));
        resolver.reset();
        assert!(resolver.accepted().is_none());
        assert!(!resolver.is_dismissible());
        assert!(!resolver.resolve(DismissSource::Drag));
    }

    #[test]
    fn record_does_not_override_accepted_source() {
        let mut resolver = DismissResolver::new(true, true, false);
        assert!(resolver.resolve(DismissSource::Drag));
        resolver.record(DismissSource::Binding);
        assert_eq!(resolver.accepted(), Some(DismissSource::Drag));

        let mut fresh = DismissResolver::new(true, true, false);
        fresh.record(DismissSource::Binding);
        assert_eq!(fresh.accepted(), Some(DismissSource::Binding));
    }
}
