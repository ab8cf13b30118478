//! Scoped dismiss capability.
//!
//! Content rendered inside a popup can close its own popup without holding a
//! reference to the controller: the presenter wraps each content build in
//! `with_dismiss`, and anything built within that scope may grab the
//! innermost proxy via `current_dismiss`. Nested popups shadow their
//! ancestors, so "dismiss" always means the nearest enclosing popup.

use std::cell::RefCell;
use std::sync::Arc;

use popkit_core::dismiss::DismissSource;

/// Capability to dismiss one specific popup.
#[derive(Clone)]
pub struct DismissProxy {
    dismiss: Arc<dyn Fn(DismissSource) + Send + Sync>,
}

impl DismissProxy {
    pub fn new(dismiss: impl Fn(DismissSource) + Send + Sync + 'static) -> Self {
        Self {
            dismiss: Arc::new(dismiss),
        }
    }

    /// Programmatic dismissal, reported as a binding-driven close.
    pub fn dismiss(&self) {
        (self.dismiss)(DismissSource::Binding);
    }

    pub fn dismiss_with(&self, source: DismissSource) {
        (self.dismiss)(source);
    }
}

thread_local! {
    static DISMISS_SCOPE: RefCell<Vec<DismissProxy>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` with `proxy` as the innermost dismiss capability.
pub fn with_dismiss<R>(proxy: DismissProxy, f: impl FnOnce() -> R) -> R {
    DISMISS_SCOPE.with(|scope| scope.borrow_mut().push(proxy));
    let result = f();
    DISMISS_SCOPE.with(|scope| {
        scope.borrow_mut().pop();
    });
    result
}

/// The nearest enclosing popup's dismiss capability, if any.
pub fn current_dismiss() -> Option<DismissProxy> {
    DISMISS_SCOPE.with(|scope| scope.borrow().last().cloned())
}
