//! Observable presence bindings.
//!
//! A `Binding<T>` is a shared mutable cell with synchronous change
//! notification. The popup controller subscribes to the host's binding and
//! reacts to presence flips; it also writes the binding back when a tap,
//! drag or timer dismisses the popup, so the host's state stays the single
//! source of truth.
//!
//! Subscribers are invoked after the value lock is released, so a callback
//! may freely read the binding it is observing.

use std::sync::{Arc, Mutex};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Stable handle for one subscription.
    pub struct SubscriptionId;
}

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct BindingInner<T> {
    value: T,
    subscribers: SlotMap<SubscriptionId, Subscriber<T>>,
}

/// Shared observable value. Cloning shares the underlying cell.
pub struct Binding<T> {
    inner: Arc<Mutex<BindingInner<T>>>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send> Binding<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BindingInner {
                value,
                subscribers: SlotMap::with_key(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Replace the value and notify every subscriber with the new value.
    pub fn set(&self, value: T) {
        let notify: SmallVec<[Subscriber<T>; 4]> = {
            let mut inner = self.lock();
            inner.value = value.clone();
            inner.subscribers.values().cloned().collect()
        };
        for subscriber in notify {
            subscriber(&value);
        }
    }

    /// Mutate in place, then notify.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let (value, notify): (T, SmallVec<[Subscriber<T>; 4]>) = {
            let mut inner = self.lock();
            f(&mut inner.value);
            (
                inner.value.clone(),
                inner.subscribers.values().cloned().collect(),
            )
        };
        for subscriber in notify {
            subscriber(&value);
        }
    }

    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        self.lock().subscribers.insert(Arc::new(f))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BindingInner<T>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ====== Presentation request ======

/// How the host expresses "show this popup".
///
/// The two modes are mutually exclusive by construction: a popup is driven
/// either by a boolean flag or by an optional item, never both.
pub enum PresentationRequest<T> {
    /// Visible while the flag is `true`.
    Flag(Binding<bool>),
    /// Visible while the item is `Some`; the item feeds the content builder.
    Item(Binding<Option<T>>),
}

impl<T: Clone + Send> PresentationRequest<T> {
    pub fn is_presented(&self) -> bool {
        match self {
            PresentationRequest::Flag(flag) => flag.get(),
            PresentationRequest::Item(item) => item.get().is_some(),
        }
    }

    pub fn item_value(&self) -> Option<T> {
        match self {
            PresentationRequest::Flag(_) => None,
            PresentationRequest::Item(item) => item.get(),
        }
    }

    /// Clear presence, notifying subscribers.
    pub fn clear(&self) {
        match self {
            PresentationRequest::Flag(flag) => flag.set(false),
            PresentationRequest::Item(item) => item.set(None),
        }
    }
}

impl<T> Clone for PresentationRequest<T> {
    fn clone(&self) -> Self {
        match self {
            PresentationRequest::Flag(flag) => PresentationRequest::Flag(flag.clone()),
            PresentationRequest::Item(item) => PresentationRequest::Item(item.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn set_notifies_subscribers_with_new_value() {
        let binding = Binding::new(false);
        let seen = Arc::new(AtomicU32::new(0));
        let seen_clone = Arc::clone(&seen);
        binding.subscribe(move |value| {
            if *value {
                seen_clone.fetch_add(1, Ordering::SeqCst);
            }
        });
        binding.set(true);
        binding.set(true);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(binding.get());
    }

    #[test]
    fn subscriber_may_read_the_binding_reentrantly() {
        let binding = Binding::new(0u32);
        let observed = Arc::new(AtomicU32::new(0));
        let observed_clone = Arc::clone(&observed);
        let reader = binding.clone();
        binding.subscribe(move |_| {
            observed_clone.store(reader.get(), Ordering::SeqCst);
        });
        binding.set(7);
        assert_eq!(observed.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let binding = Binding::new(0u32);
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = Arc::clone(&count);
        let id = binding.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        binding.set(1);
        binding.unsubscribe(id);
        binding.set(2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn request_presence_reflects_both_modes() {
        let flag: PresentationRequest<()> = PresentationRequest::Flag(Binding::new(true));
        assert!(flag.is_presented());
        flag.clear();
        assert!(!flag.is_presented());

        let item = PresentationRequest::Item(Binding::new(Some("hello".to_string())));
        assert!(item.is_presented());
        assert_eq!(item.item_value().as_deref(), Some("hello"));
        item.clear();
        assert!(!item.is_presented());
    }
}
