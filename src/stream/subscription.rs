//! Subscriptions and listener registries.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared callback invoked with each delivered event.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

type CancelFn = Box<dyn FnOnce() + Send>;

/// Handle to a registered listener.
///
/// [`cancel`](Self::cancel) is the only way to remove the listener and may be
/// called any number of times; the removal runs once. Dropping a
/// subscription does not cancel it.
#[must_use = "dropping a Subscription leaves the listener registered"]
pub struct Subscription {
    cancel: Mutex<Option<CancelFn>>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` on first cancellation.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// A subscription with nothing to remove.
    pub fn noop() -> Self {
        Self {
            cancel: Mutex::new(None),
        }
    }

    /// Remove the listener. Returns `true` the first time.
    pub fn cancel(&self) -> bool {
        let cancel = self.cancel.lock().take();
        match cancel {
            Some(cancel) => {
                cancel();
                true
            }
            None => false,
        }
    }

    /// Whether the subscription has already been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.lock().is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// A set of subscriptions released as a unit.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    entries: Vec<Subscription>,
}

impl SubscriptionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a subscription.
    pub fn push(&mut self, subscription: Subscription) {
        self.entries.push(subscription);
    }

    /// Cancel and drop every tracked subscription, returning how many were
    /// cancelled by this call.
    pub fn cancel_all(&mut self) -> usize {
        self.entries
            .drain(..)
            .filter(|subscription| subscription.cancel())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Slots<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
}

/// Registry of listeners for one event type.
///
/// Emission runs over a snapshot of the registered listeners, taken without
/// holding the lock while they run, so listeners can subscribe or cancel from
/// inside a callback.
pub struct Listeners<E> {
    inner: Arc<Mutex<Slots<E>>>,
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slots {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener.
    pub fn add(&self, listener: Listener<E>) -> Subscription {
        let id = {
            let mut slots = self.inner.lock();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.entries.push((id, listener));
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Deliver `event` to every listener registered at the time of the call.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.inner.lock().entries.len())
            .finish()
    }
}
