//! Observable Values
//!
//! A typed value holder with push-based subscriptions.
//! Subscribers receive the current value immediately on subscription
//! (replay-latest), then every subsequent change, in the order the
//! changes were made.

use std::collections::BTreeMap;
use std::fmt;

/// Handle returned by [`Observable::subscribe`], used to unsubscribe.
pub type SubscriptionId = u64;

type Callback<T> = Box<dyn FnMut(&T) + Send>;

/// Value holder that pushes every change to its subscribers.
pub struct Observable<T> {
    value: T,
    subscribers: BTreeMap<SubscriptionId, Callback<T>>,
    next_id: SubscriptionId,
}

impl<T> Observable<T> {
    /// Create with an initial value and no subscribers.
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Subscribe to changes.
    ///
    /// The callback runs once right away with the current value.
    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + Send + 'static,
    {
        callback(&self.value);

        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, Box::new(callback));
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Replace the value and notify every subscriber.
    pub(crate) fn set(&mut self, value: T) {
        self.value = value;
        for callback in self.subscribers.values_mut() {
            callback(&self.value);
        }
    }
}

impl<T: PartialEq> Observable<T> {
    /// Replace the value, notifying subscribers only if it differs.
    /// Returns true if a notification went out.
    pub(crate) fn set_if_changed(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
