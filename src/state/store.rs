//! Writable store with ordered, synchronous subscriber notification.
//!
//! DESIGN
//! ======
//! Every `set` of a new value is appended to a pending queue tagged with a
//! version number. Whoever finds the queue idle drains it, calling each
//! subscriber outside the lock. A `set` issued from inside a subscriber
//! callback only enqueues, so all subscribers see values in the same order.
//!
//! A subscriber registered at version `v` is called once immediately with the
//! current value and then only for queued versions greater than `v`.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Subscriber<T> {
    id: u64,
    /// Store version at registration time.
    since: u64,
    callback: Callback<T>,
}

struct Inner<T> {
    value: T,
    version: u64,
    next_id: u64,
    subscribers: Vec<Subscriber<T>>,
    pending: VecDeque<(u64, T)>,
    publishing: bool,
}

pub struct Store<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Store<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    #[must_use]
    pub fn new(value: T) -> Self {
        let inner = Inner {
            value,
            version: 0,
            next_id: 0,
            subscribers: Vec::new(),
            pending: VecDeque::new(),
            publishing: false,
        };
        Self { inner: Arc::new(Mutex::new(inner)) }
    }

    /// Current value. Reflects the latest `set`, even if subscribers are still
    /// being notified of it.
    #[must_use]
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Replace the value and notify subscribers. No-op when `value` equals the
    /// current value.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.lock();
            if inner.value == value {
                return;
            }
            inner.version += 1;
            let version = inner.version;
            inner.value = value.clone();
            inner.pending.push_back((version, value));
            if inner.publishing {
                return;
            }
            inner.publishing = true;
        }
        self.drain();
    }

    /// Set the value computed from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.get());
        self.set(next);
    }

    /// Register `callback`. It runs immediately with the current value, then
    /// once per later change until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let callback: Callback<T> = Arc::new(callback);
        let (id, current) = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            let since = inner.version;
            inner.subscribers.push(Subscriber { id, since, callback: Arc::clone(&callback) });
            (id, inner.value.clone())
        };

        callback(&current);

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                    inner.subscribers.retain(|s| s.id != id);
                }
            })),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn drain(&self) {
        let _guard = PublishGuard { inner: &self.inner };
        loop {
            let (value, callbacks) = {
                let mut inner = self.lock();
                let Some((version, value)) = inner.pending.pop_front() else {
                    inner.publishing = false;
                    return;
                };
                let callbacks: Vec<Callback<T>> = inner
                    .subscribers
                    .iter()
                    .filter(|s| s.since < version)
                    .map(|s| Arc::clone(&s.callback))
                    .collect();
                (value, callbacks)
            };

            for callback in &callbacks {
                callback(&value);
            }
        }
    }
}

/// Resets the queue when a subscriber panics mid-drain, so later `set` calls
/// are not stuck behind a dead drain.
struct PublishGuard<'a, T> {
    inner: &'a Mutex<Inner<T>>,
}

impl<T> Drop for PublishGuard<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.pending.clear();
            inner.publishing = false;
        }
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle for a registered subscriber. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.detach.is_some()).finish()
    }
}
