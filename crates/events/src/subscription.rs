// crates/events/src/subscription.rs
//! Unsubscribe handle for one registration in the event registry.

use std::sync::{Arc, Weak};

use crate::registry::{lock_subscribers, JobStateCallback, SubscriberMap};

/// Handle to one callback registration in a
/// [`JobStateEvents`](crate::JobStateEvents) registry.
///
/// Consumers hold the handle while interested and call
/// [`unsubscribe`](Self::unsubscribe) when done (a view's unmount path).
/// Dropping the handle without unsubscribing leaves the registration active
/// for the lifetime of the registry.
#[must_use = "dropping a Subscription does not unsubscribe; call unsubscribe() when done"]
pub struct Subscription<T: 'static> {
    registry: Weak<SubscriberMap<T>>,
    job_id: String,
    callback: Weak<dyn Fn(&T) + Send + Sync>,
}

impl<T: 'static> Subscription<T> {
    pub(crate) fn new(
        registry: Weak<SubscriberMap<T>>,
        job_id: String,
        callback: Weak<dyn Fn(&T) + Send + Sync>,
    ) -> Self {
        Self {
            registry,
            job_id,
            callback,
        }
    }

    /// Remove this exact registration from its key's subscriber list.
    ///
    /// Safe to call any number of times; removing an already-removed (or
    /// never-present) callback is a no-op, as is unsubscribing after the
    /// registry itself was dropped.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut subscribers = lock_subscribers(&registry);
        if let Some(entries) = subscribers.get_mut(&self.job_id) {
            entries.retain(|cb| !is_same_handle(cb, &self.callback));
        }
    }

    /// Whether this registration is still present in the registry.
    pub fn is_active(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let subscribers = lock_subscribers(&registry);
        subscribers
            .get(&self.job_id)
            .is_some_and(|entries| entries.iter().any(|cb| is_same_handle(cb, &self.callback)))
    }

    /// The subscription key this handle was registered under.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

impl<T: 'static> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("job_id", &self.job_id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Identity comparison by allocation address. The `Weak` held by the
/// subscription keeps the allocation alive, so the address cannot be reused
/// while the handle exists.
fn is_same_handle<T: 'static>(
    cb: &JobStateCallback<T>,
    target: &Weak<dyn Fn(&T) + Send + Sync>,
) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(cb), target.as_ptr())
}
