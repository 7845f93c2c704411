// crates/events/src/registry.rs
//! Subscription registry mapping job ids to update callbacks.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error};

use crate::subscription::Subscription;

/// Reserved subscription key whose callbacks receive every update regardless
/// of job id. Producers must never use this literal as a real job identifier.
pub const WILDCARD_JOB_ID: &str = "*";

/// Callback handle invoked with a reference to the update payload.
///
/// Registration identity is pointer identity: the same `Arc` registered twice
/// under one key counts once, and unsubscription removes exactly the handle
/// it was created for. Two distinct closures with identical behavior are two
/// registrations.
pub type JobStateCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub(crate) type SubscriberMap<T> = Mutex<HashMap<String, Vec<JobStateCallback<T>>>>;

/// Recover the guard even if a panic elsewhere poisoned the mutex. Callbacks
/// never run under the lock, so the map itself stays coherent.
pub(crate) fn lock_subscribers<T: 'static>(
    map: &SubscriberMap<T>,
) -> MutexGuard<'_, HashMap<String, Vec<JobStateCallback<T>>>> {
    match map.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!("subscriber map lock poisoned; recovering");
            poisoned.into_inner()
        }
    }
}

/// Fan-out registry between producers of job-state updates and consumers
/// interested in one job or in all jobs.
///
/// Cheap to clone; clones share the same subscriber map. The payload type is
/// opaque to the registry and forwarded by reference, untouched.
pub struct JobStateEvents<T: 'static> {
    inner: Arc<SubscriberMap<T>>,
}

impl<T: 'static> Clone for JobStateEvents<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for JobStateEvents<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for JobStateEvents<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = lock_subscribers(&self.inner);
        f.debug_struct("JobStateEvents")
            .field("keys", &subscribers.len())
            .finish()
    }
}

impl<T: 'static> JobStateEvents<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register `callback` for updates to `job_id` (or [`WILDCARD_JOB_ID`]).
    ///
    /// The callback runs synchronously on whichever thread pushes the update.
    /// Returns the handle that removes this exact registration; see
    /// [`Subscription::unsubscribe`].
    pub fn on_job_state_change(
        &self,
        job_id: impl Into<String>,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> Subscription<T> {
        self.subscribe(job_id, Arc::new(callback))
    }

    /// Register a caller-owned callback handle for updates to `job_id`.
    ///
    /// If that exact handle is already registered under the key, the
    /// registration is left as-is and the returned [`Subscription`] refers to
    /// it (set semantics).
    pub fn subscribe(
        &self,
        job_id: impl Into<String>,
        callback: JobStateCallback<T>,
    ) -> Subscription<T> {
        let job_id = job_id.into();
        {
            let mut subscribers = lock_subscribers(&self.inner);
            let entries = subscribers.entry(job_id.clone()).or_default();
            if !entries.iter().any(|existing| Arc::ptr_eq(existing, &callback)) {
                entries.push(Arc::clone(&callback));
            }
        }
        Subscription::new(
            Arc::downgrade(&self.inner),
            job_id,
            Arc::downgrade(&callback),
        )
    }

    /// Push an update for `job_id` to every interested subscriber.
    ///
    /// Callbacks registered for the exact id run first, wildcard callbacks
    /// second, all synchronously on the caller's thread. The delivery list is
    /// snapshotted when the sweep starts, so a callback that subscribes or
    /// unsubscribes mid-sweep only affects later sweeps. A panicking callback
    /// is logged and skipped; the rest of the sweep still runs.
    pub fn update_job_state(&self, job_id: &str, details: &T) {
        let (exact, wildcard) = {
            let subscribers = lock_subscribers(&self.inner);
            let exact = subscribers.get(job_id).cloned().unwrap_or_default();
            // Updating the wildcard key itself must not deliver twice.
            let wildcard = if job_id == WILDCARD_JOB_ID {
                Vec::new()
            } else {
                subscribers.get(WILDCARD_JOB_ID).cloned().unwrap_or_default()
            };
            (exact, wildcard)
        };

        if exact.is_empty() && wildcard.is_empty() {
            debug!(job_id = %job_id, "job state update with no subscribers");
            return;
        }

        for callback in exact.iter().chain(wildcard.iter()) {
            deliver(job_id, callback, details);
        }
    }

    /// Number of callbacks currently registered under `job_id`.
    pub fn subscriber_count(&self, job_id: &str) -> usize {
        lock_subscribers(&self.inner).get(job_id).map_or(0, Vec::len)
    }
}

fn deliver<T>(job_id: &str, callback: &JobStateCallback<T>, details: &T) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(details))) {
        let reason = panic_message(&*panic);
        error!(job_id = %job_id, reason = %reason, "job state subscriber panicked; continuing delivery");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
