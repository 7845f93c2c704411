// crates/events/src/stream.rs
//! Channel adapter for stream-style consumers of job-state updates.

use tokio::sync::mpsc;

use crate::registry::JobStateEvents;
use crate::subscription::Subscription;

/// Forward every update for `job_id` into an unbounded channel.
///
/// For consumers on the async side (SSE bridges, background tasks) that want
/// updates as a stream instead of a synchronous callback. Payloads are cloned
/// per delivery. Call [`Subscription::unsubscribe`] to stop forwarding: the
/// registration drops its sender and the receiver terminates. Dropping the
/// receiver alone only causes subsequent payloads to be discarded.
pub fn watch_job_state<T>(
    events: &JobStateEvents<T>,
    job_id: impl Into<String>,
) -> (Subscription<T>, mpsc::UnboundedReceiver<T>)
where
    T: Clone + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = events.on_job_state_change(job_id, move |details: &T| {
        // A gone receiver just means the consumer stopped listening.
        let _ = tx.send(details.clone());
    });
    (subscription, rx)
}
