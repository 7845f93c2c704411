// crates/events/tests/registry_events.rs
//! End-to-end coverage of the registry with the real `JobDetails` payload,
//! the way producers and UI consumers wire it up.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use jobwatch_events::{job_state_events, watch_job_state, JobStateEvents, WILDCARD_JOB_ID};
use jobwatch_types::{JobDetails, JobStateUpdate, JobStatus};
use pretty_assertions::assert_eq;
use serial_test::serial;

fn details_for(id: &str, status: JobStatus) -> JobDetails {
    JobStateUpdate::new(id, status)
        .into_details()
        .expect("wire struct serializes to an object")
}

#[test]
fn typed_producer_flow_reaches_the_targeted_view() {
    let events = JobStateEvents::<JobDetails>::new();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let seen_in_cb = Arc::clone(&seen);
    let sub = events.on_job_state_change("query-17", move |details: &JobDetails| {
        let status = details
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("?")
            .to_string();
        seen_in_cb.lock().unwrap().push(status);
    });

    events.update_job_state("query-17", &details_for("query-17", JobStatus::Enqueued));
    events.update_job_state("query-17", &details_for("query-17", JobStatus::Running));
    // A different job's lifecycle is invisible to this view.
    events.update_job_state("query-18", &details_for("query-18", JobStatus::Failed));
    events.update_job_state("query-17", &details_for("query-17", JobStatus::Completed));

    assert_eq!(*seen.lock().unwrap(), vec!["ENQUEUED", "RUNNING", "COMPLETED"]);
    sub.unsubscribe();
}

#[test]
fn wildcard_observer_sees_every_job() {
    let events = JobStateEvents::<JobDetails>::new();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let seen_in_cb = Arc::clone(&seen);
    let observer = events.on_job_state_change(WILDCARD_JOB_ID, move |details: &JobDetails| {
        let id = details
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("?")
            .to_string();
        seen_in_cb.lock().unwrap().push(id);
    });

    events.update_job_state("a", &details_for("a", JobStatus::Running));
    events.update_job_state("b", &details_for("b", JobStatus::Running));
    events.update_job_state("a", &details_for("a", JobStatus::Completed));

    assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "a"]);
    observer.unsubscribe();
}

#[test]
fn targeted_handler_runs_before_the_global_observer() {
    let events = JobStateEvents::<JobDetails>::new();
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let order_for_global = Arc::clone(&order);
    let global = events.on_job_state_change(WILDCARD_JOB_ID, move |_| {
        order_for_global.lock().unwrap().push("global");
    });
    let order_for_view = Arc::clone(&order);
    let view = events.on_job_state_change("query-1", move |_| {
        order_for_view.lock().unwrap().push("view");
    });

    events.update_job_state("query-1", &details_for("query-1", JobStatus::Running));

    // Layered handling: the job-specific handler updates its state before
    // the global observer sees the same payload.
    assert_eq!(*order.lock().unwrap(), vec!["view", "global"]);
    view.unsubscribe();
    global.unsubscribe();
}

#[test]
fn unmounted_view_stops_receiving() {
    let events = JobStateEvents::<JobDetails>::new();
    let fired = Arc::new(AtomicUsize::new(0));

    let fired_in_cb = Arc::clone(&fired);
    let sub = events.on_job_state_change("query-9", move |_| {
        fired_in_cb.fetch_add(1, Ordering::SeqCst);
    });

    events.update_job_state("query-9", &details_for("query-9", JobStatus::Running));
    sub.unsubscribe();
    events.update_job_state("query-9", &details_for("query-9", JobStatus::Completed));
    sub.unsubscribe();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn async_consumer_streams_a_job_lifecycle() {
    let events = JobStateEvents::<JobDetails>::new();
    let (sub, mut rx) = watch_job_state(&events, "query-3");

    for status in [JobStatus::Enqueued, JobStatus::Planning, JobStatus::Running] {
        events.update_job_state("query-3", &details_for("query-3", status));
    }
    events.update_job_state(
        "query-3",
        &JobStateUpdate::new("query-3", JobStatus::Completed)
            .with_rows_processed(10_240)
            .finished_now()
            .into_details()
            .unwrap(),
    );

    let mut statuses = Vec::new();
    for _ in 0..4 {
        let details = rx.recv().await.expect("channel open");
        statuses.push(
            details
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("?")
                .to_string(),
        );
    }
    assert_eq!(statuses, vec!["ENQUEUED", "PLANNING", "RUNNING", "COMPLETED"]);

    sub.unsubscribe();
    events.update_job_state("query-3", &details_for("query-3", JobStatus::Completed));
    assert_eq!(rx.recv().await, None);
}

#[test]
#[serial]
fn process_wide_registry_is_shared_across_call_sites() {
    let fired = Arc::new(AtomicUsize::new(0));

    // Consumer side registers through one accessor call...
    let fired_in_cb = Arc::clone(&fired);
    let sub = job_state_events().on_job_state_change("shared-query-1", move |_| {
        fired_in_cb.fetch_add(1, Ordering::SeqCst);
    });

    // ...and the producer side notifies through another.
    job_state_events().update_job_state(
        "shared-query-1",
        &details_for("shared-query-1", JobStatus::Running),
    );

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    sub.unsubscribe();
}
