// crates/events/examples/watch_jobs.rs
//! Drive one job through its lifecycle and watch it from two subscribers:
//! a wildcard logging observer and an async channel consumer.
//!
//! Run with: cargo run -p jobwatch-events --example watch_jobs

use jobwatch_events::{watch_job_state, JobStateEvents, WILDCARD_JOB_ID};
use jobwatch_types::{JobDetails, JobStateUpdate, JobStatus};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let events = JobStateEvents::<JobDetails>::new();

    let observer = events.on_job_state_change(WILDCARD_JOB_ID, |details: &JobDetails| {
        tracing::info!(%details, "job update observed");
    });

    let (watch, mut rx) = watch_job_state(&events, "query-42");

    for status in [JobStatus::Enqueued, JobStatus::Planning, JobStatus::Running] {
        let update = JobStateUpdate::new("query-42", status);
        events.update_job_state("query-42", &update.into_details()?);
    }
    let done = JobStateUpdate::new("query-42", JobStatus::Completed)
        .with_rows_processed(10_240)
        .finished_now();
    events.update_job_state("query-42", &done.into_details()?);

    for _ in 0..4 {
        if let Some(details) = rx.recv().await {
            let status = details.get("status").and_then(|v| v.as_str()).unwrap_or("?");
            println!("query-42 -> {status}");
        }
    }

    watch.unsubscribe();
    observer.unsubscribe();
    Ok(())
}
