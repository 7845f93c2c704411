// crates/events/src/global.rs
//! Process-wide registry instance.

use std::sync::OnceLock;

use jobwatch_types::JobDetails;

use crate::registry::JobStateEvents;

static EVENTS: OnceLock<JobStateEvents<JobDetails>> = OnceLock::new();

/// The process-wide job-state event registry.
///
/// Constructed on first access and alive for the process lifetime. Prefer
/// receiving a [`JobStateEvents`] handle through application state where an
/// injection path exists; this accessor is for call sites without one.
pub fn job_state_events() -> &'static JobStateEvents<JobDetails> {
    EVENTS.get_or_init(JobStateEvents::new)
}
