// crates/events/src/lib.rs
//! In-process fan-out of job-state updates to UI subscribers.
//!
//! Producers (job polling/streaming logic elsewhere in the application) push
//! updates with [`JobStateEvents::update_job_state`]; consumers register for
//! one job id or for all jobs ([`WILDCARD_JOB_ID`]) with
//! [`JobStateEvents::on_job_state_change`] and tear down through the returned
//! [`Subscription`]. Delivery is synchronous on the producer's thread, with
//! each callback isolated so one panicking subscriber cannot block the rest.
//!
//! The registry is payload-agnostic; the process-wide instance obtained from
//! [`job_state_events`] carries the opaque
//! [`JobDetails`](jobwatch_types::JobDetails) payload.

pub mod global;
pub mod registry;
pub mod stream;
pub mod subscription;

pub use global::job_state_events;
pub use registry::{JobStateCallback, JobStateEvents, WILDCARD_JOB_ID};
pub use stream::watch_job_state;
pub use subscription::Subscription;
