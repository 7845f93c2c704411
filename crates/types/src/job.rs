// crates/types/src/job.rs
//! Job identity, lifecycle status, and the state-update wire struct.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::details::{DetailsError, JobDetails};

/// Stable identifier of a backend-tracked job (e.g. a query execution).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../ui/src/types/generated/"))]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Lifecycle status of a job, in the order the backend reports them.
///
/// Wire form is SCREAMING_SNAKE_CASE (`"RUNNING"`, `"CANCELED"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../ui/src/types/generated/"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Enqueued,
    Planning,
    Running,
    Completed,
    Canceled,
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a state it can never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Enqueued => "ENQUEUED",
            Self::Planning => "PLANNING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Status change for one job, as sent to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../ui/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct JobStateUpdate {
    pub id: JobId,
    pub status: JobStatus,

    /// Rows processed so far, when the engine reports progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_processed: Option<u64>,

    /// Failure description, present only for [`JobStatus::Failed`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// RFC 3339 submission timestamp.
    pub started_at: String,

    /// RFC 3339 completion timestamp, present once the job is terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl JobStateUpdate {
    /// Create an update stamped with the current time as `started_at`.
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            rows_processed: None,
            error_message: None,
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: None,
        }
    }

    pub fn with_rows_processed(mut self, rows: u64) -> Self {
        self.rows_processed = Some(rows);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Stamp `finished_at` with the current time.
    pub fn finished_now(mut self) -> Self {
        self.finished_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    /// Convert into the opaque payload handed to the event registry.
    pub fn into_details(self) -> Result<JobDetails, DetailsError> {
        JobDetails::from_serialize(&self)
    }
}
