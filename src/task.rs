//! Remote task state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status reported by the service for a task.
///
/// The service sends statuses as free-form strings. Anything not in the
/// known set is kept verbatim in [`TaskStatus::Unrecognized`] and treated as
/// terminal, so a new remote status never keeps a file polling forever.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Submitted,
    Queued,
    InProgress,
    Completed,
    ProcessingFailed,
    NotEnoughCredits,
    Deleted,
    Unrecognized(String),
}

impl TaskStatus {
    /// Processing is still underway remotely; keep polling.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TaskStatus::Submitted | TaskStatus::Queued | TaskStatus::InProgress
        )
    }

    /// No further change will happen.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Submitted => "Submitted",
            TaskStatus::Queued => "Queued",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Completed => "Completed",
            TaskStatus::ProcessingFailed => "ProcessingFailed",
            TaskStatus::NotEnoughCredits => "NotEnoughCredits",
            TaskStatus::Deleted => "Deleted",
            TaskStatus::Unrecognized(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Submitted" => TaskStatus::Submitted,
            "Queued" => TaskStatus::Queued,
            "InProgress" => TaskStatus::InProgress,
            "Completed" => TaskStatus::Completed,
            "ProcessingFailed" => TaskStatus::ProcessingFailed,
            "NotEnoughCredits" => TaskStatus::NotEnoughCredits,
            "Deleted" => TaskStatus::Deleted,
            other => TaskStatus::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        TaskStatus::parse(&s)
    }
}

impl From<TaskStatus> for String {
    fn from(s: TaskStatus) -> Self {
        s.as_str().to_string()
    }
}

/// Snapshot of one remote job.
///
/// Every poll yields a fresh `Task` for the same `id`; a value is never
/// mutated in place and never reused for another file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier assigned at submission.
    pub id: String,
    pub status: TaskStatus,
    /// Present only when `status` is [`TaskStatus::Completed`].
    pub download_url: Option<String>,
    /// Service's estimate of remaining processing time, in seconds.
    pub estimated_processing_secs: Option<u64>,
    /// Failure description sent alongside `ProcessingFailed`.
    pub error: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            status,
            download_url: None,
            estimated_processing_secs: None,
            error: None,
        }
    }

    /// Attach a result URL. Ignored unless the task is `Completed`.
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        if self.status == TaskStatus::Completed {
            self.download_url = Some(url.into());
        }
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
