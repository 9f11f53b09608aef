//! Per-file outcomes and aggregate batch results.
//!
//! A batch never fails as a whole because one file failed: every file gets a
//! [`FileReport`], and the caller reads [`BatchReport::status`] to decide
//! what the run amounted to.

use crate::error::ClientError;
use crate::task::TaskStatus;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Process exit code for a fatal configuration or usage error.
pub const EXIT_FATAL: u8 = 2;

/// Why a submitted task did not produce an output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The service reported a terminal status other than `Completed`.
    RemoteStatus {
        status: TaskStatus,
        message: Option<String>,
    },
    /// `Completed` arrived without a result URL.
    MissingDownloadUrl,
    /// The result existed but could not be fetched or written.
    Download { error: ClientError },
    /// The task was still active when the per-file deadline ran out.
    DeadlineExceeded { waited_secs: u64 },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::RemoteStatus {
                status,
                message: Some(m),
            } => write!(f, "task ended with status {status}: {m}"),
            FailureReason::RemoteStatus {
                status,
                message: None,
            } => write!(f, "task ended with status {status}"),
            FailureReason::MissingDownloadUrl => {
                f.write_str("task completed without a download URL")
            }
            FailureReason::Download { error } => write!(f, "download failed: {error}"),
            FailureReason::DeadlineExceeded { waited_secs } => {
                write!(f, "task still active after {waited_secs}s")
            }
        }
    }
}

/// Terminal outcome of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Result downloaded to the output path.
    Completed,
    /// The account lacks processing allowance; not a failure of the input.
    QuotaExhausted,
    /// Submitted, but no result could be obtained.
    Failed { reason: FailureReason },
    /// Upload or task creation failed at the transport level.
    SubmitError { error: ClientError },
    /// A status check failed; the remote task is in an unknown state.
    PollError { error: ClientError },
    /// The input vanished between discovery and processing.
    MissingInput,
}

impl FileOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, FileOutcome::Completed)
    }

    /// Failure of the file itself (excludes quota exhaustion and success).
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FileOutcome::Failed { .. }
                | FileOutcome::SubmitError { .. }
                | FileOutcome::PollError { .. }
        )
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Completed => f.write_str("completed"),
            FileOutcome::QuotaExhausted => f.write_str(
                "not enough credits to process the document; add pages to the application's account",
            ),
            FileOutcome::Failed { reason } => write!(f, "failed: {reason}"),
            FileOutcome::SubmitError { error } => write!(f, "submission failed: {error}"),
            FileOutcome::PollError { error } => write!(f, "status check failed: {error}"),
            FileOutcome::MissingInput => f.write_str("no such file"),
        }
    }
}

/// Everything known about one attempted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Set once the service assigned an id.
    pub task_id: Option<String>,
    /// Last status observed from the service.
    pub final_status: Option<TaskStatus>,
    pub outcome: FileOutcome,
    pub duration_ms: u64,
}

/// Aggregate counts for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Regular files found under the input root, hidden ones included.
    pub discovered: usize,
    pub skipped_hidden: usize,
    pub attempted: usize,
    pub completed: usize,
    pub quota_exhausted: usize,
    /// Failed, submit-error and poll-error outcomes.
    pub failed: usize,
    pub missing: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    pub(crate) fn tally(files: &[FileReport], skipped_hidden: usize, total_duration_ms: u64) -> Self {
        let mut stats = BatchStats {
            discovered: files.len() + skipped_hidden,
            skipped_hidden,
            attempted: files.len(),
            total_duration_ms,
            ..Default::default()
        };
        for f in files {
            match f.outcome {
                FileOutcome::Completed => stats.completed += 1,
                FileOutcome::QuotaExhausted => stats.quota_exhausted += 1,
                FileOutcome::MissingInput => stats.missing += 1,
                FileOutcome::Failed { .. }
                | FileOutcome::SubmitError { .. }
                | FileOutcome::PollError { .. } => stats.failed += 1,
            }
        }
        stats
    }
}

/// Whether every attempted file produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every attempted file is `Completed` (also true for an empty batch).
    AllCompleted,
    /// At least one file ended in any other outcome.
    PartialFailure,
}

impl BatchStatus {
    /// `0` for [`BatchStatus::AllCompleted`], `1` otherwise.
    /// Fatal errors use [`EXIT_FATAL`].
    pub fn exit_code(self) -> u8 {
        match self {
            BatchStatus::AllCompleted => 0,
            BatchStatus::PartialFailure => 1,
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub stats: BatchStats,
}

impl BatchReport {
    pub fn status(&self) -> BatchStatus {
        if self.files.iter().all(|f| f.outcome.is_completed()) {
            BatchStatus::AllCompleted
        } else {
            BatchStatus::PartialFailure
        }
    }
}
