//! Task lifecycle controller: drive one file from upload to a terminal state.
//!
//! ```text
//! Submitting ──▶ SubmitError
//!     │  └─────▶ Rejected (NotEnoughCredits)
//!     ▼
//!   Active ──(wait ≥ floor, poll)──▶ Active
//!     │  └──────────────────────────▶ PollError
//!     ▼
//!  terminal status ──▶ Completed (downloaded) | Failed
//! ```
//!
//! Each file is attempted exactly once. There are no retries: a transport
//! error ends the file, and the batch moves on.

use crate::client::RemoteJobClient;
use crate::config::PollPolicy;
use crate::error::ClientError;
use crate::progress::ProgressCallback;
use crate::report::{FailureReason, FileOutcome};
use crate::settings::ProcessingSettings;
use crate::task::{Task, TaskStatus};
use std::path::Path;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// What happened to one submitted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRun {
    /// Set once the service assigned an id.
    pub task_id: Option<String>,
    /// Last status observed, if any.
    pub final_status: Option<TaskStatus>,
    pub outcome: FileOutcome,
}

impl TaskRun {
    fn ended(task: &Task, outcome: FileOutcome) -> Self {
        Self {
            task_id: Some(task.id.clone()),
            final_status: Some(task.status.clone()),
            outcome,
        }
    }
}

/// Drives tasks against one client with fixed settings and poll policy.
///
/// Holds only shared references, so a controller is cheap to create per
/// batch and can be reused for every file in it.
pub struct TaskController<'a> {
    client: &'a dyn RemoteJobClient,
    settings: &'a ProcessingSettings,
    poll: PollPolicy,
    progress: Option<&'a ProgressCallback>,
}

impl<'a> TaskController<'a> {
    pub fn new(
        client: &'a dyn RemoteJobClient,
        settings: &'a ProcessingSettings,
        poll: PollPolicy,
    ) -> Self {
        Self {
            client,
            settings,
            poll,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<&'a ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Submit `input`, wait for the task to finish and download the result
    /// to `output`.
    ///
    /// Never returns an error: every way a file can end is a [`FileOutcome`].
    pub async fn run(&self, input: &Path, output: &Path) -> TaskRun {
        // ── Submitting ───────────────────────────────────────────────────
        let task = match self.client.submit(input, self.settings).await {
            Ok(task) => task,
            Err(error) => {
                warn!("{}: submission failed: {}", input.display(), error);
                return TaskRun {
                    task_id: None,
                    final_status: None,
                    outcome: FileOutcome::SubmitError { error },
                };
            }
        };
        info!("{}: task {} is {}", input.display(), task.id, task.status);
        if let Some(cb) = self.progress {
            cb.on_task_submitted(input, &task);
        }

        if task.status == TaskStatus::NotEnoughCredits {
            warn!(
                "Task {}: not enough credits to process {}",
                task.id,
                input.display()
            );
            return TaskRun::ended(&task, FileOutcome::QuotaExhausted);
        }

        // ── Active ───────────────────────────────────────────────────────
        let task = match self.wait_until_terminal(input, task).await {
            Ok(task) => task,
            Err(run) => return run,
        };
        info!("Task {}: finished with status {}", task.id, task.status);

        // ── Terminal ─────────────────────────────────────────────────────
        let outcome = self.finish(&task, output).await;
        TaskRun::ended(&task, outcome)
    }

    /// Poll until the task leaves the active set.
    ///
    /// Sleeps at least the policy floor before the first check and between
    /// checks. `Err` carries the terminal run for poll errors and deadlines.
    async fn wait_until_terminal(&self, input: &Path, mut task: Task) -> Result<Task, TaskRun> {
        let submitted_at = Instant::now();
        let mut delay = self.poll.initial_delay();

        while task.is_active() {
            if let Some(deadline) = self.poll.deadline() {
                let elapsed = submitted_at.elapsed();
                if elapsed + delay > deadline {
                    warn!(
                        "Task {}: still {} after {}s, giving up",
                        task.id,
                        task.status,
                        elapsed.as_secs()
                    );
                    return Err(TaskRun::ended(
                        &task,
                        FileOutcome::Failed {
                            reason: FailureReason::DeadlineExceeded {
                                waited_secs: elapsed.as_secs(),
                            },
                        },
                    ));
                }
            }

            sleep(delay).await;
            delay = self.poll.interval();

            let next = match self.client.poll_status(&task).await {
                Ok(next) if next.id == task.id => next,
                Ok(next) => {
                    let error = ClientError::MalformedResponse {
                        operation: "getTaskStatus".into(),
                        detail: format!("asked for task {}, got {}", task.id, next.id),
                    };
                    return Err(self.poll_failed(&task, error));
                }
                Err(error) => return Err(self.poll_failed(&task, error)),
            };
            debug!("Task {}: {}", next.id, next.status);
            if let Some(cb) = self.progress {
                cb.on_task_status(input, &next);
            }
            task = next;
        }

        Ok(task)
    }

    fn poll_failed(&self, task: &Task, error: ClientError) -> TaskRun {
        warn!("Task {}: status check failed: {}", task.id, error);
        TaskRun::ended(task, FileOutcome::PollError { error })
    }

    async fn finish(&self, task: &Task, output: &Path) -> FileOutcome {
        match task.status {
            TaskStatus::Completed if task.download_url.is_some() => {
                match self.client.download(task, output).await {
                    Ok(()) => {
                        info!("Result was written to {}", output.display());
                        FileOutcome::Completed
                    }
                    Err(error) => {
                        warn!("Task {}: download failed: {}", task.id, error);
                        FileOutcome::Failed {
                            reason: FailureReason::Download { error },
                        }
                    }
                }
            }
            TaskStatus::Completed => {
                warn!("Task {}: completed without a download URL", task.id);
                FileOutcome::Failed {
                    reason: FailureReason::MissingDownloadUrl,
                }
            }
            // Quota can also run out after the task was queued.
            TaskStatus::NotEnoughCredits => FileOutcome::QuotaExhausted,
            ref status => {
                warn!("Task {}: error processing task ({})", task.id, status);
                FileOutcome::Failed {
                    reason: FailureReason::RemoteStatus {
                        status: status.clone(),
                        message: task.error.clone(),
                    },
                }
            }
        }
    }
}
