//! Remote job client: the only part of the crate that talks to the service.
//!
//! ## Data Flow
//!
//! ```text
//! submit ──▶ Task{Submitted|Queued|NotEnoughCredits}
//!              │
//! poll_status ─┴─▶ Task{…} ──▶ … ──▶ Task{Completed, download_url}
//!                                          │
//! download ────────────────────────────────┴─▶ file on disk
//! ```
//!
//! 1. [`RemoteJobClient`] — the three operations the lifecycle controller
//!    needs, behind an object-safe async trait so tests can substitute an
//!    in-memory fake
//! 2. [`http`] — the reqwest implementation against the cloud service
//! 3. [`response`] — decoding of the service's XML task and error bodies

pub mod http;
pub mod response;

use crate::error::ClientError;
use crate::settings::ProcessingSettings;
use crate::task::Task;
use async_trait::async_trait;
use std::path::Path;

pub use http::CloudOcrClient;

/// Submit / poll / download against a remote recognition service.
///
/// Every method returns `Err` only for transport-level failures. Business
/// outcomes such as exhausted quota come back as a [`Task`] status.
#[async_trait]
pub trait RemoteJobClient: Send + Sync {
    /// Upload `file` and start a task with the given settings.
    ///
    /// The returned task is `Submitted`, `Queued` or `NotEnoughCredits`.
    async fn submit(&self, file: &Path, settings: &ProcessingSettings)
        -> Result<Task, ClientError>;

    /// Fetch the current state of `task` as a new value with the same id.
    async fn poll_status(&self, task: &Task) -> Result<Task, ClientError>;

    /// Write the result of a completed task to `destination`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    /// [`ClientError::MissingDownloadUrl`] when `task` carries no result URL.
    async fn download(&self, task: &Task, destination: &Path) -> Result<(), ClientError>;
}
