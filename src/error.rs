//! Error types for the ocrsdk-batch library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`OcrSdkError`] — **Fatal**: the run cannot proceed at all (unknown
//!   output format, missing credentials, unusable proxy, input root missing).
//!   Returned as `Err(OcrSdkError)` before any document is submitted.
//!
//! * [`ClientError`] — **Per-file**: one submit, poll or download call failed
//!   at the transport level. It is stored inside
//!   [`crate::report::FileOutcome`] so the rest of the batch keeps going.
//!
//! Quota exhaustion is neither: it is a normal terminal outcome of a task and
//! never shows up as an error value.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ocrsdk-batch library.
#[derive(Debug, Error)]
pub enum OcrSdkError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Output format identifier is not in the registry.
    #[error("Unknown output format '{format}'\nSupported: {supported}")]
    UnknownFormat { format: String, supported: String },

    /// Text-type hint is not one the service understands.
    #[error("Unknown text type '{text_type}'\nSupported: {supported}, or 'all'")]
    UnknownTextType { text_type: String, supported: String },

    /// Builder or CLI validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Single-file mode only accepts bare file names.
    #[error("'{name}' should be a file name only, not a path.\nIt is resolved against {root:?}.")]
    InvalidFileName { name: String, root: PathBuf },

    // ── Client construction errors ────────────────────────────────────────
    /// A credential the service requires is empty.
    #[error("Missing credential: {name} is empty.\nSet {env_var} in the environment.")]
    MissingCredential {
        name: &'static str,
        env_var: &'static str,
    },

    /// The configured service endpoint is not a valid URL.
    #[error("Invalid service URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    /// A proxy endpoint could not be parsed.
    #[error("Invalid {scheme} proxy '{proxy}': {reason}")]
    InvalidProxy {
        scheme: &'static str,
        proxy: String,
        reason: String,
    },

    /// reqwest refused to build a client with the given settings.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// The input root to scan does not exist or is not a directory.
    #[error("Input directory not found: '{path}'")]
    InputDirNotFound { path: PathBuf },

    /// Walking the input root failed part-way.
    #[error("Failed to scan '{path}': {reason}")]
    ScanFailed { path: PathBuf, reason: String },
}

/// A transport-level failure of a single remote call.
///
/// Carries strings rather than the underlying `reqwest::Error` so it can be
/// cloned into reports and serialised with `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientError {
    /// The request never got a response (DNS, connect, TLS, proxy, timeout).
    #[error("{operation}: request failed: {detail}")]
    Request { operation: String, detail: String },

    /// The service rejected the application id / password.
    #[error("{operation}: authentication rejected (HTTP {status})")]
    Unauthorized { operation: String, status: u16 },

    /// Any other non-success HTTP status.
    #[error("{operation}: HTTP {status}: {message}")]
    HttpStatus {
        operation: String,
        status: u16,
        message: String,
    },

    /// The body could not be decoded into a task.
    #[error("{operation}: malformed response: {detail}")]
    MalformedResponse { operation: String, detail: String },

    /// A null GUID was about to be sent as a task id.
    #[error("Null task id '{task_id}' passed to getTaskStatus")]
    NullTaskId { task_id: String },

    /// `download` was called for a task that has no result URL.
    #[error("Task {task_id} has no download URL")]
    MissingDownloadUrl { task_id: String },

    /// Reading the input or writing the result failed locally.
    #[error("I/O error on '{path}': {detail}")]
    Io { path: PathBuf, detail: String },
}

impl ClientError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ClientError::Io {
            path: path.into(),
            detail: err.to_string(),
        }
    }
}
