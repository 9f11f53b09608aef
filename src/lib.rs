//! # ocrsdk-batch
//!
//! Recognise a directory of scanned documents with an asynchronous cloud OCR
//! service: upload each file, poll its task until it finishes, download the
//! result next to its siblings.
//!
//! ## Why a batch client?
//!
//! The service is job-based: an upload returns a task id, not a result, and
//! the result appears seconds to minutes later. Driving that by hand for a
//! folder of scans means juggling ids, respecting the service's minimum
//! polling interval, and not losing the whole run to one unreadable page.
//! This crate does the bookkeeping and reports every file's outcome.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input/
//!  │
//!  ├─ 1. Discover  walk the input root, skip hidden files, compute outputs
//!  ├─ 2. Submit    upload the file with language + export format
//!  ├─ 3. Poll      wait ≥ 2 s (default 5 s) between status checks
//!  ├─ 4. Download  stream the result to output/<stem>.<ext>
//!  └─ 5. Report    per-file outcome + batch counts + exit tier
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocrsdk_batch::{run_batch, BatchConfig, ClientConfig, CloudOcrClient, OutputFormat, ProcessingSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from ABBYY_APPID / ABBYY_PWD
//!     let client = CloudOcrClient::new(ClientConfig::from_env())?;
//!     let config = BatchConfig::builder()
//!         .settings(ProcessingSettings::builder().output_format(OutputFormat::Docx).build())
//!         .build()?;
//!     let report = run_batch(&client, &config).await?;
//!     eprintln!("{}/{} completed", report.stats.completed, report.stats.attempted);
//!     std::process::exit(report.status().exit_code().into());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocrsdk` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Output formats
//!
//! | Format | Extension |
//! |--------|-----------|
//! | `docx` | `.docx` |
//! | `pdfa`, `pdfTextAndImages`, `pdfSearchable` | `.pdf` |
//! | `pptx` | `.pptx` |
//! | `rtf` | `.rtf` |
//! | `txt` (default), `txtUnstructured` | `.txt` |
//! | `xlsx` | `.xlsx` |
//! | `xml`, `xmlForCorrectedImage` | `.xml` |
//!
//! Text-field recognition always produces `.xml`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod progress;
pub mod report;
pub mod settings;
pub mod task;

#[cfg(test)]
pub(crate) mod test_helpers;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{discover, is_hidden, process_items, run_batch, run_single, BatchItem, Discovery};
pub use client::{CloudOcrClient, RemoteJobClient};
pub use config::{BatchConfig, BatchConfigBuilder, ClientConfig, PollPolicy, MIN_POLL_INTERVAL};
pub use error::{ClientError, OcrSdkError};
pub use format::{extension_for, OutputFormat};
pub use lifecycle::{TaskController, TaskRun};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{BatchReport, BatchStats, BatchStatus, FailureReason, FileOutcome, FileReport, EXIT_FATAL};
pub use settings::{Operation, ProcessingSettings, TextType, TextTypes};
pub use task::{Task, TaskStatus};
