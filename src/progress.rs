//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the orchestrator works through the batch. The library itself only logs
//! through `tracing`; anything user-facing (progress bars, summaries) hangs
//! off this trait.
//!
//! # Example
//!
//! ```rust
//! use ocrsdk_batch::{BatchConfig, BatchProgressCallback, FileReport};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, report: &FileReport) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", index, total, report.input.display());
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//! let config = BatchConfig::builder()
//!     .progress_callback(cb as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::report::{BatchStats, FileReport};
use crate::task::Task;
use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator and lifecycle controller as work progresses.
///
/// All methods default to no-ops so callers only override what they need.
/// Implementations must be `Send + Sync` so one callback can be shared by
/// several batches.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after discovery, before the first file is submitted.
    ///
    /// # Arguments
    /// * `total_files` — files that will be attempted (hidden files excluded)
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is checked and submitted.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the batch
    /// * `total` — files in the batch
    /// * `input` — path of the file about to be processed
    fn on_file_start(&self, index: usize, total: usize, input: &Path) {
        let _ = (index, total, input);
    }

    /// Called once the service has accepted the upload and assigned an id.
    fn on_task_submitted(&self, input: &Path, task: &Task) {
        let _ = (input, task);
    }

    /// Called after every status check with the freshly polled task.
    fn on_task_status(&self, input: &Path, task: &Task) {
        let _ = (input, task);
    }

    /// Called when a file reaches its terminal outcome, success or not.
    fn on_file_complete(&self, index: usize, total: usize, report: &FileReport) {
        let _ = (index, total, report);
    }

    /// Called once after every discovered file has been attempted.
    fn on_batch_complete(&self, stats: &BatchStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FileOutcome;
    use crate::task::TaskStatus;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        polls: AtomicUsize,
        completes: AtomicUsize,
        total: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_files: usize) {
            self.total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _input: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_task_status(&self, _input: &Path, _task: &Task) {
            self.polls.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _report: &FileReport) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample_report() -> FileReport {
        FileReport {
            input: PathBuf::from("input/a.tiff"),
            output: PathBuf::from("output/a.txt"),
            task_id: Some("t-1".into()),
            final_status: Some(TaskStatus::Completed),
            outcome: FileOutcome::Completed,
            duration_ms: 10,
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let task = Task::new("t-1", TaskStatus::Queued);
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, Path::new("input/a.tiff"));
        cb.on_task_submitted(Path::new("input/a.tiff"), &task);
        cb.on_task_status(Path::new("input/a.tiff"), &task);
        cb.on_file_complete(1, 2, &sample_report());
        cb.on_batch_complete(&BatchStats::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let task = Task::new("t-1", TaskStatus::InProgress);

        tracker.on_batch_start(1);
        tracker.on_file_start(1, 1, Path::new("input/a.tiff"));
        tracker.on_task_status(Path::new("input/a.tiff"), &task);
        tracker.on_task_status(Path::new("input/a.tiff"), &task);
        tracker.on_file_complete(1, 1, &sample_report());

        assert_eq!(tracker.total.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.polls.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
    }
}
