//! Batch orchestration: discover inputs, run each through the lifecycle
//! controller, collect outcomes.
//!
//! Files are processed strictly one at a time. A file's failure is recorded
//! in its [`FileReport`] and never stops the files after it; only
//! configuration problems found before the first submission are fatal.

use crate::client::RemoteJobClient;
use crate::config::BatchConfig;
use crate::error::{ClientError, OcrSdkError};
use crate::lifecycle::TaskController;
use crate::report::{BatchReport, BatchStats, FileOutcome, FileReport};
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Files whose name starts with this are never submitted.
pub const HIDDEN_MARKER: char = '.';

/// One input file paired with the path its result is written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl BatchItem {
    /// `output = output_dir / (input stem + "." + extension)`.
    pub fn for_input(input: impl Into<PathBuf>, output_dir: &Path, extension: &str) -> Self {
        let input = input.into();
        let mut name = input.file_stem().map(OsStr::to_os_string).unwrap_or_default();
        name.push(".");
        name.push(extension);
        let output = output_dir.join(name);
        Self { input, output }
    }
}

/// True if the file's base name starts with [`HIDDEN_MARKER`].
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with(HIDDEN_MARKER))
        .unwrap_or(false)
}

/// Result of scanning the input root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Items in path order.
    pub items: Vec<BatchItem>,
    pub skipped_hidden: usize,
}

/// Enumerate every regular file under `config.input_dir`, recursively and
/// sorted by path, and compute each output path.
///
/// Hidden files are counted but not returned. Entries that cannot be read
/// below the root are logged and skipped.
pub fn discover(config: &BatchConfig) -> Result<Discovery, OcrSdkError> {
    let root = &config.input_dir;
    if !root.is_dir() {
        return Err(OcrSdkError::InputDirNotFound { path: root.clone() });
    }
    let extension = config.settings.output_extension();

    let mut discovery = Discovery::default();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
            Err(e) => {
                return Err(OcrSdkError::ScanFailed {
                    path: root.clone(),
                    reason: e.to_string(),
                })
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if is_hidden(entry.path()) {
            debug!("Skipping hidden file {}", entry.path().display());
            discovery.skipped_hidden += 1;
            continue;
        }
        discovery.items.push(BatchItem::for_input(
            entry.into_path(),
            &config.output_dir,
            extension,
        ));
    }

    warn_on_output_collisions(&discovery.items);
    info!(
        "Discovered {} files under {} ({} hidden skipped)",
        discovery.items.len(),
        root.display(),
        discovery.skipped_hidden
    );
    Ok(discovery)
}

/// Inputs in different sub-directories with the same stem share an output
/// path; the later one overwrites the earlier.
fn warn_on_output_collisions(items: &[BatchItem]) {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for item in items {
        if let Some(first) = seen.insert(&item.output, &item.input) {
            warn!(
                "{} and {} both write to {}",
                first.display(),
                item.input.display(),
                item.output.display()
            );
        }
    }
}

/// Scan the input root and process every discovered file.
///
/// # Errors
/// Only fatal errors: the input root is missing or unreadable.
pub async fn run_batch(
    client: &dyn RemoteJobClient,
    config: &BatchConfig,
) -> Result<BatchReport, OcrSdkError> {
    let discovery = discover(config)?;
    Ok(process_items(client, config, discovery.items, discovery.skipped_hidden).await)
}

/// Single-file mode: process `source` from the input root into `target` in
/// the output root.
///
/// Both must be bare file names. A missing source is reported as
/// [`FileOutcome::MissingInput`], not as an error.
pub async fn run_single(
    client: &dyn RemoteJobClient,
    config: &BatchConfig,
    source: &str,
    target: &str,
) -> Result<BatchReport, OcrSdkError> {
    ensure_bare_name(source, &config.input_dir)?;
    ensure_bare_name(target, &config.output_dir)?;

    let item = BatchItem {
        input: config.input_dir.join(source),
        output: config.output_dir.join(target),
    };
    Ok(process_items(client, config, vec![item], 0).await)
}

fn ensure_bare_name(name: &str, root: &Path) -> Result<(), OcrSdkError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains(MAIN_SEPARATOR)
    {
        return Err(OcrSdkError::InvalidFileName {
            name: name.to_string(),
            root: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Process already-discovered items in order.
///
/// Exposed so callers can filter or reorder the output of [`discover`].
pub async fn process_items(
    client: &dyn RemoteJobClient,
    config: &BatchConfig,
    items: Vec<BatchItem>,
    skipped_hidden: usize,
) -> BatchReport {
    let batch_start = Instant::now();
    let total = items.len();
    let progress = config.progress_callback.as_ref();
    let controller = TaskController::new(client, &config.settings, config.poll)
        .with_progress(progress);

    if let Some(cb) = progress {
        cb.on_batch_start(total);
    }

    let mut files = Vec::with_capacity(total);
    for (i, item) in items.into_iter().enumerate() {
        let index = i + 1;
        if let Some(cb) = progress {
            cb.on_file_start(index, total, &item.input);
        }

        let report = process_item(&controller, item).await;
        if let Some(cb) = progress {
            cb.on_file_complete(index, total, &report);
        }
        files.push(report);
    }

    let stats = BatchStats::tally(
        &files,
        skipped_hidden,
        batch_start.elapsed().as_millis() as u64,
    );
    info!(
        "Batch complete: {}/{} completed, {} quota exhausted, {} failed, {} missing, {}ms",
        stats.completed,
        stats.attempted,
        stats.quota_exhausted,
        stats.failed,
        stats.missing,
        stats.total_duration_ms
    );
    if let Some(cb) = progress {
        cb.on_batch_complete(&stats);
    }

    BatchReport { files, stats }
}

async fn process_item(controller: &TaskController<'_>, item: BatchItem) -> FileReport {
    let start = Instant::now();

    if !item.input.is_file() {
        warn!("{}: no such file", item.input.display());
        return FileReport {
            input: item.input,
            output: item.output,
            task_id: None,
            final_status: None,
            outcome: FileOutcome::MissingInput,
            duration_ms: start.elapsed().as_millis() as u64,
        };
    }

    let run = controller.run(&item.input, &item.output).await;
    let outcome = match run.outcome {
        // The upload could not read the input: nothing reached the service.
        FileOutcome::SubmitError {
            error: ClientError::Io { ref path, .. },
        } if path == &item.input => FileOutcome::MissingInput,
        outcome => outcome,
    };
    FileReport {
        input: item.input,
        output: item.output,
        task_id: run.task_id,
        final_status: run.final_status,
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}
