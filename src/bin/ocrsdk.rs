//! CLI binary for ocrsdk-batch.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `BatchConfig` / `ClientConfig` and prints per-file results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ocrsdk_batch::{
    run_batch, run_single, BatchConfig, BatchProgressCallback, BatchReport, BatchStats,
    BatchStatus, ClientConfig, CloudOcrClient, FileOutcome, FileReport, Operation, OutputFormat,
    PollPolicy, ProcessingSettings, ProgressCallback, Task, TextTypes, EXIT_FATAL,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// One coloured line per finished file, shared by the bar and plain output.
fn file_line(report: &FileReport, index: usize, total: usize) -> String {
    let (mark, detail) = match &report.outcome {
        FileOutcome::Completed => (green("✓"), dim(&format!("→ {}", report.output.display()))),
        FileOutcome::QuotaExhausted => (yellow("$"), yellow(&report.outcome.to_string())),
        FileOutcome::MissingInput => (red("✗"), red(&report.outcome.to_string())),
        other => (red("✗"), red(&truncate(&other.to_string(), 100))),
    };
    let task = report
        .task_id
        .as_deref()
        .map(|id| dim(&format!("[{id}]")))
        .unwrap_or_default();
    format!(
        "  {} {:>3}/{:<3} {}  {} {}  {}",
        mark,
        index,
        total,
        report.input.display(),
        task,
        detail,
        dim(&format!("{:.1}s", report.duration_ms as f64 / 1000.0)),
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{cut}\u{2026}")
    } else {
        s.to_string()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per
/// finished file. The message slot shows the current task's remote status.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` tells us how many files there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for input files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Drop the spinner when the run ends before the batch does.
    fn clear(&self) {
        self.bar.finish_and_clear();
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Recognising {total_files} files…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, input: &Path) {
        self.bar.set_message(format!("{} uploading…", file_name(input)));
    }

    fn on_task_submitted(&self, input: &Path, task: &Task) {
        self.bar
            .set_message(format!("{} {}", file_name(input), dim(task.status.as_str())));
    }

    fn on_task_status(&self, input: &Path, task: &Task) {
        let eta = task
            .estimated_processing_secs
            .map(|s| format!(" ~{s}s"))
            .unwrap_or_default();
        self.bar.set_message(format!(
            "{} {}{}",
            file_name(input),
            dim(task.status.as_str()),
            dim(&eta)
        ));
    }

    fn on_file_complete(&self, index: usize, total: usize, report: &FileReport) {
        self.bar.println(file_line(report, index, total));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, stats: &BatchStats) {
        self.bar.finish_and_clear();
        print_summary(stats);
    }
}

fn print_summary(stats: &BatchStats) {
    let not_done = stats.attempted.saturating_sub(stats.completed);
    if not_done == 0 {
        eprintln!(
            "{} {} files recognised successfully",
            green("✔"),
            bold(&stats.completed.to_string())
        );
        return;
    }
    eprintln!(
        "{} {}/{} files recognised  ({} failed, {} quota exhausted, {} missing)",
        if stats.completed == 0 {
            red("✘")
        } else {
            cyan("⚠")
        },
        bold(&stats.completed.to_string()),
        stats.attempted,
        red(&stats.failed.to_string()),
        yellow(&stats.quota_exhausted.to_string()),
        red(&stats.missing.to_string()),
    );
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Recognise everything under ./input into ./output as plain text
  ocrsdk

  # Searchable PDFs in German
  ocrsdk --format pdfSearchable -l German

  # One file from ./input, written under an explicit name in ./output
  ocrsdk scan.tiff scan.docx --format docx

  # Text fields (results are always XML)
  ocrsdk --operation text-field --text-type ocrA,e13b

  # Machine-readable report
  ocrsdk --json > report.json

OUTPUT FORMATS:
  docx  pdfa  pdfTextAndImages  pdfSearchable  pptx  rtf
  txt (default)  txtUnstructured  xlsx  xml  xmlForCorrectedImage

TEXT TYPES (text-field recognition):
  normal typewriter matrix index ocrA ocrB e13b cmc7 gothic, or all (default)

ENVIRONMENT VARIABLES:
  ABBYY_SERVER_URL   Service endpoint (default https://cloud-eu.ocrsdk.com/)
  ABBYY_APPID        Application id
  ABBYY_PWD          Application password
  http_proxy         Proxy for http:// requests
  https_proxy        Proxy for https:// requests

EXIT STATUS:
  0  every file was recognised (or there was nothing to do)
  1  at least one file failed, ran out of quota or went missing
  2  configuration or usage error; nothing was submitted
"#;

/// Recognise a directory of documents with a cloud OCR service.
#[derive(Parser, Debug)]
#[command(
    name = "ocrsdk",
    version,
    about = "Recognise a directory of documents with a cloud OCR service",
    long_about = "Upload every file under the input directory to the cloud OCR service, wait \
for each recognition task to finish, and download the results into the output directory. \
One file failing never stops the rest of the batch.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Single-file mode: file name inside the input directory.
    #[arg(requires = "target")]
    source: Option<String>,

    /// Single-file mode: result file name inside the output directory.
    target: Option<String>,

    /// Directory scanned recursively for input files.
    #[arg(long, env = "OCRSDK_INPUT_DIR", default_value = "./input")]
    input_dir: PathBuf,

    /// Directory results are written to.
    #[arg(long, env = "OCRSDK_OUTPUT_DIR", default_value = "./output")]
    output_dir: PathBuf,

    /// Recognition language.
    #[arg(short, long, env = "OCRSDK_LANGUAGE", default_value = "English")]
    language: String,

    /// Output format (exact identifier, e.g. docx, pdfSearchable).
    #[arg(short, long, env = "OCRSDK_FORMAT", default_value = "txt",
          value_parser = parse_format)]
    format: OutputFormat,

    /// Recognition call: whole image or a single text field.
    #[arg(long, env = "OCRSDK_OPERATION", value_enum, default_value = "image")]
    operation: OperationArg,

    /// Text-field hints: comma-separated or repeated, or `all`.
    #[arg(long, env = "OCRSDK_TEXT_TYPE", value_delimiter = ',', default_value = "all")]
    text_type: Vec<String>,

    /// Seconds between status checks (minimum 2).
    #[arg(long, env = "OCRSDK_POLL_INTERVAL", default_value_t = 5)]
    poll_interval: u64,

    /// Seconds to wait before the first status check (minimum 2).
    /// Defaults to the poll interval.
    #[arg(long, env = "OCRSDK_INITIAL_DELAY")]
    initial_delay: Option<u64>,

    /// Give up on a file whose task is still running after this many seconds.
    #[arg(long, env = "OCRSDK_TIMEOUT")]
    timeout: Option<u64>,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "OCRSDK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "OCRSDK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCRSDK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OCRSDK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OperationArg {
    Image,
    TextField,
}

impl From<OperationArg> for Operation {
    fn from(v: OperationArg) -> Self {
        match v {
            OperationArg::Image => Operation::RecognizeImage,
            OperationArg::TextField => Operation::RecognizeTextField,
        }
    }
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = default_log_filter(cli.verbose, cli.quiet, show_progress);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            eprintln!("{} {:#}", red("✘"), e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Log filter used when `RUST_LOG` is unset.
///
/// The progress bar carries the per-file feedback, so library INFO lines are
/// kept out of its way. The resolved service configuration is still echoed
/// before the bar starts.
fn default_log_filter(verbose: bool, quiet: bool, show_progress: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else if show_progress {
        "error,ocrsdk_batch::config=info"
    } else {
        "info"
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<BatchStatus> {
    // ── Build config ─────────────────────────────────────────────────────
    let client = CloudOcrClient::new(ClientConfig::from_env())
        .context("Failed to configure the OCR service client")?;

    let bar = show_progress.then(CliProgressCallback::new_dynamic);
    let progress_cb = bar
        .clone()
        .map(|cb| cb as Arc<dyn BatchProgressCallback>);

    // ── Run batch ────────────────────────────────────────────────────────
    let result = execute(cli, &client, progress_cb).await;
    if result.is_err() {
        if let Some(bar) = &bar {
            bar.clear();
        }
    }
    let report = result?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        print_plain(&report);
    }

    Ok(report.status())
}

async fn execute(
    cli: &Cli,
    client: &CloudOcrClient,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport> {
    let config = build_config(cli, progress)?;
    match (&cli.source, &cli.target) {
        (Some(source), Some(target)) => run_single(client, &config, source, target).await,
        _ => run_batch(client, &config).await,
    }
    .context("Batch could not start")
}

/// Per-file lines and summary when the progress bar is disabled.
fn print_plain(report: &BatchReport) {
    let total = report.files.len();
    for (i, file) in report.files.iter().enumerate() {
        eprintln!("{}", file_line(file, i + 1, total));
    }
    print_summary(&report.stats);
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let text_type =
        TextTypes::parse(&cli.text_type.join(",")).context("Invalid --text-type")?;

    let settings = ProcessingSettings::builder()
        .operation(cli.operation.clone().into())
        .language(cli.language.clone())
        .output_format(cli.format)
        .text_type(text_type)
        .build();

    let mut poll = PollPolicy::every(Duration::from_secs(cli.poll_interval));
    if let Some(secs) = cli.initial_delay {
        poll = poll.with_initial_delay(Duration::from_secs(secs));
    }
    if let Some(secs) = cli.timeout {
        poll = poll.with_deadline(Duration::from_secs(secs));
    }

    let mut builder = BatchConfig::builder()
        .input_dir(cli.input_dir.clone())
        .output_dir(cli.output_dir.clone())
        .settings(settings)
        .poll(poll);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
