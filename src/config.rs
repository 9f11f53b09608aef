//! Configuration types for batch recognition.
//!
//! Three layers, each resolved once per run and read-only afterwards:
//!
//! * [`ClientConfig`] — where the service lives and how to authenticate.
//!   Owned by the HTTP client; resolved from the environment by
//!   [`ClientConfig::from_env`].
//! * [`PollPolicy`] — how often a task's status may be checked.
//! * [`BatchConfig`] — input/output roots, [`ProcessingSettings`] and the
//!   optional progress callback, built via [`BatchConfig::builder()`].

use crate::error::OcrSdkError;
use crate::progress::ProgressCallback;
use crate::settings::ProcessingSettings;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

// ── Client configuration ─────────────────────────────────────────────────

/// Service endpoint used when `ABBYY_SERVER_URL` is not set.
pub const DEFAULT_SERVER_URL: &str = "https://cloud-eu.ocrsdk.com/";

pub const ENV_SERVER_URL: &str = "ABBYY_SERVER_URL";
pub const ENV_APPLICATION_ID: &str = "ABBYY_APPID";
pub const ENV_PASSWORD: &str = "ABBYY_PWD";
pub const ENV_HTTP_PROXY: &str = "http_proxy";
pub const ENV_HTTPS_PROXY: &str = "https_proxy";

/// Credentials and transport settings for the remote service.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    pub application_id: String,
    pub password: String,
    /// Proxy for plain `http://` requests.
    pub http_proxy: Option<String>,
    /// Proxy for `https://` requests.
    pub https_proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            application_id: String::new(),
            password: String::new(),
            http_proxy: None,
            https_proxy: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("application_id", &self.application_id)
            .field("password", &redact(&self.password))
            .field("http_proxy", &self.http_proxy)
            .field("https_proxy", &self.https_proxy)
            .finish()
    }
}

impl ClientConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve from any key lookup, starting from the built-in defaults.
    ///
    /// Each present value overrides its default and is echoed at `info`
    /// level; absent keys leave the default untouched. No other validation
    /// happens here: a malformed value surfaces when the client is built.
    pub fn resolve_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_SERVER_URL) {
            info!("server_url={}", url);
            config.server_url = url;
        }
        if let Some(id) = lookup(ENV_APPLICATION_ID) {
            info!("application_id={}", id);
            config.application_id = id;
        }
        if let Some(pwd) = lookup(ENV_PASSWORD) {
            info!("password={}", redact(&pwd));
            config.password = pwd;
        }
        if let Some(proxy) = lookup(ENV_HTTP_PROXY) {
            info!("Using http proxy at {}", proxy);
            config.http_proxy = Some(proxy);
        }
        if let Some(proxy) = lookup(ENV_HTTPS_PROXY) {
            info!("Using https proxy at {}", proxy);
            config.https_proxy = Some(proxy);
        }

        config
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

// ── Poll policy ──────────────────────────────────────────────────────────

/// Hard floor between two status checks of the same task, and between
/// submission and the first check.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Timing contract for status polling.
///
/// Both delays are clamped up to [`MIN_POLL_INTERVAL`]; polling faster than
/// that is never possible through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    initial_delay: Duration,
    interval: Duration,
    deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_POLL_INTERVAL,
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Flat policy: the same delay before the first check and between checks.
    pub fn every(interval: Duration) -> Self {
        let interval = interval.max(MIN_POLL_INTERVAL);
        Self {
            initial_delay: interval,
            interval,
            deadline: None,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay.max(MIN_POLL_INTERVAL);
        self
    }

    /// Give up on a task still active this long after submission.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

// ── Batch configuration ──────────────────────────────────────────────────

/// Input root used when none is configured.
pub const DEFAULT_INPUT_DIR: &str = "./input";

/// Output root used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Configuration for one batch run.
///
/// # Example
/// ```rust
/// use ocrsdk_batch::{BatchConfig, OutputFormat, ProcessingSettings};
///
/// let config = BatchConfig::builder()
///     .input_dir("scans")
///     .output_dir("recognised")
///     .settings(ProcessingSettings::builder().output_format(OutputFormat::Docx).build())
///     .build()
///     .unwrap();
/// assert_eq!(config.settings.output_extension(), "docx");
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory scanned recursively for input files. Default: `./input`.
    pub input_dir: PathBuf,

    /// Directory results are written to. Default: `./output`.
    ///
    /// Outputs are flat: `<output_dir>/<input stem>.<ext>`, whatever the
    /// depth of the input under `input_dir`.
    pub output_dir: PathBuf,

    pub settings: ProcessingSettings,

    pub poll: PollPolicy,

    /// Optional per-file event sink (progress bars, logs).
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            settings: ProcessingSettings::default(),
            poll: PollPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("settings", &self.settings)
            .field("poll", &self.poll)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn settings(mut self, settings: ProcessingSettings) -> Self {
        self.config.settings = settings;
        self
    }

    pub fn poll(mut self, poll: PollPolicy) -> Self {
        self.config.poll = poll;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, OcrSdkError> {
        let c = &self.config;
        if c.input_dir.as_os_str().is_empty() {
            return Err(OcrSdkError::InvalidConfig("input directory is empty".into()));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(OcrSdkError::InvalidConfig(
                "output directory is empty".into(),
            ));
        }
        if c.input_dir == c.output_dir {
            return Err(OcrSdkError::InvalidConfig(format!(
                "input and output directory are both {:?}; results would be rescanned as inputs",
                c.input_dir
            )));
        }
        if c.settings.language.trim().is_empty() {
            return Err(OcrSdkError::InvalidConfig(
                "recognition language is empty".into(),
            ));
        }
        Ok(self.config)
    }
}
