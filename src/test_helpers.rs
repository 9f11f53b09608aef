//! Scripted in-memory [`RemoteJobClient`] shared by the unit tests.

use crate::client::RemoteJobClient;
use crate::error::ClientError;
use crate::settings::ProcessingSettings;
use crate::task::{Task, TaskStatus};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::time::Instant;

/// One recorded call against the fake.
#[derive(Debug, Clone)]
pub(crate) enum Call {
    Submit {
        file: PathBuf,
        settings: ProcessingSettings,
        at: Instant,
    },
    Poll {
        task_id: String,
        at: Instant,
    },
    Download {
        task_id: String,
        destination: PathBuf,
    },
}

/// Scripted behaviour for one input file.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    submit: Result<TaskStatus, ClientError>,
    polls: VecDeque<Result<TaskStatus, ClientError>>,
    download_url: bool,
    download_error: Option<ClientError>,
    error_text: Option<String>,
    poll_id: Option<String>,
}

impl Script {
    pub(crate) fn new(submit: Result<TaskStatus, ClientError>) -> Self {
        Self {
            submit,
            polls: VecDeque::new(),
            download_url: true,
            download_error: None,
            error_text: None,
            poll_id: None,
        }
    }

    /// Statuses returned by successive polls; `Completed` once exhausted.
    pub(crate) fn polls(
        mut self,
        polls: impl IntoIterator<Item = Result<TaskStatus, ClientError>>,
    ) -> Self {
        self.polls = polls.into_iter().collect();
        self
    }

    pub(crate) fn without_download_url(mut self) -> Self {
        self.download_url = false;
        self
    }

    pub(crate) fn download_error(mut self, error: ClientError) -> Self {
        self.download_error = Some(error);
        self
    }

    pub(crate) fn error_text(mut self, text: &str) -> Self {
        self.error_text = Some(text.to_string());
        self
    }

    /// Answer polls with a different task id.
    pub(crate) fn poll_id(mut self, id: &str) -> Self {
        self.poll_id = Some(id.to_string());
        self
    }
}

/// Fake client; unscripted files go Queued → InProgress → Completed.
pub(crate) struct ScriptedClient {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the file whose name is `file_name`.
    pub(crate) fn script(self, file_name: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(task_id_for(Path::new(file_name)), script);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn submit_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Submit { .. }))
    }

    pub(crate) fn poll_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Poll { .. }))
    }

    pub(crate) fn download_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Download { .. }))
    }

    pub(crate) fn submitted_files(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Submit { file, .. } => Some(file),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn script_for(&self, task_id: &str) -> Script {
        self.scripts
            .lock()
            .unwrap()
            .entry(task_id.to_string())
            .or_insert_with(|| {
                Script::new(Ok(TaskStatus::Queued))
                    .polls([Ok(TaskStatus::InProgress), Ok(TaskStatus::Completed)])
            })
            .clone()
    }

    fn next_poll(&self, task_id: &str) -> Result<TaskStatus, ClientError> {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(task_id)
            .and_then(|s| s.polls.pop_front())
            .unwrap_or(Ok(TaskStatus::Completed))
    }
}

fn task_id_for(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("task-{stem}")
}

#[async_trait]
impl RemoteJobClient for ScriptedClient {
    async fn submit(
        &self,
        file: &Path,
        settings: &ProcessingSettings,
    ) -> Result<Task, ClientError> {
        self.record(Call::Submit {
            file: file.to_path_buf(),
            settings: settings.clone(),
            at: Instant::now(),
        });
        let task_id = task_id_for(file);
        let status = self.script_for(&task_id).submit?;
        Ok(Task::new(task_id, status))
    }

    async fn poll_status(&self, task: &Task) -> Result<Task, ClientError> {
        self.record(Call::Poll {
            task_id: task.id.clone(),
            at: Instant::now(),
        });
        let script = self.script_for(&task.id);
        let status = self.next_poll(&task.id)?;

        let id = script.poll_id.unwrap_or_else(|| task.id.clone());
        let mut next = Task::new(id.clone(), status.clone());
        if script.download_url {
            next = next.with_download_url(format!("https://results.test/{id}"));
        }
        if status == TaskStatus::ProcessingFailed {
            next.error = script.error_text;
        }
        Ok(next)
    }

    async fn download(&self, task: &Task, destination: &Path) -> Result<(), ClientError> {
        self.record(Call::Download {
            task_id: task.id.clone(),
            destination: destination.to_path_buf(),
        });
        if let Some(error) = self.script_for(&task.id).download_error {
            return Err(error);
        }
        if task.download_url.is_none() {
            return Err(ClientError::MissingDownloadUrl {
                task_id: task.id.clone(),
            });
        }
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::io(parent, e))?;
        }
        tokio::fs::write(destination, format!("recognised by {}", task.id))
            .await
            .map_err(|e| ClientError::io(destination, e))
    }
}
