//! reqwest implementation of [`RemoteJobClient`] for the cloud OCR service.
//!
//! Every call is a plain HTTP request authenticated with basic auth; the
//! service answers with a small XML document describing the task. Result
//! files are fetched from a pre-signed URL without credentials.

use super::{response, RemoteJobClient};
use crate::config::{ClientConfig, ENV_APPLICATION_ID, ENV_PASSWORD};
use crate::error::{ClientError, OcrSdkError};
use crate::settings::ProcessingSettings;
use crate::task::Task;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Proxy, Response, StatusCode, Url};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const STATUS_METHOD: &str = "getTaskStatus";
const DOWNLOAD_OPERATION: &str = "download";

/// HTTP client for the cloud OCR service.
///
/// Owns its [`ClientConfig`]; construct once per run and share by reference.
pub struct CloudOcrClient {
    http: Client,
    config: ClientConfig,
    base_url: String,
}

impl std::fmt::Debug for CloudOcrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudOcrClient")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

impl CloudOcrClient {
    /// Validate `config` and build the underlying HTTP client.
    ///
    /// # Errors
    /// Fatal configuration errors: empty credentials, an unparsable service
    /// URL or proxy endpoint.
    pub fn new(config: ClientConfig) -> Result<Self, OcrSdkError> {
        if config.application_id.is_empty() {
            return Err(OcrSdkError::MissingCredential {
                name: "application id",
                env_var: ENV_APPLICATION_ID,
            });
        }
        if config.password.is_empty() {
            return Err(OcrSdkError::MissingCredential {
                name: "password",
                env_var: ENV_PASSWORD,
            });
        }

        let base_url = config.server_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| OcrSdkError::InvalidServerUrl {
            url: config.server_url.clone(),
            reason: e.to_string(),
        })?;

        // Proxies come from `config` only, never from reqwest's own env lookup.
        let mut builder = Client::builder()
            .user_agent(concat!("ocrsdk-batch/", env!("CARGO_PKG_VERSION")))
            .no_proxy();
        if let Some(ref proxy) = config.http_proxy {
            builder = builder.proxy(Proxy::http(proxy).map_err(|e| OcrSdkError::InvalidProxy {
                scheme: "http",
                proxy: proxy.clone(),
                reason: e.to_string(),
            })?);
        }
        if let Some(ref proxy) = config.https_proxy {
            builder = builder.proxy(Proxy::https(proxy).map_err(|e| OcrSdkError::InvalidProxy {
                scheme: "https",
                proxy: proxy.clone(),
                reason: e.to_string(),
            })?);
        }
        let http = builder
            .build()
            .map_err(|e| OcrSdkError::ClientBuild(e.to_string()))?;

        debug!("Cloud OCR client ready for {}", base_url);
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `<server>/<method>` with exactly one slash between them.
    pub fn request_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method.trim_matches('/'))
    }
}

#[async_trait]
impl RemoteJobClient for CloudOcrClient {
    async fn submit(
        &self,
        file: &Path,
        settings: &ProcessingSettings,
    ) -> Result<Task, ClientError> {
        let method = settings.operation.method();
        let body = tokio::fs::read(file)
            .await
            .map_err(|e| ClientError::io(file, e))?;
        info!("Uploading {} ({} bytes) via {}", file.display(), body.len(), method);

        let response = self
            .http
            .post(self.request_url(method))
            .basic_auth(&self.config.application_id, Some(&self.config.password))
            .query(&settings.query_params())
            .body(body)
            .send()
            .await
            .map_err(|e| request_error(method, e))?;

        decode_task(method, response).await
    }

    async fn poll_status(&self, task: &Task) -> Result<Task, ClientError> {
        if response::is_null_task_id(&task.id) {
            return Err(ClientError::NullTaskId {
                task_id: task.id.clone(),
            });
        }

        let response = self
            .http
            .get(self.request_url(STATUS_METHOD))
            .basic_auth(&self.config.application_id, Some(&self.config.password))
            .query(&[("taskId", task.id.as_str())])
            .send()
            .await
            .map_err(|e| request_error(STATUS_METHOD, e))?;

        decode_task(STATUS_METHOD, response).await
    }

    async fn download(&self, task: &Task, destination: &Path) -> Result<(), ClientError> {
        let url = task
            .download_url
            .as_deref()
            .ok_or_else(|| ClientError::MissingDownloadUrl {
                task_id: task.id.clone(),
            })?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::io(parent, e))?;
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(DOWNLOAD_OPERATION, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                operation: DOWNLOAD_OPERATION.into(),
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").into(),
            });
        }

        // Stream to a sibling `.part` file and rename, so an interrupted
        // download never leaves a truncated result under the final name.
        let part = part_path(destination);
        match stream_to_file(response, &part).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, destination)
                    .await
                    .map_err(|e| ClientError::io(destination, e))?;
                debug!("Task {}: wrote {} bytes to {}", task.id, bytes, destination.display());
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(e)
            }
        }
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn request_error(operation: &str, e: reqwest::Error) -> ClientError {
    let detail = if e.is_timeout() {
        format!("timed out: {e}")
    } else {
        e.to_string()
    };
    ClientError::Request {
        operation: operation.to_string(),
        detail,
    }
}

/// Map a service response to a task, or to the matching transport error.
async fn decode_task(operation: &str, response: Response) -> Result<Task, ClientError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| request_error(operation, e))?;

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Unauthorized {
            operation: operation.to_string(),
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        let message = response::parse_error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        return Err(ClientError::HttpStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    let task = response::parse_task(&body).map_err(|detail| ClientError::MalformedResponse {
        operation: operation.to_string(),
        detail,
    })?;
    debug!("{}: task {} is {}", operation, task.id, task.status);
    Ok(task)
}

async fn stream_to_file(response: Response, path: &Path) -> Result<u64, ClientError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| ClientError::io(path, e))?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| request_error(DOWNLOAD_OPERATION, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| ClientError::io(path, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| ClientError::io(path, e))?;
    Ok(written)
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}
