//! End-to-end batch runs against a local mock of the cloud OCR service.
//!
//! Each test builds a real input tree in a temp dir, points a
//! [`CloudOcrClient`] at a wiremock server and drives [`run_batch`] with the
//! shortest legal poll interval. The mock reports completion on the first
//! status check, so every submitted file costs one 2 s wait.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use ocrsdk_batch::{
    run_batch, run_single, BatchConfig, BatchStatus, ClientConfig, CloudOcrClient, FileOutcome,
    Operation, OutputFormat, PollPolicy, ProcessingSettings, TaskStatus, TextType, TextTypes,
};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_bytes, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

struct Workspace {
    _root: TempDir,
    input: std::path::PathBuf,
    output: std::path::PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("input");
        let output = root.path().join("output");
        std::fs::create_dir_all(&input).unwrap();
        Self {
            _root: root,
            input,
            output,
        }
    }

    fn add(&self, name: &str, bytes: &[u8]) {
        let path = self.input.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, bytes).unwrap();
    }

    fn config(&self, settings: ProcessingSettings) -> BatchConfig {
        BatchConfig::builder()
            .input_dir(&self.input)
            .output_dir(&self.output)
            .settings(settings)
            .poll(PollPolicy::every(Duration::from_secs(2)))
            .build()
            .unwrap()
    }

    fn outputs(&self) -> Vec<String> {
        if !self.output.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = std::fs::read_dir(&self.output)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn client_for(server: &MockServer) -> CloudOcrClient {
    CloudOcrClient::new(ClientConfig {
        server_url: server.uri(),
        application_id: "e2e-app".into(),
        password: "e2e-pwd".into(),
        ..Default::default()
    })
    .unwrap()
}

fn task_body(id: &str, status: &str, result_url: Option<&str>) -> String {
    let url = result_url
        .map(|u| format!(r#" resultUrl="{u}""#))
        .unwrap_or_default();
    format!(r#"<response><task id="{id}" status="{status}"{url}/></response>"#)
}

/// Mount submit, status and result endpoints for one task id.
async fn mount_task(server: &MockServer, submit_path: &str, upload: &[u8], id: &str, result: &[u8]) {
    Mock::given(method("POST"))
        .and(path(submit_path))
        .and(body_bytes(upload.to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_string(task_body(id, "Queued", None)))
        .expect(1)
        .mount(server)
        .await;
    mount_completion(server, id, result).await;
}

/// Status checks for `id` report completion; its result serves `result`.
async fn mount_completion(server: &MockServer, id: &str, result: &[u8]) {
    let result_path = format!("/results/{id}");
    let result_url = format!("{}{}", server.uri(), result_path);

    Mock::given(method("GET"))
        .and(path("/getTaskStatus"))
        .and(query_param("taskId", id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(task_body(id, "Completed", Some(&result_url))),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(result_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(result.to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_image_to_docx() {
    let server = MockServer::start().await;
    mount_task(&server, "/processImage", b"scan", "task-report", b"DOCX").await;

    let ws = Workspace::new();
    ws.add("report.tiff", b"scan");
    let settings = ProcessingSettings::builder()
        .output_format(OutputFormat::Docx)
        .build();

    let report = run_batch(&client_for(&server), &ws.config(settings))
        .await
        .unwrap();

    assert_eq!(report.status(), BatchStatus::AllCompleted);
    assert_eq!(report.stats.completed, 1);
    assert_eq!(report.files[0].task_id.as_deref(), Some("task-report"));
    assert_eq!(report.files[0].final_status, Some(TaskStatus::Completed));
    assert_eq!(read(&ws.output.join("report.docx")), b"DOCX");
}

#[tokio::test]
async fn test_hidden_files_are_never_uploaded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let ws = Workspace::new();
    ws.add(".hidden.tiff", b"secret");

    let report = run_batch(&client_for(&server), &ws.config(ProcessingSettings::default()))
        .await
        .unwrap();

    assert_eq!(report.stats.attempted, 0);
    assert_eq!(report.stats.skipped_hidden, 1);
    assert_eq!(report.status(), BatchStatus::AllCompleted);
    assert!(ws.outputs().is_empty());
}

#[tokio::test]
async fn test_text_field_produces_xml() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/processTextField"))
        .and(query_param("textType", "ocrA"))
        .and(query_param("language", "English"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(task_body("task-field", "Queued", None)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_completion(&server, "task-field", b"<field/>").await;

    let ws = Workspace::new();
    ws.add("field.png", b"png");
    let settings = ProcessingSettings::builder()
        .operation(Operation::RecognizeTextField)
        .output_format(OutputFormat::Docx)
        .text_type(TextTypes::new([TextType::OcrA]))
        .build();

    let report = run_batch(&client_for(&server), &ws.config(settings))
        .await
        .unwrap();

    assert_eq!(report.stats.completed, 1);
    assert_eq!(ws.outputs(), vec!["field.xml".to_string()]);
    assert_eq!(read(&ws.output.join("field.xml")), b"<field/>");
}

#[tokio::test]
async fn test_quota_exhaustion_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    mount_task(&server, "/processImage", b"first", "task-a", b"A").await;
    Mock::given(method("POST"))
        .and(path("/processImage"))
        .and(body_bytes(b"second".to_vec()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(task_body("task-b", "NotEnoughCredits", None)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/getTaskStatus"))
        .and(query_param("taskId", "task-b"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let ws = Workspace::new();
    ws.add("a.tiff", b"first");
    ws.add("nested/b.tiff", b"second");

    let report = run_batch(&client_for(&server), &ws.config(ProcessingSettings::default()))
        .await
        .unwrap();

    assert_eq!(report.stats.attempted, 2);
    assert_eq!(report.stats.completed, 1);
    assert_eq!(report.stats.quota_exhausted, 1);
    assert_eq!(report.status(), BatchStatus::PartialFailure);
    assert_eq!(report.status().exit_code(), 1);
    assert_eq!(report.files[1].outcome, FileOutcome::QuotaExhausted);
    assert_eq!(ws.outputs(), vec!["a.txt".to_string()]);
}

#[tokio::test]
async fn test_single_file_mode_uses_target_name() {
    let server = MockServer::start().await;
    mount_task(&server, "/processImage", b"page", "task-page", b"text").await;

    let ws = Workspace::new();
    ws.add("page.jpg", b"page");
    ws.add("other.jpg", b"not uploaded");

    let report = run_single(
        &client_for(&server),
        &ws.config(ProcessingSettings::default()),
        "page.jpg",
        "renamed.txt",
    )
    .await
    .unwrap();

    assert_eq!(report.status(), BatchStatus::AllCompleted);
    assert_eq!(ws.outputs(), vec!["renamed.txt".to_string()]);
}
