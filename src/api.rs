//! HTTP surface for PDF Digest.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /` – Minimal HTML page with a multi-file PDF upload form.
//! - `POST /summaries` – Multipart upload of one or more PDFs. Each file is processed in order and
//!   reported in place: `{"results":[{"source","status":"ok","markdown","download_name","chunks"} |
//!   {"source","status":"error","error","stage"}]}`. Per-document failures do not fail the request.
//! - `POST /summaries/download` – Summarize the first uploaded PDF and return the report as a
//!   `text/markdown` attachment named `resumo_e_explicacao_<file>.md`.
//! - `GET /metrics` – Summarization counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! The HTTP surface shares the same pipeline with the MCP server and CLI, so behavior is identical
//! across interfaces.

use crate::metrics::MetricsSnapshot;
use crate::processing::{DocumentOutcome, MARKDOWN_MIME, PipelineError, SummaryApi, Upload};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

const PDF_MIME: &str = "application/pdf";

const UPLOAD_PAGE: &str = r#"<!doctype html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>PDF Digest</title></head>
<body>
<h1>Resumo e explicação de PDFs</h1>
<form action="/summaries" method="post" enctype="multipart/form-data">
  <input type="file" name="files" accept="application/pdf,.pdf" multiple required>
  <button type="submit">Enviar</button>
</form>
</body>
</html>
"#;

/// Build the HTTP router exposing the summary API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummaryApi + 'static,
{
    Router::new()
        .route("/", get(upload_page))
        .route("/summaries", post(summarize_batch::<S>))
        .route("/summaries/download", post(download_summary::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::disable())
        .with_state(service)
}

async fn upload_page() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}

/// Per-document entry of the `POST /summaries` response.
#[derive(Serialize, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
enum DocumentResult {
    Ok {
        source: String,
        markdown: String,
        download_name: String,
        chunks: usize,
    },
    Error {
        source: String,
        error: String,
        stage: &'static str,
    },
}

impl From<DocumentOutcome> for DocumentResult {
    fn from(outcome: DocumentOutcome) -> Self {
        match outcome.result {
            Ok(report) => DocumentResult::Ok {
                markdown: report.to_markdown(),
                download_name: report.download_file_name(),
                chunks: report.segments().len(),
                source: outcome.source,
            },
            Err(error) => DocumentResult::Error {
                error: error.to_string(),
                stage: error.stage(),
                source: outcome.source,
            },
        }
    }
}

/// Response body for `POST /summaries`.
#[derive(Serialize)]
struct BatchResponse {
    results: Vec<DocumentResult>,
}

/// Summarize every uploaded PDF, one at a time, reporting failures in place.
async fn summarize_batch<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError>
where
    S: SummaryApi,
{
    let uploads = read_uploads(multipart, usize::MAX).await?;
    tracing::info!(files = uploads.len(), "Summary batch received");
    let outcomes = service.summarize_uploads(uploads).await;
    Ok(Json(BatchResponse {
        results: outcomes.into_iter().map(DocumentResult::from).collect(),
    }))
}

/// Summarize the first uploaded PDF and return the report as a markdown attachment.
async fn download_summary<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Response, AppError>
where
    S: SummaryApi,
{
    let upload = read_uploads(multipart, 1)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NoFiles)?;
    let outcome = service.summarize_upload(upload).await;
    let report = outcome.result?;

    let name = report.download_file_name();
    Ok((
        [
            (
                header::CONTENT_TYPE,
                format!("{MARKDOWN_MIME}; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, content_disposition(&name)),
        ],
        report.to_markdown(),
    )
        .into_response())
}

/// Return the summarization counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: SummaryApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload_form",
                method: "GET",
                path: "/",
                description: "HTML form for uploading one or more PDF files.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summaries",
                description: "Multipart upload of PDF files (field `files`). Each file is chunked and summarized in order; the response lists one result per file with its markdown report or the failing stage.",
                request_example: Some(json!({
                    "content_type": "multipart/form-data",
                    "fields": [{ "name": "files", "filename": "report.pdf", "content_type": PDF_MIME }]
                })),
            },
            CommandDescriptor {
                name: "download",
                method: "POST",
                path: "/summaries/download",
                description: "Summarize the first uploaded PDF and return it as a text/markdown attachment named resumo_e_explicacao_<file>.md.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return summarization counters (documents summarized/failed, chunks summarized).",
                request_example: None,
            },
        ],
    })
}

/// Collect up to `limit` file parts. Parts without a file name are ignored.
async fn read_uploads(mut multipart: Multipart, limit: usize) -> Result<Vec<Upload>, AppError> {
    let mut uploads = Vec::new();
    while uploads.len() < limit {
        let Some(field) = multipart.next_field().await? else {
            break;
        };
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if !is_pdf(&file_name, field.content_type()) {
            return Err(AppError::UnsupportedMedia(file_name));
        }
        let bytes = field.bytes().await?;
        uploads.push(Upload::new(file_name, bytes.to_vec()));
    }
    if uploads.is_empty() {
        return Err(AppError::NoFiles);
    }
    Ok(uploads)
}

fn is_pdf(file_name: &str, content_type: Option<&str>) -> bool {
    content_type.is_some_and(|mime| mime.eq_ignore_ascii_case(PDF_MIME))
        || file_name.to_ascii_lowercase().ends_with(".pdf")
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    if fallback == file_name {
        format!("attachment; filename=\"{file_name}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(file_name)
        )
    }
}

enum AppError {
    Multipart(MultipartError),
    NoFiles,
    UnsupportedMedia(String),
    Pipeline(PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Multipart(error) => (StatusCode::BAD_REQUEST, error.body_text()),
            AppError::NoFiles => (
                StatusCode::BAD_REQUEST,
                "no PDF file found in the upload".to_string(),
            ),
            AppError::UnsupportedMedia(name) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("{name} is not a PDF"),
            ),
            AppError::Pipeline(error) => {
                let status = match &error {
                    PipelineError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    PipelineError::Generation { .. } => StatusCode::BAD_GATEWAY,
                    PipelineError::Staging(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, error.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::Multipart(inner)
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self::Pipeline(inner)
    }
}
