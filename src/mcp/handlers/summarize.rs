//! Handler for the `summarize-pdf` MCP tool.

use std::path::Path;
use std::sync::Arc;

use crate::{
    mcp::{format::summary_payload, handlers::parse_arguments},
    processing::SummaryService,
};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

/// Arguments accepted by `summarize-pdf`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct SummarizePdfToolRequest {
    /// Path to a PDF readable by the server process.
    pub(crate) path: String,
    /// Label for the report header and download name; defaults to the file name.
    #[serde(default)]
    pub(crate) source: Option<String>,
}

/// Handle the `summarize-pdf` tool invocation.
pub(crate) async fn handle_summarize_pdf(
    service: &Arc<SummaryService>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: SummarizePdfToolRequest = parse_arguments(arguments)?;
    let path = args.path.trim();
    if path.is_empty() {
        return Err(McpError::invalid_params("`path` must not be empty", None));
    }
    let path = Path::new(path);
    let source = args
        .source
        .map(|source| source.trim().to_string())
        .filter(|source| !source.is_empty())
        .unwrap_or_else(|| default_source(path));

    let report = service
        .summarize_file(path, &source)
        .await
        .map_err(|error| {
            McpError::internal_error(error.to_string(), Some(json!({ "stage": error.stage() })))
        })?;

    Ok(CallToolResult::structured(summary_payload(&report)))
}

fn default_source(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::generation::{GenerationClient, GenerationError};
    use crate::processing::{ExtractionError, PageLoader};
    use async_trait::async_trait;
    use rmcp::model::ErrorCode;

    struct StaticPages;

    impl PageLoader for StaticPages {
        fn load_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
            if path.ends_with("scan.pdf") {
                return Ok(vec![String::new()]);
            }
            Ok(vec!["first page".into(), "second page".into()])
        }
    }

    struct EchoClient;

    #[async_trait]
    impl GenerationClient for EchoClient {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    fn service() -> Arc<SummaryService> {
        let config = Config::from_lookup(|key| match key {
            "GENERATION_PROVIDER" => Some("ollama".into()),
            _ => None,
        })
        .expect("config");
        Arc::new(
            SummaryService::with_components(&config, Arc::new(StaticPages), Arc::new(EchoClient))
                .expect("service"),
        )
    }

    fn arguments(value: serde_json::Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[tokio::test]
    async fn summarizes_file_with_default_source_label() {
        let result = handle_summarize_pdf(
            &service(),
            arguments(json!({ "path": "/srv/docs/report.pdf" })),
        )
        .await
        .expect("tool result");

        let payload = result.structured_content.expect("structured payload");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["source"], "report.pdf");
        assert_eq!(payload["chunks"], 1);
        assert_eq!(payload["downloadName"], "resumo_e_explicacao_report.pdf.md");
        let markdown = payload["markdown"].as_str().expect("markdown");
        assert!(markdown.starts_with("Source: report.pdf\n\necho: "));
        assert!(markdown.contains("first page second page"));
    }

    #[tokio::test]
    async fn explicit_source_overrides_file_name() {
        let result = handle_summarize_pdf(
            &service(),
            arguments(json!({ "path": "/tmp/x.pdf", "source": "Relatório.pdf" })),
        )
        .await
        .expect("tool result");

        let payload = result.structured_content.expect("structured payload");
        assert_eq!(payload["source"], "Relatório.pdf");
    }

    #[tokio::test]
    async fn empty_path_is_invalid() {
        let error = handle_summarize_pdf(&service(), arguments(json!({ "path": "  " })))
            .await
            .expect_err("empty path");
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn pipeline_failure_is_internal_error_with_stage() {
        let error = handle_summarize_pdf(&service(), arguments(json!({ "path": "/tmp/scan.pdf" })))
            .await
            .expect_err("no text");
        assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(error.data.expect("error data")["stage"], "extraction");
    }
}
