//! Formatting helpers shared across MCP handlers and resources.

use crate::{metrics::MetricsSnapshot, processing::Report};
use rmcp::model::ResourceContents;
use serde::Serialize;
use serde_json::{Value, json};

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Structured result of a successful `summarize-pdf` call.
pub(crate) fn summary_payload(report: &Report) -> Value {
    json!({
        "status": "ok",
        "source": report.source(),
        "markdown": report.to_markdown(),
        "downloadName": report.download_file_name(),
        "chunks": report.segments().len(),
    })
}

/// Structured result of the `metrics` tool.
pub(crate) fn metrics_payload(snapshot: MetricsSnapshot) -> Value {
    json!({
        "documentsSummarized": snapshot.documents_summarized,
        "documentsFailed": snapshot.documents_failed,
        "chunksSummarized": snapshot.chunks_summarized,
    })
}

/// Serialize a value to JSON, falling back to compact formatting on error.
pub(crate) fn serialize_json<T: Serialize>(value: &T, context_uri: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|error| {
        tracing::warn!(uri = context_uri, %error, "Failed to serialize JSON prettily");
        serde_json::to_string(value).unwrap_or_else(|_| "{}".into())
    })
}

/// Build JSON resource contents for MCP resource responses.
pub(crate) fn json_resource_contents(uri: &str, text: String) -> ResourceContents {
    ResourceContents::TextResourceContents {
        uri: uri.to_string(),
        mime_type: Some(APPLICATION_JSON.into()),
        text,
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_payload_mirrors_report() {
        let report = Report::assemble("a.pdf", vec!["one".into(), "two".into()]);
        let payload = summary_payload(&report);
        assert_eq!(payload["chunks"], 2);
        assert_eq!(payload["markdown"], "Source: a.pdf\n\none\n\ntwo\n\n");
        assert_eq!(payload["downloadName"], "resumo_e_explicacao_a.pdf.md");
    }

    #[test]
    fn metrics_payload_uses_camel_case_keys() {
        let payload = metrics_payload(MetricsSnapshot {
            documents_summarized: 3,
            documents_failed: 1,
            chunks_summarized: 7,
        });
        assert_eq!(payload["documentsSummarized"], 3);
        assert_eq!(payload["documentsFailed"], 1);
        assert_eq!(payload["chunksSummarized"], 7);
    }

    #[test]
    fn resource_contents_are_json_text() {
        let contents = json_resource_contents("mcp://settings", "{}".into());
        match contents {
            ResourceContents::TextResourceContents {
                uri, mime_type, ..
            } => {
                assert_eq!(uri, "mcp://settings");
                assert_eq!(mime_type.as_deref(), Some(APPLICATION_JSON));
            }
            other => panic!("unexpected contents: {other:?}"),
        }
    }
}
