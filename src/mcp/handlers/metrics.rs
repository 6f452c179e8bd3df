//! Handler for the metrics tool.

use std::sync::Arc;

use crate::{mcp::format::metrics_payload, processing::SummaryService};
use rmcp::{ErrorData as McpError, model::CallToolResult};

/// Handle the `metrics` tool, returning the current summarization counters.
pub(crate) async fn handle_metrics(
    service: &Arc<SummaryService>,
) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::structured(metrics_payload(
        service.metrics_snapshot(),
    )))
}
