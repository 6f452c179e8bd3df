//! MCP server entrypoint (stdio transport).
//!
//! Exposes the `summarize-pdf` and `metrics` tools over stdio for editor and agent integrations.
//! Shares all runtime configuration with the HTTP binary; logs go to the log file only.
use anyhow::{Context, Result};
use pdfdigest::{config, logging, mcp::DigestMcpServer, processing::SummaryService};
use rmcp::{service::ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_file_tracing();
    let config = config::load_config().context("failed to load configuration")?;

    let service =
        Arc::new(SummaryService::new(&config).context("failed to initialize summary service")?);
    let server = DigestMcpServer::new(service);

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server over stdio")?;

    service
        .waiting()
        .await
        .context("MCP server terminated unexpectedly")?;

    Ok(())
}
