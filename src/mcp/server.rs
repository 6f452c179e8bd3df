//! MCP server bootstrap and request dispatch.

use std::{borrow::Cow, sync::Arc};

use crate::{
    mcp::{
        format::{json_resource_contents, serialize_json},
        handlers::{metrics::handle_metrics, summarize::handle_summarize_pdf},
        registry::{self, Registry},
        schemas,
    },
    processing::SummaryService,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, ListResourcesResult, ListToolsResult,
        RawResource, ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo,
        Tool, ToolAnnotations,
    },
};

const SETTINGS_URI: &str = "mcp://settings";

/// MCP server implementation exposing the PDF summary pipeline.
#[derive(Clone)]
pub struct DigestMcpServer {
    service: Arc<SummaryService>,
    registry: Arc<Registry>,
}

impl DigestMcpServer {
    /// Create a new MCP server using the supplied summary service.
    pub fn new(service: Arc<SummaryService>) -> Self {
        let mut settings = RawResource::new(SETTINGS_URI, "settings");
        settings.description =
            Some("Effective chunking and generation settings (credentials omitted)".into());
        settings.mime_type = Some(super::format::APPLICATION_JSON.into());

        let registry = Registry::default()
            .with_tool(summarize_tool(), tool_summarize_pdf)
            .with_tool(metrics_tool(), tool_metrics)
            .with_resource(SETTINGS_URI, settings.no_annotation(), resource_settings);

        Self {
            service,
            registry: Arc::new(registry),
        }
    }
}

fn summarize_tool() -> Tool {
    Tool {
        name: Cow::Borrowed("summarize-pdf"),
        title: Some("Summarize PDF".to_string()),
        description: Some(Cow::Borrowed(
            "Extract a PDF on the server's filesystem, summarize it chunk by chunk, and return the markdown report (summary plus bullet-point explanation per chunk).",
        )),
        input_schema: Arc::new(schemas::summarize_pdf_input_schema()),
        output_schema: None,
        annotations: Some(
            ToolAnnotations::with_title("Summarize PDF")
                .read_only(true)
                .idempotent(false)
                .open_world(true),
        ),
        icons: None,
    }
}

fn metrics_tool() -> Tool {
    Tool {
        name: Cow::Borrowed("metrics"),
        title: Some("Metrics Snapshot".to_string()),
        description: Some(Cow::Borrowed(
            "Check how many documents and chunks were summarized or failed since startup.",
        )),
        input_schema: Arc::new(schemas::empty_object_schema()),
        output_schema: None,
        annotations: Some(
            ToolAnnotations::with_title("Metrics Snapshot")
                .read_only(true)
                .idempotent(true)
                .open_world(false),
        ),
        icons: None,
    }
}

fn resource_settings(
    server: &DigestMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    let payload = serialize_json(server.service.settings(), SETTINGS_URI);
    Box::pin(async move {
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(SETTINGS_URI, payload)],
        })
    })
}

fn tool_summarize_pdf(
    server: &DigestMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_summarize_pdf(&service, request.arguments).await })
}

fn tool_metrics(server: &DigestMcpServer, _request: CallToolRequestParam) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_metrics(&service).await })
}

impl ServerHandler for DigestMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = rmcp::model::Implementation::from_build_env();
        implementation.name = "pdf-digest".to_string();
        implementation.title = Some("PDF Digest MCP".to_string());
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: implementation,
            instructions: Some(
                "Use summarize-pdf with a path to a PDF to get a markdown summary and bullet-point explanation, one section per chunk of the document. Read mcp://settings for the active chunk size and model.".into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_resources(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let resources = self.registry.resource_descriptors();
        std::future::ready(Ok(ListResourcesResult::with_all_items(resources)))
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.registry.tool_descriptors();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            match self.registry.resource(&request.uri) {
                Some(handler) => handler(self, request).await,
                None => Err(McpError::invalid_params(
                    format!("Unknown resource URI: {}", request.uri),
                    None,
                )),
            }
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match self.registry.tool(request.name.as_ref()) {
                Some(handler) => handler(self, request).await,
                None => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", request.name),
                    None,
                )),
            }
        }
    }
}
