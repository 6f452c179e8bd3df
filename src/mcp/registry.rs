//! Dispatch table pairing each tool and resource descriptor with its handler.

use std::{future::Future, pin::Pin};

use rmcp::ErrorData as McpError;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ReadResourceRequestParam, ReadResourceResult, Resource,
    Tool,
};

use super::server::DigestMcpServer;

pub type ResourceFuture =
    Pin<Box<dyn Future<Output = Result<ReadResourceResult, McpError>> + Send>>;
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<CallToolResult, McpError>> + Send>>;

pub type ResourceHandler = fn(&DigestMcpServer, ReadResourceRequestParam) -> ResourceFuture;
pub type ToolHandler = fn(&DigestMcpServer, CallToolRequestParam) -> ToolFuture;

struct ToolEntry {
    descriptor: Tool,
    handler: ToolHandler,
}

struct ResourceEntry {
    uri: &'static str,
    descriptor: Resource,
    handler: ResourceHandler,
}

/// Tools and resources in registration order, which is also the listing order.
#[derive(Default)]
pub struct Registry {
    tools: Vec<ToolEntry>,
    resources: Vec<ResourceEntry>,
}

impl Registry {
    pub fn with_tool(mut self, descriptor: Tool, handler: ToolHandler) -> Self {
        self.tools.push(ToolEntry {
            descriptor,
            handler,
        });
        self
    }

    pub fn with_resource(
        mut self,
        uri: &'static str,
        descriptor: Resource,
        handler: ResourceHandler,
    ) -> Self {
        self.resources.push(ResourceEntry {
            uri,
            descriptor,
            handler,
        });
        self
    }

    pub fn tool(&self, name: &str) -> Option<ToolHandler> {
        self.tools
            .iter()
            .find(|entry| entry.descriptor.name == name)
            .map(|entry| entry.handler)
    }

    pub fn resource(&self, uri: &str) -> Option<ResourceHandler> {
        self.resources
            .iter()
            .find(|entry| entry.uri == uri)
            .map(|entry| entry.handler)
    }

    pub fn tool_descriptors(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    pub fn resource_descriptors(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }
}
