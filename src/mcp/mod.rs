//! Model Context Protocol (MCP) integration for PDF Digest.
//!
//! This module exposes the summary pipeline to editors and agent hosts over stdio. The surface
//! area consists of:
//!
//! - Tools: `summarize-pdf` (summarize a PDF on the server's filesystem) and `metrics`.
//! - Resources: `mcp://settings` with the effective chunking and generation settings.
//!
//! Handlers, schemas, and formatting helpers are kept in focused submodules.

mod format;
pub mod handlers;
mod registry;
mod schemas;
mod server;

pub use server::DigestMcpServer;
