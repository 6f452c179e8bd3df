#![deny(missing_docs)]

//! Core library for the PDF digest service.

/// HTTP routing and upload handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Text-generation client abstraction and HTTP adapters.
pub mod generation;
/// Structured logging and tracing setup.
pub mod logging;
/// Model Context Protocol server implementation.
pub mod mcp;
/// Summarization metrics helpers.
pub mod metrics;
/// Extraction, chunking, summarization, and report assembly.
pub mod processing;
