//! Core data types and error definitions for the digest pipeline.

use crate::{
    config::{Config, ConfigError},
    generation::GenerationError,
    processing::{extraction::ExtractionError, report::Report},
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the processing of one document.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The upload could not be written to the staging directory.
    #[error("Failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),
    /// Text could not be extracted from the PDF.
    #[error("Failed to extract text: {0}")]
    Extraction(#[from] ExtractionError),
    /// A chunk request failed; the remaining chunks were not requested.
    #[error("Generation failed for chunk {chunk_index}: {source}")]
    Generation {
        /// Zero-based index of the failing chunk.
        chunk_index: usize,
        /// Underlying provider failure.
        #[source]
        source: GenerationError,
    },
}

impl PipelineError {
    /// Name of the stage that failed, as reported to API consumers.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Staging(_) => "staging",
            Self::Extraction(_) => "extraction",
            Self::Generation { .. } => "generation",
        }
    }
}

/// Errors raised while assembling a [`crate::processing::SummaryService`].
#[derive(Debug, Error)]
pub enum ServiceInitError {
    /// Chunking parameters or prompt template are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The generation client could not be constructed.
    #[error("Failed to initialize generation client: {0}")]
    Client(#[from] GenerationError),
}

/// Result of processing one document in a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Original upload name.
    pub source: String,
    /// Finished report, or the error that stopped the document.
    pub result: Result<Report, PipelineError>,
}

impl DocumentOutcome {
    /// Whether the document produced a report.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Effective pipeline settings, safe to expose (never includes credentials).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceSettings {
    /// Generation backend label.
    pub provider: &'static str,
    /// Model identifier.
    pub model: String,
    /// Provider base URL.
    pub base_url: String,
    /// Optional sampling temperature.
    pub temperature: Option<f32>,
    /// Per-request time limit in seconds.
    pub timeout_secs: u64,
    /// Largest accepted provider response.
    pub max_response_bytes: usize,
    /// Chunk requests allowed in flight per document.
    pub concurrency: usize,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub chunk_overlap: usize,
    /// Prompt template override, if any.
    pub prompt_template_file: Option<PathBuf>,
    /// Staging directory for uploads.
    pub upload_dir: PathBuf,
}

impl ServiceSettings {
    pub(crate) fn from_config(config: &Config, base_url: &str) -> Self {
        Self {
            provider: config.generation_provider.label(),
            model: config.generation_model.clone(),
            base_url: base_url.to_string(),
            temperature: config.generation_temperature,
            timeout_secs: config.generation_timeout_secs,
            max_response_bytes: config.generation_max_response_bytes,
            concurrency: config.generation_concurrency,
            chunk_size: config.text_splitter_chunk_size,
            chunk_overlap: config.text_splitter_chunk_overlap,
            prompt_template_file: config.prompt_template_path.clone(),
            upload_dir: config.upload_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_match_failure_kind() {
        let staging = PipelineError::Staging(std::io::Error::other("disk full"));
        let extraction = PipelineError::from(ExtractionError::NoText);
        let generation = PipelineError::Generation {
            chunk_index: 1,
            source: GenerationError::Unavailable("down".into()),
        };

        assert_eq!(staging.stage(), "staging");
        assert_eq!(extraction.stage(), "extraction");
        assert_eq!(generation.stage(), "generation");
        assert!(generation.to_string().contains("chunk 1"));
    }
}
