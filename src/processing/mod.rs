//! Document pipeline: staging, PDF extraction, chunking, per-chunk generation, and report assembly.

pub mod chunking;
pub mod extraction;
pub mod prompt;
pub mod report;
mod service;
pub mod staging;
mod summarizer;
pub mod tokens;
pub mod types;

pub use chunking::{Chunks, TextChunker, split_text};
pub use extraction::{Document, DocumentExtractor, ExtractionError, PageLoader, PdfExtractLoader};
pub use prompt::PromptTemplate;
pub use report::{MARKDOWN_MIME, Report, download_file_name};
pub use service::{SummaryApi, SummaryService};
pub use staging::{StagedFile, Upload, UploadStager};
pub use summarizer::Summarizer;
pub use types::{DocumentOutcome, PipelineError, ServiceInitError, ServiceSettings};
