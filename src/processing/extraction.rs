//! PDF text extraction.
//!
//! Page parsing is delegated to a [`PageLoader`]; the default loader wraps `pdf-extract`. Parsing
//! is CPU-bound and may panic on hostile input, so it runs on the blocking pool and any worker
//! failure is surfaced as an [`ExtractionError`].

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while turning a file into document text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file could not be opened or read.
    #[error("failed to open document: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a PDF the parser understands.
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    /// Parsing succeeded but no page carried any text (e.g. scanned images).
    #[error("document contains no extractable text")]
    NoText,
    /// The blocking extraction task failed or panicked.
    #[error("extraction worker failed: {0}")]
    Worker(String),
}

/// Source of per-page text for a file on disk.
pub trait PageLoader: Send + Sync {
    /// Return the text of every page, in page order.
    fn load_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// [`PageLoader`] backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractLoader;

impl PageLoader for PdfExtractLoader {
    fn load_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        std::fs::metadata(path)?;
        pdf_extract::extract_text_by_pages(path)
            .map_err(|error| ExtractionError::Parse(error.to_string()))
    }
}

/// Text content of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Name used to label the report (the original upload name).
    pub source: String,
    /// Text of each page, in order.
    pub pages: Vec<String>,
}

impl Document {
    /// Flatten the pages into a single string, separated by one space.
    pub fn text(&self) -> String {
        self.pages.join(" ")
    }
}

/// Runs a [`PageLoader`] off the async runtime and validates the result.
#[derive(Clone)]
pub struct DocumentExtractor {
    loader: Arc<dyn PageLoader>,
}

impl DocumentExtractor {
    /// Wrap a page loader.
    pub fn new(loader: Arc<dyn PageLoader>) -> Self {
        Self { loader }
    }

    /// Load `path` and label the resulting document with `source`.
    pub async fn extract(&self, path: &Path, source: &str) -> Result<Document, ExtractionError> {
        let loader = Arc::clone(&self.loader);
        let path_buf = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || loader.load_pages(&path_buf))
            .await
            .map_err(|error| ExtractionError::Worker(error.to_string()))??;

        if pages.iter().all(|page| page.trim().is_empty()) {
            return Err(ExtractionError::NoText);
        }

        let document = Document {
            source: source.to_string(),
            pages,
        };
        tracing::debug!(
            source,
            pages = document.pages.len(),
            "Extracted document text"
        );
        Ok(document)
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PdfExtractLoader))
    }
}
