//! Summary service coordinating staging, extraction, chunking, generation, and assembly.

use crate::{
    config::Config,
    generation::{GenerationClient, GenerationSettings, build_generation_client},
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::{
        chunking::TextChunker,
        extraction::{DocumentExtractor, PageLoader, PdfExtractLoader},
        report::Report,
        staging::{Upload, UploadStager},
        summarizer::Summarizer,
        tokens::TokenBudget,
        types::{DocumentOutcome, PipelineError, ServiceInitError, ServiceSettings},
    },
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Runs the full per-document pipeline: Extract → Chunk → Summarize each chunk → Assemble.
///
/// The service owns the extractor, generation client, and metrics registry so that the HTTP,
/// MCP, and CLI surfaces share one set of components. Construct it once near process start and
/// share it through an `Arc`.
pub struct SummaryService {
    extractor: DocumentExtractor,
    chunker: TextChunker,
    summarizer: Summarizer,
    stager: UploadStager,
    metrics: Arc<SummaryMetrics>,
    settings: ServiceSettings,
}

/// Abstraction over the summary pipeline used by external surfaces.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Stage, extract, and summarize one uploaded file.
    async fn summarize_upload(&self, upload: Upload) -> DocumentOutcome;

    /// Process uploads one at a time in submission order; a failure only affects its own entry.
    async fn summarize_uploads(&self, uploads: Vec<Upload>) -> Vec<DocumentOutcome> {
        let mut outcomes = Vec::with_capacity(uploads.len());
        for upload in uploads {
            outcomes.push(self.summarize_upload(upload).await);
        }
        outcomes
    }

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummaryService {
    /// Build the service from configuration, using `pdf-extract` and the configured provider.
    pub fn new(config: &Config) -> Result<Self, ServiceInitError> {
        let generation = GenerationSettings::from_config(config);
        let client = build_generation_client(&generation)?;
        Self::with_components(config, Arc::new(PdfExtractLoader), client)
    }

    /// Build the service around caller-supplied extraction and generation components.
    pub fn with_components(
        config: &Config,
        loader: Arc<dyn PageLoader>,
        client: Arc<dyn GenerationClient>,
    ) -> Result<Self, ServiceInitError> {
        let chunker = config.chunker()?;
        let template = config.prompt_template()?;
        let summarizer = Summarizer::new(client, template)
            .with_concurrency(config.generation_concurrency)
            .with_token_budget(TokenBudget::for_model(&config.generation_model));
        let generation = GenerationSettings::from_config(config);
        let settings = ServiceSettings::from_config(config, &generation.base_url);

        tracing::info!(
            provider = settings.provider,
            model = %settings.model,
            chunk_size = chunker.chunk_size(),
            overlap = chunker.overlap(),
            concurrency = settings.concurrency,
            upload_dir = %settings.upload_dir.display(),
            "Summary service ready"
        );

        Ok(Self {
            extractor: DocumentExtractor::new(loader),
            chunker,
            summarizer,
            stager: UploadStager::new(config.upload_dir.clone()),
            metrics: Arc::new(SummaryMetrics::new()),
            settings,
        })
    }

    /// Chunk `text` and summarize every chunk into a report labelled `source`.
    pub async fn summarize_text(&self, source: &str, text: &str) -> Result<Report, PipelineError> {
        let chunks: Vec<String> = self.chunker.split(text).map(str::to_owned).collect();
        let segments = self.summarizer.summarize_chunks(chunks).await?;
        Ok(Report::assemble(source, segments))
    }

    /// Extract and summarize a PDF already on disk.
    pub async fn summarize_file(&self, path: &Path, source: &str) -> Result<Report, PipelineError> {
        tracing::info!(source, path = %path.display(), "Summarizing document");
        let result = self.run_file(path, source).await;
        self.record(source, &result);
        result
    }

    /// Stage an upload, then extract and summarize it. The staged copy is removed afterwards.
    pub async fn summarize_upload(&self, upload: Upload) -> DocumentOutcome {
        let source = upload.file_name.clone();
        let result = match self.stager.stage(&upload).await {
            Ok(staged) => {
                drop(upload);
                self.summarize_file(staged.path(), &source).await
            }
            Err(error) => {
                let result = Err(PipelineError::Staging(error));
                self.record(&source, &result);
                result
            }
        };
        DocumentOutcome { source, result }
    }

    /// Current counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Effective, credential-free settings.
    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    async fn run_file(&self, path: &Path, source: &str) -> Result<Report, PipelineError> {
        let document = self.extractor.extract(path, source).await?;
        self.summarize_text(source, &document.text()).await
    }

    fn record(&self, source: &str, result: &Result<Report, PipelineError>) {
        match result {
            Ok(report) => {
                self.metrics.record_document(report.segments().len() as u64);
                tracing::info!(
                    source,
                    chunks = report.segments().len(),
                    "Document summarized"
                );
            }
            Err(error) => {
                self.metrics.record_failure();
                tracing::warn!(source, stage = error.stage(), error = %error, "Document failed");
            }
        }
    }
}

#[async_trait]
impl SummaryApi for SummaryService {
    async fn summarize_upload(&self, upload: Upload) -> DocumentOutcome {
        SummaryService::summarize_upload(self, upload).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryService::metrics_snapshot(self)
    }
}
