//! Per-chunk generation requests.
//!
//! Chunks are sent one at a time by default. With a concurrency above one, up to that many
//! requests are in flight, but results are still yielded in chunk order and the first failure in
//! chunk order ends the document; requests still pending at that point are dropped.

use crate::{
    generation::{GenerationClient, GenerationError},
    processing::{prompt::PromptTemplate, tokens::TokenBudget, types::PipelineError},
};
use futures_util::{StreamExt, TryStreamExt, stream};
use std::sync::Arc;

/// Renders prompts and forwards them to a [`GenerationClient`].
#[derive(Clone)]
pub struct Summarizer {
    client: Arc<dyn GenerationClient>,
    template: PromptTemplate,
    concurrency: usize,
    budget: Option<TokenBudget>,
}

impl Summarizer {
    /// Sequential summarizer without token estimates.
    pub fn new(client: Arc<dyn GenerationClient>, template: PromptTemplate) -> Self {
        Self {
            client,
            template,
            concurrency: 1,
            budget: None,
        }
    }

    /// Allow up to `limit` chunk requests in flight (minimum one).
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Log prompt token estimates against `budget`.
    pub fn with_token_budget(mut self, budget: Option<TokenBudget>) -> Self {
        self.budget = budget;
        self
    }

    /// Render the prompt for `chunk` and return the generated text unchanged.
    pub async fn summarize_chunk(&self, chunk: &str) -> Result<String, GenerationError> {
        self.request(0, chunk).await
    }

    /// Summarize every chunk, returning segments in chunk order.
    pub async fn summarize_chunks(
        &self,
        chunks: Vec<String>,
    ) -> Result<Vec<String>, PipelineError> {
        stream::iter(chunks.into_iter().enumerate())
            .map(|(chunk_index, chunk)| async move {
                self.request(chunk_index, &chunk)
                    .await
                    .map_err(|source| PipelineError::Generation {
                        chunk_index,
                        source,
                    })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn request(&self, chunk_index: usize, chunk: &str) -> Result<String, GenerationError> {
        let prompt = self.template.render(chunk);
        if let Some(budget) = &self.budget {
            budget.observe(chunk_index, &prompt);
        }
        tracing::debug!(
            chunk_index,
            chunk_chars = chunk.chars().count(),
            "Requesting chunk summary"
        );
        let text = self.client.generate(&prompt).await?;
        tracing::debug!(chunk_index, output_bytes = text.len(), "Chunk summarized");
        Ok(text)
    }
}
