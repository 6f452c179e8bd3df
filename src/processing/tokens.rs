//! Prompt token estimates against the generation model's context window.
//!
//! Chunking is character based, so a chunk can still overflow the model context for dense
//! scripts. The budget only observes: it logs the estimate and warns on overflow, and the request
//! is sent regardless.

use std::sync::Arc;
use tiktoken_rs::{CoreBPE, cl100k_base, get_bpe_from_model, model::get_context_size};

/// Token counter bound to one model.
#[derive(Clone)]
pub struct TokenBudget {
    model: String,
    context_window: usize,
    encoding: Arc<CoreBPE>,
}

impl TokenBudget {
    /// Resolve the tokenizer for `model`, falling back to `cl100k_base` for unknown models.
    ///
    /// Returns `None` only when no encoding can be loaded at all.
    pub fn for_model(model: &str) -> Option<Self> {
        let encoding = match get_bpe_from_model(model) {
            Ok(encoding) => encoding,
            Err(error) => {
                tracing::debug!(
                    model,
                    error = %error,
                    "Tokenizer lookup failed; using cl100k_base estimate"
                );
                match cl100k_base() {
                    Ok(encoding) => encoding,
                    Err(error) => {
                        tracing::warn!(error = %error, "No tokenizer available; skipping token estimates");
                        return None;
                    }
                }
            }
        };

        Some(Self {
            model: model.to_string(),
            context_window: get_context_size(model),
            encoding: Arc::new(encoding),
        })
    }

    /// Context window assumed for the model.
    pub fn context_window(&self) -> usize {
        self.context_window
    }

    /// Count tokens in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.encoding.encode_ordinary(text).len()
    }

    /// Log the prompt estimate and warn when it exceeds the context window.
    pub fn observe(&self, chunk_index: usize, prompt: &str) -> usize {
        let tokens = self.count(prompt);
        if tokens > self.context_window {
            tracing::warn!(
                model = %self.model,
                chunk_index,
                tokens,
                context_window = self.context_window,
                "Prompt likely exceeds the model context window"
            );
        } else {
            tracing::debug!(chunk_index, tokens, "Estimated prompt tokens");
        }
        tokens
    }
}

impl std::fmt::Debug for TokenBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBudget")
            .field("model", &self.model)
            .field("context_window", &self.context_window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_counts_tokens() {
        let budget = TokenBudget::for_model("gpt-3.5-turbo-0125").expect("budget");
        let tokens = budget.count("The quick brown fox jumps over the lazy dog.");
        assert!(tokens > 0 && tokens < 20);
        assert!(budget.context_window() >= 4096);
    }

    #[test]
    fn unknown_model_falls_back_to_default_encoding() {
        let budget = TokenBudget::for_model("llama3:8b").expect("fallback budget");
        assert!(budget.count("hello world") > 0);
        assert_eq!(budget.observe(0, "hello world"), budget.count("hello world"));
    }
}
