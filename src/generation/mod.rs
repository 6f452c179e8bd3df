//! Abstractions for generating text via an external model API.
//!
//! Two HTTP adapters are provided: an OpenAI-compatible chat completions client and an Ollama
//! client. Both enforce a per-request timeout and a response-size limit, and neither retries:
//! the first failure is returned to the caller.

mod ollama;
mod openai;

pub use ollama::OllamaGenerationClient;
pub use openai::OpenAiGenerationClient;

use crate::config::{Config, GenerationProvider};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced while requesting generated text.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider could not be reached.
    #[error("Generation provider unavailable: {0}")]
    Unavailable(String),
    /// Provider answered with a non-success status.
    #[error("Generation request failed with status {status}: {body}")]
    Failed {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// Request did not complete within the configured limit.
    #[error("Generation request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the configured size limit.
    #[error("Provider response exceeded {limit} bytes")]
    ResponseTooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Interface implemented by text-generation providers.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send `prompt` as a single request and return the generated text verbatim.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Connection and request settings for a generation provider.
#[derive(Clone)]
pub struct GenerationSettings {
    /// Backend to talk to.
    pub provider: GenerationProvider,
    /// Provider base URL.
    pub base_url: String,
    /// Bearer token, when the provider needs one.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Optional sampling temperature.
    pub temperature: Option<f32>,
    /// Per-request time limit.
    pub timeout: Duration,
    /// Largest accepted response body.
    pub max_response_bytes: usize,
}

impl GenerationSettings {
    /// Extract the generation settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let base_url = match config.generation_provider {
            GenerationProvider::OpenAI => config.openai_base_url.clone(),
            GenerationProvider::Ollama => config.ollama_url.clone(),
        };
        Self {
            provider: config.generation_provider,
            base_url,
            api_key: config.openai_api_key.clone(),
            model: config.generation_model.clone(),
            temperature: config.generation_temperature,
            timeout: Duration::from_secs(config.generation_timeout_secs),
            max_response_bytes: config.generation_max_response_bytes,
        }
    }
}

impl std::fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

/// Build a generation client for the configured provider.
pub fn build_generation_client(
    settings: &GenerationSettings,
) -> Result<Arc<dyn GenerationClient>, GenerationError> {
    tracing::info!(
        provider = settings.provider.label(),
        model = %settings.model,
        base_url = %settings.base_url,
        "Initializing generation client"
    );
    match settings.provider {
        GenerationProvider::OpenAI => Ok(Arc::new(OpenAiGenerationClient::new(settings)?)),
        GenerationProvider::Ollama => Ok(Arc::new(OllamaGenerationClient::new(settings)?)),
    }
}

fn http_client(user_agent: &str, timeout: Duration) -> Result<Client, GenerationError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|error| GenerationError::Client(error.to_string()))
}

fn transport_error(error: reqwest::Error, base_url: &str, timeout: Duration) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Timeout(timeout)
    } else {
        GenerationError::Unavailable(format!("failed to reach {base_url}: {error}"))
    }
}

/// Read the body while enforcing `limit`, bailing out as soon as it is exceeded.
async fn read_limited_body(
    mut response: reqwest::Response,
    limit: usize,
    base_url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, GenerationError> {
    if response
        .content_length()
        .is_some_and(|length| length > limit as u64)
    {
        return Err(GenerationError::ResponseTooLarge { limit });
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|error| transport_error(error, base_url, timeout))?
    {
        if body.len() + chunk.len() > limit {
            return Err(GenerationError::ResponseTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Upper bound on how much of an error body is kept, whatever the response limit.
const ERROR_BODY_PREVIEW_BYTES: usize = 4096;

const TRUNCATION_MARKER: &str = " [truncated]";

/// Turn a non-success response into [`GenerationError::Failed`].
///
/// At most `min(limit, 4 KiB)` bytes of the body are read; the rest is never downloaded.
async fn failed_status(mut response: reqwest::Response, limit: usize) -> GenerationError {
    let status = response.status().as_u16();
    let cap = limit.min(ERROR_BODY_PREVIEW_BYTES);

    let mut body = Vec::new();
    let mut truncated = false;
    while let Ok(Some(chunk)) = response.chunk().await {
        let room = cap - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            truncated = true;
            break;
        }
        body.extend_from_slice(&chunk);
    }

    let mut body = String::from_utf8_lossy(&body).into_owned();
    if truncated {
        body.push_str(TRUNCATION_MARKER);
    }
    GenerationError::Failed { status, body }
}
