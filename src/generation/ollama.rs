use super::{
    GenerationClient, GenerationError, GenerationSettings, failed_status, http_client,
    read_limited_body, transport_error,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Client for a local Ollama runtime using `/api/generate` without streaming.
pub struct OllamaGenerationClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
    max_response_bytes: usize,
}

impl OllamaGenerationClient {
    /// Build a client from provider settings.
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        Ok(Self {
            http: http_client("pdf-digest/ollama", settings.timeout)?,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            timeout: settings.timeout,
            max_response_bytes: settings.max_response_bytes,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl GenerationClient for OllamaGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });
        if let Some(temperature) = self.temperature {
            payload["options"] = json!({ "temperature": temperature });
        }

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| transport_error(error, &self.base_url, self.timeout))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationError::Unavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            return Err(failed_status(response, self.max_response_bytes).await);
        }

        let bytes = read_limited_body(
            response,
            self.max_response_bytes,
            &self.base_url,
            self.timeout,
        )
        .await?;

        let body: OllamaResponse = serde_json::from_slice(&bytes).map_err(|error| {
            GenerationError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(GenerationError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response)
    }
}
