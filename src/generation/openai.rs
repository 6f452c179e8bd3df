use super::{
    GenerationClient, GenerationError, GenerationSettings, failed_status, http_client,
    read_limited_body, transport_error,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiGenerationClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
    max_response_bytes: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiGenerationClient {
    /// Build a client from provider settings.
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| GenerationError::Client("OpenAI API key is not configured".into()))?;
        Ok(Self {
            http: http_client("pdf-digest/generation", settings.timeout)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model.clone(),
            temperature: settings.temperature,
            timeout: settings.timeout,
            max_response_bytes: settings.max_response_bytes,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl GenerationClient for OpenAiGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| transport_error(error, &self.base_url, self.timeout))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationError::Unavailable(format!(
                "endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            return Err(failed_status(response, self.max_response_bytes).await);
        }

        let body = read_limited_body(
            response,
            self.max_response_bytes,
            &self.base_url,
            self.timeout,
        )
        .await?;

        let parsed: ChatResponse = serde_json::from_slice(&body).map_err(|error| {
            GenerationError::InvalidResponse(format!("failed to decode chat completion: {error}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                GenerationError::InvalidResponse("chat completion contained no message".into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationProvider;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn settings(base_url: String) -> GenerationSettings {
        GenerationSettings {
            provider: GenerationProvider::OpenAI,
            base_url,
            api_key: Some("sk-test".into()),
            model: "gpt-test".into(),
            temperature: None,
            timeout: Duration::from_secs(5),
            max_response_bytes: 64 * 1024,
        }
    }

    #[tokio::test]
    async fn returns_first_choice_verbatim() {
        let server = MockServer::start_async().await;
        let client = OpenAiGenerationClient::new(&settings(server.base_url())).expect("client");

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .body_contains("\"model\":\"gpt-test\"")
                    .body_contains("\"role\":\"user\"")
                    .body_contains("Summarize this");
                then.status(200).json_body(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "  Resumo\n- ponto  " } }
                    ]
                }));
            })
            .await;

        let text = client.generate("Summarize this").await.expect("generated");

        mock.assert_async().await;
        assert_eq!(text, "  Resumo\n- ponto  ");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start_async().await;
        let client = OpenAiGenerationClient::new(&settings(server.base_url())).expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let error = client.generate("prompt").await.expect_err("error status");
        assert!(matches!(
            error,
            GenerationError::Failed { status: 429, ref body } if body == "rate limited"
        ));
    }

    #[tokio::test]
    async fn large_error_body_is_truncated_to_response_limit() {
        let server = MockServer::start_async().await;
        let mut small = settings(server.base_url());
        small.max_response_bytes = 64;
        let client = OpenAiGenerationClient::new(&small).expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(500).body("e".repeat(2_000_000));
            })
            .await;

        let error = client.generate("prompt").await.expect_err("error status");
        match error {
            GenerationError::Failed { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, format!("{} [truncated]", "e".repeat(64)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_choices_are_invalid() {
        let server = MockServer::start_async().await;
        let client = OpenAiGenerationClient::new(&settings(server.base_url())).expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let error = client.generate("prompt").await.expect_err("no choices");
        assert!(matches!(error, GenerationError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn oversized_response_is_rejected() {
        let server = MockServer::start_async().await;
        let mut small = settings(server.base_url());
        small.max_response_bytes = 64;
        let client = OpenAiGenerationClient::new(&small).expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [{ "message": { "content": "x".repeat(500) } }]
                }));
            })
            .await;

        let error = client.generate("prompt").await.expect_err("too large");
        assert!(matches!(
            error,
            GenerationError::ResponseTooLarge { limit: 64 }
        ));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start_async().await;
        let mut quick = settings(server.base_url());
        quick.timeout = Duration::from_millis(100);
        let client = OpenAiGenerationClient::new(&quick).expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .delay(Duration::from_millis(1500))
                    .json_body(json!({ "choices": [{ "message": { "content": "late" } }] }));
            })
            .await;

        let error = client.generate("prompt").await.expect_err("timeout");
        assert!(matches!(error, GenerationError::Timeout(_)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable() {
        let client =
            OpenAiGenerationClient::new(&settings("http://127.0.0.1:1".into())).expect("client");
        let error = client.generate("prompt").await.expect_err("unreachable");
        assert!(matches!(error, GenerationError::Unavailable(_)));
    }

    #[test]
    fn missing_api_key_is_a_client_error() {
        let mut no_key = settings("http://127.0.0.1:1".into());
        no_key.api_key = None;
        assert!(matches!(
            OpenAiGenerationClient::new(&no_key),
            Err(GenerationError::Client(_))
        ));
    }
}
