use crate::processing::chunking::TextChunker;
use crate::processing::prompt::PromptTemplate;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_GENERATION_MODEL: &str = "gpt-3.5-turbo-0125";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
const DEFAULT_CHUNK_SIZE: usize = 3000;
const DEFAULT_CHUNK_OVERLAP: usize = 200;
const DEFAULT_UPLOAD_DIR: &str = "temp";

/// Errors encountered while loading configuration or validating pipeline parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Chunk overlap must be strictly smaller than the chunk size.
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    InvalidChunking {
        /// Maximum chunk length in characters.
        chunk_size: usize,
        /// Requested overlap in characters.
        overlap: usize,
    },
    /// Prompt template does not contain exactly one chunk slot.
    #[error("Invalid prompt template: {0}")]
    InvalidPromptTemplate(String),
    /// Prompt template file could not be read.
    #[error("Failed to read prompt template {path}: {source}")]
    TemplateFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Runtime configuration for the digest service.
///
/// Loaded once at startup and passed explicitly to [`crate::processing::SummaryService`].
#[derive(Clone)]
pub struct Config {
    /// Backend used to generate summaries.
    pub generation_provider: GenerationProvider,
    /// Bearer token for the OpenAI-compatible API.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API (without the `/chat/completions` suffix).
    pub openai_base_url: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Model identifier passed to the provider.
    pub generation_model: String,
    /// Optional sampling temperature.
    pub generation_temperature: Option<f32>,
    /// Per-request time limit in seconds.
    pub generation_timeout_secs: u64,
    /// Largest response body accepted from the provider.
    pub generation_max_response_bytes: usize,
    /// Maximum number of chunk requests in flight for one document.
    pub generation_concurrency: usize,
    /// Maximum chunk length in characters.
    pub text_splitter_chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub text_splitter_chunk_overlap: usize,
    /// Optional file replacing the built-in prompt.
    pub prompt_template_path: Option<PathBuf>,
    /// Directory where uploads are staged before extraction.
    pub upload_dir: PathBuf,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported text-generation backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationProvider {
    /// OpenAI-compatible chat completions API.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

impl GenerationProvider {
    /// Lowercase label used in logs and settings payloads.
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }
}

impl FromStr for GenerationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (environment, map, ...).
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let generation_provider = match get("GENERATION_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("GENERATION_PROVIDER".into()))?,
            None => GenerationProvider::OpenAI,
        };

        let openai_api_key = get("OPENAI_API_KEY");
        if generation_provider == GenerationProvider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".into()));
        }

        let generation_concurrency =
            parse_optional::<usize>(&get, "GENERATION_CONCURRENCY")?.unwrap_or(1);
        if generation_concurrency == 0 {
            return Err(ConfigError::InvalidValue("GENERATION_CONCURRENCY".into()));
        }

        let generation_timeout_secs =
            parse_optional::<u64>(&get, "GENERATION_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if generation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("GENERATION_TIMEOUT_SECS".into()));
        }

        let config = Self {
            generation_provider,
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            generation_model: get("GENERATION_MODEL")
                .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
            generation_temperature: parse_optional(&get, "GENERATION_TEMPERATURE")?,
            generation_timeout_secs,
            generation_max_response_bytes: parse_optional(&get, "GENERATION_MAX_RESPONSE_BYTES")?
                .unwrap_or(DEFAULT_MAX_RESPONSE_BYTES),
            generation_concurrency,
            text_splitter_chunk_size: parse_optional(&get, "TEXT_SPLITTER_CHUNK_SIZE")?
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            text_splitter_chunk_overlap: parse_optional(&get, "TEXT_SPLITTER_CHUNK_OVERLAP")?
                .unwrap_or(DEFAULT_CHUNK_OVERLAP),
            prompt_template_path: get("PROMPT_TEMPLATE_FILE").map(PathBuf::from),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            server_port: parse_optional(&get, "SERVER_PORT")?,
        };

        config.chunker()?;
        Ok(config)
    }

    /// Build the text chunker described by this configuration.
    pub fn chunker(&self) -> Result<TextChunker, ConfigError> {
        TextChunker::new(
            self.text_splitter_chunk_size,
            self.text_splitter_chunk_overlap,
        )
    }

    /// Resolve the prompt template, reading the override file when configured.
    pub fn prompt_template(&self) -> Result<PromptTemplate, ConfigError> {
        match &self.prompt_template_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| {
                    ConfigError::TemplateFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                PromptTemplate::new(raw)
            }
            None => Ok(PromptTemplate::default()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("generation_provider", &self.generation_provider)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("ollama_url", &self.ollama_url)
            .field("generation_model", &self.generation_model)
            .field("generation_temperature", &self.generation_temperature)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .field(
                "generation_max_response_bytes",
                &self.generation_max_response_bytes,
            )
            .field("generation_concurrency", &self.generation_concurrency)
            .field("text_splitter_chunk_size", &self.text_splitter_chunk_size)
            .field(
                "text_splitter_chunk_overlap",
                &self.text_splitter_chunk_overlap,
            )
            .field("prompt_template_path", &self.prompt_template_path)
            .field("upload_dir", &self.upload_dir)
            .field("server_port", &self.server_port)
            .finish()
    }
}

fn parse_optional<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    get(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Load `.env` (if present) and the process environment into a [`Config`].
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        provider = config.generation_provider.label(),
        model = %config.generation_model,
        chunk_size = config.text_splitter_chunk_size,
        chunk_overlap = config.text_splitter_chunk_overlap,
        concurrency = config.generation_concurrency,
        upload_dir = %config.upload_dir.display(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_follow_openai_setup() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.generation_provider, GenerationProvider::OpenAI);
        assert_eq!(config.generation_model, "gpt-3.5-turbo-0125");
        assert_eq!(config.text_splitter_chunk_size, 3000);
        assert_eq!(config.text_splitter_chunk_overlap, 200);
        assert_eq!(config.generation_concurrency, 1);
        assert_eq!(config.upload_dir, PathBuf::from("temp"));
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn openai_requires_api_key() {
        let error = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(error, ConfigError::MissingVariable(key) if key == "OPENAI_API_KEY"));
    }

    #[test]
    fn ollama_does_not_require_api_key() {
        let config = Config::from_lookup(lookup(&[
            ("GENERATION_PROVIDER", "Ollama"),
            ("GENERATION_MODEL", "llama3"),
        ]))
        .unwrap();
        assert_eq!(config.generation_provider, GenerationProvider::Ollama);
        assert_eq!(config.ollama_url, "http://127.0.0.1:11434");
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let error = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("TEXT_SPLITTER_CHUNK_SIZE", "100"),
            ("TEXT_SPLITTER_CHUNK_OVERLAP", "100"),
        ]))
        .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidChunking {
                chunk_size: 100,
                overlap: 100
            }
        ));
    }

    #[test]
    fn rejects_unparsable_numbers_and_zero_concurrency() {
        let error = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SERVER_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue(key) if key == "SERVER_PORT"));

        let error = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("GENERATION_CONCURRENCY", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue(key) if key == "GENERATION_CONCURRENCY"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("UPLOAD_DIR", "   "),
            ("GENERATION_TEMPERATURE", "0.2"),
        ]))
        .unwrap();
        assert_eq!(config.upload_dir, PathBuf::from("temp"));
        assert_eq!(config.generation_temperature, Some(0.2));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-secret")])).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn missing_template_file_is_reported() {
        let mut config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        config.prompt_template_path = Some(PathBuf::from("/definitely/not/here.txt"));
        let error = config.prompt_template().unwrap_err();
        assert!(matches!(error, ConfigError::TemplateFile { .. }));
    }
}
