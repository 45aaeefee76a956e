//! Text generation through the hosted completions API.
//!
//! Both the question-answering and summarization flows hand a single fully assembled prompt to
//! a [`GenerationClient`]. The OpenAI-backed client issues one `/completions` request per
//! prompt and returns the first choice's text.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced while generating text.
#[derive(Debug, Error)]
pub enum GenerationClientError {
    /// Provider was unreachable or the endpoint does not exist.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Sampling parameters applied to every completion request.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Completion model identifier.
    pub model: String,
    /// Sampling temperature; `0.0` keeps answers deterministic.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl GenerationSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.completion_model.clone(),
            temperature: config.completion_temperature,
            max_tokens: config.completion_max_tokens,
        }
    }
}

/// Interface implemented by text generation providers.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a completion for `prompt`, which is the entire model input.
    async fn generate(&self, prompt: String) -> Result<String, GenerationClientError>;
}

/// Build a generation client based on configuration.
pub fn get_generation_client(
    config: &Config,
) -> Result<Box<dyn GenerationClient + Send + Sync>, GenerationClientError> {
    Ok(Box::new(OpenAiCompletionClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        GenerationSettings::from_config(config),
    )?))
}

/// Client for the `/completions` endpoint of an OpenAI-compatible API.
pub struct OpenAiCompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
    settings: GenerationSettings,
}

impl OpenAiCompletionClient {
    /// Construct a client targeting `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: GenerationSettings,
    ) -> Result<Self, GenerationClientError> {
        // No request timeout: an unresponsive upstream blocks the caller until it answers.
        let http = Client::builder()
            .user_agent(concat!("reportqa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| GenerationClientError::ProviderUnavailable(error.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[async_trait]
impl GenerationClient for OpenAiCompletionClient {
    async fn generate(&self, prompt: String) -> Result<String, GenerationClientError> {
        let payload = json!({
            "model": self.settings.model,
            "prompt": prompt,
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });

        tracing::debug!(
            model = %self.settings.model,
            prompt_chars = prompt.chars().count(),
            "Requesting completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationClientError::ProviderUnavailable(format!(
                "completion endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Completion request rejected");
            return Err(GenerationClientError::GenerationFailed(format!(
                "provider returned {status}: {body}"
            )));
        }

        let body: CompletionResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!("failed to decode response: {error}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .ok_or_else(|| GenerationClientError::InvalidResponse("response had no choices".into()))
    }
}
