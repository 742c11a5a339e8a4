use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use itinera_core::config::LlmConfig;

/// Per-call generation settings. Extraction and evaluation run
/// deterministic; itinerary and explanation text run exploratory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
}

impl CompletionOptions {
    pub const DETERMINISTIC: Self = Self { temperature: 0.0 };
    pub const EXPLORATORY: Self = Self { temperature: 0.7 };

    pub fn with_temperature(temperature: f32) -> Self {
        Self { temperature }
    }
}

/// Generation capability boundary. Implementations normalize whatever
/// envelope their provider returns into one canonical trimmed string,
/// so no downstream stage branches on response shape.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String>;
}

/// Non-streaming Ollama `/api/generate` client.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build llm http client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(config.base_url.clone(), config.model.clone(), config.timeout_secs)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateRequestOptions,
}

#[derive(Serialize)]
struct GenerateRequestOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateRequestOptions { temperature: options.temperature },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("generation request to {url} failed"))?
            .error_for_status()
            .context("generation provider returned an error status")?;

        let envelope: GenerateResponse =
            response.json().await.context("generation provider returned an unusable envelope")?;

        Ok(envelope.response.trim().to_string())
    }
}
