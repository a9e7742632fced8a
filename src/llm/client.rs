use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// A text-in, text-out language model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one rendered prompt and return the raw completion text
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Configuration for the Ollama client
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server address, without trailing slash (e.g., "http://localhost:11434")
    pub base_url: String,
    /// Model to use (e.g., "llama3.2:latest")
    pub model: String,
    /// Sampling temperature; server default when unset
    pub temperature: Option<f64>,
    /// Per-request timeout in seconds; none means wait indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL)
    }
}

impl OllamaConfig {
    /// Create with custom server and model
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            model: model.into(),
            temperature: None,
            timeout_secs: None,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads `OLLAMA_BASE_URL` (falling back to `OLLAMA_HOST`) and
    /// `OLLAMA_MODEL`; anything unset keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("OLLAMA_BASE_URL")
            .or_else(|| lookup("OLLAMA_HOST"))
            .map(with_scheme)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self::new(base_url, model)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Full URL of the generate endpoint
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// OLLAMA_HOST is commonly set as bare "host:port"
fn with_scheme(host: String) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host
    } else {
        format!("http://{}", host)
    }
}

/// Client for an Ollama server's non-streaming generate endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PipelineError::ModelUnavailable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: self
                .config
                .temperature
                .map(|temperature| GenerateOptions { temperature }),
        };

        let url = self.config.generate_url();
        debug!("POST {} ({} prompt chars)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::ModelUnavailable(format!("{}: {}", url, e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                PipelineError::ModelUnavailable(format!("{}: {}", url, e))
            } else {
                PipelineError::ModelError(format!("failed to read response body: {}", e))
            }
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(PipelineError::ModelError(format!("{} - {}", status, detail)));
        }

        parse_generate_response(&body)
    }
}

/// Extract the completion text from a generate response body
fn parse_generate_response(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::ModelError(format!("malformed response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(PipelineError::ModelError(error));
    }

    response
        .response
        .ok_or_else(|| PipelineError::ModelError("no 'response' field in reply".to_string()))
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}
