//! Configuration for OllamaOracle.

use std::env;
use std::time::Duration;

use oracle_core::OracleError;

/// Default Ollama endpoint.
pub const DEFAULT_API_URL: &str = "http://localhost:11434";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemma3:12b";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for OllamaOracle.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Ollama API URL.
    pub api_url: String,

    /// Model name to use.
    pub model: String,

    /// Sampling temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(0.7),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OllamaConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `OLLAMA_URL` - API URL (default: http://localhost:11434)
    /// - `OLLAMA_MODEL` - Model name (default: gemma3:12b)
    /// - `OLLAMA_TEMPERATURE` - Sampling temperature (default: 0.7)
    /// - `OLLAMA_TIMEOUT_SECS` - Request timeout in seconds (default: 120)
    pub fn from_env() -> Result<Self, OracleError> {
        let api_url = env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(OracleError::Configuration(format!(
                "OLLAMA_URL must be an http(s) URL, got: {}",
                api_url
            )));
        }

        let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature = env::var("OLLAMA_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.7));

        let timeout = env::var("OLLAMA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            api_url,
            model,
            temperature,
            timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> OllamaConfigBuilder {
        OllamaConfigBuilder::default()
    }
}

/// Builder for OllamaConfig.
#[derive(Debug, Default)]
pub struct OllamaConfigBuilder {
    config: OllamaConfig,
}

impl OllamaConfigBuilder {
    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OllamaConfig {
        self.config
    }
}
