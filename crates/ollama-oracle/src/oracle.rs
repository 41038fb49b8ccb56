//! OllamaOracle implementation over the local Ollama HTTP API.

use oracle_core::{async_trait, Oracle, OracleError};
use reqwest::Client;
use tracing::{debug, warn};

use crate::api_types::{ApiError, GenerateOptions, GenerateRequest, GenerateResponse};
use crate::config::OllamaConfig;

/// An oracle backed by a locally running Ollama server.
///
/// Uses the non-streaming `/api/generate` endpoint: one prompt in, one
/// reply out, which matches the single-shot [`Oracle::complete`] contract.
pub struct OllamaOracle {
    client: Client,
    config: OllamaConfig,
}

impl OllamaOracle {
    /// Create a new OllamaOracle with the given configuration.
    pub fn new(config: OllamaConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                OracleError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        debug!(
            "OllamaOracle initialized with model: {} at {}",
            config.model, config.api_url
        );

        Ok(Self { client, config })
    }

    /// Create an OllamaOracle from environment variables.
    ///
    /// See [`OllamaConfig::from_env`] for the recognized variables.
    pub fn from_env() -> Result<Self, OracleError> {
        Self::new(OllamaConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, OracleError> {
        let url = format!("{}/api/generate", self.config.api_url);

        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: self.config.temperature.map(|temperature| GenerateOptions {
                temperature: Some(temperature),
            }),
        };

        debug!(prompt_len = prompt.len(), "Sending request to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Unavailable(format!("Failed to reach Ollama: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Ollama returns {"error": "..."} bodies on failure.
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(OracleError::CompletionFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error
                )));
            }

            return Err(OracleError::CompletionFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: GenerateResponse = response.json().await.map_err(|e| {
            OracleError::CompletionFailed(format!("Failed to parse response: {}", e))
        })?;

        if !completion.done {
            warn!("Ollama reported an unfinished generation");
        }

        Ok(completion)
    }
}

#[async_trait]
impl Oracle for OllamaOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let completion = self.generate(prompt).await?;

        if let (Some(duration), Some(tokens)) = (completion.total_duration, completion.eval_count) {
            debug!(
                "Generated {} tokens in {} ms",
                tokens,
                duration / 1_000_000
            );
        }

        Ok(completion.response)
    }

    fn name(&self) -> &str {
        "OllamaOracle"
    }

    async fn is_ready(&self) -> bool {
        // Ollama answers plain GET / with "Ollama is running".
        match self.client.get(&self.config.api_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Ollama readiness check failed: {}", e);
                false
            }
        }
    }
}
