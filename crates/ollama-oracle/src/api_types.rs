//! Ollama API request and response types.

use serde::{Deserialize, Serialize};

/// Generation request to the Ollama `/api/generate` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Model to use.
    pub model: String,
    /// The prompt to complete.
    pub prompt: String,
    /// Always false: the whole reply arrives in one response body.
    pub stream: bool,
    /// Generation options (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

/// Generation options.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Non-streaming generation response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Model that produced the reply.
    pub model: String,
    /// The generated text.
    pub response: String,
    /// Whether generation finished.
    pub done: bool,
    /// Total wall time in nanoseconds, when reported.
    pub total_duration: Option<u64>,
    /// Tokens in the generated reply, when reported.
    pub eval_count: Option<u64>,
}

/// Error body returned by Ollama on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
}
