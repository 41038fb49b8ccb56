//! Ollama-backed oracle implementation for the LLMFlow agent.
//!
//! This crate implements the `Oracle` trait from `oracle-core` against a
//! locally running [Ollama](https://ollama.com) server. Configuration comes
//! from environment variables or the builder:
//!
//! ```rust,no_run
//! use ollama_oracle::{OllamaConfig, OllamaOracle};
//! use oracle_core::Oracle;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), oracle_core::OracleError> {
//!     let config = OllamaConfig::builder().model("gemma3:12b").build();
//!     let oracle = OllamaOracle::new(config)?;
//!
//!     let reply = oracle.complete("Why is the sky blue?").await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod api_types;
mod config;
mod oracle;

pub use config::{OllamaConfig, OllamaConfigBuilder, DEFAULT_API_URL, DEFAULT_MODEL};
pub use oracle::OllamaOracle;
