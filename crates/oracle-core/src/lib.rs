//! Core trait and types for oracle implementations.
//!
//! This crate provides the shared interface for all oracle implementations
//! in the LLMFlow agent ecosystem. It defines:
//!
//! - [`Oracle`] - The trait that all oracle implementations must implement
//! - [`OracleError`] - Error types for oracle operations
//! - [`ConversationMemory`] - Rolling conversation history and tool usage log
//! - [`UsageSink`] / [`UsageRecord`] - Contract for recording tool usage
//!
//! An oracle is the external natural-language reasoning service the agent
//! consults for plan synthesis, condition judgment, fallback suggestions and
//! response summarization. The interface is a single `complete` operation so
//! that every caller can treat the reply as unconstrained text and parse it
//! defensively.
//!
//! # Example
//!
//! ```rust
//! use oracle_core::{Oracle, OracleError};
//! use async_trait::async_trait;
//!
//! struct MyOracle;
//!
//! #[async_trait]
//! impl Oracle for MyOracle {
//!     async fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
//!         Ok("Hello!".to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "MyOracle"
//!     }
//! }
//! ```

mod error;
mod memory;
mod trait_def;
mod usage;

pub use error::OracleError;
pub use memory::{ConversationMemory, MemoryMessage};
pub use trait_def::Oracle;
pub use usage::{UsageRecord, UsageSink};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
