//! Mock oracle implementations for LLMFlow testing.
//!
//! This crate provides deterministic implementations of the `Oracle` trait:
//! - `StaticOracle` - Always returns the same reply
//! - `ScriptedOracle` - Returns replies from a queue, in order
//! - `FailingOracle` - Always fails
//! - `DelayedOracle` - Wraps another oracle with artificial delay
//!
//! These make the orchestration algorithm testable with a fixed sequence of
//! replies instead of a live model. For production completions, use the
//! `ollama-oracle` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_oracle::ScriptedOracle;
//! use oracle_core::Oracle;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), oracle_core::OracleError> {
//!     let oracle = ScriptedOracle::new(vec!["first".into(), "second".into()]);
//!
//!     assert_eq!(oracle.complete("ignored").await?, "first");
//!     assert_eq!(oracle.complete("ignored").await?, "second");
//!     Ok(())
//! }
//! ```

mod delayed;
mod failing;
mod scripted;
mod static_reply;

pub use delayed::DelayedOracle;
pub use failing::FailingOracle;
pub use scripted::ScriptedOracle;
pub use static_reply::StaticOracle;

// Re-export core types so tests can depend on this crate alone
pub use oracle_core::{Oracle, OracleError};
