//! Multi-step chain orchestration for the LLMFlow agent.
//!
//! A chain is an ordered list of tool invocations whose inputs may
//! reference earlier outputs through `{{output_key.path}}` placeholders.
//! This crate covers the whole lifecycle:
//!
//! - [`ChainPlanner`] asks the oracle to turn a free-form query into a
//!   JSON plan and validates it against the registry.
//! - [`Chain`] / [`ChainStep`] hold a validated plan.
//! - [`ChainRunner`] drives the steps in order: conditions are decided by
//!   the [`ConditionGate`], placeholders resolved against the
//!   [`ExecutionContext`], and each invocation goes through the
//!   [`StepExecutor`]'s shared TTL cache and retry loop.
//! - Step failures never abort a chain; they become inline
//!   `{error, alternative}` bindings and later steps keep running.
//! - [`ResponseSynthesizer`] turns the final context into prose.
//!
//! [`ChainOrchestrator`] wires all of the above behind a single
//! `process(query)` entry point.

mod chain;
mod context;
mod error;
mod executor;
mod gate;
mod orchestrator;
mod planner;
mod resolver;
mod runner;
mod synthesizer;

#[cfg(test)]
mod testutil;

pub use chain::{Chain, ChainStep};
pub use context::ExecutionContext;
pub use error::ChainError;
pub use executor::{ResultCache, RetryPolicy, StepExecutor, DEFAULT_CACHE_TTL};
pub use gate::ConditionGate;
pub use orchestrator::ChainOrchestrator;
pub use planner::ChainPlanner;
pub use resolver::resolve_params;
pub use runner::ChainRunner;
pub use synthesizer::ResponseSynthesizer;
