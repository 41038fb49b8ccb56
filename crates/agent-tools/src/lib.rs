//! Tool registry and implementations for the LLMFlow agent.
//!
//! This crate provides a `ToolRegistry` for registering and dispatching the
//! data-retrieval tools the agent can chain together. A tool is an external
//! capability (weather, news, currency, search, etc.) exposing one or more
//! named functions; the orchestrator dispatches by (tool name, function name)
//! and stores the returned JSON values opaquely.
//!
//! # Built-in Tools
//!
//! - [`Weather`] - Current conditions via wttr.in (no API key needed).
//! - [`Currency`] - Fiat conversion via exchangerate.host.
//! - [`News`] - Headlines and keyword search over public RSS feeds.
//! - [`WorldTime`] - Current time, conversions, and timezone listings via WorldTimeAPI.
//! - [`Wikipedia`] - Article search, summaries, and full text via the MediaWiki APIs.
//! - [`WebParser`] - Fetch URL content and convert HTML to text.
//! - [`Search`] - Web search via the DuckDuckGo lite endpoint.
//! - [`Stocks`] - Quotes, company info, and market indices via Yahoo Finance.
//! - [`AirQuality`] - Air quality index readings via the WAQI feed.
//! - [`Geolocation`] - Geocoding, distances, and IP lookups via Nominatim and ip-api.com.
//! - [`Astronomy`] - Planet facts and seasonal constellation visibility (local data).
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_tools::{default_registry, ToolRegistry};
//! use serde_json::{json, Map};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = default_registry();
//!
//!     let mut params = Map::new();
//!     params.insert("location".to_string(), json!("Tokyo"));
//!
//!     let result = registry.call("weather", "get_weather", params).await.unwrap();
//!     println!("{}", result);
//! }
//! ```

mod error;
mod registry;
mod tool;
pub mod tools;

pub use error::ToolError;
pub use registry::{FunctionDescriptor, ToolDescriptor, ToolRegistry};
pub use tool::{FunctionSpec, Tool, ToolArgs};
pub use tools::{
    AirQuality, Astronomy, Currency, Geolocation, News, Search, Stocks, Weather, WebParser,
    Wikipedia, WorldTime,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Create a new registry with all built-in tools registered.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Weather::new());
    registry.register(News::new());
    registry.register(Currency::new());
    registry.register(WorldTime::new());
    registry.register(Wikipedia::new());
    registry.register(WebParser::new());
    registry.register(Search::new());
    registry.register(Stocks::new());
    registry.register(AirQuality::new());
    registry.register(Geolocation::new());
    registry.register(Astronomy::new());

    registry
}
