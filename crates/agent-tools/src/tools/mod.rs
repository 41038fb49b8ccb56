//! Built-in tool implementations.
//!
//! Each module is an independent, shallow wrapper around one external data
//! source. Tools validate their own parameters, make the HTTP call, and
//! shape the response into a structured JSON value; ranking and cleaning
//! heuristics stay inside the tool that needs them.

mod air_quality;
mod astronomy;
mod currency;
mod geolocation;
mod news;
mod search;
mod stocks;
mod weather;
mod web_parser;
mod wikipedia;
mod world_time;

pub use air_quality::AirQuality;
pub use astronomy::Astronomy;
pub use currency::Currency;
pub use geolocation::Geolocation;
pub use news::News;
pub use search::Search;
pub use stocks::Stocks;
pub use weather::Weather;
pub use web_parser::WebParser;
pub use wikipedia::Wikipedia;
pub use world_time::WorldTime;
