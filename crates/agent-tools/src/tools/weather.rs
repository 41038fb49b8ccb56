//! Weather tool using the wttr.in API.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "get_weather",
    description: "Get current weather conditions for a location",
    params: "location (string, required): city name, airport code, or coordinates",
}];

/// Weather tool that fetches conditions from wttr.in.
///
/// The wttr.in service is free and requires no API key. We request the
/// `j1` JSON format and reduce it to the fields downstream steps actually
/// reference (temperature, condition, humidity, wind, precipitation).
pub struct Weather {
    client: reqwest::Client,
}

impl Weather {
    /// Create a new weather tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("curl/8.0.0") // wttr.in serves different content based on user agent
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn get_weather(&self, location: &str) -> Result<Value, ToolError> {
        let url = format!(
            "https://wttr.in/{}?format=j1",
            url::form_urlencoded::byte_serialize(location.as_bytes()).collect::<String>()
        );

        debug!("Fetching weather from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Weather API returned status {}",
                response.status()
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            warn!("wttr.in returned non-JSON body: {}", e);
            ToolError::ExecutionFailed(format!("Location not found: {}", location))
        })?;

        let current = data
            .get("current_condition")
            .and_then(|c| c.get(0))
            .ok_or_else(|| {
                ToolError::ExecutionFailed(format!("No weather data for: {}", location))
            })?;

        let area = data
            .get("nearest_area")
            .and_then(|a| a.get(0));

        let city = area
            .and_then(|a| a.pointer("/areaName/0/value"))
            .and_then(|v| v.as_str())
            .unwrap_or(location);
        let country = area
            .and_then(|a| a.pointer("/country/0/value"))
            .and_then(|v| v.as_str())
            .unwrap_or("");

        Ok(json!({
            "location": { "city": city, "country": country },
            "temperature_c": text_field(current, "temp_C"),
            "feels_like_c": text_field(current, "FeelsLikeC"),
            "condition": current
                .pointer("/weatherDesc/0/value")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown"),
            "humidity": text_field(current, "humidity"),
            "wind_kmph": text_field(current, "windspeedKmph"),
            "precipitation_mm": text_field(current, "precipMM"),
        }))
    }
}

/// Pull a numeric field that wttr.in reports as a string.
fn text_field(current: &Value, key: &str) -> Value {
    match current.get(key).and_then(|v| v.as_str()) {
        Some(s) => s
            .parse::<f64>()
            .map(|n| json!(n))
            .unwrap_or_else(|_| json!(s)),
        None => Value::Null,
    }
}

impl Default for Weather {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Weather {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Fetches current weather for a location using wttr.in. \
         Supports city names, airport codes, and coordinates."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "get_weather" => {
                let location = args.get_string("location")?;
                debug!("Getting weather for '{}'", location);
                self.get_weather(&location).await
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}
