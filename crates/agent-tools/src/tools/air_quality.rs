//! Air quality tool using the World Air Quality Index (WAQI) feed.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "get_air_quality",
        description: "Get the air quality index for a city",
        params: "location (string, required): city name or 'lat,lon' coordinates",
    },
    FunctionSpec {
        name: "get_air_quality_by_coordinates",
        description: "Get the air quality index for a latitude/longitude pair",
        params: "latitude (number, required), longitude (number, required)",
    },
];

/// Pollutants extracted from the station's individual AQI readings.
const POLLUTANTS: &[&str] = &["pm25", "pm10", "o3", "no2", "so2", "co"];

/// Air quality tool backed by the WAQI public feed (demo token).
pub struct AirQuality {
    client: reqwest::Client,
}

impl AirQuality {
    /// Create a new air quality tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("llmflow/0.1")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn get_air_quality(&self, location: &str) -> Result<Value, ToolError> {
        // "48.8,2.3" style input routes to the coordinate feed.
        if let Some((lat, lon)) = parse_coordinates(location) {
            return self.get_by_coordinates(lat, lon).await;
        }

        let url = format!(
            "https://api.waqi.info/feed/{}/?token=demo",
            url::form_urlencoded::byte_serialize(location.trim().as_bytes()).collect::<String>()
        );
        self.fetch_feed(&url, location).await
    }

    async fn get_by_coordinates(&self, lat: f64, lon: f64) -> Result<Value, ToolError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ToolError::InvalidParameter {
                name: "latitude".to_string(),
                reason: "expected a value between -90 and 90".to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ToolError::InvalidParameter {
                name: "longitude".to_string(),
                reason: "expected a value between -180 and 180".to_string(),
            });
        }

        let url = format!("https://api.waqi.info/feed/geo:{};{}/?token=demo", lat, lon);
        self.fetch_feed(&url, &format!("{}, {}", lat, lon)).await
    }

    async fn fetch_feed(&self, url: &str, location: &str) -> Result<Value, ToolError> {
        debug!("Fetching air quality from: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Air quality API returned status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        if body.get("status").and_then(|v| v.as_str()) != Some("ok") {
            return Err(ToolError::ExecutionFailed(format!(
                "No air quality station found for: {}",
                location
            )));
        }

        let data = body
            .get("data")
            .ok_or_else(|| ToolError::ExecutionFailed("Malformed air quality feed".to_string()))?;

        let aqi = data.get("aqi").and_then(|v| v.as_i64()).unwrap_or(0);
        let station = data
            .pointer("/city/name")
            .and_then(|v| v.as_str())
            .unwrap_or(location);

        let mut pollutants = Map::new();
        if let Some(iaqi) = data.get("iaqi") {
            for pol in POLLUTANTS {
                if let Some(v) = iaqi.pointer(&format!("/{}/v", pol)) {
                    pollutants.insert(pol.to_string(), v.clone());
                }
            }
        }

        Ok(json!({
            "location": location,
            "station": station,
            "aqi": aqi,
            "category": aqi_category(aqi),
            "dominant_pollutant": data.get("dominentpol").cloned().unwrap_or(Value::Null),
            "pollutants": pollutants,
            "measured_at": data.pointer("/time/s").cloned().unwrap_or(Value::Null),
        }))
    }
}

/// US EPA category for an AQI value.
fn aqi_category(aqi: i64) -> &'static str {
    match aqi {
        i64::MIN..=50 => "Good",
        51..=100 => "Moderate",
        101..=150 => "Unhealthy for Sensitive Groups",
        151..=200 => "Unhealthy",
        201..=300 => "Very Unhealthy",
        _ => "Hazardous",
    }
}

/// Parse `"lat,lon"` or `"lat, lon"` into a coordinate pair.
pub(crate) fn parse_coordinates(text: &str) -> Option<(f64, f64)> {
    let (lat, lon) = text.trim().split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Some((lat, lon))
    } else {
        None
    }
}

impl Default for AirQuality {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AirQuality {
    fn name(&self) -> &str {
        "air_quality"
    }

    fn description(&self) -> &str {
        "Gets air quality index readings for a city or coordinates via WAQI."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "get_air_quality" => {
                let location = args.get_string("location")?;
                self.get_air_quality(&location).await
            }
            "get_air_quality_by_coordinates" => {
                let lat = args.get_f64("latitude")?;
                let lon = args.get_f64("longitude")?;
                self.get_by_coordinates(lat, lon).await
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aqi_categories() {
        assert_eq!(aqi_category(30), "Good");
        assert_eq!(aqi_category(75), "Moderate");
        assert_eq!(aqi_category(120), "Unhealthy for Sensitive Groups");
        assert_eq!(aqi_category(180), "Unhealthy");
        assert_eq!(aqi_category(250), "Very Unhealthy");
        assert_eq!(aqi_category(400), "Hazardous");
    }

    #[test]
    fn test_coordinate_parsing() {
        assert_eq!(parse_coordinates("48.85, 2.35"), Some((48.85, 2.35)));
        assert_eq!(parse_coordinates("-33.87,151.21"), Some((-33.87, 151.21)));
        assert_eq!(parse_coordinates("Paris"), None);
        assert_eq!(parse_coordinates("120.0, 50.0"), None);
    }

    #[tokio::test]
    async fn test_missing_location() {
        let aq = AirQuality::new();
        let result = aq.call("get_air_quality", ToolArgs::default()).await;
        assert!(matches!(result, Err(ToolError::MissingParameter(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_latitude() {
        let aq = AirQuality::new();
        let mut params = Map::new();
        params.insert("latitude".to_string(), json!(123.0));
        params.insert("longitude".to_string(), json!(10.0));
        let result = aq
            .call("get_air_quality_by_coordinates", ToolArgs::new(params))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidParameter { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn test_air_quality_live() {
        let aq = AirQuality::new();
        let mut params = Map::new();
        params.insert("location".to_string(), json!("london"));
        let result = aq
            .call("get_air_quality", ToolArgs::new(params))
            .await
            .unwrap();
        assert!(result["aqi"].as_i64().is_some());
    }
}
