//! Geolocation tool using Nominatim geocoding and ip-api.com.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};
use crate::tools::air_quality::parse_coordinates;

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "get_location_info",
        description: "Geocode a place name or reverse-geocode coordinates",
        params: "location (string, required): place name, address, or 'lat,lon'",
    },
    FunctionSpec {
        name: "calculate_distance",
        description: "Calculate the great-circle distance between two places",
        params: "location1 (string, required), location2 (string, required)",
    },
    FunctionSpec {
        name: "find_nearby_places",
        description: "Find places of a category near a location",
        params: "location (string, required), category (string, required), radius_km (number, optional, default 2)",
    },
    FunctionSpec {
        name: "get_ip_location",
        description: "Look up the geographic location of an IP address",
        params: "ip (string, required): IPv4 or IPv6 address",
    },
];

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Geolocation tool backed by the keyless Nominatim (OpenStreetMap) API.
///
/// Nominatim asks clients to identify themselves, hence the descriptive
/// user agent. IP lookups go to ip-api.com, which is also keyless.
pub struct Geolocation {
    client: reqwest::Client,
}

impl Geolocation {
    /// Create a new geolocation tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("llmflow/0.1 (https://example.org)")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn get_location_info(&self, location: &str) -> Result<Value, ToolError> {
        let raw = if let Some((lat, lon)) = parse_coordinates(location) {
            self.reverse_geocode(lat, lon).await?
        } else {
            self.geocode(location).await?
        };
        Ok(format_place(&raw, location))
    }

    /// Forward-geocode a place name, returning the raw top Nominatim hit.
    async fn geocode(&self, location: &str) -> Result<Value, ToolError> {
        let url = format!(
            "https://nominatim.openstreetmap.org/search?q={}&format=json&addressdetails=1&limit=1",
            url::form_urlencoded::byte_serialize(location.as_bytes()).collect::<String>()
        );

        debug!("Geocoding: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Geocoding API returned status {}",
                response.status()
            )));
        }

        let hits: Value = response.json().await?;
        hits.get(0)
            .cloned()
            .ok_or_else(|| ToolError::ExecutionFailed(format!("Location not found: {}", location)))
    }

    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Value, ToolError> {
        let url = format!(
            "https://nominatim.openstreetmap.org/reverse?lat={}&lon={}&format=json&addressdetails=1",
            lat, lon
        );

        debug!("Reverse geocoding: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Reverse geocoding API returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    async fn calculate_distance(
        &self,
        location1: &str,
        location2: &str,
    ) -> Result<Value, ToolError> {
        let origin = self.get_location_info(location1).await?;
        let destination = self.get_location_info(location2).await?;

        let (lat1, lon1) = place_coordinates(&origin, location1)?;
        let (lat2, lon2) = place_coordinates(&destination, location2)?;

        let km = haversine_km(lat1, lon1, lat2, lon2);
        let miles = km * 0.621371;

        Ok(json!({
            "origin": origin,
            "destination": destination,
            "distance": {
                "kilometers": (km * 100.0).round() / 100.0,
                "miles": (miles * 100.0).round() / 100.0,
                "formatted": format!("{:.1} km ({:.1} miles)", km, miles),
            },
        }))
    }

    async fn find_nearby_places(
        &self,
        location: &str,
        category: &str,
        radius_km: f64,
    ) -> Result<Value, ToolError> {
        if radius_km <= 0.0 || radius_km > 50.0 {
            return Err(ToolError::InvalidParameter {
                name: "radius_km".to_string(),
                reason: "expected a radius between 0 and 50 km".to_string(),
            });
        }

        let center = self.get_location_info(location).await?;
        let (lat, lon) = place_coordinates(&center, location)?;
        let (min_lon, min_lat, max_lon, max_lat) = viewbox(lat, lon, radius_km);

        // Bounded search restricts hits to the radius box around the center.
        let url = format!(
            "https://nominatim.openstreetmap.org/search?q={}&format=json&limit=10&bounded=1&viewbox={},{},{},{}",
            url::form_urlencoded::byte_serialize(category.as_bytes()).collect::<String>(),
            min_lon, max_lat, max_lon, min_lat
        );

        debug!("Searching nearby places: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Place search API returned status {}",
                response.status()
            )));
        }

        let hits: Value = response.json().await?;
        let mut places: Vec<Value> = hits
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(|hit| {
                let place_lat: f64 = hit.get("lat")?.as_str()?.parse().ok()?;
                let place_lon: f64 = hit.get("lon")?.as_str()?.parse().ok()?;
                let km = haversine_km(lat, lon, place_lat, place_lon);
                Some(json!({
                    "name": hit
                        .get("display_name")
                        .and_then(|v| v.as_str())
                        .map(|s| s.split(',').next().unwrap_or(s).trim())
                        .unwrap_or(""),
                    "address": hit.get("display_name").cloned().unwrap_or(Value::Null),
                    "type": hit.get("type").cloned().unwrap_or(Value::Null),
                    "coordinates": { "latitude": place_lat, "longitude": place_lon },
                    "distance_km": (km * 100.0).round() / 100.0,
                }))
            })
            .collect();

        places.sort_by(|a, b| {
            let da = a["distance_km"].as_f64().unwrap_or(f64::MAX);
            let db = b["distance_km"].as_f64().unwrap_or(f64::MAX);
            da.total_cmp(&db)
        });

        Ok(json!({
            "location": location,
            "category": category,
            "radius_km": radius_km,
            "count": places.len(),
            "places": places,
        }))
    }

    async fn get_ip_location(&self, ip: &str) -> Result<Value, ToolError> {
        if ip.trim().parse::<std::net::IpAddr>().is_err() {
            return Err(ToolError::InvalidParameter {
                name: "ip".to_string(),
                reason: "expected a valid IPv4 or IPv6 address".to_string(),
            });
        }

        let url = format!("http://ip-api.com/json/{}", ip.trim());

        debug!("Looking up IP location: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "IP location API returned status {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        if data.get("status").and_then(|v| v.as_str()) != Some("success") {
            return Err(ToolError::ExecutionFailed(format!(
                "IP lookup failed for: {}",
                ip
            )));
        }

        Ok(json!({
            "ip": data.get("query").cloned().unwrap_or_else(|| json!(ip)),
            "country": data.get("country").cloned().unwrap_or(Value::Null),
            "region": data.get("regionName").cloned().unwrap_or(Value::Null),
            "city": data.get("city").cloned().unwrap_or(Value::Null),
            "coordinates": {
                "latitude": data.get("lat").cloned().unwrap_or(Value::Null),
                "longitude": data.get("lon").cloned().unwrap_or(Value::Null),
            },
            "timezone": data.get("timezone").cloned().unwrap_or(Value::Null),
            "isp": data.get("isp").cloned().unwrap_or(Value::Null),
        }))
    }
}

/// Shape a raw Nominatim hit into the structured place object.
fn format_place(raw: &Value, query: &str) -> Value {
    let display_name = raw
        .get("display_name")
        .and_then(|v| v.as_str())
        .unwrap_or(query);
    let name = raw
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| display_name.split(',').next().unwrap_or(display_name).trim());
    let address = raw.get("address").cloned().unwrap_or_else(|| json!({}));

    json!({
        "name": name,
        "type": raw.get("type").cloned().unwrap_or(Value::Null),
        "formatted_address": display_name,
        "coordinates": {
            "latitude": raw.get("lat").and_then(coordinate_value),
            "longitude": raw.get("lon").and_then(coordinate_value),
        },
        "address_components": {
            "country": address.get("country").cloned().unwrap_or(Value::Null),
            "country_code": address
                .get("country_code")
                .and_then(|v| v.as_str())
                .map(|s| s.to_uppercase()),
            "state": address.get("state").cloned().unwrap_or(Value::Null),
            "city": address
                .get("city")
                .or_else(|| address.get("town"))
                .or_else(|| address.get("village"))
                .cloned()
                .unwrap_or(Value::Null),
            "postcode": address.get("postcode").cloned().unwrap_or(Value::Null),
        },
    })
}

/// Nominatim serves coordinates as strings; normalize to numbers.
fn coordinate_value(v: &Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str()?.parse().ok())
}

/// Pull numeric coordinates out of a formatted place object.
fn place_coordinates(place: &Value, query: &str) -> Result<(f64, f64), ToolError> {
    let lat = place.pointer("/coordinates/latitude").and_then(|v| v.as_f64());
    let lon = place.pointer("/coordinates/longitude").and_then(|v| v.as_f64());
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(ToolError::ExecutionFailed(format!(
            "No coordinates for location: {}",
            query
        ))),
    }
}

/// Great-circle distance between two points, in kilometers.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Bounding box of `radius_km` around a point: (min_lon, min_lat, max_lon, max_lat).
fn viewbox(lat: f64, lon: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let dlat = radius_km / KM_PER_DEGREE_LAT;
    let dlon = radius_km / (KM_PER_DEGREE_LAT * lat.to_radians().cos().max(0.01));
    (lon - dlon, lat - dlat, lon + dlon, lat + dlat)
}

impl Default for Geolocation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Geolocation {
    fn name(&self) -> &str {
        "geolocation"
    }

    fn description(&self) -> &str {
        "Geocodes places, measures distances, finds nearby points of interest, and locates IP addresses."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "get_location_info" => {
                let location = args.get_string("location")?;
                self.get_location_info(&location).await
            }
            "calculate_distance" => {
                let location1 = args.get_string("location1")?;
                let location2 = args.get_string("location2")?;
                self.calculate_distance(&location1, &location2).await
            }
            "find_nearby_places" => {
                let location = args.get_string("location")?;
                let category = args.get_string("category")?;
                let radius_km = args
                    .params
                    .get("radius_km")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(2.0);
                self.find_nearby_places(&location, &category, radius_km)
                    .await
            }
            "get_ip_location" => {
                let ip = args.get_string("ip")?;
                self.get_ip_location(&ip).await
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}
