//! World time tool using WorldTimeAPI.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "get_current_time",
        description: "Get the current time for a city or IANA timezone",
        params: "location (string, required): city name or timezone like America/New_York",
    },
    FunctionSpec {
        name: "convert_time",
        description: "Convert a wall-clock time from one location to another",
        params: "time (string, required): HH:MM or YYYY-MM-DD HH:MM; source_location (string, required); target_location (string, required)",
    },
    FunctionSpec {
        name: "get_time_difference",
        description: "Get the current UTC-offset difference between two locations",
        params: "location1 (string, required), location2 (string, required)",
    },
    FunctionSpec {
        name: "list_timezones",
        description: "List IANA timezone names, optionally filtered by region",
        params: "region (string, optional): substring filter like Europe or Tokyo",
    },
];

/// Response from WorldTimeAPI.
#[derive(Debug, Deserialize)]
struct WorldTimeResponse {
    datetime: String,
    timezone: String,
    utc_offset: String,
    day_of_week: i32,
    abbreviation: String,
}

/// Common city aliases for user convenience.
const TIMEZONE_ALIASES: &[(&str, &str)] = &[
    ("new york", "America/New_York"),
    ("nyc", "America/New_York"),
    ("los angeles", "America/Los_Angeles"),
    ("chicago", "America/Chicago"),
    ("london", "Europe/London"),
    ("paris", "Europe/Paris"),
    ("berlin", "Europe/Berlin"),
    ("moscow", "Europe/Moscow"),
    ("tokyo", "Asia/Tokyo"),
    ("beijing", "Asia/Shanghai"),
    ("shanghai", "Asia/Shanghai"),
    ("hong kong", "Asia/Hong_Kong"),
    ("singapore", "Asia/Singapore"),
    ("seoul", "Asia/Seoul"),
    ("mumbai", "Asia/Kolkata"),
    ("delhi", "Asia/Kolkata"),
    ("dubai", "Asia/Dubai"),
    ("sydney", "Australia/Sydney"),
    ("sao paulo", "America/Sao_Paulo"),
    ("utc", "UTC"),
];

/// World time tool backed by worldtimeapi.org. Free API, no key required.
pub struct WorldTime {
    client: reqwest::Client,
}

impl WorldTime {
    /// Create a new world time tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("llmflow/0.1")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Map a user-supplied location to an IANA timezone name.
    fn resolve_timezone(location: &str) -> String {
        let lowered = location.trim().to_lowercase();
        for (alias, tz) in TIMEZONE_ALIASES {
            if *alias == lowered {
                return tz.to_string();
            }
        }
        // Already an IANA name ("Europe/Oslo") or a bare region we pass through.
        location.trim().replace(' ', "_")
    }

    /// Fetch the current-time record for a location's timezone.
    async fn fetch_zone(&self, location: &str) -> Result<WorldTimeResponse, ToolError> {
        let timezone = Self::resolve_timezone(location);
        let url = format!("https://worldtimeapi.org/api/timezone/{}", timezone);

        debug!("Fetching time from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Unknown timezone or location: {}",
                location
            )));
        }

        Ok(response.json().await?)
    }

    async fn get_current_time(&self, location: &str) -> Result<Value, ToolError> {
        let data = self.fetch_zone(location).await?;

        Ok(json!({
            "location": location,
            "timezone": data.timezone,
            "datetime": data.datetime,
            "utc_offset": data.utc_offset,
            "day_of_week": data.day_of_week,
            "abbreviation": data.abbreviation,
        }))
    }

    async fn convert_time(
        &self,
        time: &str,
        source_location: &str,
        target_location: &str,
    ) -> Result<Value, ToolError> {
        let source = self.fetch_zone(source_location).await?;
        let target = self.fetch_zone(target_location).await?;

        let source_offset = offset_minutes(&source.utc_offset)?;
        let target_offset = offset_minutes(&target.utc_offset)?;

        // Bare times are anchored to the source zone's current date.
        let source_dt = parse_time(time, today_in_zone(&source.datetime))?;
        let target_dt = source_dt + ChronoDuration::minutes((target_offset - source_offset) as i64);
        let diff_hours = (target_offset - source_offset) as f64 / 60.0;

        Ok(json!({
            "source": {
                "location": source_location,
                "timezone": source.timezone,
                "time": source_dt.format("%Y-%m-%d %H:%M").to_string(),
                "utc_offset": source.utc_offset,
            },
            "target": {
                "location": target_location,
                "timezone": target.timezone,
                "time": target_dt.format("%Y-%m-%d %H:%M").to_string(),
                "utc_offset": target.utc_offset,
            },
            "time_difference_hours": diff_hours,
            "day_difference": (target_dt.date() - source_dt.date()).num_days(),
        }))
    }

    async fn get_time_difference(
        &self,
        location1: &str,
        location2: &str,
    ) -> Result<Value, ToolError> {
        let first = self.fetch_zone(location1).await?;
        let second = self.fetch_zone(location2).await?;

        let offset1 = offset_minutes(&first.utc_offset)?;
        let offset2 = offset_minutes(&second.utc_offset)?;
        let diff = offset2 - offset1;

        let direction = match diff {
            d if d > 0 => "ahead of",
            d if d < 0 => "behind",
            _ => "same as",
        };

        Ok(json!({
            "location1": {
                "location": location1,
                "timezone": first.timezone,
                "datetime": first.datetime,
                "utc_offset": first.utc_offset,
            },
            "location2": {
                "location": location2,
                "timezone": second.timezone,
                "datetime": second.datetime,
                "utc_offset": second.utc_offset,
            },
            "difference": {
                "hours": diff as f64 / 60.0,
                "formatted": format_minutes(diff.unsigned_abs()),
                "direction": direction,
                "description": format!(
                    "{} is {} {}",
                    location2,
                    if diff == 0 {
                        "in the same timezone as".to_string()
                    } else {
                        format!("{} {}", format_minutes(diff.unsigned_abs()), direction)
                    },
                    location1
                ),
            },
        }))
    }

    async fn list_timezones(&self, region: Option<&str>) -> Result<Value, ToolError> {
        let url = "https://worldtimeapi.org/api/timezone";

        debug!("Listing timezones from: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Timezone API returned status {}",
                response.status()
            )));
        }

        let mut zones: Vec<String> = response.json().await?;
        if let Some(filter) = region {
            let lowered = filter.trim().to_lowercase();
            zones.retain(|z| z.to_lowercase().contains(&lowered));
        }

        Ok(json!({
            "region": region.unwrap_or("all"),
            "count": zones.len(),
            "timezones": zones,
        }))
    }
}

/// Parse a `"+09:00"` / `"-03:30"` UTC offset into minutes.
fn offset_minutes(offset: &str) -> Result<i32, ToolError> {
    let bad = || ToolError::ExecutionFailed(format!("Malformed UTC offset: {}", offset));

    let (sign, rest) = if let Some(rest) = offset.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = offset.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(bad());
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(bad)?;
    let hours: i32 = hours.parse().map_err(|_| bad())?;
    let minutes: i32 = minutes.parse().map_err(|_| bad())?;
    Ok(sign * (hours * 60 + minutes))
}

/// Format a minute count as `"3h 30m"`.
fn format_minutes(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Extract the calendar date from an RFC 3339 timestamp.
fn today_in_zone(datetime: &str) -> NaiveDate {
    datetime
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_default()
}

/// Parse `"HH:MM"` (anchored to `date`) or a full `"YYYY-MM-DD HH:MM"`.
fn parse_time(time: &str, date: NaiveDate) -> Result<NaiveDateTime, ToolError> {
    let trimmed = time.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    if let Ok(t) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
        return Ok(date.and_time(t));
    }
    Err(ToolError::InvalidParameter {
        name: "time".to_string(),
        reason: "expected HH:MM or YYYY-MM-DD HH:MM".to_string(),
    })
}

impl Default for WorldTime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WorldTime {
    fn name(&self) -> &str {
        "world_time"
    }

    fn description(&self) -> &str {
        "Current time, time conversion, and timezone listings via WorldTimeAPI."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "get_current_time" => {
                let location = args.get_string("location")?;
                self.get_current_time(&location).await
            }
            "convert_time" => {
                let time = args.get_string("time")?;
                let source = args.get_string("source_location")?;
                let target = args.get_string("target_location")?;
                self.convert_time(&time, &source, &target).await
            }
            "get_time_difference" => {
                let location1 = args.get_string("location1")?;
                let location2 = args.get_string("location2")?;
                self.get_time_difference(&location1, &location2).await
            }
            "list_timezones" => {
                let region = args.get_string_opt("region");
                self.list_timezones(region.as_deref()).await
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}
