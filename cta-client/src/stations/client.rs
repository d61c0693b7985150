//! City of Chicago data portal client for 'L' stops.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::route::Route;

use super::error::StationError;

/// Default URL of the 'L' stops dataset.
pub const DEFAULT_STATIONS_URL: &str = "https://data.cityofchicago.org/resource/8pix-ypme.json";

/// One platform stop of an 'L' station.
///
/// The portal sends ids as strings and line flags as booleans, but older
/// exports use strings for both, so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StationDto {
    /// Platform stop id (`stpid` in Train Tracker).
    #[serde(deserialize_with = "lenient_u32")]
    pub stop_id: u32,
    /// Compass direction of travel (`N`, `S`, `E`, `W`).
    #[serde(default)]
    pub direction_id: String,
    #[serde(default)]
    pub stop_name: String,
    pub station_name: String,
    #[serde(default)]
    pub station_descriptive_name: String,
    /// Parent station id (`mapid` in Train Tracker).
    #[serde(deserialize_with = "lenient_u32")]
    pub map_id: u32,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub ada: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub red: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub blue: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub g: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub brn: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub p: bool,
    /// Purple Line Express.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub pexp: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub y: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub pnk: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub o: bool,
}

impl StationDto {
    /// Whether this stop is served by `route`.
    ///
    /// Purple covers both the local and express services.
    pub fn serves(&self, route: Route) -> bool {
        match route {
            Route::Red => self.red,
            Route::Blue => self.blue,
            Route::Brown => self.brn,
            Route::Green => self.g,
            Route::Orange => self.o,
            Route::Purple => self.p || self.pexp,
            Route::Pink => self.pnk,
            Route::Yellow => self.y,
        }
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Raw::Bool(b)) => Ok(b),
        Some(Raw::Text(s)) => Ok(s.trim().eq_ignore_ascii_case("true")),
    }
}

/// Configuration for the station data client.
#[derive(Debug, Clone)]
pub struct StationClientConfig {
    /// Dataset URL
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StationClientConfig {
    pub fn new() -> Self {
        Self {
            url: DEFAULT_STATIONS_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom dataset URL (for testing).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for StationClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the 'L' stops dataset.
#[derive(Debug, Clone)]
pub struct StationClient {
    http: reqwest::blocking::Client,
    url: String,
}

impl StationClient {
    pub fn new(config: StationClientConfig) -> Result<Self, StationError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    /// Fetch every stop in the dataset.
    pub fn fetch_all(&self) -> Result<Vec<StationDto>, StationError> {
        debug!(url = %self.url, "fetching stations");

        let response = self.http.get(&self.url).send()?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text()?;
        parse_stations(&body)
    }
}

/// Parse the dataset's JSON array.
pub fn parse_stations(json: &str) -> Result<Vec<StationDto>, StationError> {
    serde_json::from_str(json).map_err(|e| StationError::Json {
        message: e.to_string(),
    })
}
