//! Typed arguments for the Train Tracker endpoints.

use std::fmt;

use crate::route::Route;

use super::error::CtaError;
use super::params::OneOrMany;

/// Arguments for the arrivals endpoint.
///
/// At least one of `station_ids` and `stop_ids` must be set. Each id
/// field takes a single id or a list of up to four.
///
/// # Examples
///
/// ```
/// use cta_client::{ArrivalsQuery, Route};
///
/// // Damen (Blue Line), next three trains
/// let query = ArrivalsQuery::stations(40590u32)
///     .with_route(Route::Blue)
///     .with_max(3);
/// assert_eq!(query.max, Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrivalsQuery {
    /// Parent station ids (`mapid`).
    pub station_ids: Option<OneOrMany<u32>>,
    /// Platform stop ids (`stpid`).
    pub stop_ids: Option<OneOrMany<u32>>,
    /// Maximum number of predictions to return.
    pub max: Option<u32>,
    /// Restrict predictions to one line.
    pub route: Option<Route>,
}

impl ArrivalsQuery {
    /// An empty query. Not valid until a station or stop id is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query by one or more station ids.
    pub fn stations(ids: impl Into<OneOrMany<u32>>) -> Self {
        Self::new().with_stations(ids)
    }

    /// Query by one or more stop ids.
    pub fn stops(ids: impl Into<OneOrMany<u32>>) -> Self {
        Self::new().with_stops(ids)
    }

    pub fn with_stations(mut self, ids: impl Into<OneOrMany<u32>>) -> Self {
        self.station_ids = Some(ids.into());
        self
    }

    pub fn with_stops(mut self, ids: impl Into<OneOrMany<u32>>) -> Self {
        self.stop_ids = Some(ids.into());
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }
}

/// A train run number, as accepted by the follow endpoint.
///
/// Built from an integer or from text. Text is validated when the
/// request is made: it must hold exactly one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunNumber(String);

impl RunNumber {
    /// Check that this is a single, non-empty identifier.
    pub fn validate(&self) -> Result<&str, CtaError> {
        let value = self.0.trim();

        if value.is_empty() {
            return Err(CtaError::MissingArgument("'runnumber' is empty".to_string()));
        }

        if value
            .chars()
            .any(|c| c == ',' || c == ';' || c.is_whitespace())
        {
            return Err(CtaError::InvalidArgument(
                "Only one 'runnumber' allowed at a time.".to_string(),
            ));
        }

        Ok(value)
    }

    /// The text as given, before validation trims it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for RunNumber {
    fn from(value: u32) -> Self {
        RunNumber(value.to_string())
    }
}

impl From<&str> for RunNumber {
    fn from(value: &str) -> Self {
        RunNumber(value.to_string())
    }
}

impl From<String> for RunNumber {
    fn from(value: String) -> Self {
        RunNumber(value)
    }
}

impl fmt::Display for RunNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
