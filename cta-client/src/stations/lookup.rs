//! Station id lookup.

use std::path::Path;

use serde::Serialize;

use crate::export::export_csv;
use crate::route::Route;

use super::client::{StationClient, StationDto, parse_stations};
use super::error::StationError;

/// The columns worth exporting from a lookup.
#[derive(Debug, Serialize)]
struct StationRow<'a> {
    stop_id: u32,
    direction_id: &'a str,
    stop_name: &'a str,
    station_name: &'a str,
    station_descriptive_name: &'a str,
    map_id: u32,
}

impl<'a> From<&'a StationDto> for StationRow<'a> {
    fn from(s: &'a StationDto) -> Self {
        Self {
            stop_id: s.stop_id,
            direction_id: &s.direction_id,
            stop_name: &s.stop_name,
            station_name: &s.station_name,
            station_descriptive_name: &s.station_descriptive_name,
            map_id: s.map_id,
        }
    }
}

/// In-memory 'L' stop reference data.
///
/// Used to find the `mapid`/`stpid` values the arrivals endpoint takes.
#[derive(Debug, Clone, Default)]
pub struct Stations {
    stops: Vec<StationDto>,
}

impl Stations {
    pub fn new(stops: Vec<StationDto>) -> Self {
        Self { stops }
    }

    /// Fetch the dataset from the data portal.
    pub fn fetch(client: &StationClient) -> Result<Self, StationError> {
        Ok(Self::new(client.fetch_all()?))
    }

    /// Load from a JSON string in the portal's format.
    pub fn from_json(json: &str) -> Result<Self, StationError> {
        Ok(Self::new(parse_stations(json)?))
    }

    /// Load from a JSON file in the portal's format.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn all(&self) -> &[StationDto] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Find stops whose station name contains `name`, ignoring case.
    ///
    /// With a route, only stops served by that line are returned.
    pub fn lookup(&self, name: &str, route: Option<Route>) -> Vec<&StationDto> {
        let needle = name.to_lowercase();

        self.stops
            .iter()
            .filter(|s| s.station_name.to_lowercase().contains(&needle))
            .filter(|s| route.is_none_or(|r| s.serves(r)))
            .collect()
    }

    /// Write stops to a CSV file with the useful id and name columns.
    pub fn export_csv<'a>(
        path: impl AsRef<Path>,
        stops: impl IntoIterator<Item = &'a StationDto>,
    ) -> Result<(), StationError> {
        export_csv(path, stops.into_iter().map(StationRow::from))?;
        Ok(())
    }
}
