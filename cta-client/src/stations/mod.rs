//! 'L' station reference data.
//!
//! Maps station names to the `mapid` and `stpid` values the arrivals
//! endpoint expects, using the City of Chicago's public stops dataset.

mod client;
mod error;
mod lookup;

pub use client::{
    DEFAULT_STATIONS_URL, StationClient, StationClientConfig, StationDto, parse_stations,
};
pub use error::StationError;
pub use lookup::Stations;
