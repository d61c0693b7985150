//! Client for the CTA Train Tracker API.
//!
//! Wraps the arrivals, locations and follow endpoints, turning their
//! loosely typed JSON into flat tables of [`TrainRow`]s, and provides
//! station id lookup from the city's public stops dataset.

pub mod cta;
pub mod export;
pub mod route;
pub mod stations;

pub use cta::{
    ArrivalResponse, ArrivalsQuery, CtaClient, CtaConfig, CtaError, FollowResponse,
    LocationResponse, RunNumber, TrainRow, TrainTable,
};
pub use route::{InvalidRoute, Route};
pub use stations::{StationClient, StationClientConfig, StationError, Stations};
