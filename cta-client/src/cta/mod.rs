//! CTA Train Tracker client.
//!
//! This module provides a client for the Chicago Transit Authority's
//! Train Tracker API, which reports real-time arrival predictions and
//! train positions for the 'L' network.
//!
//! Key characteristics of Train Tracker:
//! - Errors arrive inside a 200 response as an `errCd` of 100 or more
//! - Nearly every value, numbers and flags included, is a JSON string
//! - One-element lists are sent as bare objects
//! - Times are naive Chicago local time (`2022-05-15T15:20:41`)

mod client;
mod convert;
mod error;
mod mock;
mod params;
mod query;
mod response;
mod transport;
mod types;

pub use client::{CtaClient, CtaConfig, DEFAULT_BASE_URL, KEY_ENV_VAR};
pub use convert::TrainRow;
pub use error::CtaError;
pub use mock::{MockTransport, RecordedRequest};
pub use params::{
    Arg, ArgValue, MAX_VALUES, OneOrMany, ParamBuilder, Params, WireValue, arg, scalar,
};
pub use query::{ArrivalsQuery, RunNumber};
pub use response::{ArrivalResponse, Envelope, FollowResponse, LocationResponse, TrainTable};
pub use transport::{HttpResponse, HttpTransport, Transport};
pub use types::{OneOrList, RouteGroup, Train};
