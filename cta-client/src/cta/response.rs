//! Response wrappers for the three Train Tracker endpoints.
//!
//! Every response is checked for an embedded API error when it is
//! constructed, so holding an `ArrivalResponse` (or either sibling)
//! means the payload passed the `errCd` check. Tables are built on
//! demand and can be rebuilt any number of times.

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::convert::{TrainRow, convert_route_groups, convert_trains};
use super::error::CtaError;
use super::types::{EtaPayload, LocationPayload};

/// Top-level key wrapping every Train Tracker payload.
const ROOT_KEY: &str = "ctatt";

/// Error codes at or above this value are failures.
const FIRST_ERROR_CODE: i64 = 100;

/// A decoded body whose `errCd` has been checked.
#[derive(Debug, Clone)]
pub struct Envelope {
    data: Value,
}

impl Envelope {
    /// Check the embedded error code.
    ///
    /// Fails with [`CtaError::Api`] when `errCd` is 100 or more, and with
    /// [`CtaError::Json`] when the envelope itself is malformed. Codes
    /// below 100, negative ones included, pass.
    pub fn check(data: Value) -> Result<Self, CtaError> {
        let body = data
            .get(ROOT_KEY)
            .ok_or_else(|| CtaError::json(format!("missing '{ROOT_KEY}' object")))?;

        let code = match body.get("errCd") {
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            Some(Value::Number(n)) => n.as_i64(),
            _ => None,
        }
        .ok_or_else(|| CtaError::json("missing or non-numeric 'errCd'"))?;

        if code >= FIRST_ERROR_CODE {
            let message = body
                .get("errNm")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(CtaError::Api {
                code: u32::try_from(code).unwrap_or(u32::MAX),
                message,
            });
        }

        Ok(Self { data })
    }

    /// The `ctatt` object.
    pub fn body(&self) -> &Value {
        // Presence checked in `check`
        &self.data[ROOT_KEY]
    }

    /// Server timestamp of the response, if sent.
    pub fn timestamp(&self) -> Option<&str> {
        self.body().get("tmst").and_then(Value::as_str)
    }

    fn payload<'a, T: Deserialize<'a>>(&'a self) -> Result<T, CtaError> {
        T::deserialize(self.body()).map_err(|e| CtaError::json(e.to_string()))
    }
}

/// A response that can be normalized into train rows.
pub trait TrainTable {
    /// Build the table with deltas measured against `now`.
    fn to_table_at(&self, now: NaiveDateTime) -> Result<Vec<TrainRow>, CtaError>;

    /// Build the table against the current local time.
    ///
    /// The minute columns depend on the wall clock, so two calls can
    /// differ by however long passed between them.
    fn to_table(&self) -> Result<Vec<TrainRow>, CtaError> {
        self.to_table_at(Local::now().naive_local())
    }
}

fn eta_table(envelope: &Envelope, now: NaiveDateTime) -> Result<Vec<TrainRow>, CtaError> {
    let payload: EtaPayload = envelope.payload()?;
    let trains = payload.eta.ok_or(CtaError::NoTrains)?.into_vec();
    let rows = convert_trains(trains, now)?;
    debug!(rows = rows.len(), "normalized ETA response");
    Ok(rows)
}

/// Response from the arrivals endpoint.
#[derive(Debug, Clone)]
pub struct ArrivalResponse {
    envelope: Envelope,
}

impl ArrivalResponse {
    pub fn new(data: Value) -> Result<Self, CtaError> {
        Ok(Self {
            envelope: Envelope::check(data)?,
        })
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl TrainTable for ArrivalResponse {
    fn to_table_at(&self, now: NaiveDateTime) -> Result<Vec<TrainRow>, CtaError> {
        eta_table(&self.envelope, now)
    }
}

/// Response from the follow endpoint.
#[derive(Debug, Clone)]
pub struct FollowResponse {
    envelope: Envelope,
}

impl FollowResponse {
    pub fn new(data: Value) -> Result<Self, CtaError> {
        Ok(Self {
            envelope: Envelope::check(data)?,
        })
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl TrainTable for FollowResponse {
    fn to_table_at(&self, now: NaiveDateTime) -> Result<Vec<TrainRow>, CtaError> {
        eta_table(&self.envelope, now)
    }
}

/// Response from the locations endpoint.
///
/// Trains are grouped per line; the table flattens the groups and tags
/// each row with its line code.
#[derive(Debug, Clone)]
pub struct LocationResponse {
    envelope: Envelope,
}

impl LocationResponse {
    pub fn new(data: Value) -> Result<Self, CtaError> {
        Ok(Self {
            envelope: Envelope::check(data)?,
        })
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl TrainTable for LocationResponse {
    fn to_table_at(&self, now: NaiveDateTime) -> Result<Vec<TrainRow>, CtaError> {
        let payload: LocationPayload = self.envelope.payload()?;
        let groups = payload.route.map(|g| g.into_vec()).unwrap_or_default();
        let rows = convert_route_groups(groups, now)?;

        if rows.is_empty() {
            return Err(CtaError::NoTrains);
        }

        debug!(rows = rows.len(), "normalized locations response");
        Ok(rows)
    }
}
