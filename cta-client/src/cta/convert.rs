//! Conversion from Train Tracker DTOs to table rows.
//!
//! Every endpoint ends up as a flat `Vec<TrainRow>`: raw wire fields,
//! parsed timestamps and two minute deltas measured against a supplied
//! instant.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use super::error::CtaError;
use super::types::{RouteGroup, Train};

/// One row of a normalized train table.
///
/// String fields are passed through from the API untouched. Use the
/// accessor methods for decoded flags and coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainRow {
    pub sta_id: Option<String>,
    pub stp_id: Option<String>,
    pub sta_nm: Option<String>,
    pub stp_de: Option<String>,
    pub rn: Option<String>,
    pub rt: Option<String>,
    pub dest_st: Option<String>,
    pub dest_nm: Option<String>,
    pub tr_dr: Option<String>,
    pub next_sta_id: Option<String>,
    pub next_stp_id: Option<String>,
    pub next_sta_nm: Option<String>,
    pub is_app: Option<String>,
    pub is_sch: Option<String>,
    pub is_dly: Option<String>,
    pub is_flt: Option<String>,
    pub flags: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub heading: Option<String>,

    /// Parsed `prdt`.
    pub prediction_time: NaiveDateTime,
    /// Parsed `arrT`.
    pub arrival_time: NaiveDateTime,
    /// `arrival_time - now`, in fractional minutes.
    pub mins_til_arrival: f64,
    /// `now - prediction_time`, in fractional minutes.
    pub mins_since_prediction: f64,

    /// Owning line for rows from the locations endpoint.
    pub route: Option<String>,
}

impl TrainRow {
    /// Train is approaching the station.
    pub fn is_approaching(&self) -> bool {
        flag(self.is_app.as_deref())
    }

    /// Prediction comes from the schedule rather than live tracking.
    pub fn is_scheduled(&self) -> bool {
        flag(self.is_sch.as_deref())
    }

    pub fn is_delayed(&self) -> bool {
        flag(self.is_dly.as_deref())
    }

    /// A fault was detected that may affect the prediction.
    pub fn is_fault(&self) -> bool {
        flag(self.is_flt.as_deref())
    }

    pub fn latitude(&self) -> Option<f64> {
        self.lat.as_deref().and_then(|s| s.trim().parse().ok())
    }

    pub fn longitude(&self) -> Option<f64> {
        self.lon.as_deref().and_then(|s| s.trim().parse().ok())
    }

    /// Compass heading in degrees.
    pub fn heading_degrees(&self) -> Option<u16> {
        self.heading.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

fn flag(value: Option<&str>) -> bool {
    value == Some("1")
}

/// Convert ETA records (arrivals, follow) into rows.
pub fn convert_trains(trains: Vec<Train>, now: NaiveDateTime) -> Result<Vec<TrainRow>, CtaError> {
    trains
        .into_iter()
        .map(|train| convert_train(train, None, now))
        .collect()
}

/// Flatten per-line groups into rows tagged with their line.
///
/// Groups without trains are skipped.
pub fn convert_route_groups(
    groups: Vec<RouteGroup>,
    now: NaiveDateTime,
) -> Result<Vec<TrainRow>, CtaError> {
    let mut rows = Vec::new();

    for group in groups {
        let Some(trains) = group.train else {
            continue;
        };

        for train in trains.into_vec() {
            rows.push(convert_train(train, Some(&group.name), now)?);
        }
    }

    Ok(rows)
}

fn convert_train(
    train: Train,
    route: Option<&str>,
    now: NaiveDateTime,
) -> Result<TrainRow, CtaError> {
    let prediction_time = parse_timestamp("prdt", train.prdt.as_deref())?;
    let arrival_time = parse_timestamp("arrT", train.arr_t.as_deref())?;

    Ok(TrainRow {
        sta_id: train.sta_id,
        stp_id: train.stp_id,
        sta_nm: train.sta_nm,
        stp_de: train.stp_de,
        rn: train.rn,
        rt: train.rt,
        dest_st: train.dest_st,
        dest_nm: train.dest_nm,
        tr_dr: train.tr_dr,
        next_sta_id: train.next_sta_id,
        next_stp_id: train.next_stp_id,
        next_sta_nm: train.next_sta_nm,
        is_app: train.is_app,
        is_sch: train.is_sch,
        is_dly: train.is_dly,
        is_flt: train.is_flt,
        flags: train.flags,
        lat: train.lat,
        lon: train.lon,
        heading: train.heading,
        prediction_time,
        arrival_time,
        mins_til_arrival: minutes(arrival_time - now),
        mins_since_prediction: minutes(now - prediction_time),
        route: route.map(str::to_string),
    })
}

/// Parse a naive local timestamp such as `2022-05-15T15:20:41`.
fn parse_timestamp(field: &'static str, value: Option<&str>) -> Result<NaiveDateTime, CtaError> {
    let value = value.ok_or_else(|| CtaError::InvalidTimestamp {
        field,
        value: String::new(),
    })?;

    value
        .trim()
        .parse::<NaiveDateTime>()
        .map_err(|_| CtaError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

/// Fractional minutes, no rounding.
fn minutes(delta: TimeDelta) -> f64 {
    match delta.num_microseconds() {
        Some(us) => us as f64 / 60_000_000.0,
        None => delta.num_seconds() as f64 / 60.0,
    }
}
