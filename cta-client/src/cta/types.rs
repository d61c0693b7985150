//! Train Tracker response DTOs.
//!
//! These map directly onto the `ctatt` JSON payload. The API sends
//! nearly everything as strings, omits fields instead of sending nulls,
//! and collapses one-element lists into bare objects, so most fields are
//! `Option` and list fields go through [`OneOrList`].

use serde::{Deserialize, Deserializer};

/// A JSON value that is either a list or a single bare element.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrList<T> {
    List(Vec<T>),
    One(T),
}

impl<T> OneOrList<T> {
    /// Normalize to a list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrList::List(items) => items,
            OneOrList::One(item) => vec![item],
        }
    }
}

/// Payload of the arrivals and follow endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct EtaPayload {
    /// Predictions; absent when nothing matched.
    #[serde(default)]
    pub eta: Option<OneOrList<Train>>,
}

/// Payload of the locations endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationPayload {
    #[serde(default)]
    pub route: Option<OneOrList<RouteGroup>>,
}

/// Trains reported for one line by the locations endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteGroup {
    /// Wire code of the line (`"blue"`, `"brn"`, ...).
    #[serde(rename = "@name")]
    pub name: String,

    /// Absent when no trains are running on the line.
    #[serde(default)]
    pub train: Option<OneOrList<Train>>,
}

/// One arrival prediction or train position.
///
/// The arrivals endpoint fills the station/stop fields, the locations
/// endpoint fills the `next*` fields, and follow fills a mix.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    #[serde(default, deserialize_with = "lenient_string")]
    pub sta_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stp_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sta_nm: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stp_de: Option<String>,

    /// Run number.
    #[serde(default, deserialize_with = "lenient_string")]
    pub rn: Option<String>,
    /// Route code.
    #[serde(default, deserialize_with = "lenient_string")]
    pub rt: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dest_st: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dest_nm: Option<String>,
    /// Direction code.
    #[serde(default, deserialize_with = "lenient_string")]
    pub tr_dr: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub next_sta_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub next_stp_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub next_sta_nm: Option<String>,

    /// When the prediction was made (naive local time).
    #[serde(default, deserialize_with = "lenient_string")]
    pub prdt: Option<String>,
    /// Predicted arrival (naive local time).
    #[serde(default, deserialize_with = "lenient_string")]
    pub arr_t: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub is_app: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub is_sch: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub is_dly: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub is_flt: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub flags: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub lat: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lon: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub heading: Option<String>,
}

/// Accept a string, number, bool or null and keep it as text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
