//! Train line identifiers.

use std::fmt;
use std::str::FromStr;

/// Error returned when a route name or code does not match any line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route: {value:?} is not a known {kind}")]
pub struct InvalidRoute {
    value: String,
    kind: &'static str,
}

/// A CTA 'L' train line.
///
/// Each line has a fixed symbolic name (`"BLUE"`) and the code the
/// Train Tracker API uses on the wire (`"blue"`). Codes are not simply
/// the lowercased name: Brown is `brn`, Green is `g`, and so on.
///
/// # Examples
///
/// ```
/// use cta_client::Route;
///
/// assert_eq!(Route::Brown.code(), "brn");
/// assert_eq!(Route::from_code("org").unwrap(), Route::Orange);
///
/// // Names are case-sensitive
/// assert!(Route::from_name("BLUE").is_ok());
/// assert!(Route::from_name("blue").is_err());
/// assert!(Route::from_name("Blue").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Route {
    Red,
    Blue,
    Brown,
    Green,
    Orange,
    Purple,
    Pink,
    Yellow,
}

impl Route {
    /// Every line, in declaration order.
    pub const ALL: [Route; 8] = [
        Route::Red,
        Route::Blue,
        Route::Brown,
        Route::Green,
        Route::Orange,
        Route::Purple,
        Route::Pink,
        Route::Yellow,
    ];

    /// The code sent to and received from the API.
    pub fn code(self) -> &'static str {
        match self {
            Route::Red => "red",
            Route::Blue => "blue",
            Route::Brown => "brn",
            Route::Green => "g",
            Route::Orange => "org",
            Route::Purple => "p",
            Route::Pink => "pink",
            Route::Yellow => "y",
        }
    }

    /// The fixed upper-case symbolic name.
    pub fn name(self) -> &'static str {
        match self {
            Route::Red => "RED",
            Route::Blue => "BLUE",
            Route::Brown => "BROWN",
            Route::Green => "GREEN",
            Route::Orange => "ORANGE",
            Route::Purple => "PURPLE",
            Route::Pink => "PINK",
            Route::Yellow => "YELLOW",
        }
    }

    /// Look up a line by its wire code. Exact match only.
    pub fn from_code(code: &str) -> Result<Self, InvalidRoute> {
        Self::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| InvalidRoute {
                value: code.to_string(),
                kind: "route code",
            })
    }

    /// Look up a line by its symbolic name.
    ///
    /// There is no case folding: `"RED"` resolves, `"red"` and `"Red"`
    /// do not.
    pub fn from_name(name: &str) -> Result<Self, InvalidRoute> {
        Self::ALL
            .into_iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| InvalidRoute {
                value: name.to_string(),
                kind: "route name",
            })
    }
}

impl FromStr for Route {
    type Err = InvalidRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
