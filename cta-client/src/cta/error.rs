//! CTA client error types.

/// Errors from the Train Tracker client.
///
/// Nothing here is retried: every variant is terminal for the call
/// that produced it.
#[derive(Debug, thiserror::Error)]
pub enum CtaError {
    /// No API key was passed and the environment variable is unset
    #[error("missing credentials: set the '{var}' environment variable or provide a key")]
    MissingCredentials { var: &'static str },

    /// A required argument (or one of a required pair) was not supplied
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// A list argument had more values than the API accepts
    #[error("too many arguments: {field:?} received {received} arguments. {max} is the maximum.")]
    TooManyArguments {
        field: String,
        received: usize,
        max: usize,
    },

    /// An argument had the wrong shape for the endpoint
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("request to {url} failed with status {status}: {body}")]
    Status { status: u16, url: String, body: String },

    /// Body was not the JSON shape we expected
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The API reported an error code inside an otherwise successful response
    #[error("received code {code} with message: {message:?}")]
    Api { code: u32, message: String },

    /// The payload held no train records
    #[error("no trains found in response")]
    NoTrains,

    /// A timestamp field could not be parsed
    #[error("invalid timestamp in {field}: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

impl CtaError {
    pub(crate) fn json(message: impl Into<String>) -> Self {
        CtaError::Json {
            message: message.into(),
            body: None,
        }
    }
}
