//! Station reference data error types.

use crate::export::ExportError;

/// Errors that can occur when loading or exporting station data.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Data portal returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse station JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Failed to read a local data file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write the delimited export
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StationError::Api {
            status: 404,
            message: "not found".into(),
        };
        assert_eq!(err.to_string(), "API error 404: not found");

        let err = StationError::Json {
            message: "expected array".into(),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected array");
    }
}
