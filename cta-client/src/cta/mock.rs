//! Mock transport for testing without API access.
//!
//! Serves canned bodies keyed by endpoint path and records every request
//! so callers can assert on the outgoing parameters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::error::CtaError;
use super::transport::{HttpResponse, Transport};

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// All values sent for a field, in order.
    pub fn values(&self, field: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Transport that answers from memory.
///
/// Responses are matched on the last path segment of the URL
/// (`ttarrivals.aspx`, ...). Unmatched requests get a 404.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: HashMap<String, HttpResponse>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `path` with status 200 and `body`.
    pub fn with_json(self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(path, 200, body)
    }

    /// Answer requests for `path` with an arbitrary status and body.
    pub fn with_response(
        mut self,
        path: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.responses.insert(
            path.into(),
            HttpResponse {
                status,
                body: body.into(),
            },
        );
        self
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, CtaError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                url: url.to_string(),
                query: query.to_vec(),
            });

        let path = url.rsplit('/').next().unwrap_or(url);
        Ok(self
            .responses
            .get(path)
            .cloned()
            .unwrap_or_else(|| HttpResponse {
                status: 404,
                body: format!("no mock response for {path}"),
            }))
    }
}
