//! HTTP transport for the client.
//!
//! The client only needs one operation: a GET with query pairs that
//! returns a status and a body. Keeping that behind a trait lets tests
//! and offline tools swap in [`MockTransport`](super::MockTransport).

use std::time::Duration;

use tracing::debug;

use super::error::CtaError;

/// Status code and body text of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A synchronous HTTP GET.
///
/// List parameters arrive already flattened into repeated pairs.
pub trait Transport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, CtaError>;
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, CtaError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, CtaError> {
        debug!(url, params = query.len(), "sending request");

        let response = self.http.get(url).query(query).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        debug!(url, status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}
