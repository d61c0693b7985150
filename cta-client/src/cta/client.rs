//! Train Tracker HTTP client.
//!
//! Validates call arguments, encodes them, issues one GET per call and
//! wraps the checked JSON body in the endpoint's response type.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::route::Route;

use super::error::CtaError;
use super::params::{OneOrMany, ParamBuilder, Params, arg, scalar};
use super::query::{ArrivalsQuery, RunNumber};
use super::response::{ArrivalResponse, FollowResponse, LocationResponse};
use super::transport::{HttpTransport, Transport};

/// Default base URL for the Train Tracker API.
pub const DEFAULT_BASE_URL: &str = "http://lapi.transitchicago.com/api";

/// Environment variable read when no key is passed explicitly.
pub const KEY_ENV_VAR: &str = "CTA_KEY";

const DEFAULT_VERSION: u32 = 1;

const ARRIVALS_PATH: &str = "ttarrivals.aspx";
const POSITIONS_PATH: &str = "ttpositions.aspx";
const FOLLOW_PATH: &str = "ttfollow.aspx";

/// Configuration for the Train Tracker client.
#[derive(Debug, Clone)]
pub struct CtaConfig {
    /// API key sent as the `key` parameter
    pub api_key: String,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// API version, rendered as `1.0` in the path
    pub version: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CtaConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_VERSION,
            timeout_secs: 30,
        }
    }

    /// Create a config from the `CTA_KEY` environment variable.
    pub fn from_env() -> Result<Self, CtaError> {
        Self::resolve(None)
    }

    /// Use `api_key` if given, otherwise fall back to `CTA_KEY`.
    pub fn resolve(api_key: Option<&str>) -> Result<Self, CtaError> {
        Self::resolve_with(api_key, |name| std::env::var(name).ok())
    }

    /// Like [`resolve`](Self::resolve), with a custom environment lookup.
    ///
    /// Empty strings count as unset.
    pub fn resolve_with(
        api_key: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CtaError> {
        api_key
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| env(KEY_ENV_VAR).filter(|k| !k.is_empty()))
            .map(Self::new)
            .ok_or(CtaError::MissingCredentials { var: KEY_ENV_VAR })
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Train Tracker API client.
///
/// Holds no mutable state: calls are independent and may overlap.
#[derive(Debug, Clone)]
pub struct CtaClient<T = HttpTransport> {
    transport: T,
    base_url: String,
    version: u32,
    builder: ParamBuilder,
}

impl CtaClient<HttpTransport> {
    /// Create a client that talks to the real API.
    pub fn new(config: CtaConfig) -> Result<Self, CtaError> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        Self::with_transport(config, transport)
    }

    /// Create a client keyed from `CTA_KEY`.
    pub fn from_env() -> Result<Self, CtaError> {
        Self::new(CtaConfig::from_env()?)
    }
}

impl<T: Transport> CtaClient<T> {
    /// Create a client over a custom transport.
    ///
    /// Fails with [`CtaError::MissingCredentials`] when the key is blank.
    pub fn with_transport(config: CtaConfig, transport: T) -> Result<Self, CtaError> {
        if config.api_key.trim().is_empty() {
            return Err(CtaError::MissingCredentials { var: KEY_ENV_VAR });
        }

        Ok(Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            version: config.version,
            builder: ParamBuilder::new(config.api_key),
        })
    }

    /// Versioned base URL, e.g. `http://lapi.transitchicago.com/api/1.0`.
    pub fn base_url(&self) -> String {
        format!("{}/{:.1}", self.base_url, f64::from(self.version))
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get arrival predictions for stations or stops.
    ///
    /// Fails with [`CtaError::MissingArgument`] when neither station nor
    /// stop ids are set. Setting both is allowed but logs a warning,
    /// since the API's behaviour for that combination is unclear.
    pub fn arrivals(&self, query: &ArrivalsQuery) -> Result<ArrivalResponse, CtaError> {
        if query.station_ids.is_none() && query.stop_ids.is_none() {
            return Err(CtaError::MissingArgument(
                "both 'mapid' and 'stpid' cannot be null, provide one".to_string(),
            ));
        }

        if query.station_ids.is_some() && query.stop_ids.is_some() {
            warn!("both 'mapid' and 'stpid' were set; results may be unexpected");
        }

        let params = self.builder.build([
            ("mapid", arg(query.station_ids.clone())),
            ("stpid", arg(query.stop_ids.clone())),
            ("rt", scalar(query.route)),
            ("max", scalar(query.max)),
        ])?;

        ArrivalResponse::new(self.send_request(ARRIVALS_PATH, &params)?)
    }

    /// Get the positions of all trains on one or more lines.
    ///
    /// There is no cap on the number of lines.
    pub fn locations(
        &self,
        routes: impl Into<OneOrMany<Route>>,
    ) -> Result<LocationResponse, CtaError> {
        let routes = routes.into();
        if routes.is_empty() {
            return Err(CtaError::InvalidArgument(
                "at least one route is required".to_string(),
            ));
        }

        let params = self.builder.build_unbounded([("rt", arg(Some(routes)))])?;

        LocationResponse::new(self.send_request(POSITIONS_PATH, &params)?)
    }

    /// Follow a single train by run number.
    pub fn follow(&self, run_number: impl Into<RunNumber>) -> Result<FollowResponse, CtaError> {
        let run_number = run_number.into();
        let run_number = run_number.validate()?;

        let params = self
            .builder
            .build([("runnumber", scalar(Some(run_number)))])?;

        FollowResponse::new(self.send_request(FOLLOW_PATH, &params)?)
    }

    fn send_request(&self, path: &str, params: &Params) -> Result<Value, CtaError> {
        let url = format!("{}/{}", self.base_url(), path);
        debug!(%url, "requesting");

        let response = self.transport.get(&url, &params.to_query_pairs())?;

        if !response.is_success() {
            return Err(CtaError::Status {
                status: response.status,
                url,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| CtaError::Json {
            message: e.to_string(),
            body: Some(response.body.chars().take(500).collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cta::mock::MockTransport;
    use crate::cta::response::TrainTable;
    use std::io;
    use std::sync::{Arc, Mutex};

    const FAKE_KEY: &str = "abc";

    const ETA_BODY: &str = r#"{"ctatt":{"tmst":"2022-05-15T15:21:00","errCd":"0","errNm":null,"eta":[{"staId":"40590","stpId":"30115","staNm":"Damen","rn":"106","rt":"Blue","destNm":"O'Hare","trDr":"1","prdt":"2022-05-15T15:20:41","arrT":"2022-05-15T15:22:41","isApp":"0","isSch":"0","isDly":"0","isFlt":"0","flags":null}]}}"#;

    const POSITIONS_BODY: &str = r#"{"ctatt":{"errCd":"0","route":[{"@name":"blue","train":[{"rn":"106","prdt":"2022-05-15T15:20:41","arrT":"2022-05-15T15:22:41"},{"rn":"107","prdt":"2022-05-15T15:21:04","arrT":"2022-05-15T15:22:04"}]},{"@name":"y","train":{"rn":"501","prdt":"2022-05-15T15:20:00","arrT":"2022-05-15T15:25:00"}}]}}"#;

    fn mock() -> MockTransport {
        MockTransport::new()
            .with_json(ARRIVALS_PATH, ETA_BODY)
            .with_json(FOLLOW_PATH, ETA_BODY)
            .with_json(POSITIONS_PATH, POSITIONS_BODY)
    }

    fn client() -> CtaClient<MockTransport> {
        CtaClient::with_transport(CtaConfig::new(FAKE_KEY), mock()).unwrap()
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a fmt subscriber installed and return what it logged.
    fn with_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        (result, text)
    }

    #[test]
    fn config_builder() {
        let config = CtaConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_version(2)
            .with_timeout(60);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.version, 2);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = CtaConfig::new("test-key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.version, 1);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn missing_credentials() {
        let err = CtaConfig::resolve_with(None, |_| None).unwrap_err();
        assert!(matches!(err, CtaError::MissingCredentials { var: "CTA_KEY" }));

        let err = CtaConfig::resolve_with(Some(""), |_| Some(String::new())).unwrap_err();
        assert!(matches!(err, CtaError::MissingCredentials { .. }));
    }

    #[test]
    fn credentials_from_argument_or_environment() {
        let config = CtaConfig::resolve_with(Some("explicit"), |_| Some("env".into())).unwrap();
        assert_eq!(config.api_key, "explicit");

        let config = CtaConfig::resolve_with(None, |name| {
            (name == KEY_ENV_VAR).then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(config.api_key, "from-env");
    }

    #[test]
    fn client_creation() {
        assert!(CtaClient::new(CtaConfig::new("test-key")).is_ok());
    }

    #[test]
    fn blank_key_is_rejected_at_construction() {
        for key in ["", "   "] {
            let err = CtaClient::with_transport(CtaConfig::new(key), MockTransport::new())
                .unwrap_err();
            assert!(matches!(err, CtaError::MissingCredentials { var: "CTA_KEY" }));
        }

        assert!(matches!(
            CtaClient::new(CtaConfig::new("")),
            Err(CtaError::MissingCredentials { .. })
        ));
    }

    #[test]
    fn versioned_base_url() {
        let client = client();
        assert_eq!(client.version(), 1);
        assert_eq!(client.base_url(), "http://lapi.transitchicago.com/api/1.0");

        let client = CtaClient::with_transport(
            CtaConfig::new(FAKE_KEY)
                .with_base_url("http://localhost:8080/api/")
                .with_version(2),
            MockTransport::new(),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api/2.0");
    }

    #[test]
    fn arrivals_requires_an_id() {
        let client = client();
        let err = client.arrivals(&ArrivalsQuery::new()).unwrap_err();
        assert!(matches!(err, CtaError::MissingArgument(_)));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn arrivals_rejects_too_many_ids() {
        let client = client();
        let err = client
            .arrivals(&ArrivalsQuery::stations([1u32, 2, 3, 4, 5]))
            .unwrap_err();

        assert!(matches!(
            err,
            CtaError::TooManyArguments { received: 5, max: 4, .. }
        ));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn arrivals_with_both_ids_forwards_both() {
        let client = client();
        let query = ArrivalsQuery::stations(40590u32).with_stops([30115u32, 30116]);
        let response = client.arrivals(&query).unwrap();
        assert_eq!(response.to_table().unwrap().len(), 1);

        let request = client.transport().last_request().unwrap();
        assert_eq!(
            request.url,
            "http://lapi.transitchicago.com/api/1.0/ttarrivals.aspx"
        );
        assert_eq!(request.values("mapid"), ["40590"]);
        assert_eq!(request.values("stpid"), ["30115", "30116"]);
        assert_eq!(request.values("key"), [FAKE_KEY]);
        assert_eq!(request.values("outputType"), ["JSON"]);
        assert!(request.values("rt").is_empty());
        assert!(request.values("max").is_empty());
    }

    #[test]
    fn arrivals_with_both_ids_warns() {
        let client = client();
        let query = ArrivalsQuery::stations(40590u32).with_stops(30115u32);

        let (result, logs) = with_logs(|| client.arrivals(&query));
        assert!(result.is_ok());

        let line = logs
            .lines()
            .find(|line| line.contains("WARN"))
            .expect("no warning logged");
        assert!(line.contains("mapid"), "{line}");
        assert!(line.contains("stpid"), "{line}");
    }

    #[test]
    fn arrivals_with_one_id_does_not_warn() {
        let client = client();

        let (result, logs) = with_logs(|| client.arrivals(&ArrivalsQuery::stations(40590u32)));
        assert!(result.is_ok());
        assert!(!logs.contains("WARN"), "{logs}");
    }

    #[test]
    fn arrivals_route_and_max() {
        let client = client();
        let query = ArrivalsQuery::stations(40590u32)
            .with_route(Route::Brown)
            .with_max(3);
        client.arrivals(&query).unwrap();

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.values("rt"), ["brn"]);
        assert_eq!(request.values("max"), ["3"]);
    }

    #[test]
    fn locations_sends_route_codes() {
        let client = client();
        let response = client.locations([Route::Blue, Route::Yellow]).unwrap();

        let request = client.transport().last_request().unwrap();
        assert!(request.url.ends_with("/ttpositions.aspx"));
        assert_eq!(request.values("rt"), ["blue", "y"]);

        let rows = response.to_table().unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn locations_has_no_cap() {
        let client = client();
        client.locations(Route::ALL).unwrap();

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.values("rt").len(), 8);
    }

    #[test]
    fn locations_single_route() {
        let client = client();
        client.locations(Route::Red).unwrap();
        let request = client.transport().last_request().unwrap();
        assert_eq!(request.values("rt"), ["red"]);
    }

    #[test]
    fn locations_rejects_empty_list() {
        let err = client().locations(Vec::<Route>::new()).unwrap_err();
        assert!(matches!(err, CtaError::InvalidArgument(_)));
    }

    #[test]
    fn follow_single_run_number() {
        let client = client();
        client.follow(106u32).unwrap();

        let request = client.transport().last_request().unwrap();
        assert!(request.url.ends_with("/ttfollow.aspx"));
        assert_eq!(request.values("runnumber"), ["106"]);
    }

    #[test]
    fn follow_rejects_several_run_numbers() {
        let client = client();
        let err = client.follow("106,107").unwrap_err();
        assert!(matches!(err, CtaError::InvalidArgument(_)));
        assert!(err.to_string().contains("Only one"));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn non_success_status_includes_body() {
        let transport =
            MockTransport::new().with_response(ARRIVALS_PATH, 503, "Service Unavailable");
        let client = CtaClient::with_transport(CtaConfig::new(FAKE_KEY), transport).unwrap();

        let err = client.arrivals(&ArrivalsQuery::stations(1u32)).unwrap_err();
        match err {
            CtaError::Status { status, body, url } => {
                assert_eq!(status, 503);
                assert_eq!(body, "Service Unavailable");
                assert!(url.ends_with(ARRIVALS_PATH));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_json_body() {
        let transport = MockTransport::new().with_json(FOLLOW_PATH, "<html>oops</html>");
        let client = CtaClient::with_transport(CtaConfig::new(FAKE_KEY), transport).unwrap();

        let err = client.follow(1u32).unwrap_err();
        assert!(matches!(err, CtaError::Json { body: Some(_), .. }));
    }

    #[test]
    fn api_error_surfaces_from_call() {
        let transport = MockTransport::new().with_json(
            ARRIVALS_PATH,
            r#"{"ctatt":{"errCd":"101","errNm":"Invalid API key."}}"#,
        );
        let client = CtaClient::with_transport(CtaConfig::new(FAKE_KEY), transport).unwrap();

        let err = client.arrivals(&ArrivalsQuery::stops(30115u32)).unwrap_err();
        assert!(matches!(err, CtaError::Api { code: 101, .. }));
    }
}
