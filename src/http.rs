//! Transport primitives for the bundled data sources.
//!
//! The module exposes [`HttpTransport`] alongside [`HttpGet`] and [`HttpResponse`] so
//! downstream crates can plug in custom HTTP stacks. Transports only move bytes and report
//! status metadata; [`decode_json`] turns a response into a typed payload or an
//! [`UpstreamError`], so every source classifies failures the same way.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::UpstreamError};
#[cfg(feature = "reqwest")] use crate::error::TransportError;

/// Boxed future returned by [`HttpTransport::get`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of issuing the GET requests used by the data sources.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// several sources behind `Arc`. Non-success statuses are not errors at this layer: return the
/// response and let [`decode_json`] classify it.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Performs a GET request.
	fn get(&self, request: HttpGet) -> HttpFuture<'_>;
}

/// Outbound GET request description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpGet {
	/// Fully built request URL, query string included.
	pub url: Url,
	/// Header name/value pairs.
	pub headers: Vec<(&'static str, String)>,
	/// Optional per-request timeout.
	pub timeout: Option<StdDuration>,
}
impl HttpGet {
	/// Creates a request without headers or timeout.
	pub fn new(url: Url) -> Self {
		Self { url, headers: Vec::new(), timeout: None }
	}

	/// Appends a header.
	pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Sets the request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Returns the first value recorded for `name`, compared case-insensitively.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Response captured by a transport.
///
/// Additional fields may be added in future releases, so downstream code should construct
/// values using field names instead of struct update syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Canonical reason phrase, if known.
	pub reason: Option<String>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Reports whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Decodes a successful response body, or classifies the failure.
///
/// Non-2xx statuses become [`UpstreamError::Status`]; bodies that do not match `T` become
/// [`UpstreamError::Parse`] with the failing JSON path preserved.
pub fn decode_json<T>(endpoint: &'static str, response: HttpResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	if !response.is_success() {
		return Err(UpstreamError::Status {
			endpoint,
			status: response.status,
			reason: response.reason.unwrap_or_default(),
			retry_after: response.retry_after,
		}
		.into());
	}

	let mut de = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| UpstreamError::Parse { endpoint, source }.into())
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn get(&self, request: HttpGet) -> HttpFuture<'_> {
		Box::pin(async move {
			let endpoint = request.url.host_str().unwrap_or_default().to_owned();
			let mut builder = self.0.get(request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if let Some(timeout) = request.timeout {
				builder = builder.timeout(timeout);
			}

			let response =
				builder.send().await.map_err(|e| map_reqwest_error(endpoint.clone(), e))?;
			let status = response.status();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await.map_err(|e| map_reqwest_error(endpoint, e))?;

			Ok(HttpResponse {
				status: status.as_u16(),
				reason: status.canonical_reason().map(str::to_owned),
				retry_after,
				body: body.to_vec(),
			})
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: String, err: ReqwestError) -> Error {
	use crate::error::ConfigError;

	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { endpoint }.into();
	}

	TransportError::network(endpoint, err).into()
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Price {
		price: f64,
	}

	fn response(status: u16, body: &str) -> HttpResponse {
		HttpResponse { status, reason: None, retry_after: None, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn decode_json_parses_success_bodies() {
		let price: Price = decode_json("test.price", response(200, "{\"price\":0.43}"))
			.expect("Valid JSON should decode.");

		assert_eq!(price.price, 0.43);
	}

	#[test]
	fn decode_json_maps_status_failures() {
		let mut failed = response(429, "");

		failed.reason = Some("Too Many Requests".into());
		failed.retry_after = Some(Duration::seconds(15));

		let err = decode_json::<Price>("test.price", failed)
			.expect_err("Non-success status should fail.");

		match err {
			Error::Upstream(UpstreamError::Status { endpoint, status, reason, retry_after }) => {
				assert_eq!(endpoint, "test.price");
				assert_eq!(status, 429);
				assert_eq!(reason, "Too Many Requests");
				assert_eq!(retry_after, Some(Duration::seconds(15)));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn decode_json_reports_parse_path() {
		let err = decode_json::<Price>("test.price", response(200, "{\"price\":\"high\"}"))
			.expect_err("Mistyped field should fail.");

		match err {
			Error::Upstream(UpstreamError::Parse { source, .. }) => {
				assert_eq!(source.path().to_string(), "price");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn http_get_builder_collects_headers() {
		let request = HttpGet::new(Url::parse("https://example.com/v1").expect("URL should parse."))
			.header("x-api-key", "secret")
			.timeout(StdDuration::from_secs(10));

		assert_eq!(request.header_value("X-API-KEY"), Some("secret"));
		assert_eq!(request.timeout, Some(StdDuration::from_secs(10)));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, "30".parse().expect("Header value should parse."));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(30)));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_saturates_oversized_delta() {
		let mut headers = HeaderMap::new();

		headers.insert(
			RETRY_AFTER,
			"18446744073709551615".parse().expect("Header value should parse."),
		);

		let hint = parse_retry_after(&headers).expect("Oversized delta should still yield a hint.");

		assert!(hint.is_positive());
		assert_eq!(hint, Duration::seconds(i64::MAX));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_accepts_http_dates() {
		let future = (OffsetDateTime::now_utc() + Duration::hours(1))
			.format(&Rfc2822)
			.expect("Future date should format as RFC 2822.");
		let past = (OffsetDateTime::now_utc() - Duration::hours(1))
			.format(&Rfc2822)
			.expect("Past date should format as RFC 2822.");
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, future.parse().expect("Header value should parse."));

		let hint = parse_retry_after(&headers).expect("Future HTTP date should yield a hint.");

		assert!(hint > Duration::minutes(58) && hint <= Duration::hours(1));

		headers.insert(RETRY_AFTER, past.parse().expect("Header value should parse."));

		assert_eq!(parse_retry_after(&headers), None);
	}
}
