//! Crate-level error types shared across the governor, transports, and data sources.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Upstream answered, but not with a usable payload.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The caller cancelled while waiting for the throttle window.
	#[error(transparent)]
	Cancelled(#[from] Cancelled),
}

/// Raised when a governed fetch is cancelled before it was dispatched.
///
/// Cancellation only takes effect while the caller is waiting out the throttle window, so a
/// value of this type always means no request was sent and no governor state changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ThisError)]
#[error("Fetch was cancelled while waiting for the throttle window.")]
pub struct Cancelled;

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Throttle interval is negative.
	#[error("Minimum request interval must not be negative, got {interval}.")]
	NegativeInterval {
		/// Rejected interval.
		interval: Duration,
	},
	/// A data source that requires an API key was built without one.
	#[error("Missing {source_name} API key.")]
	MissingApiKey {
		/// Data source label.
		source_name: &'static str,
	},
	/// API key failed validation.
	#[error("API key is invalid: {reason}.")]
	InvalidApiKey {
		/// Validation failure summary.
		reason: &'static str,
	},
	/// Trading pair identifier cannot be used as a path segment.
	#[error("Trading pair `{pair}` is invalid.")]
	InvalidPair {
		/// Rejected pair.
		pair: String,
	},
	/// Page size must be positive.
	#[error("Page size must be greater than zero.")]
	ZeroPageSize,
	/// Endpoint URL cannot be parsed or joined.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidEndpoint { source }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures reported by an upstream API that did answer the request.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Endpoint returned a non-success status code.
	#[error("API error from {endpoint}: {status} {reason}.")]
	Status {
		/// Endpoint label that produced the response.
		endpoint: &'static str,
		/// HTTP status code.
		status: u16,
		/// Reason phrase, when available.
		reason: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Endpoint returned a body that does not match the expected schema.
	#[error("Endpoint {endpoint} returned malformed JSON.")]
	Parse {
		/// Endpoint label that produced the response.
		endpoint: &'static str,
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Body decoded, but its content is unusable (explicit failure flag, malformed amounts).
	#[error("Endpoint {endpoint} returned an unusable payload: {message}.")]
	Invalid {
		/// Endpoint label that produced the response.
		endpoint: &'static str,
		/// What was wrong with the payload.
		message: String,
	},
}
impl UpstreamError {
	/// Returns the HTTP status carried by the failure, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Parse { .. } | Self::Invalid { .. } => None,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {endpoint}.")]
	Network {
		/// Endpoint host or label.
		endpoint: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded its timeout.
	#[error("Request to {endpoint} timed out.")]
	Timeout {
		/// Endpoint host or label.
		endpoint: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint: endpoint.into(), source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn cancelled_converts_into_crate_error() {
		let err: Error = Cancelled.into();

		assert!(matches!(err, Error::Cancelled(Cancelled)));
		assert_eq!(err.to_string(), "Fetch was cancelled while waiting for the throttle window.");
	}

	#[test]
	fn upstream_status_formats_reason() {
		let err = UpstreamError::Status {
			endpoint: "blockberry.validators",
			status: 429,
			reason: "Too Many Requests".into(),
			retry_after: Some(Duration::seconds(15)),
		};

		assert_eq!(err.status(), Some(429));
		assert_eq!(
			Error::from(err).to_string(),
			"API error from blockberry.validators: 429 Too Many Requests."
		);
	}

	#[test]
	fn parse_error_exposes_json_path() {
		let mut de = serde_json::Deserializer::from_str("{\"price\":\"nope\"}");
		let source = serde_path_to_error::deserialize::<_, BTreeMap<String, f64>>(&mut de)
			.expect_err("String price should fail to decode as f64.");
		let err = UpstreamError::Parse { endpoint: "insidex.price", source };

		assert_eq!(err.status(), None);

		let source = StdError::source(&err).expect("Parse errors should expose their source.");

		assert!(source.to_string().contains("price"));
	}
}
