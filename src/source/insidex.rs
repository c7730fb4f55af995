//! insidex price feed for the WAL token.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{self, HttpGet, HttpTransport},
	source::ApiKey,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Environment variable consulted by [`InsidexConfig::from_env`].
pub const INSIDEX_API_KEY_ENV: &str = "INSIDEX_API_KEY";

const ENDPOINT: &str = "insidex.price";

/// Price, market cap, and circulating supply for a coin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAndMarketCap {
	/// Market capitalization in USD.
	pub market_cap: f64,
	/// Spot price in USD.
	pub price: f64,
	/// Circulating supply.
	pub supply: f64,
}

/// insidex client settings. The API key is optional; requests go out without the header when
/// none is configured.
#[derive(Clone, Debug)]
pub struct InsidexConfig {
	/// Full `price-and-mc` URL for the coin of interest.
	pub endpoint: Url,
	/// Optional key sent in the `x-api-key` header.
	pub api_key: Option<ApiKey>,
}
impl InsidexConfig {
	/// WAL `price-and-mc` endpoint.
	pub const DEFAULT_ENDPOINT: &'static str = "https://api-ex.insidex.trade/coins/0x356a26eb9e012a68958082340d4c4116e7f55615cf27affcff209cf0ae544f59::wal::WAL/price-and-mc";

	/// Creates a configuration for the default WAL endpoint.
	pub fn new(api_key: Option<ApiKey>) -> Result<Self, ConfigError> {
		Ok(Self { endpoint: Url::parse(Self::DEFAULT_ENDPOINT)?, api_key })
	}

	/// Builds a configuration whose key comes from [`INSIDEX_API_KEY_ENV`], if set.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::new(ApiKey::from_env(INSIDEX_API_KEY_ENV)?)
	}

	/// Overrides the endpoint (useful for mocks and other coins).
	pub fn with_endpoint(mut self, endpoint: Url) -> Self {
		self.endpoint = endpoint;

		self
	}
}

#[cfg(feature = "reqwest")]
/// insidex client specialized for the crate's default reqwest transport.
pub type ReqwestInsidexClient = InsidexClient<ReqwestHttpClient>;

/// Client for the insidex `price-and-mc` endpoint.
pub struct InsidexClient<H>
where
	H: ?Sized + HttpTransport,
{
	config: InsidexConfig,
	transport: Arc<H>,
}
impl<H> InsidexClient<H>
where
	H: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(config: InsidexConfig, transport: impl Into<Arc<H>>) -> Self {
		Self { config, transport: transport.into() }
	}

	/// Fetches the current price, market cap, and supply.
	pub async fn price(&self) -> Result<PriceAndMarketCap> {
		let mut request = HttpGet::new(self.config.endpoint.clone());

		if let Some(key) = &self.config.api_key {
			request = request.header("x-api-key", key.expose());
		}

		let response = self.transport.get(request).await?;

		http::decode_json(ENDPOINT, response)
	}
}
#[cfg(feature = "reqwest")]
impl InsidexClient<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn new(config: InsidexConfig) -> Self {
		Self::with_transport(config, ReqwestHttpClient::default())
	}
}
impl<H> Debug for InsidexClient<H>
where
	H: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InsidexClient")
			.field("endpoint", &self.config.endpoint.as_str())
			.field("api_key_set", &self.config.api_key.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, error::UpstreamError};

	fn client(transport: Arc<ScriptedTransport>, key: Option<&str>) -> InsidexClient<ScriptedTransport> {
		let api_key = key.map(|value| ApiKey::new(value).expect("Fixture key should be valid."));
		let config = InsidexConfig::new(api_key).expect("Default endpoint should parse.");

		InsidexClient::with_transport(config, transport)
	}

	#[tokio::test]
	async fn price_omits_key_header_when_unset() {
		let transport = Arc::new(ScriptedTransport::default());

		transport.push_json(200, r#"{"marketCap":2150000000.0,"price":0.43,"supply":5000000000.0}"#);

		let price = client(transport.clone(), None).price().await.expect("Price should decode.");
		let requests = transport.requests();
		let (_, request) = requests.first().expect("One request should be recorded.");

		assert_eq!(price.supply, 5_000_000_000.0);
		assert_eq!(request.header_value("x-api-key"), None);
		assert!(request.url.as_str().ends_with("::wal::WAL/price-and-mc"));
	}

	#[tokio::test]
	async fn price_surfaces_status_failures() {
		let transport = Arc::new(ScriptedTransport::default());

		transport.push_json(401, "{}");

		let err = client(transport.clone(), Some("insidex-key"))
			.price()
			.await
			.expect_err("Unauthorized responses should fail.");
		let requests = transport.requests();

		assert!(matches!(err, Error::Upstream(UpstreamError::Status { status: 401, .. })));
		assert_eq!(requests[0].1.header_value("x-api-key"), Some("insidex-key"));
	}
}
