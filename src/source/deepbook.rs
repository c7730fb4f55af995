//! DeepBook indexer order-book snapshots.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{self, HttpGet, HttpTransport},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const ENDPOINT: &str = "deepbook.orderbook";

/// One price level; the indexer sends `[price, quantity]` as decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct OrderBookLevel {
	/// Level price.
	pub price: String,
	/// Quantity resting at `price`.
	pub quantity: String,
}
impl From<(String, String)> for OrderBookLevel {
	fn from((price, quantity): (String, String)) -> Self {
		Self { price, quantity }
	}
}
impl From<OrderBookLevel> for (String, String) {
	fn from(level: OrderBookLevel) -> Self {
		(level.price, level.quantity)
	}
}

/// Order-book snapshot for one trading pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
	/// Indexer timestamp, passed through as sent.
	pub timestamp: String,
	/// Bid levels, best first.
	#[serde(default)]
	pub bids: Vec<OrderBookLevel>,
	/// Ask levels, best first.
	#[serde(default)]
	pub asks: Vec<OrderBookLevel>,
}
impl OrderBook {
	/// Highest bid, if any.
	pub fn best_bid(&self) -> Option<&OrderBookLevel> {
		self.bids.first()
	}

	/// Lowest ask, if any.
	pub fn best_ask(&self) -> Option<&OrderBookLevel> {
		self.asks.first()
	}
}

/// DeepBook indexer settings.
#[derive(Clone, Debug)]
pub struct OrderBookConfig {
	/// Order-book root; the pair is appended as the last path segment.
	pub base_url: Url,
}
impl OrderBookConfig {
	/// Mainnet indexer order-book root.
	pub const DEFAULT_BASE_URL: &'static str =
		"https://deepbook-indexer.mainnet.mystenlabs.com/orderbook/";

	/// Creates a configuration for the mainnet indexer.
	pub fn new() -> Result<Self, ConfigError> {
		Ok(Self { base_url: Url::parse(Self::DEFAULT_BASE_URL)? })
	}

	/// Overrides the order-book root (useful for mocks).
	pub fn with_base_url(mut self, mut base_url: Url) -> Self {
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		self.base_url = base_url;

		self
	}
}

#[cfg(feature = "reqwest")]
/// Order-book client specialized for the crate's default reqwest transport.
pub type ReqwestOrderBookClient = OrderBookClient<ReqwestHttpClient>;

/// Client for the DeepBook indexer `orderbook/{pair}` endpoint.
pub struct OrderBookClient<H>
where
	H: ?Sized + HttpTransport,
{
	config: OrderBookConfig,
	transport: Arc<H>,
}
impl<H> OrderBookClient<H>
where
	H: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(config: OrderBookConfig, transport: impl Into<Arc<H>>) -> Self {
		Self { config, transport: transport.into() }
	}

	/// Fetches the order book for `pair`, e.g. `SUI_USDC`.
	///
	/// Empty pairs and pairs containing `/`, `?` or `#` are rejected with
	/// [`ConfigError::InvalidPair`] before any request is sent.
	pub async fn order_book(&self, pair: &str) -> Result<OrderBook> {
		if pair.is_empty() || pair.contains(['/', '?', '#']) {
			return Err(ConfigError::InvalidPair { pair: pair.to_owned() }.into());
		}

		let url = self.config.base_url.join(pair).map_err(ConfigError::from)?;
		let response = self.transport.get(HttpGet::new(url)).await?;

		http::decode_json(ENDPOINT, response)
	}
}
#[cfg(feature = "reqwest")]
impl OrderBookClient<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn new(config: OrderBookConfig) -> Self {
		Self::with_transport(config, ReqwestHttpClient::default())
	}
}
impl<H> Debug for OrderBookClient<H>
where
	H: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OrderBookClient").field("base_url", &self.config.base_url.as_str()).finish()
	}
}
