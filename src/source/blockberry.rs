//! Blockberry Walrus-mainnet client for paginated validator, account, and blob listings.
//!
//! Requests carry `page`, `size`, `orderBy`, and `sortBy` query parameters plus the
//! `x-api-key` header. A key is mandatory: [`BlockberryConfigBuilder::build`] refuses to
//! produce a configuration without one, so a missing key is reported before any request is
//! attempted.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{self, HttpGet, HttpTransport},
	source::{ApiKey, Page, SortOrder},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Environment variable consulted by [`BlockberryConfig::from_env`].
pub const BLOCKBERRY_API_KEY_ENV: &str = "BLOCKBERRY_API_KEY";

/// Paginated Walrus resources exposed by Blockberry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalrusResource {
	/// Storage node validators, sorted by stake.
	Validators,
	/// Accounts, sorted by balance.
	Accounts,
	/// Blobs, sorted by timestamp.
	Blobs,
}
impl WalrusResource {
	/// Path segment relative to the Walrus base URL.
	pub const fn path(self) -> &'static str {
		match self {
			WalrusResource::Validators => "validators",
			WalrusResource::Accounts => "accounts",
			WalrusResource::Blobs => "blobs",
		}
	}

	/// Sort column used by the dashboard listings.
	pub const fn default_sort(self) -> &'static str {
		match self {
			WalrusResource::Validators => "STAKE",
			WalrusResource::Accounts => "BALANCE",
			WalrusResource::Blobs => "TIMESTAMP",
		}
	}

	/// Stable label used in errors.
	pub const fn endpoint(self) -> &'static str {
		match self {
			WalrusResource::Validators => "blockberry.validators",
			WalrusResource::Accounts => "blockberry.accounts",
			WalrusResource::Blobs => "blockberry.blobs",
		}
	}
}
impl Display for WalrusResource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.path())
	}
}

/// Query parameters for one page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageQuery {
	/// Zero-based page index.
	pub page: u32,
	/// Records per page.
	pub size: u32,
	/// Sort direction.
	pub order: SortOrder,
	/// Sort column.
	pub sort_by: &'static str,
}
impl PageQuery {
	/// Creates a descending query on the resource's default sort column.
	pub fn new(resource: WalrusResource, page: u32, size: u32) -> Self {
		Self { page, size, order: SortOrder::Desc, sort_by: resource.default_sort() }
	}

	/// Overrides the sort direction.
	pub fn with_order(mut self, order: SortOrder) -> Self {
		self.order = order;

		self
	}

	/// Query-string pairs in the order Blockberry documents them.
	pub fn pairs(&self) -> [(&'static str, String); 4] {
		[
			("page", self.page.to_string()),
			("size", self.size.to_string()),
			("orderBy", self.order.as_str().to_owned()),
			("sortBy", self.sort_by.to_owned()),
		]
	}
}

/// Validated Blockberry client settings.
#[derive(Clone, Debug)]
pub struct BlockberryConfig {
	/// Walrus API base URL, always ending in `/`.
	pub base_url: Url,
	/// Key sent in the `x-api-key` header.
	pub api_key: ApiKey,
	/// Records requested per page.
	pub page_size: u32,
	/// Optional per-request timeout.
	pub timeout: Option<StdDuration>,
}
impl BlockberryConfig {
	/// Walrus-mainnet API root.
	pub const DEFAULT_BASE_URL: &'static str = "https://api.blockberry.one/walrus-mainnet/v1/";
	/// Page size used by the dashboard tables.
	pub const DEFAULT_PAGE_SIZE: u32 = 20;

	/// Starts a builder seeded with the defaults.
	pub fn builder() -> BlockberryConfigBuilder {
		BlockberryConfigBuilder::default()
	}

	/// Builds a configuration whose key comes from [`BLOCKBERRY_API_KEY_ENV`].
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut builder = Self::builder();

		if let Some(key) = ApiKey::from_env(BLOCKBERRY_API_KEY_ENV)? {
			builder = builder.api_key(key);
		}

		builder.build()
	}
}

/// Builder for [`BlockberryConfig`] values.
#[derive(Debug, Default)]
pub struct BlockberryConfigBuilder {
	/// Base URL override.
	pub base_url: Option<Url>,
	/// API key, required at build time.
	pub api_key: Option<ApiKey>,
	/// Page size override.
	pub page_size: Option<u32>,
	/// Optional per-request timeout.
	pub timeout: Option<StdDuration>,
}
impl BlockberryConfigBuilder {
	/// Overrides the base URL (useful for mocks and proxies).
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the API key.
	pub fn api_key(mut self, key: ApiKey) -> Self {
		self.api_key = Some(key);

		self
	}

	/// Overrides the page size.
	pub fn page_size(mut self, size: u32) -> Self {
		self.page_size = Some(size);

		self
	}

	/// Sets a per-request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Validates the settings.
	pub fn build(self) -> Result<BlockberryConfig, ConfigError> {
		let api_key = self.api_key.ok_or(ConfigError::MissingApiKey { source_name: "Blockberry" })?;
		let page_size = self.page_size.unwrap_or(BlockberryConfig::DEFAULT_PAGE_SIZE);

		if page_size == 0 {
			return Err(ConfigError::ZeroPageSize);
		}

		let mut base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(BlockberryConfig::DEFAULT_BASE_URL)?,
		};

		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		Ok(BlockberryConfig { base_url, api_key, page_size, timeout: self.timeout })
	}
}

/// Walrus storage node validator as listed by Blockberry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalrusValidator {
	/// Validator object hash.
	pub validator_hash: String,
	/// Display name.
	#[serde(default)]
	pub validator_name: String,
	/// Committee status label.
	#[serde(default)]
	pub status: String,
	/// Total stake.
	#[serde(default)]
	pub stake: f64,
	/// Commission rate.
	#[serde(default)]
	pub commission_rate: f64,
	/// Uptime ratio.
	#[serde(default)]
	pub uptime: f64,
	/// Rank by stake.
	#[serde(default)]
	pub rank: u32,
	/// Fields this crate does not model.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

/// Walrus account row; only the commonly rendered fields are typed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalrusAccount {
	/// Account address.
	#[serde(default)]
	pub address: Option<String>,
	/// WAL balance.
	#[serde(default)]
	pub balance: Option<f64>,
	/// Fields this crate does not model.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

/// Walrus blob row; only the commonly rendered fields are typed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalrusBlob {
	/// Blob identifier.
	#[serde(default)]
	pub blob_id: Option<String>,
	/// Encoded size in bytes.
	#[serde(default)]
	pub size: Option<u64>,
	/// Registration time in Unix milliseconds.
	#[serde(default)]
	pub timestamp: Option<i64>,
	/// Fields this crate does not model.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

#[cfg(feature = "reqwest")]
/// Blockberry client specialized for the crate's default reqwest transport.
pub type ReqwestBlockberryClient = BlockberryClient<ReqwestHttpClient>;

/// Paginated Blockberry Walrus client.
pub struct BlockberryClient<H>
where
	H: ?Sized + HttpTransport,
{
	config: BlockberryConfig,
	transport: Arc<H>,
}
impl<H> BlockberryClient<H>
where
	H: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(config: BlockberryConfig, transport: impl Into<Arc<H>>) -> Self {
		Self { config, transport: transport.into() }
	}

	/// Settings the client was built with.
	pub fn config(&self) -> &BlockberryConfig {
		&self.config
	}

	/// Builds the GET request for one page of `resource`.
	pub fn request(&self, resource: WalrusResource, query: &PageQuery) -> Result<HttpGet> {
		let mut url = self.config.base_url.join(resource.path()).map_err(ConfigError::from)?;

		url.query_pairs_mut().extend_pairs(query.pairs());

		let mut request = HttpGet::new(url)
			.header("accept", "*/*")
			.header("x-api-key", self.config.api_key.expose());

		if let Some(timeout) = self.config.timeout {
			request = request.timeout(timeout);
		}

		Ok(request)
	}

	/// Fetches page `page` of `resource` with the configured page size.
	pub async fn fetch_page<T>(&self, resource: WalrusResource, page: u32) -> Result<Page<T>>
	where
		T: DeserializeOwned,
	{
		let query = PageQuery::new(resource, page, self.config.page_size);

		self.fetch_query(resource, &query).await
	}

	/// Fetches a page described by an explicit query.
	pub async fn fetch_query<T>(&self, resource: WalrusResource, query: &PageQuery) -> Result<Page<T>>
	where
		T: DeserializeOwned,
	{
		let request = self.request(resource, query)?;
		let response = self.transport.get(request).await?;

		http::decode_json(resource.endpoint(), response)
	}

	/// Validators sorted by stake, descending.
	pub async fn validators(&self, page: u32) -> Result<Page<WalrusValidator>> {
		self.fetch_page(WalrusResource::Validators, page).await
	}

	/// Accounts sorted by balance, descending.
	pub async fn accounts(&self, page: u32) -> Result<Page<WalrusAccount>> {
		self.fetch_page(WalrusResource::Accounts, page).await
	}

	/// Blobs sorted by timestamp, descending.
	pub async fn blobs(&self, page: u32) -> Result<Page<WalrusBlob>> {
		self.fetch_page(WalrusResource::Blobs, page).await
	}
}
#[cfg(feature = "reqwest")]
impl BlockberryClient<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn new(config: BlockberryConfig) -> Self {
		Self::with_transport(config, ReqwestHttpClient::default())
	}
}
impl<H> Clone for BlockberryClient<H>
where
	H: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { config: self.config.clone(), transport: self.transport.clone() }
	}
}
impl<H> Debug for BlockberryClient<H>
where
	H: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BlockberryClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("page_size", &self.config.page_size)
			.finish()
	}
}
