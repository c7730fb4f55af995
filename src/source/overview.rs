//! Cached Walrus network overview backend.
//!
//! [`OverviewClient::fetch`] propagates every failure. [`OverviewClient::fetch_or_fallback`]
//! is the dashboard-facing variant: when the backend is unreachable it answers with a built-in
//! snapshot instead, resized to the caller's storage amount and unit, and flags the result as a
//! fallback so callers can tell the two apart.
//!
//! The same backend prices storage. [`OverviewClient::calculate_storage_costs`] asks the
//! storage-costs endpoint for a size and falls back to the overview's calculator rows when that
//! fails. [`WalrusOverview::metrics`] derives the per-byte prices and durations the dashboard
//! charts use.

// self
use crate::{
	_prelude::*,
	error::{ConfigError, UpstreamError},
	http::{self, HttpGet, HttpTransport},
	obs::fetch_warn,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const ENDPOINT: &str = "walrus.overview";
const STORAGE_COSTS_ENDPOINT: &str = "walrus.storage_costs";
const FROST_PER_MB_SCALE: u64 = 1_000_000;

/// Network-wide storage statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
	/// Used share of total capacity, in percent.
	pub storage_utilization: f64,
	/// Used capacity in terabytes.
	#[serde(rename = "usedCapacityTB")]
	pub used_capacity_tb: f64,
	/// Total capacity in petabytes.
	#[serde(rename = "totalCapacityPB")]
	pub total_capacity_pb: f64,
	/// Storage pool count, as reported upstream.
	pub storage_pools: String,
}

/// Epoch and sharding parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
	/// Current epoch number.
	pub current_epoch: u64,
	/// Epoch length in hours.
	pub epoch_duration_hours: u64,
	/// Number of shards.
	pub n_shards: u64,
}

/// Per-megabyte prices in FROST, kept as strings to avoid precision loss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoragePricing {
	/// Storage price per MB per epoch.
	#[serde(rename = "storagePricePerMB")]
	pub storage_price_per_mb: String,
	/// One-off write price per MB.
	#[serde(rename = "writePricePerMB")]
	pub write_price_per_mb: String,
}

/// Cost of storing the calculator amount for one period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCost {
	/// Period label, e.g. `1 MONTH`.
	pub period: String,
	/// Period length in epochs.
	pub epochs: f64,
	/// Total cost in WAL.
	#[serde(rename = "costWAL")]
	pub cost_wal: f64,
	/// Total cost in USD.
	#[serde(rename = "costUSD")]
	pub cost_usd: f64,
	/// Storage component in WAL.
	pub storage_cost: f64,
	/// Write component in WAL.
	pub write_cost: f64,
}

/// Storage cost estimates for a given amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageCostCalculator {
	/// Stored amount.
	pub amount: f64,
	/// Unit of `amount`, e.g. `GB`.
	pub unit: String,
	/// Costs per period.
	pub costs: Vec<StorageCost>,
}

/// Walrus overview served by the cached backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalrusOverview {
	/// WAL price in USD.
	pub wal_token_price: f64,
	/// WAL market cap in USD.
	pub market_cap: f64,
	/// WAL total supply.
	pub total_supply: f64,
	/// Storage statistics.
	pub network_stats: NetworkStats,
	/// Epoch parameters.
	pub network_config: NetworkConfig,
	/// Storage prices.
	pub storage_pricing: StoragePricing,
	/// Cost estimates.
	pub storage_cost_calculator: StorageCostCalculator,
	/// When the backend last refreshed the data.
	#[serde(with = "time::serde::rfc3339")]
	pub last_updated: OffsetDateTime,
	/// Backend served this from its own cache.
	#[serde(default)]
	pub from_cache: bool,
	/// Backend cache is past its refresh deadline.
	#[serde(default)]
	pub stale: bool,
}
impl WalrusOverview {
	/// Built-in snapshot used when the backend is unreachable.
	pub fn fallback(amount: f64, unit: impl Into<String>) -> Self {
		let cost = |period: &str, epochs: f64, cost_wal: f64, cost_usd: f64| StorageCost {
			period: period.into(),
			epochs,
			cost_wal,
			cost_usd,
			storage_cost: cost_wal,
			write_cost: 2.0,
		};

		Self {
			wal_token_price: 0.004_326_69,
			market_cap: 0.0,
			total_supply: 5_000_000_000.0,
			network_stats: NetworkStats {
				storage_utilization: 18.563_768_774_476_802,
				used_capacity_tb: 773.490_365_603_2,
				total_capacity_pb: 4.166_666_666_666_666,
				storage_pools: "123".into(),
			},
			network_config: NetworkConfig {
				current_epoch: 10,
				epoch_duration_hours: 336,
				n_shards: 1_000,
			},
			storage_pricing: StoragePricing {
				storage_price_per_mb: "11000".into(),
				write_price_per_mb: "20000".into(),
			},
			storage_cost_calculator: StorageCostCalculator {
				amount,
				unit: unit.into(),
				costs: vec![
					cost("1 WEEK", 0.5, 0.1832, 0.000_793),
					cost("1 MONTH", 2.14, 0.7864, 0.003_402),
					cost("1 YEAR", 26.07, 9.5754, 0.041_434),
				],
			},
			last_updated: OffsetDateTime::now_utc(),
			from_cache: false,
			stale: false,
		}
	}

	/// Derives per-byte prices, used capacity in bytes, and the epoch length.
	///
	/// Fails with [`UpstreamError::Invalid`] when a price is not a whole FROST amount.
	pub fn metrics(&self) -> Result<WalrusMetrics> {
		Ok(WalrusMetrics {
			storage_price_frost_per_byte: frost_per_byte(
				"storagePricePerMB",
				&self.storage_pricing.storage_price_per_mb,
			)?,
			write_price_frost_per_byte: frost_per_byte(
				"writePricePerMB",
				&self.storage_pricing.write_price_per_mb,
			)?,
			used_capacity_bytes: self.network_stats.used_capacity_tb * StorageUnit::Tb.bytes() as f64,
			epoch_duration: StdDuration::from_secs(
				self.network_config.epoch_duration_hours.saturating_mul(3_600),
			),
		})
	}
}

/// Quantities derived from a [`WalrusOverview`].
#[derive(Clone, Debug, PartialEq)]
pub struct WalrusMetrics {
	/// Storage price, scaled from the per-MB FROST quote.
	pub storage_price_frost_per_byte: u64,
	/// Write price, scaled from the per-MB FROST quote.
	pub write_price_frost_per_byte: u64,
	/// Used capacity in bytes.
	pub used_capacity_bytes: f64,
	/// Length of one epoch.
	pub epoch_duration: StdDuration,
}

fn frost_per_byte(field: &str, raw: &str) -> Result<u64> {
	raw.trim()
		.parse::<u64>()
		.ok()
		.and_then(|frost| frost.checked_mul(FROST_PER_MB_SCALE))
		.ok_or_else(|| {
			UpstreamError::Invalid {
				endpoint: ENDPOINT,
				message: format!("{field} `{raw}` is not a FROST amount"),
			}
			.into()
		})
}

/// Overview paired with where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct OverviewSnapshot {
	/// Overview data.
	pub overview: WalrusOverview,
	/// `true` when the backend failed and the built-in snapshot was served.
	pub fallback: bool,
}

/// Size unit accepted by the storage-costs endpoint. Units are decimal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StorageUnit {
	/// Kilobytes.
	Kb,
	/// Megabytes.
	Mb,
	/// Gigabytes.
	Gb,
	/// Terabytes.
	Tb,
}
impl StorageUnit {
	/// Returns the query-string value.
	pub const fn as_str(self) -> &'static str {
		match self {
			StorageUnit::Kb => "KB",
			StorageUnit::Mb => "MB",
			StorageUnit::Gb => "GB",
			StorageUnit::Tb => "TB",
		}
	}

	/// Bytes in one unit.
	pub const fn bytes(self) -> u64 {
		match self {
			StorageUnit::Kb => 1_000,
			StorageUnit::Mb => 1_000_000,
			StorageUnit::Gb => 1_000_000_000,
			StorageUnit::Tb => 1_000_000_000_000,
		}
	}
}
impl Display for StorageUnit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Amount of storage to price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StorageAmount {
	/// Size in `unit`s.
	pub amount: f64,
	/// Unit of `amount`.
	pub unit: StorageUnit,
}
impl StorageAmount {
	/// Size priced when the caller gives none (1 MiB).
	pub const DEFAULT_SIZE_BYTES: u64 = 1024 * 1024;

	/// Uses an explicit amount and unit.
	pub fn new(amount: f64, unit: StorageUnit) -> Self {
		Self { amount, unit }
	}

	/// Expresses `bytes` in TB from 10^12 bytes, GB from 10^9, and MB below that.
	pub fn from_bytes(bytes: u64) -> Self {
		let unit = if bytes >= StorageUnit::Tb.bytes() {
			StorageUnit::Tb
		} else if bytes >= StorageUnit::Gb.bytes() {
			StorageUnit::Gb
		} else {
			StorageUnit::Mb
		};

		Self { amount: bytes as f64 / unit.bytes() as f64, unit }
	}
}
impl Default for StorageAmount {
	fn default() -> Self {
		Self::from_bytes(Self::DEFAULT_SIZE_BYTES)
	}
}

/// Echo of the priced size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageCostsInput {
	/// Requested size.
	pub size: f64,
	/// Requested unit.
	pub unit: String,
}

/// WAL costs per period returned by the storage-costs endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCostTable {
	/// One day.
	#[serde(default)]
	pub one_day: f64,
	/// One epoch (14 days).
	#[serde(default)]
	pub one_epoch: f64,
	/// One month.
	#[serde(default)]
	pub one_month: f64,
	/// One year.
	#[serde(default)]
	pub one_year: f64,
}
impl StorageCostTable {
	/// Calculator rows for the epoch, month, and year periods, priced at `wal_price_usd`.
	pub fn rows(&self, wal_price_usd: f64) -> Vec<StorageCost> {
		let periods = [
			("1 EPOCH (14 days)", 1.0, self.one_epoch),
			("1 MONTH", 2.14, self.one_month),
			("1 YEAR", 26.07, self.one_year),
		];

		periods
			.into_iter()
			.map(|(period, epochs, cost_wal)| StorageCost {
				period: period.into(),
				epochs,
				cost_wal,
				cost_usd: cost_wal * wal_price_usd,
				storage_cost: cost_wal,
				write_cost: 0.0,
			})
			.collect()
	}
}

/// Storage-costs endpoint response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageCostsResponse {
	/// `false` when the backend could not price the request.
	pub success: bool,
	/// Echo of the request.
	#[serde(default)]
	pub input: Option<StorageCostsInput>,
	/// Costs per period.
	#[serde(default)]
	pub costs: StorageCostTable,
	/// Currency of `costs`.
	#[serde(default)]
	pub currency: String,
	/// Free-form backend note.
	#[serde(default)]
	pub note: String,
	/// Failure description when `success` is `false`.
	#[serde(default)]
	pub error: Option<String>,
}

/// Storage cost rows paired with where they came from.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageCostEstimate {
	/// Amount that was priced.
	pub amount: StorageAmount,
	/// One row per period.
	pub costs: Vec<StorageCost>,
	/// `true` when the rows come from the overview calculator instead of the storage-costs endpoint.
	pub fallback: bool,
}

/// Overview backend settings.
#[derive(Clone, Debug)]
pub struct OverviewConfig {
	/// Cached overview URL.
	pub endpoint: Url,
	/// Storage-costs URL.
	pub storage_costs_endpoint: Url,
	/// Request timeout.
	pub timeout: StdDuration,
}
impl OverviewConfig {
	/// Default cached-overview URL.
	pub const DEFAULT_ENDPOINT: &'static str =
		"https://walrus5-gucco4za.b4a.run/api/walrus/overview-cached";
	/// Default storage-costs URL.
	pub const DEFAULT_STORAGE_COSTS_ENDPOINT: &'static str =
		"https://walrus5-gucco4za.b4a.run/api/walrus/storage-costs";
	/// Default request timeout.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

	/// Creates a configuration with the default endpoints and timeout.
	pub fn new() -> Result<Self, ConfigError> {
		Ok(Self {
			endpoint: Url::parse(Self::DEFAULT_ENDPOINT)?,
			storage_costs_endpoint: Url::parse(Self::DEFAULT_STORAGE_COSTS_ENDPOINT)?,
			timeout: Self::DEFAULT_TIMEOUT,
		})
	}

	/// Overrides the overview endpoint.
	pub fn with_endpoint(mut self, endpoint: Url) -> Self {
		self.endpoint = endpoint;

		self
	}

	/// Overrides the storage-costs endpoint.
	pub fn with_storage_costs_endpoint(mut self, endpoint: Url) -> Self {
		self.storage_costs_endpoint = endpoint;

		self
	}

	/// Overrides the timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}
}

#[cfg(feature = "reqwest")]
/// Overview client specialized for the crate's default reqwest transport.
pub type ReqwestOverviewClient = OverviewClient<ReqwestHttpClient>;

/// Client for the cached Walrus overview backend.
pub struct OverviewClient<H>
where
	H: ?Sized + HttpTransport,
{
	config: OverviewConfig,
	transport: Arc<H>,
}
impl<H> OverviewClient<H>
where
	H: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(config: OverviewConfig, transport: impl Into<Arc<H>>) -> Self {
		Self { config, transport: transport.into() }
	}

	/// Fetches the overview, propagating any failure.
	pub async fn fetch(&self) -> Result<WalrusOverview> {
		let request = HttpGet::new(self.config.endpoint.clone())
			.header("content-type", "application/json")
			.timeout(self.config.timeout);
		let response = self.transport.get(request).await?;

		http::decode_json(ENDPOINT, response)
	}

	/// Fetches the overview, answering with [`WalrusOverview::fallback`] on failure.
	pub async fn fetch_or_fallback(&self, amount: f64, unit: &str) -> OverviewSnapshot {
		match self.fetch().await {
			Ok(overview) => OverviewSnapshot { overview, fallback: false },
			#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
			Err(e) => {
				fetch_warn!(error = %e, "Walrus overview unavailable, serving fallback snapshot.");

				OverviewSnapshot { overview: WalrusOverview::fallback(amount, unit), fallback: true }
			},
		}
	}

	/// Prices `amount` with the storage-costs endpoint.
	///
	/// A response with `success: false` becomes [`UpstreamError::Invalid`] carrying the
	/// backend's error text.
	pub async fn storage_costs(&self, amount: StorageAmount) -> Result<StorageCostsResponse> {
		let mut url = self.config.storage_costs_endpoint.clone();

		url.query_pairs_mut()
			.append_pair("size", &amount.amount.to_string())
			.append_pair("unit", amount.unit.as_str());

		let request = HttpGet::new(url).timeout(self.config.timeout);
		let response = self.transport.get(request).await?;
		let costs: StorageCostsResponse = http::decode_json(STORAGE_COSTS_ENDPOINT, response)?;

		if !costs.success {
			let message =
				costs.error.unwrap_or_else(|| String::from("Failed to calculate storage costs"));

			return Err(UpstreamError::Invalid { endpoint: STORAGE_COSTS_ENDPOINT, message }.into());
		}

		Ok(costs)
	}

	/// Cost rows for `amount` at `wal_price_usd`.
	///
	/// When the storage-costs endpoint fails, the rows come from the overview calculator (live or
	/// built-in) for the same amount, with any `1 DAY` row dropped.
	pub async fn calculate_storage_costs(
		&self,
		wal_price_usd: f64,
		amount: StorageAmount,
	) -> StorageCostEstimate {
		match self.storage_costs(amount).await {
			Ok(response) => {
				let costs = response.costs.rows(wal_price_usd);

				StorageCostEstimate { amount, costs, fallback: false }
			},
			#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
			Err(e) => {
				fetch_warn!(error = %e, "Storage costs unavailable, using overview calculator.");

				let snapshot = self.fetch_or_fallback(amount.amount, amount.unit.as_str()).await;
				let costs = snapshot
					.overview
					.storage_cost_calculator
					.costs
					.into_iter()
					.filter(|cost| cost.period != "1 DAY")
					.collect();

				StorageCostEstimate { amount, costs, fallback: true }
			},
		}
	}

	/// Derived network figures from the overview, or from the built-in snapshot when the backend
	/// is unreachable.
	pub async fn network_metrics(&self) -> Result<WalrusMetrics> {
		self.fetch_or_fallback(100.0, StorageUnit::Gb.as_str()).await.overview.metrics()
	}
}
#[cfg(feature = "reqwest")]
impl OverviewClient<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn new(config: OverviewConfig) -> Self {
		Self::with_transport(config, ReqwestHttpClient::default())
	}
}
impl<H> Debug for OverviewClient<H>
where
	H: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OverviewClient")
			.field("endpoint", &self.config.endpoint.as_str())
			.field("storage_costs_endpoint", &self.config.storage_costs_endpoint.as_str())
			.field("timeout", &self.config.timeout)
			.finish()
	}
}
