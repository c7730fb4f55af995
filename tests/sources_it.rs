#![cfg(feature = "reqwest")]

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use walrus_governor::{
	error::{Error, TransportError, UpstreamError},
	source::{
		ApiKey, InsidexClient, InsidexConfig, OrderBookClient, OrderBookConfig, OverviewClient,
		OverviewConfig, StorageAmount, StorageUnit,
	},
	url::Url,
};

const PRICE_PATH: &str = "/coins/0x2::wal::WAL/price-and-mc";
const OVERVIEW: &str = r#"{
	"walTokenPrice": 0.41,
	"marketCap": 612000000,
	"totalSupply": 5000000000,
	"networkStats": {"storageUtilization": 19.2, "usedCapacityTB": 790.0, "totalCapacityPB": 4.1, "storagePools": "125"},
	"networkConfig": {"currentEpoch": 11, "epochDurationHours": 336, "nShards": 1000},
	"storagePricing": {"storagePricePerMB": "11000", "writePricePerMB": "20000"},
	"storageCostCalculator": {
		"amount": 100,
		"unit": "GB",
		"costs": [{"period": "1 MONTH", "epochs": 2.14, "costWAL": 0.79, "costUSD": 0.0034, "storageCost": 0.6, "writeCost": 0.19}]
	},
	"lastUpdated": "2025-09-06T08:30:00Z"
}"#;

fn insidex_config(server: &MockServer, key: Option<&str>) -> InsidexConfig {
	let api_key = key.map(|value| ApiKey::new(value).expect("Integration key should be valid."));

	InsidexConfig::new(api_key)
		.expect("Default insidex endpoint should parse.")
		.with_endpoint(Url::parse(&server.url(PRICE_PATH)).expect("Mock price URL should parse."))
}

fn overview_config(server: &MockServer) -> OverviewConfig {
	OverviewConfig::new()
		.expect("Default overview endpoint should parse.")
		.with_endpoint(
			Url::parse(&server.url("/api/walrus/overview-cached"))
				.expect("Mock overview URL should parse."),
		)
}

fn order_book_config(server: &MockServer) -> OrderBookConfig {
	OrderBookConfig::new()
		.expect("Default indexer URL should parse.")
		.with_base_url(Url::parse(&server.url("/orderbook")).expect("Mock indexer URL should parse."))
}

#[tokio::test]
async fn insidex_price_sends_key_when_configured() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PRICE_PATH).header("x-api-key", "insidex-it");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"marketCap":2150000000.0,"price":0.43,"supply":5000000000.0}"#);
		})
		.await;
	let client = InsidexClient::new(insidex_config(&server, Some("insidex-it")));
	let price = client.price().await.expect("Price should load.");

	assert_eq!(price.price, 0.43);
	assert_eq!(price.market_cap, 2_150_000_000.0);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn insidex_unauthorized_is_a_status_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PRICE_PATH);
			then.status(401).body("{\"message\":\"Unauthorized\"}");
		})
		.await;
	let client = InsidexClient::new(insidex_config(&server, None));
	let err = client.price().await.expect_err("Unauthorized request should fail.");

	assert!(matches!(err, Error::Upstream(UpstreamError::Status { status: 401, .. })));
	assert_eq!(err.to_string(), "API error from insidex.price: 401 Unauthorized.");
}

#[tokio::test]
async fn overview_decodes_live_payload() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/walrus/overview-cached")
				.header("content-type", "application/json");
			then.status(200).header("content-type", "application/json").body(OVERVIEW);
		})
		.await;
	let client = OverviewClient::new(overview_config(&server));
	let snapshot = client.fetch_or_fallback(100.0, "GB").await;

	assert!(!snapshot.fallback);
	assert_eq!(snapshot.overview.network_config.current_epoch, 11);
	assert_eq!(snapshot.overview.storage_cost_calculator.costs[0].cost_wal, 0.79);
	assert!(!snapshot.overview.from_cache);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn overview_falls_back_when_backend_fails() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/walrus/overview-cached");
			then.status(500);
		})
		.await;
	let client = OverviewClient::new(overview_config(&server));
	let snapshot = client.fetch_or_fallback(2.5, "TB").await;

	assert!(snapshot.fallback);
	assert_eq!(snapshot.overview.network_config.current_epoch, 10);
	assert_eq!(snapshot.overview.storage_cost_calculator.amount, 2.5);
	assert_eq!(snapshot.overview.storage_cost_calculator.unit, "TB");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn overview_timeout_is_a_transport_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/walrus/overview-cached");
			then.status(200).delay(Duration::from_millis(500)).body(OVERVIEW);
		})
		.await;
	let client =
		OverviewClient::new(overview_config(&server).with_timeout(Duration::from_millis(50)));
	let err = client.fetch().await.expect_err("Slow backend should time out.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
}

#[tokio::test]
async fn storage_costs_send_size_and_unit() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/walrus/storage-costs")
				.query_param("size", "2.5")
				.query_param("unit", "TB");
			then.status(200).header("content-type", "application/json").body(
				r#"{"success":true,"input":{"size":2.5,"unit":"TB"},"costs":{"oneDay":8.0,"oneEpoch":110.0,"oneMonth":235.4,"oneYear":2867.7},"currency":"WAL","note":""}"#,
			);
		})
		.await;
	let config = overview_config(&server).with_storage_costs_endpoint(
		Url::parse(&server.url("/api/walrus/storage-costs"))
			.expect("Mock storage-costs URL should parse."),
	);
	let client = OverviewClient::new(config);
	let estimate = client
		.calculate_storage_costs(0.5, StorageAmount::new(2.5, StorageUnit::Tb))
		.await;

	assert!(!estimate.fallback);
	assert_eq!(estimate.costs.len(), 3);
	assert_eq!(estimate.costs[0].period, "1 EPOCH (14 days)");
	assert_eq!(estimate.costs[0].cost_usd, 55.0);
	assert_eq!(estimate.costs[2].cost_wal, 2867.7);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn order_book_reads_pair_snapshot() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orderbook/SUI_USDC");
			then.status(200).header("content-type", "application/json").body(
				r#"{"timestamp":"1757152800000","bids":[["3.41","1200"]],"asks":[["3.42","650"],["3.43","90"]]}"#,
			);
		})
		.await;
	let client = OrderBookClient::new(order_book_config(&server));
	let book = client.order_book("SUI_USDC").await.expect("Order book should load.");

	assert_eq!(book.timestamp, "1757152800000");
	assert_eq!(book.best_bid().map(|level| level.price.as_str()), Some("3.41"));
	assert_eq!(book.asks.len(), 2);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn order_book_unknown_pair_is_a_status_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orderbook/NOPE_USDC");
			then.status(404).body("{}");
		})
		.await;
	let client = OrderBookClient::new(order_book_config(&server));
	let err = client.order_book("NOPE_USDC").await.expect_err("Unknown pair should fail.");

	assert!(matches!(err, Error::Upstream(UpstreamError::Status { status: 404, .. })));
	assert_eq!(err.to_string(), "API error from deepbook.orderbook: 404 Not Found.");
}
