//! Throttled, per-key cached request governor for Walrus analytics APIs.
//!
//! [`governor::RequestGovernor`] spaces dispatches and caches successful payloads per key;
//! [`source`] holds typed Blockberry, insidex, and overview clients built on [`http::HttpTransport`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod governor;
pub mod http;
pub mod obs;
pub mod session;
pub mod source;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		governor::{Clock, ClockSleep, GovernorConfig, TokioClock},
		http::{HttpFuture, HttpGet, HttpResponse, HttpTransport},
		source::{ApiKey, BlockberryConfig},
	};

	/// Clock that defers to tokio time while recording every requested sleep.
	///
	/// Pair it with `#[tokio::test(start_paused = true)]` so recorded waits stay deterministic.
	#[derive(Clone, Debug, Default)]
	pub struct RecordingClock {
		inner: TokioClock,
		sleeps: Arc<Mutex<Vec<StdDuration>>>,
	}
	impl RecordingClock {
		/// Returns every sleep duration requested so far.
		pub fn sleeps(&self) -> Vec<StdDuration> {
			self.sleeps.lock().clone()
		}
	}
	impl Clock for RecordingClock {
		fn now(&self) -> Instant {
			self.inner.now()
		}

		fn sleep(&self, duration: StdDuration) -> ClockSleep {
			self.sleeps.lock().push(duration);

			self.inner.sleep(duration)
		}
	}

	/// Scripted [`HttpTransport`] that replays queued responses and records requests.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedTransport {
		responses: Arc<Mutex<VecDeque<HttpResponse>>>,
		requests: Arc<Mutex<Vec<(Instant, HttpGet)>>>,
	}
	impl ScriptedTransport {
		/// Queues a JSON response with the provided status.
		pub fn push_json(&self, status: u16, body: impl Into<String>) {
			self.responses.lock().push_back(HttpResponse {
				status,
				reason: None,
				retry_after: None,
				body: body.into().into_bytes(),
			});
		}

		/// Queues a prepared response.
		pub fn push(&self, response: HttpResponse) {
			self.responses.lock().push_back(response);
		}

		/// Returns every request observed so far, tagged with the tokio instant it arrived.
		pub fn requests(&self) -> Vec<(Instant, HttpGet)> {
			self.requests.lock().clone()
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn get(&self, request: HttpGet) -> HttpFuture<'_> {
			self.requests.lock().push((Instant::now(), request));

			let next = self.responses.lock().pop_front();

			Box::pin(async move {
				Ok(next.unwrap_or(HttpResponse {
					status: 503,
					reason: Some("No scripted response".into()),
					retry_after: None,
					body: Vec::new(),
				}))
			})
		}
	}

	/// Builds a governor configuration with the provided interval in milliseconds.
	pub fn test_governor_config(millis: i64) -> GovernorConfig {
		GovernorConfig::from_millis(millis)
			.expect("Test governor interval should be non-negative.")
			.with_label("test")
	}

	/// Builds a Blockberry configuration pointing at `base_url` with a fixture API key.
	pub fn test_blockberry_config(base_url: &str) -> BlockberryConfig {
		BlockberryConfig::builder()
			.base_url(Url::parse(base_url).expect("Test Blockberry base URL should parse."))
			.api_key(ApiKey::new("test-api-key").expect("Test API key should be valid."))
			.build()
			.expect("Test Blockberry configuration should build.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio::time::Instant;
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	#[cfg(any(test, feature = "reqwest"))]
	pub use crate::error::Error;
	pub use crate::error::Result;
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
