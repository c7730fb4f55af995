//! Optional observability helpers for governed fetches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `walrus_governor.fetch` with the `governor`
//!   (config label) and `stage` (call site) fields, plus debug events for throttle decisions.
//! - Enable `metrics` to increment the `walrus_governor_fetch_total` counter for every cache hit,
//!   throttle wait, dispatch, success, failure, and cancellation, labeled by `governor` +
//!   `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

pub(crate) use self::tracing::{fetch_debug, fetch_warn};

// self
use crate::_prelude::*;

/// Outcome labels recorded for each governed fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Served from the governor cache.
	CacheHit,
	/// Caller had to wait for the throttle window.
	Throttled,
	/// Fetcher was invoked.
	Dispatched,
	/// Fetcher succeeded and the payload was cached.
	Success,
	/// Fetcher failed; the failure was propagated.
	Failure,
	/// Caller cancelled during the throttle wait.
	Cancelled,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::CacheHit => "cache_hit",
			FetchOutcome::Throttled => "throttled",
			FetchOutcome::Dispatched => "dispatched",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
			FetchOutcome::Cancelled => "cancelled",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
