//! Per-governor counters that stay available without the `metrics` feature.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing how a governor served its callers.
#[derive(Debug, Default)]
pub struct GovernorStats {
	dispatches: AtomicU64,
	cache_hits: AtomicU64,
	failures: AtomicU64,
	cancellations: AtomicU64,
}
impl GovernorStats {
	/// Returns the number of fetcher invocations.
	pub fn dispatches(&self) -> u64 {
		self.dispatches.load(Ordering::Relaxed)
	}

	/// Returns the number of calls answered from the cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of fetcher failures propagated to callers.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of calls cancelled during the throttle wait.
	pub fn cancellations(&self) -> u64 {
		self.cancellations.load(Ordering::Relaxed)
	}

	pub(crate) fn record_dispatch(&self) {
		self.dispatches.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cancellation(&self) {
		self.cancellations.fetch_add(1, Ordering::Relaxed);
	}
}
