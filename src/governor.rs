//! Rate-limited, per-key cached fetch governor.
//!
//! A [`RequestGovernor`] mediates access to a paginated remote resource. Each key is fetched at
//! most once per governor lifetime: successful payloads are cached until the governor is
//! dropped, failures are propagated verbatim and leave no trace in the cache. Dispatches across
//! all keys are spaced by at least [`GovernorConfig::min_interval`], measured from the moment the
//! previous fetcher was invoked rather than from when it completed.
//!
//! The only suspension point is the throttle wait. Dropping a fetch future during that wait, or
//! firing the [`CancellationToken`] handed to [`RequestGovernor::fetch_with_cancel`], abandons
//! the call before the dispatch timestamp is recorded, so a cancelled call never changes
//! governor state. Once the fetcher has been invoked the call runs to completion.

pub mod clock;
pub mod config;
pub mod stats;

pub use clock::*;
pub use config::*;
pub use stats::*;

// self
use crate::{
	_prelude::*,
	error::Cancelled,
	obs::{self, FetchOutcome, FetchSpan, fetch_debug, fetch_warn},
};

enum Reservation<T> {
	Cached(Arc<T>),
	Dispatch,
}

/// Throttled, per-key cached wrapper around caller-supplied fetchers.
///
/// The governor owns its cache and throttle state exclusively; construct one per session and
/// drop it when the session ends. Independent governors never coordinate.
pub struct RequestGovernor<K, T, C = TokioClock>
where
	C: Clock,
{
	config: GovernorConfig,
	clock: C,
	cache: RwLock<HashMap<K, Arc<T>>>,
	last_dispatch: Mutex<Option<Instant>>,
	turn: AsyncMutex<()>,
	stats: GovernorStats,
}
impl<K, T> RequestGovernor<K, T>
where
	K: Eq + Hash,
{
	/// Creates a governor driven by tokio's timer.
	pub fn new(config: GovernorConfig) -> Self {
		Self::with_clock(config, TokioClock)
	}
}
impl<K, T, C> RequestGovernor<K, T, C>
where
	K: Eq + Hash,
	C: Clock,
{
	/// Creates a governor that measures and waits with the provided clock.
	pub fn with_clock(config: GovernorConfig, clock: C) -> Self {
		Self {
			config,
			clock,
			cache: Default::default(),
			last_dispatch: Default::default(),
			turn: AsyncMutex::new(()),
			stats: Default::default(),
		}
	}

	/// Returns the cached payload for `key` or dispatches `fetcher` once the throttle allows.
	///
	/// Cache hits return immediately, even inside the throttle window. On a miss the caller
	/// waits out whatever remains of the window, the dispatch time is recorded, and `fetcher` is
	/// invoked. A successful payload is cached under `key`; a failure is returned unchanged and
	/// nothing is cached, so a later call for the same key dispatches again.
	///
	/// Dropping the returned future before the fetcher starts leaves the governor untouched.
	pub async fn fetch<F, Fut, E>(&self, key: K, fetcher: F) -> Result<Arc<T>, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		let span = FetchSpan::new(self.config.label(), "fetch");

		span.instrument(async move {
			match self.reserve(&key).await {
				Reservation::Cached(hit) => Ok(hit),
				Reservation::Dispatch => self.dispatch(key, fetcher).await,
			}
		})
		.await
	}

	/// Variant of [`RequestGovernor::fetch`] that observes `cancel` during the throttle wait.
	///
	/// When `cancel` fires before the fetcher is invoked the call returns [`Cancelled`] and the
	/// dispatch timestamp and cache are left as they were. Cancellation after dispatch is not
	/// retractable: the fetcher completes and its outcome is cached or returned as usual.
	pub async fn fetch_with_cancel<F, Fut, E>(
		&self,
		key: K,
		cancel: &CancellationToken,
		fetcher: F,
	) -> Result<Arc<T>, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
		E: From<Cancelled>,
	{
		let span = FetchSpan::new(self.config.label(), "fetch_with_cancel");

		span.instrument(async move {
			if let Some(hit) = self.lookup(&key) {
				return Ok(hit);
			}

			let reservation = tokio::select! {
				biased;

				_ = cancel.cancelled() => {
					self.stats.record_cancellation();
					obs::record_fetch_outcome(self.config.label(), FetchOutcome::Cancelled);
					fetch_debug!("Fetch cancelled before dispatch.");

					return Err(Cancelled.into());
				},
				reservation = self.reserve(&key) => reservation,
			};

			match reservation {
				Reservation::Cached(hit) => Ok(hit),
				Reservation::Dispatch => self.dispatch(key, fetcher).await,
			}
		})
		.await
	}

	/// Returns the cached payload for `key` without dispatching or counting a hit.
	pub fn get(&self, key: &K) -> Option<Arc<T>> {
		self.cache.read().get(key).cloned()
	}

	/// Reports whether `key` already has a cached payload.
	pub fn contains(&self, key: &K) -> bool {
		self.cache.read().contains_key(key)
	}

	/// Number of cached keys.
	pub fn len(&self) -> usize {
		self.cache.read().len()
	}

	/// Reports whether nothing has been cached yet.
	pub fn is_empty(&self) -> bool {
		self.cache.read().is_empty()
	}

	/// Instant the most recent fetcher was invoked, if any.
	pub fn last_dispatch_at(&self) -> Option<Instant> {
		*self.last_dispatch.lock()
	}

	/// Counters describing how callers were served.
	pub fn stats(&self) -> &GovernorStats {
		&self.stats
	}

	/// Configuration the governor was built with.
	pub fn config(&self) -> &GovernorConfig {
		&self.config
	}

	fn lookup(&self, key: &K) -> Option<Arc<T>> {
		let hit = self.get(key)?;

		self.stats.record_cache_hit();
		obs::record_fetch_outcome(self.config.label(), FetchOutcome::CacheHit);
		fetch_debug!("Serving cached payload.");

		Some(hit)
	}

	/// Waits for this caller's dispatch slot and stamps it.
	///
	/// The turn guard serializes the elapsed check, the wait, and the timestamp update across
	/// concurrent callers. Nothing is mutated until the wait has finished, so dropping this
	/// future mid-wait is free of side effects.
	async fn reserve(&self, key: &K) -> Reservation<T> {
		if let Some(hit) = self.lookup(key) {
			return Reservation::Cached(hit);
		}

		let _turn = self.turn.lock().await;
		let previous = *self.last_dispatch.lock();

		if let Some(previous) = previous {
			let interval = self.config.min_interval();
			let elapsed = self.clock.now().saturating_duration_since(previous);

			if elapsed < interval {
				let wait = interval - elapsed;

				obs::record_fetch_outcome(self.config.label(), FetchOutcome::Throttled);
				fetch_debug!(?wait, "Waiting for throttle window.");

				self.clock.sleep(wait).await;
			}
		}

		// Another caller may have filled the key while this one waited.
		if let Some(hit) = self.lookup(key) {
			return Reservation::Cached(hit);
		}

		*self.last_dispatch.lock() = Some(self.clock.now());

		Reservation::Dispatch
	}

	async fn dispatch<F, Fut, E>(&self, key: K, fetcher: F) -> Result<Arc<T>, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		self.stats.record_dispatch();
		obs::record_fetch_outcome(self.config.label(), FetchOutcome::Dispatched);

		match fetcher().await {
			Ok(payload) => {
				let payload = self.cache.write().entry(key).or_insert(Arc::new(payload)).clone();

				obs::record_fetch_outcome(self.config.label(), FetchOutcome::Success);

				Ok(payload)
			},
			Err(e) => {
				self.stats.record_failure();
				obs::record_fetch_outcome(self.config.label(), FetchOutcome::Failure);
				fetch_warn!("Fetcher failed; nothing cached.");

				Err(e)
			},
		}
	}
}
impl<K, T, C> Debug for RequestGovernor<K, T, C>
where
	C: Clock,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestGovernor")
			.field("config", &self.config)
			.field("cached", &self.cache.read().len())
			.field("last_dispatch", &*self.last_dispatch.lock())
			.finish()
	}
}
