//! Time sources used by the governor's throttle.

// self
use crate::_prelude::*;

/// Boxed sleep future returned by [`Clock::sleep`].
pub type ClockSleep = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Monotonic time source plus an awaitable delay.
///
/// The governor reads [`Clock::now`] to measure elapsed time since the last dispatch and awaits
/// [`Clock::sleep`] for the remainder of the throttle window. Dropping the sleep future must be
/// enough to abandon the wait.
pub trait Clock
where
	Self: 'static + Send + Sync,
{
	/// Returns the current monotonic instant.
	fn now(&self) -> Instant;

	/// Suspends the caller for `duration`.
	fn sleep(&self, duration: StdDuration) -> ClockSleep;
}

/// Default clock backed by tokio's timer.
///
/// Honors `tokio::time::pause`, so tests can drive the throttle without real waits.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;
impl Clock for TokioClock {
	fn now(&self) -> Instant {
		Instant::now()
	}

	fn sleep(&self, duration: StdDuration) -> ClockSleep {
		Box::pin(tokio::time::sleep(duration))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn tokio_clock_advances_with_paused_time() {
		let clock = TokioClock;
		let start = clock.now();

		clock.sleep(StdDuration::from_millis(1_500)).await;

		assert!(clock.now() - start >= StdDuration::from_millis(1_500));
	}
}
