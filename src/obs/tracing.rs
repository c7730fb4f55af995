// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFetch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFetch<F> = F;

/// A span builder used by governed fetches.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the governor label + stage.
	pub fn new(governor: &'static str, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("walrus_governor.fetch", governor, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (governor, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFetch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event inside the current span when tracing is enabled.
macro_rules! fetch_debug {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			tracing::debug!($($arg)*);
		}
	};
}
/// Emits a warning event inside the current span when tracing is enabled.
macro_rules! fetch_warn {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			tracing::warn!($($arg)*);
		}
	};
}
pub(crate) use {fetch_debug, fetch_warn};
