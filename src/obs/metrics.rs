// self
use crate::obs::FetchOutcome;

/// Records a fetch outcome via the global metrics recorder (when enabled).
pub fn record_fetch_outcome(governor: &'static str, outcome: FetchOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"walrus_governor_fetch_total",
			"governor" => governor,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (governor, outcome);
	}
}
