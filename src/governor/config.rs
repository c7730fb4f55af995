//! Throttle configuration validated at construction time.

// self
use crate::{_prelude::*, error::ConfigError};

/// Validated settings for a [`RequestGovernor`](crate::governor::RequestGovernor).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GovernorConfig {
	min_interval: StdDuration,
	label: &'static str,
}
impl GovernorConfig {
	/// Spacing used by the Blockberry validator view.
	pub const DEFAULT_MIN_INTERVAL: Duration = Duration::milliseconds(15_000);
	/// Label attached to spans and metrics when none is provided.
	pub const DEFAULT_LABEL: &'static str = "default";

	/// Creates a configuration enforcing `min_interval` between dispatches.
	///
	/// Negative intervals are rejected; zero disables spacing while keeping the cache.
	pub fn new(min_interval: Duration) -> Result<Self, ConfigError> {
		let min_interval = StdDuration::try_from(min_interval)
			.map_err(|_| ConfigError::NegativeInterval { interval: min_interval })?;

		Ok(Self { min_interval, label: Self::DEFAULT_LABEL })
	}

	/// Millisecond form of [`GovernorConfig::new`].
	pub fn from_millis(millis: i64) -> Result<Self, ConfigError> {
		Self::new(Duration::milliseconds(millis))
	}

	/// Names the governor in spans and metric labels.
	pub fn with_label(mut self, label: &'static str) -> Self {
		self.label = label;

		self
	}

	/// Minimum spacing between two dispatches.
	pub fn min_interval(&self) -> StdDuration {
		self.min_interval
	}

	/// Label used for observability.
	pub fn label(&self) -> &'static str {
		self.label
	}
}
impl Default for GovernorConfig {
	fn default() -> Self {
		Self { min_interval: StdDuration::from_millis(15_000), label: Self::DEFAULT_LABEL }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn negative_interval_is_rejected() {
		let err = GovernorConfig::from_millis(-1)
			.expect_err("Negative intervals should fail validation.");

		assert!(matches!(
			err,
			ConfigError::NegativeInterval { interval } if interval == Duration::milliseconds(-1)
		));
	}

	#[test]
	fn zero_interval_is_allowed() {
		let config = GovernorConfig::from_millis(0).expect("Zero interval should be accepted.");

		assert!(config.min_interval().is_zero());
	}

	#[test]
	fn default_matches_validator_view_spacing() {
		let config = GovernorConfig::default();
		let explicit = GovernorConfig::new(GovernorConfig::DEFAULT_MIN_INTERVAL)
			.expect("Default interval should validate.");

		assert_eq!(config, explicit);
		assert_eq!(config.min_interval(), StdDuration::from_secs(15));
		assert_eq!(config.with_label("validators").label(), "validators");
	}
}
