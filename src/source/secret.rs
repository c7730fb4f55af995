//! Redacting API key wrapper.

// self
use crate::{_prelude::*, error::ConfigError};

/// API key sent in the `x-api-key` header; formatters never print it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ApiKey(String);
impl ApiKey {
	/// Validates and wraps a key.
	pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
		let value = value.into();

		if value.trim().is_empty() {
			return Err(ConfigError::InvalidApiKey { reason: "key is empty" });
		}
		if value.chars().any(char::is_whitespace) {
			return Err(ConfigError::InvalidApiKey { reason: "key contains whitespace" });
		}

		Ok(Self(value))
	}

	/// Reads and validates a key from `var`, returning `None` when the variable is unset or empty.
	pub fn from_env(var: &str) -> Result<Option<Self>, ConfigError> {
		match std::env::var(var) {
			Ok(value) if value.trim().is_empty() => Ok(None),
			Ok(value) => Self::new(value).map(Some),
			Err(_) => Ok(None),
		}
	}

	/// Returns the inner key. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for ApiKey {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ApiKey {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ApiKey").field(&"<redacted>").finish()
	}
}
impl Display for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_key_formatters_redact() {
		let key = ApiKey::new("bb-super-secret").expect("Fixture key should be valid.");

		assert_eq!(format!("{key:?}"), "ApiKey(\"<redacted>\")");
		assert_eq!(format!("{key}"), "<redacted>");
		assert_eq!(key.expose(), "bb-super-secret");
	}

	#[test]
	fn api_key_rejects_blank_and_spaced_values() {
		assert!(matches!(ApiKey::new("   "), Err(ConfigError::InvalidApiKey { .. })));
		assert!(matches!("bb key".parse::<ApiKey>(), Err(ConfigError::InvalidApiKey { .. })));
	}

	#[test]
	fn unset_env_var_yields_none() {
		let key = ApiKey::from_env("WALRUS_GOVERNOR_TEST_UNSET_KEY")
			.expect("Unset variables should not be an error.");

		assert!(key.is_none());
	}
}
