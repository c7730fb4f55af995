//! Typed clients for the remote APIs the governor fronts.
//!
//! Every source is generic over an [`HttpTransport`](crate::http::HttpTransport) and returns
//! crate [`Error`](crate::error::Error)s, so its fetch methods can be handed to a
//! [`RequestGovernor`](crate::governor::RequestGovernor) as fetchers without adapters.

pub mod blockberry;
pub mod deepbook;
pub mod insidex;
pub mod overview;

mod secret;

pub use blockberry::*;
pub use deepbook::*;
pub use insidex::*;
pub use overview::*;
pub use secret::*;

// self
use crate::_prelude::*;

/// Sort direction accepted by paginated endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
	/// Ascending.
	Asc,
	/// Descending.
	#[default]
	Desc,
}
impl SortOrder {
	/// Returns the query-string value.
	pub const fn as_str(self) -> &'static str {
		match self {
			SortOrder::Asc => "ASC",
			SortOrder::Desc => "DESC",
		}
	}
}
impl Display for SortOrder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Page envelope returned by paginated endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
	/// Records on this page.
	#[serde(default = "Vec::new")]
	pub data: Vec<T>,
	/// Zero-based page index.
	#[serde(default)]
	pub page: u32,
	/// Requested page size.
	#[serde(default)]
	pub size: u32,
	/// Total record count across all pages.
	#[serde(default)]
	pub total: u64,
}
impl<T> Page<T> {
	/// Reports whether a later page exists.
	pub fn has_next(&self) -> bool {
		let seen = (u64::from(self.page) + 1).saturating_mul(u64::from(self.size));

		self.size > 0 && seen < self.total
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn page_reports_remaining_records() {
		let page = Page::<u32> { data: vec![1, 2], page: 0, size: 2, total: 5 };
		let last = Page::<u32> { data: vec![5], page: 2, size: 2, total: 5 };

		assert!(page.has_next());
		assert!(!last.has_next());
	}

	#[test]
	fn sort_order_serializes_uppercase() {
		let payload =
			serde_json::to_string(&SortOrder::Desc).expect("SortOrder should serialize to JSON.");

		assert_eq!(payload, "\"DESC\"");
		assert_eq!(SortOrder::Asc.to_string(), "ASC");
	}
}
