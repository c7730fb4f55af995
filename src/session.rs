//! Validator page session: one governor per view over the Blockberry validator listing.
//!
//! A [`ValidatorPages`] value is what a dashboard view holds while it is open. Revisiting a page
//! is answered from the session's cache; opening a new page waits until the governor interval
//! (15 seconds unless configured otherwise) has passed since the previous request. Dropping the
//! session discards the cache.

// self
use crate::{
	_prelude::*,
	governor::{Clock, GovernorConfig, RequestGovernor, TokioClock},
	http::HttpTransport,
	source::{BlockberryClient, Page, WalrusValidator},
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestHttpClient, source::BlockberryConfig};

/// One page of validators as returned by Blockberry.
pub type ValidatorPage = Page<WalrusValidator>;

#[cfg(feature = "reqwest")]
/// Validator session specialized for the crate's default reqwest transport.
pub type ReqwestValidatorPages = ValidatorPages<ReqwestHttpClient>;

/// Governed, cached access to Blockberry validator pages.
pub struct ValidatorPages<H, C = TokioClock>
where
	H: ?Sized + HttpTransport,
	C: Clock,
{
	client: BlockberryClient<H>,
	governor: RequestGovernor<u32, ValidatorPage, C>,
}
impl<H> ValidatorPages<H>
where
	H: ?Sized + HttpTransport,
{
	/// Creates a session that spaces new page requests by the default 15 second interval.
	pub fn new(client: BlockberryClient<H>) -> Self {
		Self::with_governor(client, GovernorConfig::default().with_label("walrus_validators"))
	}

	/// Creates a session with a custom governor configuration.
	pub fn with_governor(client: BlockberryClient<H>, config: GovernorConfig) -> Self {
		Self::with_clock(client, config, TokioClock)
	}
}
impl<H, C> ValidatorPages<H, C>
where
	H: ?Sized + HttpTransport,
	C: Clock,
{
	/// Creates a session whose governor measures time with `clock`.
	pub fn with_clock(client: BlockberryClient<H>, config: GovernorConfig, clock: C) -> Self {
		Self { client, governor: RequestGovernor::with_clock(config, clock) }
	}

	/// Returns validator page `page`, from cache when it was already loaded.
	pub async fn page(&self, page: u32) -> Result<Arc<ValidatorPage>> {
		self.governor.fetch(page, || self.client.validators(page)).await
	}

	/// Like [`ValidatorPages::page`], but gives up with
	/// [`Error::Cancelled`](crate::error::Error::Cancelled) if `cancel` fires while the request is
	/// still waiting for its throttle slot.
	pub async fn page_with_cancel(
		&self,
		page: u32,
		cancel: &CancellationToken,
	) -> Result<Arc<ValidatorPage>> {
		self.governor.fetch_with_cancel(page, cancel, || self.client.validators(page)).await
	}

	/// Returns a page only if it is already cached.
	pub fn cached(&self, page: u32) -> Option<Arc<ValidatorPage>> {
		self.governor.get(&page)
	}

	/// Governor backing this session.
	pub fn governor(&self) -> &RequestGovernor<u32, ValidatorPage, C> {
		&self.governor
	}

	/// Blockberry client backing this session.
	pub fn client(&self) -> &BlockberryClient<H> {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl ValidatorPages<ReqwestHttpClient> {
	/// Builds a reqwest-backed session whose API key comes from the environment.
	///
	/// Fails with [`ConfigError::MissingApiKey`] when `BLOCKBERRY_API_KEY` is unset.
	pub fn from_env() -> Result<Self, ConfigError> {
		let config = BlockberryConfig::from_env()?;

		Ok(Self::new(BlockberryClient::new(config)))
	}
}
impl<H, C> Debug for ValidatorPages<H, C>
where
	H: ?Sized + HttpTransport,
	C: Clock,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ValidatorPages")
			.field("client", &self.client)
			.field("governor", &self.governor)
			.finish()
	}
}
