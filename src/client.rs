//! Authenticated request client.
//!
//! [`ApiClient`] owns the transport, the injected session store, the query cache, and the
//! refresh single-flight guard. Operations are split across submodules the same way a
//! logical call is split into phases: [`call`] renders and sends requests and normalizes
//! responses, [`refresh`] renews the access token, and [`session`] handles login/logout.

pub mod call;
pub mod refresh;
pub mod session;

pub use refresh::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::LoginMarker,
	cache::QueryCache,
	config::ClientConfig,
	http::ApiTransport,
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Host hooks fired on session lifecycle changes.
///
/// A browser host sets or clears the marker cookie and navigates to the login page from
/// [`on_session_expired`](SessionEvents::on_session_expired); headless hosts can ignore
/// every hook. All methods default to no-ops.
pub trait SessionEvents: Send + Sync {
	/// Called after credentials from a successful login were stored.
	fn on_login(&self, _marker: &LoginMarker) {}

	/// Called after the session was cleared on request.
	fn on_logout(&self, _marker: &LoginMarker) {}

	/// Called after credentials were cleared because the session could not be renewed.
	fn on_session_expired(&self, _marker: &LoginMarker) {}
}

/// Hooks implementation that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSessionEvents;
impl SessionEvents for NoopSessionEvents {}

/// Performs authenticated calls against one backend.
///
/// Cloning is cheap: every clone shares the transport, session store, cache, metrics, and
/// refresh guard, so background revalidation tasks can own a clone.
pub struct ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<C>,
	/// Session store holding the access/refresh pair.
	pub store: Arc<dyn SessionStore>,
	/// Validated endpoint configuration.
	pub config: ClientConfig,
	/// Session lifecycle hooks.
	pub events: Arc<dyn SessionEvents>,
	/// Read-through cache backing [`ApiClient::swr`].
	pub cache: QueryCache,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn SessionStore>,
		transport: impl Into<Arc<C>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			config,
			events: Arc::new(NoopSessionEvents),
			cache: QueryCache::default(),
			refresh_metrics: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Sets or replaces the session lifecycle hooks.
	pub fn with_events(mut self, events: Arc<dyn SessionEvents>) -> Self {
		self.events = events;

		self
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Self {
		Self::with_transport(config, store, ReqwestTransport::default())
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			events: self.events.clone(),
			cache: self.cache.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("cached_entries", &self.cache.len())
			.finish()
	}
}
