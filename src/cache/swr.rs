//! Cached reads and path invalidation on [`ApiClient`].

// crates.io
use tokio::{runtime::Handle, task::JoinHandle};
// self
use crate::{
	_prelude::*,
	cache::{CacheKey, QueryState, SwrConfig},
	client::ApiClient,
	http::ApiTransport,
	obs::{self, CallKind, CallOutcome, CallSpan},
	request::QueryParams,
};

/// Handle for a background refetch scheduled by [`ApiClient::revalidate_path`].
///
/// Dropping the handle does not cancel the refetch.
#[derive(Debug)]
pub struct Revalidation {
	keys: Vec<CacheKey>,
	handle: Option<JoinHandle<()>>,
}
impl Revalidation {
	/// Keys that were marked stale.
	pub fn keys(&self) -> &[CacheKey] {
		&self.keys
	}

	/// Returns true when a background refetch was spawned.
	pub fn is_scheduled(&self) -> bool {
		self.handle.is_some()
	}

	/// Waits for the background refetch to complete.
	pub async fn finished(self) {
		if let Some(handle) = self.handle {
			// A panicking refetch leaves its keys stale; the next read retries them.
			let _ = handle.await;
		}
	}
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Cached `GET path?params`.
	///
	/// `None` is the "do not fetch" sentinel used by dependent queries: it returns the idle
	/// state without touching the network or the cache. Failures are returned as
	/// [`QueryState::error`], never as an `Err`.
	pub async fn swr<T>(
		&self,
		path: Option<&str>,
		params: &QueryParams,
		config: &SwrConfig,
	) -> QueryState<T>
	where
		T: DeserializeOwned,
	{
		let Some(path) = path else {
			return QueryState::idle();
		};

		self.swr_value(path, params, config).await.decode()
	}

	/// Untyped variant of [`ApiClient::swr`] for a non-null path.
	pub async fn swr_value(
		&self,
		path: &str,
		params: &QueryParams,
		config: &SwrConfig,
	) -> QueryState<Value> {
		const KIND: CallKind = CallKind::CachedRead;

		let key = CacheKey::new(path, params);
		// Taken before the freshness check so a refetch completing in between is observed.
		let observed = self.cache.current_generation();

		if !config.revalidate_on_read
			&& self.cache.is_fresh(&key, config.fresh_for, OffsetDateTime::now_utc())
		{
			obs::record_cache_read(true);

			return self.cache.state(&key);
		}

		let span = CallSpan::new(KIND, "swr");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let state = span
			.instrument(async {
				let guard = self.cache.fetch_guard(&key);
				let inflight = guard.lock().await;
				// Another reader completed a fetch of this key while we waited.
				let deduplicated = self.cache.fetched_after(&key, observed);
				let state = if deduplicated {
					self.cache.state(&key)
				} else {
					self.fetch_into_cache(&key, params).await
				};

				obs::record_cache_read(deduplicated);

				drop(inflight);
				self.cache.release_fetch_guard(&key, guard);

				state
			})
			.await;
		let outcome = if state.error.is_some() { CallOutcome::Failure } else { CallOutcome::Success };

		obs::record_call_outcome(KIND, outcome);

		state
	}

	/// Returns the cached tri-state for `(path, params)` without fetching.
	pub fn peek<T>(&self, path: Option<&str>, params: &QueryParams) -> QueryState<T>
	where
		T: DeserializeOwned,
	{
		match path {
			Some(path) => self.cache.state(&CacheKey::new(path, params)).decode(),
			None => QueryState::idle(),
		}
	}

	/// Marks every cached read of `path` stale and refetches them in the background.
	///
	/// Never blocks on the network. Outside a tokio runtime the entries are only marked
	/// stale, and the next [`ApiClient::swr`] of each key refetches it.
	pub fn revalidate_path(&self, path: &str) -> Revalidation {
		let keys = self.cache.mark_stale(path);

		if keys.is_empty() {
			return Revalidation { keys, handle: None };
		}

		let handle = Handle::try_current().ok().map(|runtime| {
			let client = self.clone();
			let pending = keys.clone();

			runtime.spawn(async move { client.refetch_stale(pending).await })
		});

		Revalidation { keys, handle }
	}

	async fn refetch_stale(&self, keys: Vec<CacheKey>) {
		const KIND: CallKind = CallKind::Revalidate;

		let span = CallSpan::new(KIND, "revalidate_path");

		span.instrument(async {
			for key in keys {
				// Dropped by logout or expiry since it was marked.
				let Some(entry) = self.cache.get(&key) else {
					continue;
				};
				let guard = self.cache.fetch_guard(&key);
				let inflight = guard.lock().await;

				if self.cache.is_stale(&key) {
					obs::record_call_outcome(KIND, CallOutcome::Attempt);

					let state = self.fetch_into_cache(&key, &entry.params).await;
					let outcome =
						if state.error.is_none() { CallOutcome::Success } else { CallOutcome::Failure };

					obs::record_call_outcome(KIND, outcome);
				}

				drop(inflight);
				self.cache.release_fetch_guard(&key, guard);
			}
		})
		.await
	}

	async fn fetch_into_cache(&self, key: &CacheKey, params: &QueryParams) -> QueryState<Value> {
		self.cache.begin_fetch(key, params);

		let outcome = self.get::<Value>(key.path(), params.clone()).await.map_err(|e| e.envelope());

		self.cache.complete_fetch(key, outcome)
	}
}
