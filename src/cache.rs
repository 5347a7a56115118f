//! Read-through query cache keyed by `(path, params)`.
//!
//! Keys are built from the request path and the canonical query string, so two parameter
//! maps with the same pairs always land on the same entry and invalidation by path is a
//! plain string comparison. Reads go through [`ApiClient::swr`](crate::client::ApiClient::swr);
//! writes invalidate with [`ApiClient::revalidate_path`](crate::client::ApiClient::revalidate_path).

pub mod swr;

pub use swr::*;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{_prelude::*, error::ApiError, request::QueryParams};

/// Deterministic cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
	path: String,
	query: String,
}
impl CacheKey {
	/// Builds the key for a path and its parameters.
	pub fn new(path: impl Into<String>, params: &QueryParams) -> Self {
		Self { path: path.into(), query: params.to_query_string() }
	}

	/// Path component used for invalidation.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Canonical query string (empty when no parameters are emitted).
	pub fn query(&self) -> &str {
		&self.query
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.query.is_empty() {
			f.write_str(&self.path)
		} else {
			write!(f, "{}?{}", self.path, self.query)
		}
	}
}

/// Cache policy for one read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwrConfig {
	/// How long a successful entry is served without refetching.
	pub fresh_for: Duration,
	/// Refetch on every read, even when the entry is fresh.
	pub revalidate_on_read: bool,
}
impl SwrConfig {
	/// Always refetch.
	pub const fn always() -> Self {
		Self { fresh_for: Duration::ZERO, revalidate_on_read: true }
	}

	/// Serve entries for `fresh_for` before refetching.
	pub const fn fresh_for(fresh_for: Duration) -> Self {
		Self { fresh_for, revalidate_on_read: false }
	}
}
impl Default for SwrConfig {
	fn default() -> Self {
		Self::fresh_for(Duration::seconds(2))
	}
}

/// Loading/error/data tri-state returned by cached reads.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryState<T> {
	/// Last successful data, absent on error or before the first fetch.
	pub data: Option<T>,
	/// Envelope of the last failure.
	pub error: Option<ApiError>,
	/// True while the first fetch of this key is in flight.
	pub is_loading: bool,
}
impl<T> QueryState<T> {
	/// State for a read that was not issued.
	pub const fn idle() -> Self {
		Self { data: None, error: None, is_loading: false }
	}

	/// Returns true when neither data nor an error is present.
	pub fn is_empty(&self) -> bool {
		self.data.is_none() && self.error.is_none()
	}
}
impl<T> Default for QueryState<T> {
	fn default() -> Self {
		Self::idle()
	}
}
impl QueryState<Value> {
	/// Decodes the cached JSON into `T`, turning a shape mismatch into an error state.
	pub fn decode<T>(self) -> QueryState<T>
	where
		T: DeserializeOwned,
	{
		let Self { data, error, is_loading } = self;

		match data.map(serde_path_to_error::deserialize::<_, T>) {
			Some(Ok(value)) => QueryState { data: Some(value), error, is_loading },
			Some(Err(e)) => QueryState {
				data: None,
				error: Some(ApiError::new(format!(
					"Response body does not match the expected shape: {e}"
				))),
				is_loading,
			},
			None => QueryState { data: None, error, is_loading },
		}
	}
}

/// One cached read.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
	/// Parameters used to (re)fetch the entry.
	pub params: QueryParams,
	/// Last successful body.
	pub data: Option<Value>,
	/// Last failure envelope.
	pub error: Option<ApiError>,
	/// Set by invalidation; cleared by the next completed fetch.
	pub stale: bool,
	/// A fetch for this key is in flight.
	pub in_flight: bool,
	/// Completion instant of the last fetch.
	pub fetched_at: Option<OffsetDateTime>,
	/// Cache-wide sequence number of the last completed fetch.
	pub generation: u64,
}
impl CacheEntry {
	fn pending(params: QueryParams) -> Self {
		Self {
			params,
			data: None,
			error: None,
			stale: false,
			in_flight: true,
			fetched_at: None,
			generation: 0,
		}
	}

	fn is_fresh(&self, fresh_for: Duration, now: OffsetDateTime) -> bool {
		match self.fetched_at {
			Some(at) => !self.stale && self.error.is_none() && now - at < fresh_for,
			None => false,
		}
	}

	fn state(&self) -> QueryState<Value> {
		QueryState {
			data: self.data.clone(),
			error: self.error.clone(),
			is_loading: self.in_flight && self.fetched_at.is_none(),
		}
	}
}

type EntryMap = Arc<RwLock<HashMap<CacheKey, CacheEntry>>>;
type GuardMap = Arc<Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>>;

/// Process-wide query cache shared by all clones of a client.
///
/// Later completions overwrite earlier ones; there is no ordering across keys.
#[derive(Clone, Debug, Default)]
pub struct QueryCache {
	entries: EntryMap,
	fetch_guards: GuardMap,
	generation: Arc<AtomicU64>,
}
impl QueryCache {
	/// Returns a copy of the entry for `key`.
	pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
		self.entries.read().get(key).cloned()
	}

	/// Current tri-state of `key` (idle when unknown).
	pub fn state(&self, key: &CacheKey) -> QueryState<Value> {
		self.entries.read().get(key).map(CacheEntry::state).unwrap_or_default()
	}

	/// Returns true when `key` holds a fresh, non-stale, successful entry.
	pub fn is_fresh(&self, key: &CacheKey, fresh_for: Duration, now: OffsetDateTime) -> bool {
		self.entries.read().get(key).is_some_and(|entry| entry.is_fresh(fresh_for, now))
	}

	/// Returns true when `key` is marked stale.
	pub fn is_stale(&self, key: &CacheKey) -> bool {
		self.entries.read().get(key).is_some_and(|entry| entry.stale)
	}

	/// Number of cached keys.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns true when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Sorted list of cached keys.
	pub fn keys(&self) -> Vec<CacheKey> {
		let mut keys: Vec<_> = self.entries.read().keys().cloned().collect();

		keys.sort();

		keys
	}

	/// Marks every entry whose path equals `path` as stale and returns their keys.
	pub fn mark_stale(&self, path: &str) -> Vec<CacheKey> {
		let mut entries = self.entries.write();
		let mut keys: Vec<_> = entries
			.iter_mut()
			.filter(|(key, _)| key.path == path)
			.map(|(key, entry)| {
				entry.stale = true;

				key.clone()
			})
			.collect();

		keys.sort();

		keys
	}

	/// Drops every entry.
	///
	/// Fetch guards are kept so a fetch still in flight keeps excluding other fetches of its
	/// key; they are released as their fetches finish.
	pub fn clear(&self) {
		self.entries.write().clear();
	}

	pub(crate) fn current_generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	pub(crate) fn fetched_after(&self, key: &CacheKey, generation: u64) -> bool {
		self.entries.read().get(key).is_some_and(|entry| entry.generation > generation)
	}

	pub(crate) fn begin_fetch(&self, key: &CacheKey, params: &QueryParams) {
		let mut entries = self.entries.write();

		match entries.get_mut(key) {
			Some(entry) => entry.in_flight = true,
			None => {
				entries.insert(key.clone(), CacheEntry::pending(params.clone()));
			},
		}
	}

	/// Stores the outcome of a fetch and returns the state the reader should see.
	///
	/// When the entry was cleared while the fetch was in flight (logout or expiry), the
	/// outcome is not cached but is still returned, so the failure reaches the caller.
	pub(crate) fn complete_fetch(
		&self,
		key: &CacheKey,
		outcome: Result<Value, ApiError>,
	) -> QueryState<Value> {
		let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
		let mut entries = self.entries.write();
		let Some(entry) = entries.get_mut(key) else {
			return match outcome {
				Ok(data) => QueryState { data: Some(data), error: None, is_loading: false },
				Err(error) => QueryState { data: None, error: Some(error), is_loading: false },
			};
		};

		match outcome {
			Ok(data) => {
				entry.data = Some(data);
				entry.error = None;
			},
			Err(error) => {
				entry.data = None;
				entry.error = Some(error);
			},
		}

		entry.stale = false;
		entry.in_flight = false;
		entry.fetched_at = Some(OffsetDateTime::now_utc());
		entry.generation = generation;

		entry.state()
	}

	pub(crate) fn fetch_guard(&self, key: &CacheKey) -> Arc<AsyncMutex<()>> {
		let mut guards = self.fetch_guards.lock();

		guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	/// Drops `guard` from the map once no other reader holds a handle to it.
	///
	/// Must be called after the caller released its lock on the guard.
	pub(crate) fn release_fetch_guard(&self, key: &CacheKey, guard: Arc<AsyncMutex<()>>) {
		let mut guards = self.fetch_guards.lock();

		// The map and `guard` are the last two handles.
		if Arc::strong_count(&guard) == 2
			&& guards.get(key).is_some_and(|current| Arc::ptr_eq(current, &guard))
		{
			guards.remove(key);
		}
	}

	#[cfg(test)]
	fn guard_count(&self) -> usize {
		self.fetch_guards.lock().len()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn key(path: &str, params: QueryParams) -> CacheKey {
		CacheKey::new(path, &params)
	}

	#[test]
	fn keys_are_order_independent_and_render_like_urls() {
		let a = key("/api/users", QueryParams::new().with("page", 2_u32).with("search", "a"));
		let b = key("/api/users", QueryParams::new().with("search", "a").with("page", 2_u32));

		assert_eq!(a, b);
		assert_eq!(a.to_string(), "/api/users?page=2&search=a");
		assert_eq!(key("/api/groups", QueryParams::new()).to_string(), "/api/groups");
	}

	#[test]
	fn mark_stale_matches_path_exactly() {
		let cache = QueryCache::default();
		let groups = key("/api/groups", QueryParams::new().with("search", "x"));
		let group = key("/api/groups/g-1", QueryParams::new());
		let trainings = key("/api/trainings", QueryParams::new());

		for k in [&groups, &group, &trainings] {
			cache.begin_fetch(k, &QueryParams::new());
			cache.complete_fetch(k, Ok(Value::Array(Vec::new())));
		}

		assert_eq!(cache.mark_stale("/api/groups"), vec![groups.clone()]);
		assert!(cache.is_stale(&groups));
		assert!(!cache.is_stale(&group));
		assert!(!cache.is_stale(&trainings));
	}

	#[test]
	fn failures_replace_data_and_are_never_fresh() {
		let cache = QueryCache::default();
		let k = key("/api/trainings", QueryParams::new());

		cache.begin_fetch(&k, &QueryParams::new());

		assert!(cache.state(&k).is_loading);

		cache.complete_fetch(&k, Ok(serde_json::json!([1])));

		assert!(cache.is_fresh(&k, Duration::minutes(1), OffsetDateTime::now_utc()));

		cache.begin_fetch(&k, &QueryParams::new());
		cache.complete_fetch(&k, Err(ApiError::new("HTTP 500: Internal Server Error")));

		let state = cache.state(&k);

		assert!(state.data.is_none());
		assert!(!state.is_loading);
		assert_eq!(state.error.map(|e| e.error), Some("HTTP 500: Internal Server Error".into()));
		assert!(!cache.is_fresh(&k, Duration::minutes(1), OffsetDateTime::now_utc()));
	}

	#[test]
	fn completion_after_clear_is_returned_but_not_cached() {
		let cache = QueryCache::default();
		let k = key("/api/users", QueryParams::new());

		cache.begin_fetch(&k, &QueryParams::new());
		cache.clear();

		let state = cache.complete_fetch(&k, Err(ApiError::new("expired")));

		assert!(cache.is_empty());
		assert_eq!(state.error.map(|e| e.error), Some("expired".into()));
		assert!(state.data.is_none());
		assert!(!state.is_loading);
	}

	#[tokio::test]
	async fn fetch_guards_are_released_by_the_last_holder() {
		let cache = QueryCache::default();
		let k = key("/api/groups", QueryParams::new());
		let first = cache.fetch_guard(&k);
		let second = cache.fetch_guard(&k);

		assert!(Arc::ptr_eq(&first, &second));

		let held = first.lock().await;

		// Logout while a fetch is in flight keeps the guard in place.
		cache.clear();

		assert!(Arc::ptr_eq(&cache.fetch_guard(&k), &first));

		drop(held);
		cache.release_fetch_guard(&k, first);

		assert_eq!(cache.guard_count(), 1);

		cache.release_fetch_guard(&k, second);

		assert_eq!(cache.guard_count(), 0);
	}
}
