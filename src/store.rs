//! Session storage contracts and built-in store implementations.
//!
//! The client never touches ambient global state: every read or write of the access/refresh
//! pair goes through an injected [`SessionStore`], so hosts can back it with process memory,
//! a file, or a platform keychain, and tests can substitute doubles.

pub mod file;
pub mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the session's credential pair.
///
/// Writes are last-write-wins; the client serializes refreshes itself.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the current snapshot (either token may be absent).
	fn load(&self) -> StoreFuture<'_, StoredSession>;

	/// Persists a freshly issued pair, replacing whatever was stored.
	fn save(&self, pair: CredentialPair) -> StoreFuture<'_, ()>;

	/// Replaces the access token, and the refresh token when the backend rotated it.
	fn set_access_token(
		&self,
		access: TokenSecret,
		rotated_refresh: Option<TokenSecret>,
	) -> StoreFuture<'_, ()>;

	/// Removes both tokens.
	fn clear(&self) -> StoreFuture<'_, ()>;
}
impl dyn SessionStore {
	/// Returns the current access token, if any.
	pub async fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.load().await?.access)
	}

	/// Returns the current refresh token, if any.
	pub async fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.load().await?.refresh)
	}
}

/// Snapshot of the persisted session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
	/// Current access token.
	#[serde(default)]
	pub access: Option<TokenSecret>,
	/// Current refresh token.
	#[serde(default)]
	pub refresh: Option<TokenSecret>,
}
impl StoredSession {
	/// Returns true when no token is stored.
	pub fn is_empty(&self) -> bool {
		self.access.is_none() && self.refresh.is_none()
	}

	fn apply_access(&mut self, access: TokenSecret, rotated_refresh: Option<TokenSecret>) {
		self.access = Some(access);

		if let Some(refresh) = rotated_refresh {
			self.refresh = Some(refresh);
		}
	}
}
impl From<CredentialPair> for StoredSession {
	fn from(pair: CredentialPair) -> Self {
		Self { access: Some(pair.access), refresh: Some(pair.refresh) }
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
