//! Thread-safe in-memory [`SessionStore`] implementation for short-lived processes and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	store::{SessionStore, StoreFuture, StoredSession},
};

/// Keeps the session in-process; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(Arc<RwLock<StoredSession>>);
impl MemorySessionStore {
	/// Returns a copy of the current session without going through the async contract.
	pub fn snapshot(&self) -> StoredSession {
		self.0.read().clone()
	}
}
impl SessionStore for MemorySessionStore {
	fn load(&self) -> StoreFuture<'_, StoredSession> {
		let inner = self.0.clone();

		Box::pin(async move { Ok(inner.read().clone()) })
	}

	fn save(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		let inner = self.0.clone();

		Box::pin(async move {
			*inner.write() = pair.into();

			Ok(())
		})
	}

	fn set_access_token(
		&self,
		access: TokenSecret,
		rotated_refresh: Option<TokenSecret>,
	) -> StoreFuture<'_, ()> {
		let inner = self.0.clone();

		Box::pin(async move {
			inner.write().apply_access(access, rotated_refresh);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let inner = self.0.clone();

		Box::pin(async move {
			*inner.write() = StoredSession::default();

			Ok(())
		})
	}
}
