//! Access token renewal with a single-flight guard.
//!
//! Every renewal runs under one async lock shared by all clones of the client. A caller
//! that was rejected with token `A` first waits for the lock, then re-reads the store: if
//! the stored access token is no longer `A`, a concurrent caller already renewed it and the
//! waiter reuses that token instead of spending the refresh token a second time.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{RefreshRequest, RefreshResponse, TokenSecret},
	client::{
		ApiClient,
		call::{decode_slice, json_post},
	},
	error::{ApiError, ConfigError},
	http::ApiTransport,
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::SessionStore,
};

impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Exchanges the stored refresh token for a new access token and stores it.
	///
	/// Fails with [`ConfigError::MissingRefreshToken`] when no refresh token is stored, with
	/// [`Error::Network`] on transport failure, and with [`Error::Api`] on a non-2xx answer.
	/// Authenticated calls turn any of these into [`Error::SessionExpired`].
	pub async fn refresh(&self) -> Result<TokenSecret> {
		let _singleflight = self.refresh_guard.lock().await;

		self.refresh_locked().await
	}

	/// Renews the access token after `rejected` was refused, unless a concurrent caller
	/// already replaced it.
	pub(crate) async fn refresh_after_rejection(
		&self,
		rejected: Option<&TokenSecret>,
	) -> Result<TokenSecret> {
		let _singleflight = self.refresh_guard.lock().await;

		let current = <dyn SessionStore>::access_token(self.store.as_ref()).await?;

		if let Some(current) = current.filter(|token| rejected != Some(token)) {
			self.refresh_metrics.record_reuse();

			return Ok(current);
		}

		self.refresh_locked().await
	}

	async fn refresh_locked(&self) -> Result<TokenSecret> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async {
				let refresh = <dyn SessionStore>::refresh_token(self.store.as_ref())
					.await?
					.ok_or(ConfigError::MissingRefreshToken)?;
				let url = self.config.resolve(&self.config.refresh_path)?;
				let request = json_post(url, &RefreshRequest { refresh: refresh.expose() })?;
				let response = self.transport.execute(request).await.map_err(Error::network)?;

				span.record_status(response.status);

				if !response.is_success() {
					return Err(ApiError::from_response(&response).into());
				}

				let renewed: RefreshResponse = decode_slice(response.status, &response.body)?;

				self.store.set_access_token(renewed.access.clone(), renewed.refresh).await?;

				Ok(renewed.access)
			})
			.await;

		match &result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}
}
