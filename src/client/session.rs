//! Login and logout.

// self
use crate::{
	_prelude::*,
	auth::{self, CredentialPair, LoginMarker},
	client::{
		ApiClient,
		call::{decode_slice, json_post},
	},
	error::ApiError,
	http::ApiTransport,
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::SessionStore,
};

impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Exchanges a login identifier for a credential pair and stores it.
	///
	/// The login call carries no bearer token and never triggers a refresh; a rejection is
	/// surfaced as [`Error::Api`] so login forms can render it inline.
	pub async fn login(&self, identifier: &str) -> Result<CredentialPair> {
		const KIND: CallKind = CallKind::Login;

		let span = CallSpan::new(KIND, "login");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let url = self.config.resolve(&self.config.login_path)?;
				let body = auth::login_body(&self.config.login_field, identifier);
				let response = self
					.transport
					.execute(json_post(url, &body)?)
					.await
					.map_err(Error::network)?;

				span.record_status(response.status);

				if !response.is_success() {
					return Err(ApiError::from_response(&response).into());
				}

				let pair: CredentialPair = decode_slice(response.status, &response.body)?;

				self.store.save(pair.clone()).await?;
				self.cache.clear();
				self.events.on_login(&LoginMarker::set());

				Ok(pair)
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Clears stored credentials and cached reads, then notifies the host.
	pub async fn logout(&self) -> Result<()> {
		self.store.clear().await?;
		self.cache.clear();
		self.events.on_logout(&LoginMarker::cleared());

		Ok(())
	}

	/// Returns true when an access token is stored.
	///
	/// This only reflects local state; the backend may still reject the token.
	pub async fn has_session(&self) -> Result<bool> {
		Ok(<dyn SessionStore>::access_token(self.store.as_ref()).await?.is_some())
	}
}
