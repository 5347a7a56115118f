//! Access/refresh credential pair plus the login and refresh wire shapes.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access/refresh pair owned by the session store.
///
/// Both values are opaque; expiry is only discovered when the backend rejects the access
/// token with a 401.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer credential.
	pub access: TokenSecret,
	/// Long-lived credential exchanged for new access tokens.
	pub refresh: TokenSecret,
}
impl CredentialPair {
	/// Creates a pair from raw token strings.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: TokenSecret::new(access), refresh: TokenSecret::new(refresh) }
	}
}

/// Body posted to the refresh endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct RefreshRequest<'a> {
	/// Refresh token being exchanged.
	pub refresh: &'a str,
}

/// Body returned by the refresh endpoint.
///
/// Backends that rotate refresh tokens also return a replacement `refresh` value.
#[derive(Clone, Debug, Deserialize)]
pub struct RefreshResponse {
	/// Newly minted access token.
	pub access: TokenSecret,
	/// Rotated refresh token, if the backend rotates.
	#[serde(default)]
	pub refresh: Option<TokenSecret>,
}

/// Builds the login body `{ <field>: <identifier> }`.
pub fn login_body(field: &str, identifier: &str) -> Value {
	let mut body = serde_json::Map::new();

	body.insert(field.to_owned(), Value::String(identifier.to_owned()));

	Value::Object(body)
}
