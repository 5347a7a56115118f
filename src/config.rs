//! Validated client configuration: where the backend lives and how the auth endpoints look.

/// Builder API for assembling validated client configuration.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Default login endpoint path.
pub const DEFAULT_LOGIN_PATH: &str = "/api/auth/login";
/// Default refresh endpoint path.
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh";
/// Default body field carrying the login identifier.
pub const DEFAULT_LOGIN_FIELD: &str = "uwa_id";

/// Immutable configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Origin every request path is resolved against.
	pub base_url: Url,
	/// Path of the login endpoint.
	pub login_path: String,
	/// Path of the refresh endpoint.
	pub refresh_path: String,
	/// Body field used to send the login identifier.
	pub login_field: String,
}
impl ClientConfig {
	/// Creates a new builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::new()
	}

	/// Resolves an API path (which may already carry a query) against the base URL.
	pub fn resolve(&self, path: &str) -> Result<Url> {
		self.base_url.join(path).map_err(|source| {
			crate::error::ConfigError::InvalidPath { path: path.to_owned(), source }.into()
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn resolve_keeps_origin_and_replaces_path() {
		let config = ClientConfig::builder()
			.base_url(Url::parse("http://127.0.0.1:8000/dashboard/").expect("Fixture URL parses."))
			.build()
			.expect("Fixture config should be valid.");
		let url = config.resolve("/api/groups").expect("Absolute API path should resolve.");

		assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/groups");
	}
}
