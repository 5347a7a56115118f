// self
use crate::{
	_prelude::*,
	config::{ClientConfig, DEFAULT_LOGIN_FIELD, DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH},
};

/// Errors raised while constructing or validating a [`ClientConfig`].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ClientConfigError {
	/// A base URL is mandatory.
	#[error("Missing base URL.")]
	MissingBaseUrl,
	/// Only HTTP(S) origins are supported.
	#[error("The base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Auth endpoint paths must be absolute.
	#[error("The {endpoint} path must start with `/`: {path}.")]
	RelativePath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Offending path.
		path: String,
	},
	/// The login field must be a non-empty identifier.
	#[error("The login field cannot be empty.")]
	EmptyLoginField,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Origin every request path is resolved against.
	pub base_url: Option<Url>,
	/// Login endpoint path.
	pub login_path: String,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Body field carrying the login identifier.
	pub login_field: String,
}
impl ClientConfigBuilder {
	/// Creates a builder seeded with the default auth endpoints.
	pub fn new() -> Self {
		Self {
			base_url: None,
			login_path: DEFAULT_LOGIN_PATH.into(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			login_field: DEFAULT_LOGIN_FIELD.into(),
		}
	}

	/// Sets the backend origin.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the login body field.
	pub fn login_field(mut self, field: impl Into<String>) -> Self {
		self.login_field = field.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let base_url = self.base_url.ok_or(ClientConfigError::MissingBaseUrl)?;
		let config = ClientConfig {
			base_url,
			login_path: self.login_path,
			refresh_path: self.refresh_path,
			login_field: self.login_field,
		};

		config.validate()?;

		Ok(config)
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ClientConfig {
	fn validate(&self) -> Result<(), ClientConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") || self.base_url.cannot_be_a_base()
		{
			return Err(ClientConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}

		validate_path("login", &self.login_path)?;
		validate_path("refresh", &self.refresh_path)?;

		if self.login_field.trim().is_empty() {
			return Err(ClientConfigError::EmptyLoginField);
		}

		Ok(())
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ClientConfigError::RelativePath { endpoint, path: path.to_owned() })
	}
}
