//! Client-level error types and the uniform `{ error, data? }` envelope.

// self
use crate::{_prelude::*, http::HttpResponse};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// User-facing message attached to [`Error::SessionExpired`].
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session expired, please log in again";

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The request never reached the server (offline, DNS, TLS, connection reset).
	#[error("{message}")]
	Network {
		/// Rendered transport error.
		message: String,
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// The access token was rejected and could not be renewed.
	#[error("Your session expired, please log in again")]
	SessionExpired,
	/// The backend answered with a non-2xx status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// A 2xx body did not match the expected shape.
	#[error("Response body does not match the expected shape.")]
	Decode {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
}
impl Error {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { message: src.to_string(), source: Box::new(src) }
	}

	/// Returns the HTTP status associated with the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(api) => api.status,
			Self::Decode { status, .. } => Some(*status),
			Self::SessionExpired => Some(401),
			_ => None,
		}
	}

	/// Converts any failure into the uniform `{ error, data? }` envelope.
	pub fn envelope(&self) -> ApiError {
		match self {
			Self::Api(api) => api.clone(),
			Self::SessionExpired => ApiError::new(SESSION_EXPIRED_MESSAGE).with_status(401),
			Self::Decode { status, .. } => ApiError::new(self.to_string()).with_status(*status),
			other => ApiError::new(other.to_string()),
		}
	}
}

/// Uniform failure envelope surfaced to callers and cached-read consumers.
///
/// `data` carries structured validation detail when the backend returned a JSON object
/// without a string `error` field, or a JSON array of messages. The HTTP status and `Retry-After` hint are
/// kept for programmatic inspection but never serialized, so the wire shape stays
/// `{ "error": ..., "data": ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
	/// Human-readable message.
	pub error: String,
	/// Structured detail (field errors) returned by the backend.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
	/// HTTP status code, when a response was received.
	#[serde(skip)]
	pub status: Option<u16>,
	/// Retry-After hint from the backend, if supplied.
	#[serde(skip)]
	pub retry_after: Option<Duration>,
}
impl ApiError {
	/// Creates an envelope carrying only a message.
	pub fn new(error: impl Into<String>) -> Self {
		Self { error: error.into(), data: None, status: None, retry_after: None }
	}

	/// Normalizes a non-2xx response.
	///
	/// A JSON object with a string `error` field surfaces that message. Any other JSON object
	/// or array surfaces `HTTP {status}: {statusText}` and is kept as `data`. Anything else
	/// (non-JSON, scalars, empty bodies) surfaces the status line alone.
	pub fn from_response(response: &HttpResponse) -> Self {
		let base = |message: String| {
			Self::new(message)
				.with_status(response.status)
				.with_retry_after(response.retry_after)
		};

		match serde_json::from_slice::<Value>(&response.body) {
			Ok(Value::Object(body)) => match body.get("error") {
				Some(Value::String(message)) => base(message.clone()),
				_ => base(response.status_line()).with_data(Value::Object(body)),
			},
			// Bare validation failures arrive as a list of messages.
			Ok(messages @ Value::Array(_)) => base(response.status_line()).with_data(messages),
			_ => base(response.status_line()),
		}
	}

	/// Attaches structured detail.
	pub fn with_data(mut self, data: Value) -> Self {
		self.data = Some(data);

		self
	}

	/// Attaches the HTTP status code.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Attaches a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Returns the field names present in the structured detail, in backend order.
	pub fn field_names(&self) -> Vec<&str> {
		match &self.data {
			Some(Value::Object(fields)) => fields.keys().map(String::as_str).collect(),
			_ => Vec::new(),
		}
	}

	/// Returns the messages reported for a single field, if any.
	pub fn field_errors(&self, field: &str) -> Vec<String> {
		let Some(Value::Object(fields)) = &self.data else {
			return Vec::new();
		};

		match fields.get(field) {
			Some(Value::Array(items)) => items
				.iter()
				.map(|item| match item {
					Value::String(s) => s.clone(),
					other => other.to_string(),
				})
				.collect(),
			Some(Value::String(s)) => vec![s.clone()],
			Some(other) => vec![other.to_string()],
			None => Vec::new(),
		}
	}
}
impl Display for ApiError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.error)?;

		let fields = self.field_names();

		if !fields.is_empty() {
			write!(f, " ({})", fields.join(", "))?;
		}

		Ok(())
	}
}
impl StdError for ApiError {}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request path could not be resolved against the base URL.
	#[error("Path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized into JSON.
	#[error("Request body cannot be serialized.")]
	InvalidBody(#[from] serde_json::Error),
	/// Query parameters could not be built from the provided value.
	#[error("Query parameters must serialize into a JSON object, got {kind}.")]
	InvalidQuery {
		/// JSON kind that was produced instead of an object.
		kind: &'static str,
	},
	/// The session store holds no refresh token.
	#[error("Session store is missing a refresh token.")]
	MissingRefreshToken,
	/// Resource identifier validation failed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::resources::IdentifierError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
