//! Transport primitives for API calls.
//!
//! [`ApiTransport`] is the client's only dependency on an HTTP stack. The client renders
//! every logical call into a transport-neutral [`HttpRequest`] (URL with query already
//! applied, headers, body) and reads back an [`HttpResponse`] carrying the status, reason
//! phrase, `Retry-After` hint, and raw body bytes. Anything that fails before a response is
//! available is a transport error and becomes [`Error::Network`].

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	request::{Method, MultipartForm},
};

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = std::result::Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing one API request.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// clones of the client and by background revalidation tasks.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends the request and resolves once the full response body is available.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Body kinds understood by transports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HttpBody {
	/// No body.
	#[default]
	Empty,
	/// Pre-serialized bytes; the matching content type is already in the headers.
	Bytes(Vec<u8>),
	/// Multipart form; the transport sets the content type with its boundary.
	Multipart(MultipartForm),
}

/// Fully rendered request handed to a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including the query string.
	pub url: Url,
	/// Header name/value pairs, names in lowercase.
	pub headers: Vec<(String, String)>,
	/// Request body.
	pub body: HttpBody,
}
impl HttpRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: HttpBody::Empty }
	}

	/// Appends a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets the body.
	pub fn body(mut self, body: HttpBody) -> Self {
		self.body = body;

		self
	}

	/// Returns the first header with the provided (lowercase) name.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}
}

/// Response captured by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase (`statusText`), when the transport knows it.
	pub reason: Option<String>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response with the provided status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, reason: None, retry_after: None, body: body.into() }
	}

	/// Sets the reason phrase.
	pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
		self.reason = Some(reason.into());

		self
	}

	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Renders `HTTP {status}: {statusText}`.
	pub fn status_line(&self) -> String {
		format!("HTTP {}: {}", self.status, self.reason.as_deref().unwrap_or_default())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn build_form(form: MultipartForm) -> Result<reqwest::multipart::Form, ReqwestError> {
		use reqwest::multipart::{Form, Part};

		let mut out = Form::new();

		for part in form.parts {
			out = match part {
				crate::request::FormPart::Text { name, value } => out.text(name, value),
				crate::request::FormPart::File { name, file_name, content_type, bytes } => {
					let mut file = Part::bytes(bytes).file_name(file_name);

					if let Some(content_type) = content_type {
						file = file.mime_str(&content_type)?;
					}

					out.part(name, file)
				},
			};
		}

		Ok(out)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestTransport(..)")
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(request.method.into(), request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}

			builder = match request.body {
				HttpBody::Empty => builder,
				HttpBody::Bytes(bytes) => builder.body(bytes),
				HttpBody::Multipart(form) => builder.multipart(Self::build_form(form)?),
			};

			let response = builder.send().await?;
			let status = response.status();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse {
				status: status.as_u16(),
				reason: status.canonical_reason().map(str::to_owned),
				retry_after,
				body,
			})
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_line_uses_reason_phrase() {
		let response = HttpResponse::new(500, "oops").with_reason("Internal Server Error");

		assert_eq!(response.status_line(), "HTTP 500: Internal Server Error");
		assert!(!response.is_success());
		assert!(HttpResponse::new(204, Vec::new()).is_success());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, "30".parse().expect("Header value should parse."));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(30)));
	}
}
