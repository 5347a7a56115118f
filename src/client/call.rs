//! One logical call: render, attempt, and at most one refresh-then-retry.
//!
//! The call is an explicit two-phase sequence. [`ApiClient::attempt`] sends the request
//! with whatever access token is stored. Only when that first response is a 401 does
//! `refresh_then_retry_once` run; it renews the token, sends the request a second time,
//! and turns a second 401 into [`Error::SessionExpired`]. Nothing loops and nothing
//! recurses, so the single-retry bound holds by construction.

// self
use crate::{
	_prelude::*,
	auth::{LoginMarker, TokenSecret},
	client::ApiClient,
	error::{ApiError, ConfigError},
	http::{ApiTransport, HttpBody, HttpRequest, HttpResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
	request::{ApiRequest, Method, MultipartForm, Payload, QueryParams},
	store::SessionStore,
};

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Performs one logical call and decodes the 2xx body into `T`.
	///
	/// Empty or non-JSON 2xx bodies decode from `null`, so `()`, `Option<_>`, and
	/// [`Value`] work for 204-style responses.
	pub async fn request<T>(
		&self,
		method: Method,
		path: &str,
		payload: impl Into<Payload>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(&ApiRequest::new(method, path).payload(payload)).await
	}

	/// Sends a prebuilt request and decodes the 2xx body into `T`.
	pub async fn send<T>(&self, request: &ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let (status, body) = self.execute(request).await?;

		decode_value(status, body)
	}

	/// Sends a prebuilt request and returns the raw JSON body (`null` when empty).
	pub async fn send_value(&self, request: &ApiRequest) -> Result<Value> {
		Ok(self.execute(request).await?.1)
	}

	/// `GET path?params`.
	pub async fn get<T>(&self, path: &str, params: QueryParams) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(&ApiRequest::get(path).query(params)).await
	}

	/// `POST path` with a JSON body.
	pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.send(&ApiRequest::post(path).json(body)?).await
	}

	/// `PUT path` with a JSON body.
	pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.send(&ApiRequest::put(path).json(body)?).await
	}

	/// `PATCH path` with a JSON body.
	pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.send(&ApiRequest::patch(path).json(body)?).await
	}

	/// `DELETE path` without a body.
	pub async fn delete<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(&ApiRequest::delete(path)).await
	}

	/// `DELETE path` with a JSON body (batch deletions).
	pub async fn delete_with<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.send(&ApiRequest::delete(path).json(body)?).await
	}

	/// `POST path` with a multipart body (file uploads).
	pub async fn upload<T>(&self, path: &str, form: MultipartForm) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(&ApiRequest::post(path).multipart(form)).await
	}

	/// Renders a descriptor into a transport request, attaching `access` as a bearer token.
	pub fn render(&self, request: &ApiRequest, access: Option<&TokenSecret>) -> Result<HttpRequest> {
		let mut url = self.config.resolve(&request.path)?;
		let mut body = HttpBody::Empty;
		let mut headers = vec![("accept".to_owned(), JSON_CONTENT_TYPE.to_owned())];

		match &request.payload {
			Payload::None => {},
			Payload::Query(params) => params.apply_to(&mut url),
			Payload::Json(value) => {
				headers.push(("content-type".to_owned(), JSON_CONTENT_TYPE.to_owned()));
				body = HttpBody::Bytes(serde_json::to_vec(value).map_err(ConfigError::from)?);
			},
			Payload::Multipart(form) => body = HttpBody::Multipart(form.clone()),
		}

		if let Some(access) = access {
			headers.push(("authorization".to_owned(), access.bearer()));
		}

		Ok(HttpRequest { method: request.method, url, headers, body })
	}

	async fn execute(&self, request: &ApiRequest) -> Result<(u16, Value)> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "execute");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let (sent_with, response) = self.attempt(request).await?;
				let response = if response.status == 401 {
					self.refresh_then_retry_once(request, sent_with, &span).await?
				} else {
					response
				};

				span.record_status(response.status);

				into_result(response)
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Sends the request once with the currently stored access token.
	///
	/// Returns the token that was attached so a 401 can be attributed to it.
	async fn attempt(&self, request: &ApiRequest) -> Result<(Option<TokenSecret>, HttpResponse)> {
		let access = <dyn SessionStore>::access_token(self.store.as_ref()).await?;
		let http = self.render(request, access.as_ref())?;
		let response = self.transport.execute(http).await.map_err(Error::network)?;

		Ok((access, response))
	}

	async fn refresh_then_retry_once(
		&self,
		request: &ApiRequest,
		rejected: Option<TokenSecret>,
		span: &CallSpan,
	) -> Result<HttpResponse> {
		if let Err(e) = self.refresh_after_rejection(rejected.as_ref()).await {
			span.warn(&format!("Access token renewal failed: {e}"));

			return Err(self.expire_session(span).await);
		}

		let (_, response) = self.attempt(request).await?;

		if response.status == 401 {
			span.warn("Renewed access token was rejected.");

			return Err(self.expire_session(span).await);
		}

		Ok(response)
	}

	/// Clears credentials and cached reads, notifies the host, and yields the terminal error.
	///
	/// When the store cannot be cleared the storage error is returned instead and the host is
	/// not told the session ended, since the credentials are still persisted.
	pub(crate) async fn expire_session(&self, span: &CallSpan) -> Error {
		let cleared = self.store.clear().await;

		self.cache.clear();
		obs::record_session_expired(cleared.is_ok());

		if let Err(e) = cleared {
			span.warn(&format!("Expired credentials could not be cleared: {e}"));

			return e.into();
		}

		self.events.on_session_expired(&LoginMarker::cleared());

		Error::SessionExpired
	}
}

/// Builds a JSON `POST` used by the auth endpoints, which bypass bearer handling.
pub(crate) fn json_post<B>(url: Url, body: &B) -> Result<HttpRequest>
where
	B: ?Sized + Serialize,
{
	let bytes = serde_json::to_vec(body).map_err(ConfigError::from)?;

	Ok(HttpRequest::new(Method::Post, url)
		.header("accept", JSON_CONTENT_TYPE)
		.header("content-type", JSON_CONTENT_TYPE)
		.body(HttpBody::Bytes(bytes)))
}

/// Decodes a 2xx body directly from bytes, naming the failing field on mismatch.
pub(crate) fn decode_slice<T>(status: u16, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de).map_err(|source| Error::Decode { source, status })
}

fn decode_value<T>(status: u16, body: Value) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(body).map_err(|source| Error::Decode { source, status })
}

fn into_result(response: HttpResponse) -> Result<(u16, Value)> {
	if response.is_success() {
		let body = serde_json::from_slice(&response.body).unwrap_or(Value::Null);

		Ok((response.status, body))
	} else {
		Err(ApiError::from_response(&response).into())
	}
}
