//! Request descriptors: HTTP verb, path, and exactly one payload kind.
//!
//! Query parameters live in a sorted map so the same logical parameter set always yields
//! the same URL and the same cache key. Null values are omitted and list values are
//! expanded into repeated `name=value` entries rather than comma-joined.

// self
use crate::{_prelude::*, error::ConfigError};

/// HTTP verbs used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// Read.
	Get,
	/// Create or action.
	Post,
	/// Full replacement.
	Put,
	/// Partial update.
	Patch,
	/// Removal.
	Delete,
}
impl Method {
	/// Returns the canonical verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// A single query parameter value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamValue {
	/// Omitted from the query string.
	Null,
	/// Emitted once.
	Scalar(String),
	/// Emitted once per element, in order.
	List(Vec<String>),
}
impl ParamValue {
	fn from_json(value: Value) -> Self {
		match value {
			Value::Null => Self::Null,
			Value::Array(items) =>
				Self::List(items.into_iter().filter_map(scalar_from_json).collect()),
			other => scalar_from_json(other).map(Self::Scalar).unwrap_or(Self::Null),
		}
	}
}
impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Scalar(value.to_owned())
	}
}
impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Scalar(value)
	}
}
impl<T> From<Option<T>> for ParamValue
where
	T: Into<ParamValue>,
{
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Self::Null)
	}
}
impl From<Vec<String>> for ParamValue {
	fn from(values: Vec<String>) -> Self {
		Self::List(values)
	}
}
macro_rules! impl_param_from_display {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for ParamValue {
				fn from(value: $ty) -> Self {
					Self::Scalar(value.to_string())
				}
			}
		)*
	};
}
impl_param_from_display!(bool, i32, i64, u32, u64, usize);

/// Sorted query parameter map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryParams(BTreeMap<String, ParamValue>);
impl QueryParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds parameters from any value serializing into a JSON object.
	///
	/// Nested objects are sent as their JSON text; nulls inside lists are dropped.
	pub fn from_serialize<T>(value: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		match serde_json::to_value(value).map_err(ConfigError::from)? {
			Value::Object(map) => Ok(Self(
				map.into_iter().map(|(key, value)| (key, ParamValue::from_json(value))).collect(),
			)),
			Value::Null => Ok(Self::default()),
			other => Err(ConfigError::InvalidQuery { kind: json_kind(&other) }.into()),
		}
	}

	/// Adds or replaces a parameter.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.insert(name, value);

		self
	}

	/// Adds a repeated parameter.
	pub fn with_list<I, V>(mut self, name: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<String>,
	{
		self.0.insert(name.into(), ParamValue::List(values.into_iter().map(Into::into).collect()));

		self
	}

	/// Adds or replaces a parameter in place.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
		self.0.insert(name.into(), value.into());
	}

	/// Returns the raw value of a parameter.
	pub fn get(&self, name: &str) -> Option<&ParamValue> {
		self.0.get(name)
	}

	/// Returns true when no pair would be emitted.
	pub fn is_empty(&self) -> bool {
		self.pairs().next().is_none()
	}

	/// Iterates the `(name, value)` pairs that end up in the query string, in key order.
	pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().flat_map(|(name, value)| {
			let values: Vec<&str> = match value {
				ParamValue::Null => Vec::new(),
				ParamValue::Scalar(v) => vec![v.as_str()],
				ParamValue::List(vs) => vs.iter().map(String::as_str).collect(),
			};

			values.into_iter().map(move |v| (name.as_str(), v))
		})
	}

	/// Canonical `application/x-www-form-urlencoded` rendering.
	pub fn to_query_string(&self) -> String {
		url::form_urlencoded::Serializer::new(String::new()).extend_pairs(self.pairs()).finish()
	}

	/// Appends every pair to the URL's query, leaving the URL untouched when empty.
	pub fn apply_to(&self, url: &mut Url) {
		if self.is_empty() {
			return;
		}

		url.query_pairs_mut().extend_pairs(self.pairs());
	}
}

/// One part of a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormPart {
	/// Plain text field.
	Text {
		/// Field name.
		name: String,
		/// Field value.
		value: String,
	},
	/// File field.
	File {
		/// Field name.
		name: String,
		/// File name reported to the server.
		file_name: String,
		/// MIME type, if known.
		content_type: Option<String>,
		/// File contents.
		bytes: Vec<u8>,
	},
}

/// Multipart payload kept as plain data so a retried request can rebuild it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
	/// Parts in submission order.
	pub parts: Vec<FormPart>,
}
impl MultipartForm {
	/// Creates an empty form.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a text field.
	pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.parts.push(FormPart::Text { name: name.into(), value: value.into() });

		self
	}

	/// Appends a file field.
	pub fn file(
		mut self,
		name: impl Into<String>,
		file_name: impl Into<String>,
		content_type: Option<&str>,
		bytes: impl Into<Vec<u8>>,
	) -> Self {
		self.parts.push(FormPart::File {
			name: name.into(),
			file_name: file_name.into(),
			content_type: content_type.map(str::to_owned),
			bytes: bytes.into(),
		});

		self
	}
}

/// Mutually exclusive payload kinds for one call.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Payload {
	/// No parameters and no body.
	#[default]
	None,
	/// Query-string parameters.
	Query(QueryParams),
	/// JSON body sent with `Content-Type: application/json`.
	Json(Value),
	/// Multipart body; the transport chooses the content type and boundary.
	Multipart(MultipartForm),
}
impl From<QueryParams> for Payload {
	fn from(params: QueryParams) -> Self {
		Self::Query(params)
	}
}
impl From<MultipartForm> for Payload {
	fn from(form: MultipartForm) -> Self {
		Self::Multipart(form)
	}
}
impl From<Value> for Payload {
	fn from(body: Value) -> Self {
		Self::Json(body)
	}
}

/// Ephemeral description of one logical call.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Path relative to the configured base URL (e.g. `/api/groups`).
	pub path: String,
	/// Parameters or body.
	pub payload: Payload,
}
impl ApiRequest {
	/// Creates a request without payload.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), payload: Payload::None }
	}

	/// `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Attaches query parameters.
	pub fn query(mut self, params: QueryParams) -> Self {
		self.payload = Payload::Query(params);

		self
	}

	/// Attaches a JSON body serialized from `body`.
	pub fn json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		self.payload = Payload::Json(serde_json::to_value(body).map_err(ConfigError::from)?);

		Ok(self)
	}

	/// Attaches a multipart body.
	pub fn multipart(mut self, form: MultipartForm) -> Self {
		self.payload = Payload::Multipart(form);

		self
	}

	/// Attaches an already-built payload.
	pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
		self.payload = payload.into();

		self
	}

	/// Query parameters carried by this request, if any.
	pub fn params(&self) -> Option<&QueryParams> {
		match &self.payload {
			Payload::Query(params) => Some(params),
			_ => None,
		}
	}
}

fn scalar_from_json(value: Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s),
		other => Some(other.to_string()),
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn serialization_is_order_independent() {
		let a = QueryParams::new().with("search", "a").with("page", 2_u32);
		let b = QueryParams::new().with("page", 2_u32).with("search", "a");

		assert_eq!(a.to_query_string(), b.to_query_string());
		assert_eq!(a.to_query_string(), "page=2&search=a");
	}

	#[test]
	fn lists_repeat_and_nulls_are_omitted() {
		let params = QueryParams::from_serialize(&serde_json::json!({
			"ids": ["x", "y"],
			"group": null,
			"page": 1,
		}))
		.expect("Object params should convert.");

		assert_eq!(params.to_query_string(), "ids=x&ids=y&page=1");

		let mut url = Url::parse("http://localhost/api/users").expect("Fixture URL parses.");

		params.apply_to(&mut url);

		let ids: Vec<_> = url.query_pairs().filter(|(k, _)| k == "ids").map(|(_, v)| v).collect();

		assert_eq!(ids, vec!["x", "y"]);
	}

	#[test]
	fn empty_params_leave_url_untouched() {
		let mut url = Url::parse("http://localhost/api/groups").expect("Fixture URL parses.");

		QueryParams::new().with("role", None::<String>).apply_to(&mut url);

		assert_eq!(url.as_str(), "http://localhost/api/groups");
	}

	#[test]
	fn non_object_params_are_rejected() {
		let err = QueryParams::from_serialize(&["a", "b"]).expect_err("Arrays are not params.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidQuery { kind: "an array" })));
	}
}
