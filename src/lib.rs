//! Authenticated REST client for the SafeTrack training-compliance API: bearer tokens with
//! single-flight refresh, uniform error envelopes, and a path-invalidated query cache.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod request;
pub mod resources;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::ApiClient,
		config::ClientConfig,
		http::ReqwestTransport,
		store::{MemorySessionStore, SessionStore},
	};

	/// Client type alias used by reqwest-backed tests.
	pub type ReqwestTestClient = ApiClient<ReqwestTransport>;

	/// Constructs an [`ApiClient`] pointing at `base_url`, backed by an in-memory session store
	/// and the reqwest transport.
	pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestTestClient, Arc<MemorySessionStore>) {
		let config = ClientConfig::builder()
			.base_url(Url::parse(base_url).expect("Test base URL should parse."))
			.build()
			.expect("Test config should be valid.");
		let store_backend = Arc::new(MemorySessionStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let client = ApiClient::with_transport(config, store, ReqwestTransport::default());

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
