//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
use time::Duration;
// self
use safetrack_client::{
	auth::CredentialPair,
	cache::SwrConfig,
	client::ReqwestApiClient,
	config::ClientConfig,
	store::{MemorySessionStore, SessionStore},
	url::Url,
};

/// Builds a config pointing at `base_url` (e.g. `MockServer::base_url`).
pub fn test_config(base_url: &str) -> ClientConfig {
	ClientConfig::builder()
		.base_url(Url::parse(base_url).expect("Mock server base URL should parse."))
		.build()
		.expect("Mock server config should be valid.")
}

/// Client against the mock server with an empty in-memory session store.
pub fn build_client(server: &MockServer) -> (ReqwestApiClient, Arc<MemorySessionStore>) {
	let store = Arc::new(MemorySessionStore::default());

	(ReqwestApiClient::new(test_config(&server.base_url()), store.clone()), store)
}

/// Seeds the store with the provided access/refresh pair.
pub async fn seed_session(store: &dyn SessionStore, access: &str, refresh: &str) {
	store
		.save(CredentialPair::new(access, refresh))
		.await
		.expect("Failed to seed credentials into the session store.");
}

/// Cache policy that keeps entries fresh for the length of a test.
pub fn minute() -> SwrConfig {
	SwrConfig::fresh_for(Duration::minutes(1))
}
