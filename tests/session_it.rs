#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::{Arc, Mutex};
// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use common::*;
use safetrack_client::{
	auth::LoginMarker,
	cache::SwrConfig,
	client::{ReqwestApiClient, SessionEvents},
	error::Error,
	request::QueryParams,
	store::MemorySessionStore,
};

#[derive(Default)]
struct CookieJar(Mutex<Vec<String>>);
impl CookieJar {
	fn cookies(&self) -> Vec<String> {
		self.0.lock().expect("Cookie jar lock should not be poisoned.").clone()
	}

	fn push(&self, marker: &LoginMarker) {
		self.0.lock().expect("Cookie jar lock should not be poisoned.").push(marker.to_cookie());
	}
}
impl SessionEvents for CookieJar {
	fn on_login(&self, marker: &LoginMarker) {
		self.push(marker);
	}

	fn on_logout(&self, marker: &LoginMarker) {
		self.push(marker);
	}
}

fn build_client_with_jar(
	server: &MockServer,
) -> (ReqwestApiClient, Arc<MemorySessionStore>, Arc<CookieJar>) {
	let (client, store) = build_client(server);
	let jar = Arc::new(CookieJar::default());

	(client.with_events(jar.clone()), store, jar)
}

#[tokio::test]
async fn login_stores_credentials_and_sets_marker() {
	let server = MockServer::start_async().await;
	let (client, store, jar) = build_client_with_jar(&server);
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/login")
				.header_missing("authorization")
				.json_body(json!({ "uwa_id": "23456789" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"access-1\",\"refresh\":\"refresh-1\"}");
		})
		.await;
	let pair = client.login("23456789").await.expect("Login should succeed.");

	login.assert_async().await;

	assert_eq!(pair.access.expose(), "access-1");
	assert_eq!(store.snapshot().refresh.as_ref().map(|t| t.expose()), Some("refresh-1"));
	assert!(client.has_session().await.expect("Store should be readable."));
	assert_eq!(jar.cookies(), vec!["logged_in=1; Path=/; Max-Age=604800".to_string()]);
}

#[tokio::test]
async fn rejected_login_is_an_api_error_without_refresh() {
	let server = MockServer::start_async().await;
	let (client, store, jar) = build_client_with_jar(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"Unknown UWA ID\"}");
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200);
		})
		.await;
	let err = client.login("00000000").await.expect_err("Unknown users must be rejected.");

	refresh.assert_calls_async(0).await;

	match err {
		Error::Api(api) => {
			assert_eq!(api.error, "Unknown UWA ID");
			assert_eq!(api.status, Some(401));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(store.snapshot().is_empty());
	assert!(jar.cookies().is_empty());
}

#[tokio::test]
async fn logout_clears_store_cache_and_marker() {
	let server = MockServer::start_async().await;
	let (client, store, jar) = build_client_with_jar(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"access-1\",\"refresh\":\"refresh-1\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/groups");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;

	client.login("23456789").await.expect("Login should succeed.");
	client
		.swr::<Vec<Value>>(Some("/api/groups"), &QueryParams::new(), &SwrConfig::default())
		.await;

	assert_eq!(client.cache.len(), 1);

	client.logout().await.expect("Logout should succeed.");

	assert!(store.snapshot().is_empty());
	assert!(client.cache.is_empty());
	assert!(!client.has_session().await.expect("Store should be readable."));
	assert_eq!(
		jar.cookies(),
		vec![
			"logged_in=1; Path=/; Max-Age=604800".to_string(),
			"logged_in=; Path=/; Max-Age=0".to_string(),
		]
	);
}
