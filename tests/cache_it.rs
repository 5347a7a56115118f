#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use common::*;
use safetrack_client::{
	cache::{CacheKey, SwrConfig},
	error::SESSION_EXPIRED_MESSAGE,
	request::QueryParams,
};

#[tokio::test]
async fn null_path_is_idle_and_never_fetches() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let any = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200).body("[]");
		})
		.await;
	let state = client.swr::<Vec<Value>>(None, &QueryParams::new(), &SwrConfig::always()).await;

	any.assert_calls_async(0).await;

	assert!(state.data.is_none());
	assert!(state.error.is_none());
	assert!(!state.is_loading);
	assert!(client.cache.is_empty());
}

#[tokio::test]
async fn fresh_entries_are_served_from_cache() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let trainings = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/trainings");
			then.status(200).header("content-type", "application/json").body("[{\"id\":\"t-1\"}]");
		})
		.await;

	for _ in 0..3 {
		let state = client.swr::<Vec<Value>>(Some("/api/trainings"), &QueryParams::new(), &minute()).await;

		assert_eq!(state.data.map(|items| items.len()), Some(1));
	}

	trainings.assert_calls_async(1).await;

	client.swr::<Vec<Value>>(Some("/api/trainings"), &QueryParams::new(), &SwrConfig::always()).await;

	trainings.assert_calls_async(2).await;
}

#[tokio::test]
async fn revalidation_refetches_only_the_matching_path() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let groups = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/groups").query_param("search", "x");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let trainings = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/trainings");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let search = QueryParams::new().with("search", "x");

	client.swr::<Vec<Value>>(Some("/api/groups"), &search, &minute()).await;
	client.swr::<Vec<Value>>(Some("/api/trainings"), &QueryParams::new(), &minute()).await;

	let revalidation = client.revalidate_path("/api/groups");

	assert_eq!(revalidation.keys(), &[CacheKey::new("/api/groups", &search)]);
	assert!(revalidation.is_scheduled());

	revalidation.finished().await;

	groups.assert_calls_async(2).await;
	trainings.assert_calls_async(1).await;

	assert!(!client.cache.is_stale(&CacheKey::new("/api/groups", &search)));

	// The refetched entry is fresh again.
	client.swr::<Vec<Value>>(Some("/api/groups"), &search, &minute()).await;

	groups.assert_calls_async(2).await;
}

#[tokio::test]
async fn revalidating_an_unknown_path_is_a_noop() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let revalidation = client.revalidate_path("/api/users");

	assert!(revalidation.keys().is_empty());
	assert!(!revalidation.is_scheduled());

	revalidation.finished().await;
}

#[tokio::test]
async fn failures_are_reported_in_state() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/training-records");
			then.status(500).body("upstream exploded");
		})
		.await;

	let state = client
		.swr::<Value>(Some("/api/training-records"), &QueryParams::new(), &minute())
		.await;

	assert!(state.data.is_none());
	assert!(!state.is_loading);
	assert_eq!(
		state.error.as_ref().map(|e| e.error.as_str()),
		Some("HTTP 500: Internal Server Error")
	);

	let peeked = client.peek::<Value>(Some("/api/training-records"), &QueryParams::new());

	assert_eq!(peeked.error, state.error);
}

#[tokio::test]
async fn shape_mismatches_become_error_state() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/groups");
			then.status(200).header("content-type", "application/json").body("{\"not\":\"a list\"}");
		})
		.await;

	let state = client.swr::<Vec<Value>>(Some("/api/groups"), &QueryParams::new(), &minute()).await;

	assert!(state.data.is_none());
	assert!(state.error.is_some());

	let raw = client.peek::<Value>(Some("/api/groups"), &QueryParams::new());

	assert_eq!(raw.data, Some(json!({ "not": "a list" })));
}

#[tokio::test]
async fn session_expiry_during_a_cached_read_is_reported() {
	let server = MockServer::start_async().await;
	let (client, store) = build_client(&server);

	seed_session(&*store, "access-1", "refresh-1").await;

	let groups = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/groups");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(401);
		})
		.await;
	let state = client.swr::<Vec<Value>>(Some("/api/groups"), &QueryParams::new(), &minute()).await;

	groups.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	let error = state.error.expect("Expiry must surface as an error.");

	assert_eq!(error.error, SESSION_EXPIRED_MESSAGE);
	assert_eq!(error.status, Some(401));
	assert!(state.data.is_none());
	assert!(!state.is_loading);
	// Expiry dropped every cached read, including this one.
	assert!(client.cache.is_empty());
	assert!(store.snapshot().is_empty());
}
