#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::*;
use safetrack_client::{
	cache::CacheKey,
	request::QueryParams,
	resources::{
		BatchMode, GroupId, GroupInput, Role, TrainingId, TrainingRecordId, UserId, UserQuery,
		UserUpdate,
	},
};

#[tokio::test]
async fn user_listing_searches_numeric_terms_by_id() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let users = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/users")
				.query_param("id", "2345")
				.query_param("page", "1")
				.query_param("page_size", "10")
				.query_param_missing("name");
			then.status(200).header("content-type", "application/json").body(
				"{\"page\":1,\"page_size\":10,\"total_pages\":1,\"total_items\":1,\"items\":[{\"id\":\"2345\",\"name\":\"Ada\",\"role\":\"ADMIN\",\"aliases\":[],\"groups\":[\"g-1\"]}]}",
			);
		})
		.await;
	let query = UserQuery { search: Some("2345".into()), ..Default::default() };
	let state = client.list_users(&query, &minute()).await;

	users.assert_async().await;

	let page = state.data.expect("Listing should decode.");

	assert_eq!(page.total_items, 1);
	assert_eq!(page.items[0].role, Role::Admin);
	assert_eq!(page.items[0].groups, vec![GroupId::new("g-1").expect("Fixture id is valid.")]);
}

#[tokio::test]
async fn group_writes_revalidate_the_group_list() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/groups");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/groups").json_body(json!({ "name": "Lab" }));
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"id\":\"g-9\",\"name\":\"Lab\"}");
		})
		.await;

	client.list_groups(&minute()).await;

	let group = client
		.create_group(&GroupInput { name: Some("Lab".into()), ..Default::default() })
		.await
		.expect("Group creation should succeed.");

	create.assert_async().await;

	assert_eq!(group.id.as_ref(), "g-9");
	assert!(client.cache.is_stale(&CacheKey::new("/api/groups", &QueryParams::new())));

	// A read after the write is served by exactly one refetch, ours or the background one.
	client.list_groups(&minute()).await;

	list.assert_calls_async(2).await;
}

#[tokio::test]
async fn user_updates_revalidate_the_user_detail() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let detail = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/users/10001");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"10001\",\"name\":\"Ada\",\"role\":\"VIEWER\"}");
		})
		.await;
	let update = server
		.mock_async(|when, then| {
			when.method(PATCH).path("/api/users/10001").json_body(json!({ "role": "ADMIN" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"10001\",\"name\":\"Ada\",\"role\":\"ADMIN\"}");
		})
		.await;
	let id = UserId::new("10001").expect("User fixture should be valid.");

	assert_eq!(client.user(&id, &minute()).await.data.map(|u| u.role), Some(Role::Viewer));

	client
		.update_user(&id, &UserUpdate { role: Some(Role::Admin), ..Default::default() })
		.await
		.expect("User update should succeed.");

	update.assert_async().await;

	assert!(client.cache.is_stale(&CacheKey::new("/api/users/10001", &QueryParams::new())));

	client.user(&id, &minute()).await;

	detail.assert_calls_async(2).await;
}

#[tokio::test]
async fn batch_membership_patches_every_group() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let batch = server
		.mock_async(|when, then| {
			when.method(PATCH).path("/api/groups/batch/users").json_body(json!([
				{ "group": "g-1", "remove": ["10001", "10002"] },
				{ "group": "g-2", "remove": ["10001", "10002"] },
			]));
			then.status(200);
		})
		.await;
	let groups = [GroupId::new("g-1"), GroupId::new("g-2")]
		.map(|id| id.expect("Group fixture should be valid."));
	let users = [UserId::new("10001"), UserId::new("10002")]
		.map(|id| id.expect("User fixture should be valid."));

	client
		.unassign_users_from_groups(&groups, &users)
		.await
		.expect("Batch removal should succeed.");

	batch.assert_async().await;
}

#[tokio::test]
async fn training_assignment_sends_direction_per_group() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let batch = server
		.mock_async(|when, then| {
			when.method(PATCH)
				.path("/api/groups/batch/trainings")
				.json_body(json!([{ "group": "g-1", "add": ["t-1"] }]));
			then.status(200);
		})
		.await;

	client
		.assign_trainings_to_groups(
			&[GroupId::new("g-1").expect("Group fixture should be valid.")],
			&[TrainingId::new("t-1").expect("Training fixture should be valid.")],
			BatchMode::Add,
		)
		.await
		.expect("Batch assignment should succeed.");

	batch.assert_async().await;
}

#[tokio::test]
async fn batch_record_deletion_sends_ids_in_body() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let delete = server
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/api/training-records/batch")
				.json_body(json!({ "ids": ["r-1", "r-2"] }));
			then.status(200).header("content-type", "application/json").body("{\"deleted\":2}");
		})
		.await;
	let ids = [TrainingRecordId::new("r-1"), TrainingRecordId::new("r-2")]
		.map(|id| id.expect("Record fixture should be valid."));
	let summary =
		client.delete_training_records(&ids).await.expect("Batch deletion should succeed.");

	delete.assert_async().await;

	assert_eq!(summary["deleted"], 2);
}

#[tokio::test]
async fn absent_training_id_skips_the_read() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let any = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200);
		})
		.await;
	let state = client.training(None, &minute()).await;

	any.assert_calls_async(0).await;

	assert!(state.is_empty() && !state.is_loading);
}
