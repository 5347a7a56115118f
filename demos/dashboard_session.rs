//! Walks through one dashboard session against a mocked SafeTrack backend: log in, read the
//! group list through the cache, create a group, and watch the list revalidate.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use safetrack_client::{
	cache::SwrConfig,
	client::ReqwestApiClient,
	config::ClientConfig,
	resources::{GroupInput, TrainingId},
	store::MemorySessionStore,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"demo-access\",\"refresh\":\"demo-refresh\"}");
		})
		.await;

	let list = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/groups").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":\"g-1\",\"name\":\"Chemistry labs\",\"trainings\":[\"t-1\"]}]");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/groups");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"id\":\"g-2\",\"name\":\"Workshop\",\"trainings\":[\"t-1\"]}");
		})
		.await;

	let config = ClientConfig::builder().base_url(Url::parse(&server.base_url())?).build()?;
	let client = ReqwestApiClient::new(config, Arc::new(MemorySessionStore::default()));
	let policy = SwrConfig::default();

	client.login("23456789").await?;

	let groups = client.list_groups(&policy).await;

	println!("Groups on first read: {:?}.", groups.data.unwrap_or_default());

	let created = client
		.create_group(&GroupInput {
			name: Some("Workshop".into()),
			description: None,
			trainings: Some(vec![TrainingId::new("t-1")?]),
		})
		.await?;

	println!("Created group {} ({}).", created.name, created.id);

	// Background revalidation of `/api/groups` was scheduled by the write.
	let groups = client.list_groups(&policy).await;

	println!("Groups after the write: {} entries.", groups.data.map(|g| g.len()).unwrap_or(0));

	client.logout().await?;

	println!("Logged out; session present: {}.", client.has_session().await?);

	list.assert_calls_async(2).await;

	Ok(())
}
