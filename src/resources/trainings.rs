//! `/api/trainings` endpoints.

// self
use crate::{
	_prelude::*,
	cache::{QueryState, SwrConfig},
	client::ApiClient,
	http::ApiTransport,
	request::QueryParams,
	resources::{self, DEFAULT_PAGE_SIZE, Page, TrainingId, UserId},
};

/// List path for trainings.
pub const TRAININGS_PATH: &str = "/api/trainings";

/// Where completions of a training come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrainingType {
	/// Learning management system course.
	Lms,
	/// TryBooking event.
	Trybooking,
	/// Recorded manually.
	External,
}

/// A training definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Training {
	/// Training identifier.
	pub id: TrainingId,
	/// Creation timestamp as sent by the backend.
	pub timestamp: String,
	/// Display name.
	pub name: String,
	/// Description.
	#[serde(default)]
	pub description: String,
	/// Days after which a completion expires (0 means never).
	#[serde(default)]
	pub expiry: u32,
	/// Completion source.
	#[serde(rename = "type")]
	pub kind: TrainingType,
	/// Source-specific settings.
	#[serde(default)]
	pub config: Value,
}
impl Training {
	/// Completion validity, or `None` when completions never expire.
	pub fn validity(&self) -> Option<Duration> {
		(self.expiry > 0).then(|| Duration::days(i64::from(self.expiry)))
	}
}

/// Body for [`ApiClient::create_training`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTraining {
	/// Display name.
	pub name: String,
	/// Description.
	pub description: String,
	/// Days after which a completion expires (0 means never).
	pub expiry: u32,
	/// Completion source.
	#[serde(rename = "type")]
	pub kind: TrainingType,
	/// Source-specific settings.
	pub config: Value,
}

/// Partial update for [`ApiClient::update_training`]; the type cannot change.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrainingUpdate {
	/// New name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// New description.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// New expiry in days.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expiry: Option<u32>,
	/// Replacement settings.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config: Option<Value>,
}

/// Completion status of one user assigned to a training.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingUserStatus {
	/// Assigned user.
	pub id: UserId,
	/// Status label reported by the backend.
	pub status: String,
}

/// Filters for [`ApiClient::training_users`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainingUserQuery {
	/// Free-text term; numeric terms match the id, others the name.
	pub search: Option<String>,
	/// Restrict to one status label.
	pub status: Option<String>,
	/// Sort key.
	pub order_by: Option<String>,
	/// 1-based page number.
	pub page: u32,
	/// Items per page.
	pub page_size: u32,
}
impl TrainingUserQuery {
	/// Renders the query parameters.
	pub fn params(&self) -> QueryParams {
		let mut params = QueryParams::new()
			.with("status", self.status.as_deref().filter(|s| !s.is_empty()))
			.with("order_by", self.order_by.as_deref().filter(|s| !s.is_empty()))
			.with("page", self.page)
			.with("page_size", self.page_size);

		resources::insert_search(&mut params, self.search.as_deref());

		params
	}
}
impl Default for TrainingUserQuery {
	fn default() -> Self {
		Self { search: None, status: None, order_by: None, page: 1, page_size: DEFAULT_PAGE_SIZE }
	}
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Cached training listing.
	pub async fn list_trainings(&self, config: &SwrConfig) -> QueryState<Vec<Training>> {
		self.swr(Some(TRAININGS_PATH), &QueryParams::new(), config).await
	}

	/// Cached single training; `None` skips the read.
	pub async fn training(&self, id: Option<&TrainingId>, config: &SwrConfig) -> QueryState<Training> {
		let path = id.map(|id| resources::item_path(TRAININGS_PATH, id));

		self.swr(path.as_deref(), &QueryParams::new(), config).await
	}

	/// Cached paged listing of users assigned to a training.
	pub async fn training_users(
		&self,
		id: &TrainingId,
		query: &TrainingUserQuery,
		config: &SwrConfig,
	) -> QueryState<Page<TrainingUserStatus>> {
		let path = format!("{}/users", resources::item_path(TRAININGS_PATH, id));

		self.swr(Some(&path), &query.params(), config).await
	}

	/// Creates a training.
	pub async fn create_training(&self, training: &NewTraining) -> Result<Training> {
		let created = self.post(TRAININGS_PATH, training).await?;

		self.revalidate_path(TRAININGS_PATH);

		Ok(created)
	}

	/// Partially updates a training.
	pub async fn update_training(&self, id: &TrainingId, update: &TrainingUpdate) -> Result<Training> {
		let path = resources::item_path(TRAININGS_PATH, id);
		let updated = self.patch(&path, update).await?;

		self.revalidate_path(TRAININGS_PATH);
		self.revalidate_path(&path);

		Ok(updated)
	}

	/// Deletes a training.
	pub async fn delete_training(&self, id: &TrainingId) -> Result<()> {
		self.delete::<Value>(&resources::item_path(TRAININGS_PATH, id)).await?;
		self.revalidate_path(TRAININGS_PATH);

		Ok(())
	}
}
