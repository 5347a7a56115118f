//! `/api/training-records` endpoints.

// self
use crate::{
	_prelude::*,
	cache::{QueryState, SwrConfig},
	client::ApiClient,
	http::ApiTransport,
	request::QueryParams,
	resources::{self, DEFAULT_PAGE_SIZE, TrainingId, TrainingRecordId, UserId},
};

/// List path for training records.
pub const TRAINING_RECORDS_PATH: &str = "/api/training-records";
/// Batch create/delete path.
pub const TRAINING_RECORDS_BATCH_PATH: &str = "/api/training-records/batch";

/// One completion of a training by a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
	/// Record identifier.
	pub id: TrainingRecordId,
	/// Completion timestamp as sent by the backend.
	pub timestamp: String,
	/// User who completed the training.
	pub user: UserId,
	/// Completed training.
	pub training: TrainingId,
	/// Source-specific completion detail.
	#[serde(default)]
	pub details: Value,
	/// Completion is past the training's expiry.
	#[serde(default)]
	pub expired: bool,
}

/// Offset-paged record listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
	/// Total number of matching records.
	pub count: u64,
	/// URL of the next page.
	pub next: Option<String>,
	/// URL of the previous page.
	pub previous: Option<String>,
	/// Records on this page.
	pub results: Vec<TrainingRecord>,
}
impl RecordPage {
	/// Empty page used as a placeholder while loading or on error.
	pub fn empty() -> Self {
		Self { count: 0, next: None, previous: None, results: Vec::new() }
	}
}

/// Filters for [`ApiClient::list_training_records`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainingRecordQuery {
	/// Free-text term passed through unchanged.
	pub search: Option<String>,
	/// Restrict to one user.
	pub user: Option<UserId>,
	/// Restrict to one training.
	pub training: Option<TrainingId>,
	/// Sort key; defaults to `timestamp`.
	pub order_by: String,
	/// 1-based page number.
	pub page: u32,
	/// Items per page.
	pub page_size: u32,
}
impl TrainingRecordQuery {
	/// Renders the query parameters.
	pub fn params(&self) -> QueryParams {
		QueryParams::new()
			.with("search", self.search.as_deref().filter(|s| !s.is_empty()))
			.with("user", self.user.as_deref())
			.with("training", self.training.as_deref())
			.with("order_by", Some(self.order_by.as_str()).filter(|s| !s.is_empty()))
			.with("page", self.page)
			.with("page_size", self.page_size)
	}
}
impl Default for TrainingRecordQuery {
	fn default() -> Self {
		Self {
			search: None,
			user: None,
			training: None,
			order_by: "timestamp".into(),
			page: 1,
			page_size: DEFAULT_PAGE_SIZE,
		}
	}
}

/// Body for [`ApiClient::create_training_record`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTrainingRecord {
	/// User who completed the training.
	pub user: UserId,
	/// Completed training.
	pub training: TrainingId,
	/// Completion detail.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

/// Body for [`ApiClient::create_training_records`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingRecordBatch {
	/// Users who completed the training.
	pub user_ids: Vec<UserId>,
	/// Completed training.
	pub training_id: TrainingId,
	/// Completion detail applied to every record.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

#[derive(Serialize)]
struct RecordIds<'a> {
	ids: &'a [TrainingRecordId],
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Cached paged record listing.
	pub async fn list_training_records(
		&self,
		query: &TrainingRecordQuery,
		config: &SwrConfig,
	) -> QueryState<RecordPage> {
		self.swr(Some(TRAINING_RECORDS_PATH), &query.params(), config).await
	}

	/// Cached single record.
	pub async fn training_record(
		&self,
		id: &TrainingRecordId,
		config: &SwrConfig,
	) -> QueryState<TrainingRecord> {
		let path = resources::item_path(TRAINING_RECORDS_PATH, id);

		self.swr(Some(&path), &QueryParams::new(), config).await
	}

	/// Records one completion.
	pub async fn create_training_record(&self, record: &NewTrainingRecord) -> Result<TrainingRecord> {
		let created = self.post(TRAINING_RECORDS_PATH, record).await?;

		self.revalidate_path(TRAINING_RECORDS_PATH);

		Ok(created)
	}

	/// Records the same completion for many users; returns the backend's summary.
	pub async fn create_training_records(&self, batch: &TrainingRecordBatch) -> Result<Value> {
		let summary = self.post(TRAINING_RECORDS_BATCH_PATH, batch).await?;

		self.revalidate_path(TRAINING_RECORDS_PATH);

		Ok(summary)
	}

	/// Replaces the completion detail of one record.
	pub async fn update_training_record(
		&self,
		id: &TrainingRecordId,
		details: Value,
	) -> Result<TrainingRecord> {
		let path = resources::item_path(TRAINING_RECORDS_PATH, id);
		let updated = self.patch(&path, &serde_json::json!({ "details": details })).await?;

		self.revalidate_path(TRAINING_RECORDS_PATH);
		self.revalidate_path(&path);

		Ok(updated)
	}

	/// Deletes one record.
	pub async fn delete_training_record(&self, id: &TrainingRecordId) -> Result<()> {
		self.delete::<Value>(&resources::item_path(TRAINING_RECORDS_PATH, id)).await?;
		self.revalidate_path(TRAINING_RECORDS_PATH);

		Ok(())
	}

	/// Deletes many records with one `DELETE` carrying `{ ids }`.
	pub async fn delete_training_records(&self, ids: &[TrainingRecordId]) -> Result<Value> {
		let summary = self.delete_with(TRAINING_RECORDS_BATCH_PATH, &RecordIds { ids }).await?;

		self.revalidate_path(TRAINING_RECORDS_PATH);

		Ok(summary)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_query_orders_by_timestamp() {
		let query = TrainingRecordQuery {
			training: Some(TrainingId::new("t-1").expect("Training fixture should be valid.")),
			..Default::default()
		};

		assert_eq!(
			query.params().to_query_string(),
			"order_by=timestamp&page=1&page_size=10&training=t-1"
		);
	}

	#[test]
	fn record_pages_accept_null_links() {
		let page: RecordPage = serde_json::from_value(serde_json::json!({
			"count": 0,
			"next": null,
			"previous": null,
			"results": [],
		}))
		.expect("Empty page should decode.");

		assert_eq!(page, RecordPage::empty());
	}
}
