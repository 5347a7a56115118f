//! `/api/users` endpoints.

// self
use crate::{
	_prelude::*,
	cache::{QueryState, SwrConfig},
	client::ApiClient,
	http::ApiTransport,
	request::{MultipartForm, QueryParams},
	resources::{self, DEFAULT_PAGE_SIZE, GroupId, Page, TrainingId, UserId},
};

/// List path for users.
pub const USERS_PATH: &str = "/api/users";
/// Bulk import path (multipart upload).
pub const USERS_BATCH_PATH: &str = "/api/users/batch";

/// Account role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
	/// Full read/write access.
	Admin,
	/// Read-only access.
	Viewer,
}
impl Role {
	/// Wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Role::Admin => "ADMIN",
			Role::Viewer => "VIEWER",
		}
	}
}

/// A SafeTrack user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Staff/student number.
	pub id: UserId,
	/// Display name.
	pub name: String,
	/// Account role.
	pub role: Role,
	/// Alternate identifiers.
	#[serde(default)]
	pub aliases: Vec<String>,
	/// Groups the user belongs to.
	#[serde(default)]
	pub groups: Vec<GroupId>,
}

/// Filters for [`ApiClient::list_users`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserQuery {
	/// Free-text term; numeric terms match the id, others the name.
	pub search: Option<String>,
	/// Restrict to one group.
	pub group: Option<GroupId>,
	/// Restrict to one role.
	pub role: Option<Role>,
	/// Sort key, prefixed with `-` for descending order.
	pub order_by: Option<String>,
	/// 1-based page number.
	pub page: u32,
	/// Items per page.
	pub page_size: u32,
}
impl UserQuery {
	/// Renders the query parameters.
	pub fn params(&self) -> QueryParams {
		let mut params = QueryParams::new()
			.with("group", self.group.as_deref())
			.with("role", self.role.map(Role::as_str))
			.with("order_by", self.order_by.as_deref().filter(|s| !s.is_empty()))
			.with("page", self.page)
			.with("page_size", self.page_size);

		resources::insert_search(&mut params, self.search.as_deref());

		params
	}
}
impl Default for UserQuery {
	fn default() -> Self {
		Self {
			search: None,
			group: None,
			role: None,
			order_by: None,
			page: 1,
			page_size: DEFAULT_PAGE_SIZE,
		}
	}
}

/// Body for [`ApiClient::create_user`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewUser {
	/// Staff/student number.
	pub id: UserId,
	/// Display name.
	pub name: String,
}

/// Partial update for [`ApiClient::update_user`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
	/// New display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// New role.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub role: Option<Role>,
	/// Replacement alias list.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub aliases: Option<Vec<String>>,
}

/// Completion status of one training assigned to a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTrainingStatus {
	/// Assigned training.
	pub training: TrainingId,
	/// Status label reported by the backend.
	pub status: String,
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Cached paged user listing.
	pub async fn list_users(&self, query: &UserQuery, config: &SwrConfig) -> QueryState<Page<User>> {
		self.swr(Some(USERS_PATH), &query.params(), config).await
	}

	/// Cached single user.
	pub async fn user(&self, id: &UserId, config: &SwrConfig) -> QueryState<User> {
		self.swr(Some(&resources::item_path(USERS_PATH, id)), &QueryParams::new(), config).await
	}

	/// Cached training statuses of one user.
	pub async fn user_trainings(
		&self,
		id: &UserId,
		config: &SwrConfig,
	) -> QueryState<Vec<UserTrainingStatus>> {
		let path = format!("{}/trainings", resources::item_path(USERS_PATH, id));

		self.swr(Some(&path), &QueryParams::new(), config).await
	}

	/// Creates one user.
	pub async fn create_user(&self, user: &NewUser) -> Result<User> {
		let created = self.post(USERS_PATH, user).await?;

		self.revalidate_path(USERS_PATH);

		Ok(created)
	}

	/// Imports users from an uploaded spreadsheet; the file goes in the `file` field.
	pub async fn import_users(&self, form: MultipartForm) -> Result<Vec<User>> {
		let created = self.upload(USERS_BATCH_PATH, form).await?;

		self.revalidate_path(USERS_PATH);

		Ok(created)
	}

	/// Partially updates one user.
	pub async fn update_user(&self, id: &UserId, update: &UserUpdate) -> Result<User> {
		let updated = self.patch(&resources::item_path(USERS_PATH, id), update).await?;

		self.revalidate_user(id);

		Ok(updated)
	}

	/// Deletes one user.
	pub async fn delete_user(&self, id: &UserId) -> Result<()> {
		self.delete::<Value>(&resources::item_path(USERS_PATH, id)).await?;
		self.revalidate_user(id);

		Ok(())
	}

	/// Invalidates the listing plus the reads of one user.
	pub(crate) fn revalidate_user(&self, id: &UserId) {
		let item = resources::item_path(USERS_PATH, id);

		self.revalidate_path(USERS_PATH);
		self.revalidate_path(&item);
		self.revalidate_path(&format!("{item}/trainings"));
	}
}
