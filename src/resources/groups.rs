//! `/api/groups` endpoints, including batch membership and training assignment.

// self
use crate::{
	_prelude::*,
	cache::{QueryState, SwrConfig},
	client::ApiClient,
	http::ApiTransport,
	request::QueryParams,
	resources::{self, GroupId, TrainingId, UserId, trainings::TRAININGS_PATH},
};

/// List path for groups.
pub const GROUPS_PATH: &str = "/api/groups";
/// Batch membership path.
pub const GROUPS_BATCH_USERS_PATH: &str = "/api/groups/batch/users";
/// Batch training assignment path.
pub const GROUPS_BATCH_TRAININGS_PATH: &str = "/api/groups/batch/trainings";

/// A user group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
	/// Group identifier.
	pub id: GroupId,
	/// Display name.
	pub name: String,
	/// Optional description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Trainings required of the group's members.
	#[serde(default)]
	pub trainings: Vec<TrainingId>,
}

/// Body for [`ApiClient::create_group`] and [`ApiClient::update_group`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GroupInput {
	/// Display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Description.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Replacement training list.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub trainings: Option<Vec<TrainingId>>,
}

/// Direction of a batch membership or assignment change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchMode {
	/// Add the members to every group.
	Add,
	/// Remove the members from every group.
	Remove,
}

/// One element of a batch change: `{ group, add }` or `{ group, remove }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupBatchChange<M> {
	/// Target group.
	pub group: GroupId,
	/// Members to add.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub add: Option<Vec<M>>,
	/// Members to remove.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub remove: Option<Vec<M>>,
}
impl<M> GroupBatchChange<M>
where
	M: Clone,
{
	/// Builds one change per group applying `members` in `mode`.
	pub fn for_groups(groups: &[GroupId], members: &[M], mode: BatchMode) -> Vec<Self> {
		groups
			.iter()
			.map(|group| {
				let members = Some(members.to_vec());
				let (add, remove) = match mode {
					BatchMode::Add => (members, None),
					BatchMode::Remove => (None, members),
				};

				Self { group: group.clone(), add, remove }
			})
			.collect()
	}
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Cached group listing.
	pub async fn list_groups(&self, config: &SwrConfig) -> QueryState<Vec<Group>> {
		self.swr(Some(GROUPS_PATH), &QueryParams::new(), config).await
	}

	/// Creates a group.
	pub async fn create_group(&self, group: &GroupInput) -> Result<Group> {
		let created = self.post(GROUPS_PATH, group).await?;

		self.revalidate_path(GROUPS_PATH);

		Ok(created)
	}

	/// Partially updates a group.
	pub async fn update_group(&self, id: &GroupId, group: &GroupInput) -> Result<Group> {
		let updated = self.patch(&resources::item_path(GROUPS_PATH, id), group).await?;

		self.revalidate_path(GROUPS_PATH);

		Ok(updated)
	}

	/// Deletes a group.
	pub async fn delete_group(&self, id: &GroupId) -> Result<()> {
		self.delete::<Value>(&resources::item_path(GROUPS_PATH, id)).await?;
		self.revalidate_path(GROUPS_PATH);

		Ok(())
	}

	/// Adds every user to every group.
	pub async fn assign_users_to_groups(&self, groups: &[GroupId], users: &[UserId]) -> Result<()> {
		self.batch_users(groups, users, BatchMode::Add).await
	}

	/// Removes every user from every group.
	pub async fn unassign_users_from_groups(
		&self,
		groups: &[GroupId],
		users: &[UserId],
	) -> Result<()> {
		self.batch_users(groups, users, BatchMode::Remove).await
	}

	/// Adds or removes trainings on every group.
	pub async fn assign_trainings_to_groups(
		&self,
		groups: &[GroupId],
		trainings: &[TrainingId],
		mode: BatchMode,
	) -> Result<()> {
		let changes = GroupBatchChange::for_groups(groups, trainings, mode);

		self.patch::<Value, _>(GROUPS_BATCH_TRAININGS_PATH, &changes).await?;
		self.revalidate_path(GROUPS_PATH);
		self.revalidate_path(TRAININGS_PATH);

		Ok(())
	}

	async fn batch_users(&self, groups: &[GroupId], users: &[UserId], mode: BatchMode) -> Result<()> {
		let changes = GroupBatchChange::for_groups(groups, users, mode);

		self.patch::<Value, _>(GROUPS_BATCH_USERS_PATH, &changes).await?;
		self.revalidate_path(GROUPS_PATH);

		// Membership shows up in each user's detail and training statuses.
		for user in users {
			self.revalidate_user(user);
		}

		Ok(())
	}
}
