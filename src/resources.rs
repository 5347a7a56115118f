//! Typed SafeTrack endpoints built on the authenticated client and the query cache.
//!
//! Reads go through [`ApiClient::swr`](crate::client::ApiClient::swr) and return a
//! [`QueryState`](crate::cache::QueryState); writes return `Result` and revalidate the list
//! paths whose contents they change.

pub mod groups;
pub mod id;
pub mod training_records;
pub mod trainings;
pub mod users;

pub use groups::*;
pub use id::*;
pub use training_records::*;
pub use trainings::*;
pub use users::*;

// self
use crate::{_prelude::*, request::QueryParams};

/// Default page size used by paged list views.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page envelope used by the user listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
	/// 1-based page number.
	pub page: u32,
	/// Items per page.
	pub page_size: u32,
	/// Total number of pages.
	pub total_pages: u32,
	/// Total number of matching items.
	pub total_items: u64,
	/// Items on this page.
	pub items: Vec<T>,
}
impl<T> Page<T> {
	/// Empty page used as a placeholder while loading or on error.
	pub fn empty(page: u32, page_size: u32) -> Self {
		Self { page, page_size, total_pages: 0, total_items: 0, items: Vec::new() }
	}
}

/// Inserts a free-text search term, filtering by `id` when it is numeric and by `name`
/// otherwise.
pub(crate) fn insert_search(params: &mut QueryParams, search: Option<&str>) {
	let Some(search) = search.filter(|s| !s.is_empty()) else {
		return;
	};
	let key = if leading_integer(search) { "id" } else { "name" };

	params.insert(key, search);
}

/// Item path `{base}/{id}`.
pub(crate) fn item_path(base: &str, id: &str) -> String {
	format!("{base}/{id}")
}

// Numeric search terms are those that start with an optional sign and a digit.
fn leading_integer(search: &str) -> bool {
	let digits = search.trim_start().trim_start_matches(['+', '-']);

	digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}
