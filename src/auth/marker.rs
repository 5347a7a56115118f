//! `logged_in` marker cookie used by hosts for route guarding.
//!
//! The marker never authenticates anything; it only tells a page router whether a session
//! is believed to exist.

// self
use crate::_prelude::*;

/// Name of the route-guard cookie.
pub const LOGIN_MARKER_COOKIE: &str = "logged_in";

/// Route-guard cookie emitted on login and cleared on logout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoginMarker {
	/// Whether the marker asserts a live session.
	pub logged_in: bool,
	/// Cookie lifetime.
	pub max_age: Duration,
}
impl LoginMarker {
	/// Lifetime of the marker set at login.
	pub const MAX_AGE: Duration = Duration::days(7);

	/// Marker written after a successful login.
	pub const fn set() -> Self {
		Self { logged_in: true, max_age: Self::MAX_AGE }
	}

	/// Marker that expires the cookie immediately.
	pub const fn cleared() -> Self {
		Self { logged_in: false, max_age: Duration::ZERO }
	}

	/// Renders the cookie as a `Set-Cookie` / `document.cookie` value.
	pub fn to_cookie(&self) -> String {
		let value = if self.logged_in { "1" } else { "" };

		format!(
			"{LOGIN_MARKER_COOKIE}={value}; Path=/; Max-Age={}",
			self.max_age.whole_seconds().max(0)
		)
	}

	/// Absolute expiry computed from `now`.
	pub fn expires_at(&self, now: OffsetDateTime) -> OffsetDateTime {
		now + self.max_age
	}
}
impl Display for LoginMarker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.to_cookie())
	}
}
