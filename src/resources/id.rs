//! Validated identifiers interpolated into resource paths.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;
const PATH_DELIMITERS: [char; 4] = ['/', '?', '#', '%'];

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (user, group, training, record).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (user, group, training, record).
		kind: &'static str,
	},
	/// The identifier contains a character that would alter the request path.
	#[error("{kind} identifier contains the path delimiter `{delimiter}`.")]
	ContainsDelimiter {
		/// Kind of identifier (user, group, training, record).
		kind: &'static str,
		/// Offending character.
		delimiter: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (user, group, training, record).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { UserId, "Identifier of a SafeTrack user (the university staff/student number).", "User" }
def_id! { GroupId, "Identifier of a user group.", "Group" }
def_id! { TrainingId, "Identifier of a training definition.", "Training" }
def_id! { TrainingRecordId, "Identifier of a training completion record.", "TrainingRecord" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if let Some(delimiter) = view.chars().find(|c| PATH_DELIMITERS.contains(c)) {
		return Err(IdentifierError::ContainsDelimiter { kind, delimiter });
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_delimiters() {
		assert!(UserId::new(" 2345").is_err(), "Leading whitespace must be rejected.");
		assert!(GroupId::new("").is_err());
		assert_eq!(
			TrainingId::new("a/../b"),
			Err(IdentifierError::ContainsDelimiter { kind: "Training", delimiter: '/' })
		);
		assert!(TrainingRecordId::new("r?x=1").is_err());

		let user = UserId::new("23456789").expect("Numeric user fixture should be valid.");

		assert_eq!(user.as_ref(), "23456789");
		assert_eq!(format!("{user:?}"), "User(23456789)");
	}

	#[test]
	fn deserialization_enforces_validation() {
		let group: GroupId =
			serde_json::from_str("\"g-42\"").expect("Group should deserialize successfully.");

		assert_eq!(group.as_ref(), "g-42");
		assert!(serde_json::from_str::<GroupId>("\"with space\"").is_err());
	}

	#[test]
	fn length_limit_counts_characters() {
		UserId::new("a".repeat(IDENTIFIER_MAX_LEN)).expect("Exact length should succeed.");

		assert!(UserId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<UserId, u8> = HashMap::from_iter([(
			UserId::new("10001").expect("User used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("10001"), Some(&7));
	}
}
