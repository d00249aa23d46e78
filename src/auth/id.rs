//! Strongly typed identifiers used across the dispatch layer.

// crates.io
use uuid::Uuid;
// self
use crate::_prelude::*;

macro_rules! validated_id {
	($(#[$meta:meta])* $name:ident, $kind:literal) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates and wraps `value`.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				Self::try_from(value.as_ref().to_owned())
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate($kind, &value).map(|()| Self(value))
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}({})", $kind, self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (client, correlation).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (client, correlation).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (client, correlation).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

validated_id! {
	/// OAuth 2.0 client identifier of the confidential application.
	ClientId, "Client"
}
validated_id! {
	/// Identifier tying a request to every error and log line it produces.
	///
	/// Sent to the token endpoint as `client-request-id` and stamped on escaping
	/// authentication errors.
	CorrelationId, "Correlation"
}

impl CorrelationId {
	/// Generates a random UUIDv4 correlation id.
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}
}

fn validate(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
