//! Redacting wrapper for tokens, passwords, and client secrets.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Secret string (token, password, client secret) whose formatters never print the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw value. Callers must keep it out of logs.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the secret is empty or whitespace only.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&REDACTED).finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_redact() {
		let secret = TokenSecret::new("p@ssw0rd");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "p@ssw0rd");
	}

	#[test]
	fn blank_detection_ignores_padding() {
		assert!(TokenSecret::from("   ").is_blank());
		assert!(TokenSecret::from("").is_blank());
		assert!(!TokenSecret::from(" x ").is_blank());
	}
}
