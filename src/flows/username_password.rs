//! Resource owner password credentials.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, TokenSecret},
	config::ApplicationConfig,
	flows::{GrantFlow, RequestOptions, impl_request_options, require_field},
	grant::{GrantClient, GrantClientFactory, GrantType, UsernamePasswordGrant},
};

/// Request to authenticate a user by username and password.
#[derive(Clone, Debug)]
pub struct UsernamePasswordRequest {
	/// Common request fields.
	pub options: RequestOptions,
	/// Resource owner's username.
	pub username: String,
	/// Resource owner's password.
	pub password: TokenSecret,
}
impl UsernamePasswordRequest {
	/// Creates a request for `username` with `password`.
	pub fn new<I, S>(username: impl Into<String>, password: impl Into<String>, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			options: RequestOptions::new(scopes),
			username: username.into(),
			password: TokenSecret::new(password),
		}
	}
}
impl_request_options!(UsernamePasswordRequest);
impl GrantFlow for UsernamePasswordRequest {
	type Grant = UsernamePasswordGrant;

	const STAGE: &'static str = "acquire_token_by_username_password";

	fn options(&self) -> &RequestOptions {
		&self.options
	}

	fn prepare(
		self,
		config: &ApplicationConfig,
		correlation_id: CorrelationId,
	) -> Result<Self::Grant> {
		require_field(GrantType::Password, "username", &self.username)?;
		require_field(GrantType::Password, "password", self.password.expose())?;

		let parameters = self.options.user_parameters(GrantType::Password, config, correlation_id)?;

		Ok(UsernamePasswordGrant { parameters, username: self.username, password: self.password })
	}

	fn client(
		factory: &dyn GrantClientFactory,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<Self::Grant>>> {
		factory.username_password_client(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::RequestError;

	#[test]
	fn debug_output_hides_the_password() {
		let request = UsernamePasswordRequest::new("alice", "correct horse", ["user.read"]);

		assert!(!format!("{request:?}").contains("correct horse"));

		let config = ApplicationConfig::builder("app-id")
			.authority("https://login.example.com/consumers")
			.client_secret("shh")
			.build()
			.expect("Config fixture should build.");
		let err = UsernamePasswordRequest::new("alice", "", ["user.read"])
			.prepare(&config, CorrelationId::generate())
			.expect_err("Blank password must fail.");

		assert!(matches!(
			err,
			Error::InvalidRequest(RequestError::MissingField { field: "password", .. })
		));
	}
}
