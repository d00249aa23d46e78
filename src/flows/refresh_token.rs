//! Refresh token redemption.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, TokenSecret},
	config::ApplicationConfig,
	flows::{GrantFlow, RequestOptions, impl_request_options, require_field},
	grant::{GrantClient, GrantClientFactory, GrantType, RefreshTokenGrant},
};

/// Request to redeem a refresh token.
#[derive(Clone, Debug)]
pub struct RefreshTokenRequest {
	/// Common request fields.
	pub options: RequestOptions,
	/// Refresh token previously issued to this client.
	pub refresh_token: TokenSecret,
}
impl RefreshTokenRequest {
	/// Creates a request redeeming `refresh_token` for `scopes`.
	pub fn new<I, S>(refresh_token: impl Into<String>, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { options: RequestOptions::new(scopes), refresh_token: TokenSecret::new(refresh_token) }
	}
}
impl_request_options!(RefreshTokenRequest);
impl GrantFlow for RefreshTokenRequest {
	type Grant = RefreshTokenGrant;

	const STAGE: &'static str = "acquire_token_by_refresh_token";

	fn options(&self) -> &RequestOptions {
		&self.options
	}

	fn prepare(
		self,
		config: &ApplicationConfig,
		correlation_id: CorrelationId,
	) -> Result<Self::Grant> {
		require_field(GrantType::RefreshToken, "refresh_token", self.refresh_token.expose())?;

		let parameters =
			self.options.user_parameters(GrantType::RefreshToken, config, correlation_id)?;

		Ok(RefreshTokenGrant { parameters, refresh_token: self.refresh_token })
	}

	fn client(
		factory: &dyn GrantClientFactory,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<Self::Grant>>> {
		factory.refresh_token_client(config)
	}
}
