//! Authorization code redemption.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, TokenSecret},
	config::ApplicationConfig,
	error::RequestError,
	flows::{GrantFlow, RequestOptions, impl_request_options, require_field},
	grant::{AuthorizationCodeGrant, GrantClient, GrantClientFactory, GrantType},
};

/// Request to redeem an authorization code returned to the redirect URI.
#[derive(Clone, Debug)]
pub struct AuthorizationCodeRequest {
	/// Common request fields.
	pub options: RequestOptions,
	/// Authorization code.
	pub code: TokenSecret,
	/// Redirect URI used when the code was requested.
	pub redirect_uri: String,
	/// PKCE verifier matching the challenge sent with the authorization request.
	pub code_verifier: Option<TokenSecret>,
}
impl AuthorizationCodeRequest {
	/// Creates a request for `code` issued to `redirect_uri`.
	pub fn new<I, S>(code: impl Into<String>, redirect_uri: impl Into<String>, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			options: RequestOptions::new(scopes),
			code: TokenSecret::new(code),
			redirect_uri: redirect_uri.into(),
			code_verifier: None,
		}
	}

	/// Attaches the PKCE verifier.
	pub fn with_code_verifier(mut self, verifier: impl Into<String>) -> Self {
		self.code_verifier = Some(TokenSecret::new(verifier));

		self
	}
}
impl_request_options!(AuthorizationCodeRequest);
impl GrantFlow for AuthorizationCodeRequest {
	type Grant = AuthorizationCodeGrant;

	const STAGE: &'static str = "acquire_token_by_code";

	fn options(&self) -> &RequestOptions {
		&self.options
	}

	fn prepare(
		self,
		config: &ApplicationConfig,
		correlation_id: CorrelationId,
	) -> Result<Self::Grant> {
		require_field(GrantType::AuthorizationCode, "code", self.code.expose())?;
		require_field(GrantType::AuthorizationCode, "redirect_uri", &self.redirect_uri)?;

		let redirect_uri = Url::parse(&self.redirect_uri)
			.map_err(|source| RequestError::InvalidRedirectUri { source })?;
		let parameters =
			self.options.user_parameters(GrantType::AuthorizationCode, config, correlation_id)?;

		Ok(AuthorizationCodeGrant {
			parameters,
			code: self.code,
			redirect_uri,
			code_verifier: self.code_verifier.filter(|verifier| !verifier.is_blank()),
		})
	}

	fn client(
		factory: &dyn GrantClientFactory,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<Self::Grant>>> {
		factory.authorization_code_client(config)
	}
}
