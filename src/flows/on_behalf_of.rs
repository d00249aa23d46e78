//! On-behalf-of exchange for middle-tier services.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, TokenSecret},
	config::ApplicationConfig,
	flows::{GrantFlow, RequestOptions, impl_request_options, require_field},
	grant::{GrantClient, GrantClientFactory, GrantType, OnBehalfOfGrant},
};

/// Request to exchange the caller's access token for a downstream token.
#[derive(Clone, Debug)]
pub struct OnBehalfOfRequest {
	/// Common request fields.
	pub options: RequestOptions,
	/// Bearer token the service received from its caller.
	pub obo_assertion: TokenSecret,
}
impl OnBehalfOfRequest {
	/// Creates a request exchanging `obo_assertion` for `scopes`.
	pub fn new<I, S>(obo_assertion: impl Into<String>, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { options: RequestOptions::new(scopes), obo_assertion: TokenSecret::new(obo_assertion) }
	}
}
impl_request_options!(OnBehalfOfRequest);
impl GrantFlow for OnBehalfOfRequest {
	type Grant = OnBehalfOfGrant;

	const STAGE: &'static str = "acquire_token_on_behalf_of";

	fn options(&self) -> &RequestOptions {
		&self.options
	}

	fn prepare(
		self,
		config: &ApplicationConfig,
		correlation_id: CorrelationId,
	) -> Result<Self::Grant> {
		require_field(GrantType::OnBehalfOf, "obo_assertion", self.obo_assertion.expose())?;

		let parameters =
			self.options.user_parameters(GrantType::OnBehalfOf, config, correlation_id)?;

		Ok(OnBehalfOfGrant { parameters, assertion: self.obo_assertion })
	}

	fn client(
		factory: &dyn GrantClientFactory,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<Self::Grant>>> {
		factory.on_behalf_of_client(config)
	}
}
