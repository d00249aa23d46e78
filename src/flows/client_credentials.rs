//! App-only client credentials.
//!
//! Client credentials is the only grant with extra dispatch policy:
//!
//! - OIDC scopes (`openid`, `profile`, `offline_access`) are stripped and at least one
//!   resource scope must remain.
//! - The authority must name a concrete tenant; `common`, `organizations`, and `consumers`
//!   fail with [`ConfigError::MissingTenantId`](crate::error::ConfigError::MissingTenantId)
//!   before any grant client exists.
//! - A request may carry its own signed assertion, which replaces the configured credential.
//! - A registered [`AppTokenProvider`](crate::ext::AppTokenProvider) answers instead of the
//!   grant client.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, TokenSecret},
	config::ApplicationConfig,
	credential::ClientCredential,
	error::RequestError,
	ext,
	flows::{ConfidentialClient, GrantFlow, RequestOptions, impl_request_options},
	grant::{
		ClientCredentialGrant, GrantClient, GrantClientFactory, GrantFuture, GrantParameters,
		GrantRequest,
	},
};

/// Request for an app-only token.
#[derive(Clone, Debug)]
pub struct ClientCredentialRequest {
	/// Common request fields.
	pub options: RequestOptions,
	/// Signed assertion that replaces the configured credential for this request.
	pub client_assertion: Option<TokenSecret>,
}
impl ClientCredentialRequest {
	/// Creates a request for `scopes` (usually `{resource}/.default`).
	pub fn new<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { options: RequestOptions::new(scopes), client_assertion: None }
	}

	/// Authenticates this request with `assertion` instead of the configured credential.
	pub fn with_client_assertion(mut self, assertion: impl Into<String>) -> Self {
		self.client_assertion = Some(TokenSecret::new(assertion));

		self
	}
}
impl_request_options!(ClientCredentialRequest);
impl GrantFlow for ClientCredentialRequest {
	type Grant = ClientCredentialGrant;

	const STAGE: &'static str = "acquire_token_by_client_credential";

	fn options(&self) -> &RequestOptions {
		&self.options
	}

	fn prepare(
		self,
		config: &ApplicationConfig,
		correlation_id: CorrelationId,
	) -> Result<Self::Grant> {
		let grant = <Self::Grant as GrantRequest>::GRANT;
		let scopes = self.options.scopes_for(grant)?;

		if scopes.is_empty() {
			return Err(RequestError::EmptyScopes { grant }.into());
		}
		if self.client_assertion.as_ref().is_some_and(TokenSecret::is_blank) {
			return Err(RequestError::MissingField { grant, field: "client_assertion" }.into());
		}

		config.authority.validate_for(grant)?;

		let assertion_override = self.client_assertion.as_ref().map(TokenSecret::expose);
		let credential = ClientCredential::for_request(config, assertion_override);

		Ok(ClientCredentialGrant {
			parameters: GrantParameters {
				correlation_id,
				scopes,
				credential,
				skip_cache: self.options.skip_cache,
			},
			tenant_id: config.authority.tenant().to_owned(),
		})
	}

	fn client(
		factory: &dyn GrantClientFactory,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<Self::Grant>>> {
		factory.client_credential_client(config)
	}

	fn intercept<'a>(
		client: &'a ConfidentialClient,
		grant: &'a Self::Grant,
	) -> Option<GrantFuture<'a>> {
		client.app_token_provider().map(|provider| ext::acquire_app_token(provider.as_ref(), grant))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{credential::JWT_BEARER_ASSERTION_TYPE, error::ConfigError};

	const RESOURCE_DEFAULT: &str = "https://graph.example.com/.default";

	fn config(authority: &str) -> ApplicationConfig {
		ApplicationConfig::builder("app-id")
			.authority(authority)
			.client_secret("shh")
			.build()
			.expect("Config fixture should build.")
	}

	#[test]
	fn oidc_scopes_are_stripped() {
		let grant = ClientCredentialRequest::new(["openid", "profile", RESOURCE_DEFAULT])
			.prepare(&config("https://login.example.com/contoso"), CorrelationId::generate())
			.expect("Client credentials should prepare.");

		assert_eq!(grant.parameters.scopes.iter().collect::<Vec<_>>(), vec![RESOURCE_DEFAULT]);
		assert_eq!(grant.tenant_id, "contoso");
	}

	#[test]
	fn only_oidc_scopes_leave_nothing_to_request() {
		let err = ClientCredentialRequest::new(["openid", "offline_access"])
			.prepare(&config("https://login.example.com/contoso"), CorrelationId::generate())
			.expect_err("OIDC-only scopes must fail.");

		assert!(matches!(err, Error::InvalidRequest(RequestError::EmptyScopes { .. })));
	}

	#[test]
	fn alias_tenants_fail_before_credentials_are_built() {
		for alias in ["common", "organizations", "consumers"] {
			let err = ClientCredentialRequest::new([RESOURCE_DEFAULT])
				.prepare(
					&config(&format!("https://login.example.com/{alias}")),
					CorrelationId::generate(),
				)
				.expect_err("Alias tenants must fail.");

			assert!(matches!(err, Error::Config(ConfigError::MissingTenantId { .. })));
		}
	}

	#[test]
	fn request_assertion_overrides_configured_secret() {
		let grant = ClientCredentialRequest::new([RESOURCE_DEFAULT])
			.with_client_assertion("request.jwt")
			.prepare(&config("https://login.example.com/contoso"), CorrelationId::generate())
			.expect("Client credentials should prepare.");

		match grant.parameters.credential {
			ClientCredential::Assertion(assertion) => {
				assert_eq!(assertion.assertion(), "request.jwt");
				assert_eq!(assertion.assertion_type(), JWT_BEARER_ASSERTION_TYPE);
			},
			other => panic!("Expected the request assertion, got {other:?}."),
		}

		let blank = ClientCredentialRequest::new([RESOURCE_DEFAULT])
			.with_client_assertion("")
			.prepare(&config("https://login.example.com/contoso"), CorrelationId::generate());

		assert!(matches!(
			blank,
			Err(Error::InvalidRequest(RequestError::MissingField { field: "client_assertion", .. }))
		));
	}
}
