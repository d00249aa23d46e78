//! Dispatch layer for confidential-client token acquisition.
//!
//! [`ConfidentialClient`] exposes one entry point per grant. Each entry point runs the same
//! template:
//!
//! 1. Validate the request shape and normalize scopes.
//! 2. Apply grant policy (client credentials rejects alias tenants).
//! 3. Attach the client credential.
//! 4. For client credentials, let a registered [`AppTokenProvider`] answer instead.
//! 5. Build a fresh grant client and await it.
//! 6. Stamp the request correlation id on any escaping authentication error.
//!
//! Steps 1 to 3 never touch the network, and their failures never construct a grant client.

pub mod authorization_code;
pub mod client_credentials;
pub mod metrics;
pub mod on_behalf_of;
pub mod refresh_token;
pub mod username_password;

pub use authorization_code::*;
pub use client_credentials::*;
pub use metrics::*;
pub use on_behalf_of::*;
pub use refresh_token::*;
pub use username_password::*;

// std
use std::sync::OnceLock;
// self
use crate::{
	_prelude::*,
	auth::{AuthenticationResult, CorrelationId, ScopeSet},
	config::ApplicationConfig,
	credential::ClientCredential,
	error::{ConfigError, RequestError},
	ext::AppTokenProvider,
	grant::{GrantClient, GrantClientFactory, GrantFuture, GrantParameters, GrantRequest, GrantType},
	obs::{self, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")] use crate::oauth::ReqwestTokenEndpointFactory;

macro_rules! impl_request_options {
	($name:ident) => {
		impl $name {
			/// Pins the correlation id instead of generating one.
			pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
				self.options.correlation_id = Some(correlation_id.into());

				self
			}

			/// Asks the grant client to bypass any cached token.
			pub fn with_skip_cache(mut self, skip_cache: bool) -> Self {
				self.options.skip_cache = skip_cache;

				self
			}
		}
	};
}
pub(crate) use impl_request_options;

/// Confidential client that routes token requests to grant clients.
///
/// The application configuration is shared behind an [`Arc`] and never mutated. Every call
/// asks the [`GrantClientFactory`] for a new client, so calls share no mutable state beyond
/// the metric counters.
pub struct ConfidentialClient {
	config: Arc<ApplicationConfig>,
	factory: Arc<dyn GrantClientFactory>,
	app_token_provider: OnceLock<Arc<dyn AppTokenProvider>>,
	metrics: Arc<DispatchMetrics>,
}
impl ConfidentialClient {
	/// Creates a client that builds grant clients through `factory`.
	pub fn with_factory(
		config: impl Into<Arc<ApplicationConfig>>,
		factory: Arc<dyn GrantClientFactory>,
	) -> Self {
		Self {
			config: config.into(),
			factory,
			app_token_provider: OnceLock::new(),
			metrics: Default::default(),
		}
	}

	/// Application configuration shared by every grant client.
	pub fn config(&self) -> &Arc<ApplicationConfig> {
		&self.config
	}

	/// Counters for calls made through this client.
	pub fn metrics(&self) -> &Arc<DispatchMetrics> {
		&self.metrics
	}

	/// Registers the app token provider consulted by client-credential requests.
	///
	/// The slot can be filled once; later calls fail with
	/// [`ConfigError::AppTokenProviderAlreadySet`].
	pub fn set_app_token_provider(&self, provider: impl 'static + AppTokenProvider) -> Result<()> {
		self.app_token_provider
			.set(Arc::new(provider))
			.map_err(|_| ConfigError::AppTokenProviderAlreadySet.into())
	}

	/// Returns `true` once an app token provider is registered.
	pub fn has_app_token_provider(&self) -> bool {
		self.app_token_provider.get().is_some()
	}

	/// Redeems an authorization code.
	pub async fn acquire_token_by_code(
		&self,
		request: AuthorizationCodeRequest,
	) -> Result<AuthenticationResult> {
		self.dispatch(request).await
	}

	/// Redeems a refresh token.
	pub async fn acquire_token_by_refresh_token(
		&self,
		request: RefreshTokenRequest,
	) -> Result<AuthenticationResult> {
		self.dispatch(request).await
	}

	/// Acquires an app-only token.
	pub async fn acquire_token_by_client_credential(
		&self,
		request: ClientCredentialRequest,
	) -> Result<AuthenticationResult> {
		self.dispatch(request).await
	}

	/// Exchanges an incoming user assertion for a downstream token.
	pub async fn acquire_token_on_behalf_of(
		&self,
		request: OnBehalfOfRequest,
	) -> Result<AuthenticationResult> {
		self.dispatch(request).await
	}

	/// Acquires a token with the resource owner's username and password.
	pub async fn acquire_token_by_username_password(
		&self,
		request: UsernamePasswordRequest,
	) -> Result<AuthenticationResult> {
		self.dispatch(request).await
	}

	pub(crate) fn app_token_provider(&self) -> Option<&Arc<dyn AppTokenProvider>> {
		self.app_token_provider.get()
	}

	async fn dispatch<F>(&self, request: F) -> Result<AuthenticationResult>
	where
		F: GrantFlow,
	{
		let grant = <F::Grant as GrantRequest>::GRANT;

		self.metrics.record_attempt();
		obs::record_flow_outcome(grant, FlowOutcome::Attempt);

		let result = match resolve_correlation_id(request.options()) {
			Ok(correlation_id) => {
				let span = FlowSpan::new(grant, F::STAGE, &correlation_id);

				span.instrument(self.execute(request, correlation_id.clone()))
					.await
					.map_err(|err| self.enrich(err, correlation_id))
			},
			Err(err) => Err(err),
		};

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_flow_outcome(grant, FlowOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_flow_outcome(grant, FlowOutcome::Failure);
			},
		}

		result
	}

	async fn execute<F>(
		&self,
		request: F,
		correlation_id: CorrelationId,
	) -> Result<AuthenticationResult>
	where
		F: GrantFlow,
	{
		let grant = request.prepare(&self.config, correlation_id)?;

		if let Some(answer) = F::intercept(self, &grant) {
			self.metrics.record_app_token_provider();

			return answer.await;
		}

		let client = F::client(self.factory.as_ref(), &self.config)?;

		client.acquire_token(grant).await
	}

	fn enrich(&self, mut err: Error, correlation_id: CorrelationId) -> Error {
		if err.set_correlation_id(correlation_id) {
			self.metrics.record_enrichment();
		}

		err
	}
}
#[cfg(feature = "reqwest")]
impl ConfidentialClient {
	/// Creates a client backed by the default reqwest token-endpoint grant clients.
	///
	/// The underlying transport never follows redirects.
	pub fn new(config: impl Into<Arc<ApplicationConfig>>) -> Result<Self> {
		Ok(Self::with_factory(config, Arc::new(ReqwestTokenEndpointFactory::reqwest()?)))
	}
}
impl Debug for ConfidentialClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfidentialClient")
			.field("config", &self.config)
			.field("app_token_provider_set", &self.has_app_token_provider())
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// Fields shared by every inbound request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
	/// Requested scopes; duplicates collapse and order is irrelevant.
	pub scopes: Vec<String>,
	/// Caller-supplied correlation id; one is generated when absent.
	pub correlation_id: Option<String>,
	/// Hint forwarded to the grant client to bypass any cache.
	pub skip_cache: bool,
}
impl RequestOptions {
	/// Creates options for the provided scopes.
	pub fn new<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { scopes: scopes.into_iter().map(Into::into).collect(), ..Default::default() }
	}

	/// Normalizes scopes and applies the OIDC policy of `grant`.
	///
	/// User-delegated grants always ask for the OIDC defaults; app-only grants never do.
	fn scopes_for(&self, grant: GrantType) -> Result<ScopeSet, RequestError> {
		let scopes = ScopeSet::new(self.scopes.iter().map(String::as_str))?;

		if grant.is_user_delegated() {
			Ok(scopes.with_oidc_defaults())
		} else {
			Ok(scopes.without_oidc_defaults())
		}
	}

	fn user_parameters(
		&self,
		grant: GrantType,
		config: &ApplicationConfig,
		correlation_id: CorrelationId,
	) -> Result<GrantParameters, RequestError> {
		Ok(GrantParameters {
			correlation_id,
			scopes: self.scopes_for(grant)?,
			credential: ClientCredential::for_request(config, None),
			skip_cache: self.skip_cache,
		})
	}
}

/// Per-grant half of the dispatch template.
pub(crate) trait GrantFlow: Sized + Send {
	type Grant: GrantRequest;

	/// Entry point name recorded on the flow span.
	const STAGE: &'static str;

	fn options(&self) -> &RequestOptions;

	/// Validates the request and turns it into a normalized grant.
	fn prepare(self, config: &ApplicationConfig, correlation_id: CorrelationId)
	-> Result<Self::Grant>;

	fn client(
		factory: &dyn GrantClientFactory,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<Self::Grant>>>;

	/// Lets a hook answer before any grant client exists.
	fn intercept<'a>(
		_client: &'a ConfidentialClient,
		_grant: &'a Self::Grant,
	) -> Option<GrantFuture<'a>> {
		None
	}
}

fn resolve_correlation_id(options: &RequestOptions) -> Result<CorrelationId> {
	match options.correlation_id.as_deref() {
		Some(raw) => CorrelationId::new(raw).map_err(|e| RequestError::from(e).into()),
		None => Ok(CorrelationId::generate()),
	}
}

fn require_field(grant: GrantType, field: &'static str, value: &str) -> Result<(), RequestError> {
	if value.trim().is_empty() {
		return Err(RequestError::MissingField { grant, field });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> ApplicationConfig {
		ApplicationConfig::builder("app-id")
			.authority("https://login.example.com/common")
			.client_secret("shh")
			.build()
			.expect("Config fixture should build.")
	}

	#[test]
	fn request_options_normalize_and_merge_oidc_defaults() {
		let options = RequestOptions::new(["user.read", "user.read", "openid"]);
		let correlation_id =
			CorrelationId::new("corr-opts").expect("Correlation fixture should be valid.");
		let parameters = options
			.user_parameters(GrantType::RefreshToken, &config(), correlation_id)
			.expect("Options should normalize.");

		assert_eq!(
			parameters.scopes.iter().collect::<Vec<_>>(),
			vec!["offline_access", "openid", "profile", "user.read"]
		);
		assert!(matches!(parameters.credential, ClientCredential::Secret(_)));
	}

	#[test]
	fn oidc_policy_follows_the_grant_audience() {
		let options = RequestOptions::new(["openid", "https://graph.example.com/.default"]);
		let app_only =
			options.scopes_for(GrantType::ClientCredentials).expect("Scopes should normalize.");
		let delegated = options.scopes_for(GrantType::OnBehalfOf).expect("Scopes should normalize.");

		assert_eq!(app_only.iter().collect::<Vec<_>>(), vec!["https://graph.example.com/.default"]);
		assert_eq!(delegated.len(), 4);
		assert!(delegated.contains("offline_access"));
	}

	#[test]
	fn invalid_scope_entries_are_request_errors() {
		let err = RequestOptions::new(["user read"])
			.user_parameters(GrantType::Password, &config(), CorrelationId::generate())
			.expect_err("Whitespace in a scope must fail.");

		assert!(matches!(err, RequestError::InvalidScope(_)));
	}

	#[test]
	fn correlation_ids_are_validated_or_generated() {
		let pinned =
			RequestOptions { correlation_id: Some("corr-pinned".into()), ..Default::default() };

		assert_eq!(
			resolve_correlation_id(&pinned).expect("Pinned id should be accepted.").as_ref(),
			"corr-pinned"
		);

		let invalid =
			RequestOptions { correlation_id: Some("has space".into()), ..Default::default() };

		assert!(matches!(
			resolve_correlation_id(&invalid),
			Err(Error::InvalidRequest(RequestError::InvalidCorrelationId(_)))
		));
		assert_ne!(
			resolve_correlation_id(&RequestOptions::default()).expect("Generated id."),
			resolve_correlation_id(&RequestOptions::default()).expect("Generated id.")
		);
	}

	#[test]
	fn blank_fields_are_rejected() {
		assert!(require_field(GrantType::Password, "username", "alice").is_ok());
		assert!(matches!(
			require_field(GrantType::Password, "password", "  "),
			Err(RequestError::MissingField { field: "password", .. })
		));
	}
}
