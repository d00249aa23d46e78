#![allow(dead_code)]

// std
use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use time::OffsetDateTime;
// self
use oauth2_confidential::{
	auth::{AuthenticationResult, CorrelationId},
	config::ApplicationConfig,
	credential::ClientCredential,
	error::{AuthError, AuthErrorKind, Error},
	grant::{
		AuthorizationCodeGrant, ClientCredentialGrant, GrantClient, GrantClientFactory,
		GrantFuture, GrantRequest, GrantType, OnBehalfOfGrant, RefreshTokenGrant,
		UsernamePasswordGrant,
	},
};

#[cfg(feature = "reqwest")]
use oauth2_confidential::{
	flows::ConfidentialClient,
	http::ReqwestHttpClient,
	oauth::{ReqwestTokenEndpointFactory, ReqwestTransportErrorMapper},
	reqwest::Client as ReqwestClient,
};

pub const AUTHORITY: &str = "https://login.example.com/contoso";
pub const RESOURCE_DEFAULT: &str = "https://graph.example.com/.default";

/// Builds a reqwest transport that accepts the self-signed certificates produced by
/// `httpmock`, with the same redirect policy as the default transport.
#[cfg(feature = "reqwest")]
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	ReqwestHttpClient::from_builder(
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true),
	)
	.expect("Failed to build insecure reqwest client for tests.")
}

/// Confidential client wired to the default token endpoint grant clients over
/// [`test_reqwest_http_client`].
#[cfg(feature = "reqwest")]
pub fn reqwest_test_client(config: ApplicationConfig) -> ConfidentialClient {
	ConfidentialClient::with_factory(
		config,
		Arc::new(ReqwestTokenEndpointFactory::new(
			test_reqwest_http_client(),
			ReqwestTransportErrorMapper,
		)),
	)
}

/// Grant observed by a stub client.
#[derive(Clone, Debug)]
pub struct RecordedGrant {
	pub grant: GrantType,
	pub correlation_id: CorrelationId,
	pub scopes: Vec<String>,
	pub credential: &'static str,
	pub skip_cache: bool,
	pub fields: Vec<(&'static str, String)>,
}

/// How stub clients answer.
#[derive(Clone, Debug, Default)]
pub enum StubBehavior {
	#[default]
	Succeed,
	/// Fail with `invalid_grant`, optionally already tagged with a server correlation id.
	Reject { server_correlation_id: Option<&'static str> },
}

#[derive(Debug, Default)]
pub struct Recorder {
	constructions: AtomicUsize,
	grants: Mutex<Vec<RecordedGrant>>,
	behavior: StubBehavior,
}
impl Recorder {
	pub fn constructions(&self) -> usize {
		self.constructions.load(Ordering::SeqCst)
	}

	pub fn grants(&self) -> Vec<RecordedGrant> {
		self.grants.lock().expect("Recorder lock should not be poisoned.").clone()
	}

	pub fn last_grant(&self) -> RecordedGrant {
		self.grants().pop().expect("At least one grant should have been recorded.")
	}
}

/// Factory that counts constructions and hands out recording stub clients.
#[derive(Clone, Debug, Default)]
pub struct RecordingFactory {
	pub recorder: Arc<Recorder>,
}
impl RecordingFactory {
	pub fn with_behavior(behavior: StubBehavior) -> Self {
		Self { recorder: Arc::new(Recorder { behavior, ..Default::default() }) }
	}

	fn stub<G>(&self) -> Box<dyn GrantClient<G>>
	where
		G: GrantRequest,
	{
		self.recorder.constructions.fetch_add(1, Ordering::SeqCst);

		Box::new(StubClient { recorder: self.recorder.clone() })
	}
}
impl GrantClientFactory for RecordingFactory {
	fn authorization_code_client(
		&self,
		_config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<AuthorizationCodeGrant>>, Error> {
		Ok(self.stub())
	}

	fn refresh_token_client(
		&self,
		_config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<RefreshTokenGrant>>, Error> {
		Ok(self.stub())
	}

	fn client_credential_client(
		&self,
		_config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<ClientCredentialGrant>>, Error> {
		Ok(self.stub())
	}

	fn on_behalf_of_client(
		&self,
		_config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<OnBehalfOfGrant>>, Error> {
		Ok(self.stub())
	}

	fn username_password_client(
		&self,
		_config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<UsernamePasswordGrant>>, Error> {
		Ok(self.stub())
	}
}

struct StubClient {
	recorder: Arc<Recorder>,
}
impl<G> GrantClient<G> for StubClient
where
	G: GrantRequest,
{
	fn acquire_token(&self, grant: G) -> GrantFuture<'_> {
		Box::pin(async move {
			let parameters = grant.parameters();
			let credential = match &parameters.credential {
				ClientCredential::Secret(_) => "secret",
				ClientCredential::Assertion(_) => "assertion",
				ClientCredential::AssertionCallback(_) => "assertion_callback",
			};

			self.recorder.grants.lock().expect("Recorder lock should not be poisoned.").push(
				RecordedGrant {
					grant: G::GRANT,
					correlation_id: parameters.correlation_id.clone(),
					scopes: parameters.scopes.iter().map(str::to_owned).collect(),
					credential,
					skip_cache: parameters.skip_cache,
					fields: grant.grant_fields(),
				},
			);

			match &self.recorder.behavior {
				StubBehavior::Succeed =>
					AuthenticationResult::builder(
						parameters.scopes.clone(),
						parameters.correlation_id.clone(),
					)
					.tenant_id("contoso")
					.access_token(format!("stub-{}", G::GRANT.label()))
					.issued_at(OffsetDateTime::now_utc())
					.expires_in(3600)
					.build()
					.map_err(Error::from),
				StubBehavior::Reject { server_correlation_id } => {
					let kind = AuthErrorKind::InvalidGrant { reason: "stub rejection".into() };
					let error = match server_correlation_id {
						Some(id) => AuthError::with_correlation_id(
							kind,
							CorrelationId::new(id).expect("Server correlation fixture is valid."),
						),
						None => AuthError::from(kind),
					};

					Err(Error::Auth(error))
				},
			}
		})
	}
}

pub fn secret_config(authority: &str) -> ApplicationConfig {
	ApplicationConfig::builder("app-id")
		.authority(authority)
		.client_secret("configured-secret")
		.build()
		.expect("Secret-based config fixture should build.")
}
