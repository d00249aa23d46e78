//! App token provider hook for the client credentials grant.
//!
//! When a provider is registered, client-credential requests are answered by the provider
//! instead of a grant client. The provider is called once per request and never retried.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationResult, CorrelationId, ScopeSet, TokenSecret, TokenSource},
	error::{AuthErrorKind, ResponseError},
	grant::{ClientCredentialGrant, GrantFuture},
};

/// Boxed future returned by [`AppTokenProvider::acquire`].
pub type AppTokenProviderFuture<'a> =
	Pin<Box<dyn Future<Output = Result<AppTokenProviderResult, BoxError>> + 'a + Send>>;

/// Out-of-band source of app-only tokens.
///
/// Implemented for any `Fn(AppTokenProviderParameters) -> impl Future<Output = Result<AppTokenProviderResult, BoxError>>`.
pub trait AppTokenProvider: Send + Sync {
	/// Produces a token for the provided request.
	fn acquire(&self, parameters: AppTokenProviderParameters) -> AppTokenProviderFuture<'_>;
}
impl<F, Fut> AppTokenProvider for F
where
	F: Send + Sync + Fn(AppTokenProviderParameters) -> Fut,
	Fut: 'static + Send + Future<Output = Result<AppTokenProviderResult, BoxError>>,
{
	fn acquire(&self, parameters: AppTokenProviderParameters) -> AppTokenProviderFuture<'_> {
		Box::pin(self(parameters))
	}
}

/// Inputs handed to an [`AppTokenProvider`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppTokenProviderParameters {
	/// Correlation id of the dispatch call.
	pub correlation_id: CorrelationId,
	/// Tenant the token must be scoped to.
	pub tenant_id: String,
	/// Normalized request scopes.
	pub scopes: ScopeSet,
}
impl AppTokenProviderParameters {
	/// Derives the provider inputs from a normalized client-credential grant.
	pub fn from_grant(grant: &ClientCredentialGrant) -> Self {
		Self {
			correlation_id: grant.parameters.correlation_id.clone(),
			tenant_id: grant.tenant_id.clone(),
			scopes: grant.parameters.scopes.clone(),
		}
	}
}

/// Token returned by an [`AppTokenProvider`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppTokenProviderResult {
	/// Access token.
	pub access_token: TokenSecret,
	/// Lifetime in seconds.
	pub expires_in_seconds: i64,
	/// Recommended renewal point in seconds.
	#[serde(default)]
	pub refresh_in_seconds: Option<i64>,
}
impl AppTokenProviderResult {
	const PROACTIVE_REFRESH_THRESHOLD_SECS: i64 = 2 * 60 * 60;

	/// Creates a result without a refresh hint.
	pub fn new(access_token: impl Into<String>, expires_in_seconds: i64) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			expires_in_seconds,
			refresh_in_seconds: None,
		}
	}

	/// Sets the refresh hint.
	pub fn with_refresh_in(mut self, seconds: i64) -> Self {
		self.refresh_in_seconds = Some(seconds);

		self
	}

	/// Converts the provider answer into an [`AuthenticationResult`] issued at `issued_at`.
	///
	/// Long-lived tokens without a refresh hint are scheduled for renewal at half their
	/// lifetime.
	pub fn into_authentication_result(
		self,
		parameters: AppTokenProviderParameters,
		issued_at: OffsetDateTime,
	) -> Result<AuthenticationResult, ResponseError> {
		let refresh_in = self.refresh_in_seconds.or_else(|| {
			(self.expires_in_seconds >= Self::PROACTIVE_REFRESH_THRESHOLD_SECS)
				.then_some(self.expires_in_seconds / 2)
		});
		let mut builder = AuthenticationResult::builder(parameters.scopes, parameters.correlation_id)
			.tenant_id(parameters.tenant_id)
			.access_token(self.access_token.expose())
			.issued_at(issued_at)
			.expires_in(self.expires_in_seconds)
			.token_source(TokenSource::AppTokenProvider);

		if let Some(seconds) = refresh_in {
			builder = builder.refresh_in(seconds);
		}

		builder.build()
	}
}

/// Answers a client-credential grant through `provider`.
pub(crate) fn acquire_app_token<'a>(
	provider: &'a dyn AppTokenProvider,
	grant: &'a ClientCredentialGrant,
) -> GrantFuture<'a> {
	Box::pin(async move {
		let parameters = AppTokenProviderParameters::from_grant(grant);
		let answer = provider
			.acquire(parameters.clone())
			.await
			.map_err(|source| AuthErrorKind::AppTokenProvider { source })?;

		answer.into_authentication_result(parameters, OffsetDateTime::now_utc()).map_err(Error::from)
	})
}
