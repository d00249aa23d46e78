//! Normalized authentication result returned by every grant client.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, ScopeSet, TokenSecret},
	error::ResponseError,
};

/// Token type reported when the issuer does not name one.
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// Where an [`AuthenticationResult`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
	/// Issued by the identity provider's token endpoint.
	IdentityProvider,
	/// Supplied out-of-band by a registered app token provider.
	AppTokenProvider,
}

/// Tokens issued for one dispatch call.
///
/// The dispatch layer passes this value through untouched; only grant clients and the app
/// token provider adapter build it.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthenticationResult {
	/// Tenant segment of the authority that issued the token.
	pub tenant_id: String,
	/// Scopes the token was issued for.
	pub scopes: ScopeSet,
	/// Access token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type (usually `Bearer`).
	pub token_type: String,
	/// Instant the result was issued.
	pub issued_at: OffsetDateTime,
	/// Instant the access token expires.
	pub expires_on: OffsetDateTime,
	/// Instant after which the token should be proactively renewed, if known.
	pub refresh_on: Option<OffsetDateTime>,
	/// Refresh token, when the grant issued one.
	pub refresh_token: Option<TokenSecret>,
	/// OIDC id token, when the grant issued one.
	pub id_token: Option<TokenSecret>,
	/// Correlation id of the request that produced this result.
	pub correlation_id: CorrelationId,
	/// Origin of the token.
	pub token_source: TokenSource,
}
impl AuthenticationResult {
	/// Returns a builder seeded with the request scopes and correlation id.
	pub fn builder(scopes: ScopeSet, correlation_id: CorrelationId) -> AuthenticationResultBuilder {
		AuthenticationResultBuilder::new(scopes, correlation_id)
	}

	/// Returns `true` once the access token has expired at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_on
	}

	/// Returns `true` when the token is expired or past its refresh-on hint at `instant`.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime) -> bool {
		self.is_expired_at(instant) || self.refresh_on.is_some_and(|refresh_on| instant >= refresh_on)
	}

	/// Lifetime remaining at `instant`, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_on - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for AuthenticationResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticationResult")
			.field("tenant_id", &self.tenant_id)
			.field("scopes", &self.scopes)
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("issued_at", &self.issued_at)
			.field("expires_on", &self.expires_on)
			.field("refresh_on", &self.refresh_on)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("correlation_id", &self.correlation_id)
			.field("token_source", &self.token_source)
			.finish()
	}
}

/// Builder for [`AuthenticationResult`].
#[derive(Clone, Debug)]
pub struct AuthenticationResultBuilder {
	scopes: ScopeSet,
	correlation_id: CorrelationId,
	tenant_id: String,
	access_token: Option<TokenSecret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<i64>,
	refresh_in: Option<i64>,
	refresh_token: Option<TokenSecret>,
	id_token: Option<TokenSecret>,
	token_source: TokenSource,
}
impl AuthenticationResultBuilder {
	const MAX_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

	fn new(scopes: ScopeSet, correlation_id: CorrelationId) -> Self {
		Self {
			scopes,
			correlation_id,
			tenant_id: String::new(),
			access_token: None,
			token_type: None,
			issued_at: None,
			expires_in: None,
			refresh_in: None,
			refresh_token: None,
			id_token: None,
			token_source: TokenSource::IdentityProvider,
		}
	}

	/// Sets the issuing tenant.
	pub fn tenant_id(mut self, tenant: impl Into<String>) -> Self {
		self.tenant_id = tenant.into();

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Overrides the token type (defaults to [`BEARER_TOKEN_TYPE`]).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the issued-at instant (defaults to the current clock).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets the access token lifetime in seconds.
	pub fn expires_in(mut self, seconds: i64) -> Self {
		self.expires_in = Some(seconds);

		self
	}

	/// Sets the refresh-on hint in seconds from issuance.
	pub fn refresh_in(mut self, seconds: i64) -> Self {
		self.refresh_in = Some(seconds);

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the id token value.
	pub fn id_token(mut self, token: impl Into<String>) -> Self {
		self.id_token = Some(TokenSecret::new(token));

		self
	}

	/// Records where the token came from.
	pub fn token_source(mut self, source: TokenSource) -> Self {
		self.token_source = source;

		self
	}

	/// Consumes the builder and produces an [`AuthenticationResult`].
	pub fn build(self) -> Result<AuthenticationResult, ResponseError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_blank())
			.ok_or(ResponseError::MissingAccessToken)?;
		let expires_in = self.expires_in.ok_or(ResponseError::MissingExpiresIn)?;

		if expires_in <= 0 {
			return Err(ResponseError::NonPositiveExpiresIn);
		}
		if expires_in > Self::MAX_LIFETIME_SECS {
			return Err(ResponseError::ExpiresInOutOfRange);
		}

		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let refresh_on = self
			.refresh_in
			.filter(|secs| *secs > 0 && *secs <= expires_in)
			.map(|secs| issued_at + Duration::seconds(secs));

		Ok(AuthenticationResult {
			tenant_id: self.tenant_id,
			scopes: self.scopes,
			access_token,
			token_type: self.token_type.unwrap_or_else(|| BEARER_TOKEN_TYPE.into()),
			issued_at,
			expires_on: issued_at + Duration::seconds(expires_in),
			refresh_on,
			refresh_token: self.refresh_token,
			id_token: self.id_token,
			correlation_id: self.correlation_id,
			token_source: self.token_source,
		})
	}
}
