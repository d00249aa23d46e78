//! Normalized grants handed to grant clients.
//!
//! These values are produced by the dispatch layer after validation; every field is
//! already checked, scopes are normalized, and the credential is attached.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, ScopeSet, TokenSecret},
	credential::ClientCredential,
	grant::GrantType,
};

/// Fields shared by every normalized grant.
#[derive(Clone, Debug)]
pub struct GrantParameters {
	/// Correlation id of the dispatch call.
	pub correlation_id: CorrelationId,
	/// Scopes sent to the token endpoint.
	pub scopes: ScopeSet,
	/// Credential used to authenticate the client.
	pub credential: ClientCredential,
	/// Caller asked to bypass any cache the grant client keeps.
	pub skip_cache: bool,
}

/// Normalized grant that knows its [`GrantType`].
pub trait GrantRequest: 'static + Send + Sync {
	/// Grant type of the request.
	const GRANT: GrantType;

	/// Shared grant fields.
	fn parameters(&self) -> &GrantParameters;

	/// Grant-specific form fields, excluding `grant_type`, `scope`, and the credential.
	fn grant_fields(&self) -> Vec<(&'static str, String)>;
}

/// Authorization code redemption.
#[derive(Clone, Debug)]
pub struct AuthorizationCodeGrant {
	/// Shared fields.
	pub parameters: GrantParameters,
	/// Authorization code returned to the redirect URI.
	pub code: TokenSecret,
	/// Redirect URI used in the authorization request.
	pub redirect_uri: Url,
	/// PKCE verifier, when the authorization request used a challenge.
	pub code_verifier: Option<TokenSecret>,
}
impl GrantRequest for AuthorizationCodeGrant {
	const GRANT: GrantType = GrantType::AuthorizationCode;

	fn parameters(&self) -> &GrantParameters {
		&self.parameters
	}

	fn grant_fields(&self) -> Vec<(&'static str, String)> {
		let mut fields = vec![
			("code", self.code.expose().to_owned()),
			("redirect_uri", self.redirect_uri.to_string()),
		];

		if let Some(verifier) = &self.code_verifier {
			fields.push(("code_verifier", verifier.expose().to_owned()));
		}

		fields
	}
}

/// Refresh token redemption.
#[derive(Clone, Debug)]
pub struct RefreshTokenGrant {
	/// Shared fields.
	pub parameters: GrantParameters,
	/// Refresh token to redeem.
	pub refresh_token: TokenSecret,
}
impl GrantRequest for RefreshTokenGrant {
	const GRANT: GrantType = GrantType::RefreshToken;

	fn parameters(&self) -> &GrantParameters {
		&self.parameters
	}

	fn grant_fields(&self) -> Vec<(&'static str, String)> {
		vec![("refresh_token", self.refresh_token.expose().to_owned())]
	}
}

/// App-only client credentials grant.
#[derive(Clone, Debug)]
pub struct ClientCredentialGrant {
	/// Shared fields.
	pub parameters: GrantParameters,
	/// Concrete tenant the token is scoped to.
	pub tenant_id: String,
}
impl GrantRequest for ClientCredentialGrant {
	const GRANT: GrantType = GrantType::ClientCredentials;

	fn parameters(&self) -> &GrantParameters {
		&self.parameters
	}

	fn grant_fields(&self) -> Vec<(&'static str, String)> {
		Vec::new()
	}
}

/// On-behalf-of exchange of an incoming user assertion.
#[derive(Clone, Debug)]
pub struct OnBehalfOfGrant {
	/// Shared fields.
	pub parameters: GrantParameters,
	/// Access token the middle-tier service received from its caller.
	pub assertion: TokenSecret,
}
impl GrantRequest for OnBehalfOfGrant {
	const GRANT: GrantType = GrantType::OnBehalfOf;

	fn parameters(&self) -> &GrantParameters {
		&self.parameters
	}

	fn grant_fields(&self) -> Vec<(&'static str, String)> {
		vec![
			("assertion", self.assertion.expose().to_owned()),
			("requested_token_use", "on_behalf_of".to_owned()),
		]
	}
}

/// Resource owner password credentials grant.
#[derive(Clone, Debug)]
pub struct UsernamePasswordGrant {
	/// Shared fields.
	pub parameters: GrantParameters,
	/// Resource owner's username.
	pub username: String,
	/// Resource owner's password.
	pub password: TokenSecret,
}
impl GrantRequest for UsernamePasswordGrant {
	const GRANT: GrantType = GrantType::Password;

	fn parameters(&self) -> &GrantParameters {
		&self.parameters
	}

	fn grant_fields(&self) -> Vec<(&'static str, String)> {
		vec![("username", self.username.clone()), ("password", self.password.expose().to_owned())]
	}
}
