//! Grant client contracts.
//!
//! A grant client turns one normalized grant into an [`AuthenticationResult`]. The dispatch
//! layer never talks to the network itself; it asks a [`GrantClientFactory`] for a fresh
//! client per call and awaits it.

pub mod request;

pub use request::*;

// self
use crate::{_prelude::*, auth::AuthenticationResult, config::ApplicationConfig};

/// Boxed future returned by [`GrantClient::acquire_token`].
pub type GrantFuture<'a> = Pin<Box<dyn Future<Output = Result<AuthenticationResult>> + 'a + Send>>;

/// OAuth 2.0 grants the dispatch layer can route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization code redemption.
	AuthorizationCode,
	/// Refresh token redemption.
	RefreshToken,
	/// App-only client credentials.
	ClientCredentials,
	/// On-behalf-of exchange of a user assertion.
	OnBehalfOf,
	/// Resource owner password credentials.
	Password,
}
impl GrantType {
	/// Returns the `grant_type` value sent to the token endpoint.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
			GrantType::OnBehalfOf => "urn:ietf:params:oauth:grant-type:jwt-bearer",
			GrantType::Password => "password",
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn label(self) -> &'static str {
		match self {
			GrantType::OnBehalfOf => "on_behalf_of",
			other => other.as_str(),
		}
	}

	/// Returns `true` for grants acting on behalf of a signed-in user.
	pub const fn is_user_delegated(self) -> bool {
		!matches!(self, GrantType::ClientCredentials)
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}

/// Capability that acquires tokens for one grant shape.
pub trait GrantClient<G>: Send + Sync {
	/// Exchanges the grant for tokens.
	fn acquire_token(&self, grant: G) -> GrantFuture<'_>;
}

/// Builds grant clients from the shared application configuration.
///
/// Constructors are synchronous and must not perform I/O. The dispatch layer calls exactly
/// one constructor per request and drops the client once the request settles.
pub trait GrantClientFactory: Send + Sync {
	/// Client for [`AuthorizationCodeGrant`].
	fn authorization_code_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<AuthorizationCodeGrant>>>;

	/// Client for [`RefreshTokenGrant`].
	fn refresh_token_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<RefreshTokenGrant>>>;

	/// Client for [`ClientCredentialGrant`].
	fn client_credential_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<ClientCredentialGrant>>>;

	/// Client for [`OnBehalfOfGrant`].
	fn on_behalf_of_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<OnBehalfOfGrant>>>;

	/// Client for [`UsernamePasswordGrant`].
	fn username_password_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<UsernamePasswordGrant>>>;
}
