//! Application identity: client id, authority, and the configured client credential.

pub mod authority;

pub use authority::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, IdentifierError, TokenSecret},
	credential::{ClientAssertion, ClientAssertionProvider, ClientCredential},
};

/// Errors raised while assembling an [`ApplicationConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ApplicationConfigError {
	/// Client id failed validation.
	#[error("Client id is invalid.")]
	InvalidClientId(#[from] IdentifierError),
	/// No authority was configured.
	#[error("Missing authority.")]
	MissingAuthority,
	/// Authority failed validation.
	#[error(transparent)]
	Authority(#[from] AuthorityError),
	/// No client secret, assertion, or assertion callback was configured.
	#[error("A confidential client needs a client secret, client assertion, or assertion callback.")]
	MissingCredential,
	/// More than one kind of credential material was configured.
	#[error("Configure exactly one of client secret, client assertion, or assertion callback.")]
	ConflictingCredentials,
	/// Configured secret or assertion is blank.
	#[error("The configured {kind} is empty.")]
	BlankCredential {
		/// Which credential was blank.
		kind: &'static str,
	},
	/// Token endpoint override must use HTTPS (loopback hosts excepted).
	#[error("Token endpoint must use HTTPS: {url}.")]
	InsecureTokenEndpoint {
		/// Offending URL.
		url: String,
	},
}

/// Immutable application configuration owned by a confidential client.
#[derive(Clone, Debug)]
pub struct ApplicationConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: ClientId,
	/// Authority (issuer URL + tenant).
	pub authority: Authority,
	/// Configured credential material.
	pub credential: ClientCredential,
	/// Optional token endpoint override; defaults to the authority's v2.0 endpoint.
	pub token_endpoint: Option<Url>,
}
impl ApplicationConfig {
	/// Creates a builder for the provided client id.
	pub fn builder(client_id: impl Into<String>) -> ApplicationConfigBuilder {
		ApplicationConfigBuilder::new(client_id)
	}

	/// Token endpoint used by the default grant clients.
	pub fn token_endpoint(&self) -> Url {
		self.token_endpoint.clone().unwrap_or_else(|| self.authority.token_endpoint())
	}
}

/// Builder for [`ApplicationConfig`] values.
pub struct ApplicationConfigBuilder {
	client_id: String,
	authority: Option<String>,
	client_secret: Option<TokenSecret>,
	client_assertion: Option<TokenSecret>,
	assertion_callback: Option<Arc<dyn ClientAssertionProvider>>,
	token_endpoint: Option<Url>,
}
impl ApplicationConfigBuilder {
	/// Creates a builder seeded with the client id.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			authority: None,
			client_secret: None,
			client_assertion: None,
			assertion_callback: None,
			token_endpoint: None,
		}
	}

	/// Sets the authority URL (`https://{host}/{tenant}`).
	pub fn authority(mut self, authority: impl Into<String>) -> Self {
		self.authority = Some(authority.into());

		self
	}

	/// Authenticates with a shared client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Authenticates with a pre-signed JWT client assertion.
	pub fn client_assertion(mut self, assertion: impl Into<String>) -> Self {
		self.client_assertion = Some(TokenSecret::new(assertion));

		self
	}

	/// Authenticates with assertions produced on demand by `provider`.
	pub fn client_assertion_callback(
		mut self,
		provider: impl 'static + ClientAssertionProvider,
	) -> Self {
		self.assertion_callback = Some(Arc::new(provider));

		self
	}

	/// Overrides the token endpoint derived from the authority.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ApplicationConfig, ApplicationConfigError> {
		let client_id = ClientId::new(&self.client_id)?;
		let raw_authority =
			self.authority.as_deref().ok_or(ApplicationConfigError::MissingAuthority)?;
		let authority = Authority::parse(raw_authority)?;
		let credential = match (self.client_secret, self.client_assertion, self.assertion_callback) {
			(Some(secret), None, None) => {
				if secret.is_blank() {
					return Err(ApplicationConfigError::BlankCredential { kind: "client secret" });
				}

				ClientCredential::Secret(secret)
			},
			(None, Some(assertion), None) => {
				if assertion.is_blank() {
					return Err(ApplicationConfigError::BlankCredential { kind: "client assertion" });
				}

				ClientCredential::Assertion(ClientAssertion::new(assertion.expose()))
			},
			(None, None, Some(provider)) => ClientCredential::AssertionCallback(provider),
			(None, None, None) => return Err(ApplicationConfigError::MissingCredential),
			_ => return Err(ApplicationConfigError::ConflictingCredentials),
		};

		if let Some(url) = self.token_endpoint.as_ref().filter(|url| !is_secure(url)) {
			return Err(ApplicationConfigError::InsecureTokenEndpoint { url: url.to_string() });
		}

		Ok(ApplicationConfig { client_id, authority, credential, token_endpoint: self.token_endpoint })
	}
}
impl Debug for ApplicationConfigBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApplicationConfigBuilder")
			.field("client_id", &self.client_id)
			.field("authority", &self.authority)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("client_assertion_set", &self.client_assertion.is_some())
			.field("assertion_callback_set", &self.assertion_callback.is_some())
			.field("token_endpoint", &self.token_endpoint)
			.finish()
	}
}
