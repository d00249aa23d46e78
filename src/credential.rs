//! Client credential material attached to every outgoing grant.
//!
//! The dispatch layer clones the configured credential (or applies a request-level
//! assertion override) once per call. Assertion callbacks are never invoked here; grant
//! clients resolve them lazily through [`ClientCredential::resolve`] when they are about to
//! talk to the token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, TokenSecret},
	config::ApplicationConfig,
	error::AuthErrorKind,
};

/// Client assertion type sent alongside every JWT client assertion.
pub const JWT_BEARER_ASSERTION_TYPE: &str =
	"urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Boxed future returned by [`ClientAssertionProvider::assertion`].
pub type ClientAssertionFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ClientAssertionToken, BoxError>> + 'a + Send>>;

/// Produces signed client assertions on demand.
///
/// Implemented for any `Fn(ClientAssertionContext) -> impl Future<Output = Result<ClientAssertionToken, BoxError>>`
/// so callers can register an async closure directly.
pub trait ClientAssertionProvider: Send + Sync {
	/// Returns a fresh assertion for the provided context.
	fn assertion(&self, context: ClientAssertionContext) -> ClientAssertionFuture<'_>;
}
impl<F, Fut> ClientAssertionProvider for F
where
	F: Send + Sync + Fn(ClientAssertionContext) -> Fut,
	Fut: 'static + Send + Future<Output = Result<ClientAssertionToken, BoxError>>,
{
	fn assertion(&self, context: ClientAssertionContext) -> ClientAssertionFuture<'_> {
		Box::pin(self(context))
	}
}

/// Inputs handed to a [`ClientAssertionProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientAssertionContext {
	/// Client id the assertion must be issued for (`iss`/`sub`).
	pub client_id: ClientId,
	/// Token endpoint the assertion will be presented to (`aud`).
	pub token_endpoint: Url,
}
impl ClientAssertionContext {
	/// Creates a new context.
	pub fn new(client_id: ClientId, token_endpoint: Url) -> Self {
		Self { client_id, token_endpoint }
	}
}

/// Assertion returned by a [`ClientAssertionProvider`].
#[derive(Clone, Debug)]
pub struct ClientAssertionToken {
	/// Signed assertion.
	pub token: TokenSecret,
	/// Assertion lifetime, when the provider reports one.
	pub expires_in_seconds: Option<i64>,
	/// Recommended renewal point, when the provider reports one.
	pub refresh_in_seconds: Option<i64>,
}
impl ClientAssertionToken {
	/// Wraps a signed assertion with no lifetime hints.
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: TokenSecret::new(token), expires_in_seconds: None, refresh_in_seconds: None }
	}

	/// Records the assertion lifetime.
	pub fn with_expires_in(mut self, seconds: i64) -> Self {
		self.expires_in_seconds = Some(seconds);

		self
	}

	/// Records the recommended renewal point.
	pub fn with_refresh_in(mut self, seconds: i64) -> Self {
		self.refresh_in_seconds = Some(seconds);

		self
	}
}

/// Pre-signed JWT client assertion.
///
/// The assertion type is fixed to [`JWT_BEARER_ASSERTION_TYPE`] and cannot be changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientAssertion {
	value: TokenSecret,
}
impl ClientAssertion {
	/// Wraps a signed assertion.
	pub fn new(value: impl Into<String>) -> Self {
		Self { value: TokenSecret::new(value) }
	}

	/// Raw assertion value.
	pub fn assertion(&self) -> &str {
		self.value.expose()
	}

	/// Assertion type sent as `client_assertion_type`.
	pub fn assertion_type(&self) -> &'static str {
		JWT_BEARER_ASSERTION_TYPE
	}
}

/// Credential attached to a single token request.
#[derive(Clone)]
pub enum ClientCredential {
	/// Shared client secret.
	Secret(TokenSecret),
	/// Pre-signed JWT assertion.
	Assertion(ClientAssertion),
	/// Assertion produced on demand by a caller-supplied callback.
	AssertionCallback(Arc<dyn ClientAssertionProvider>),
}
impl ClientCredential {
	/// Builds the credential for one request.
	///
	/// A request-level assertion override replaces whatever the application configured.
	pub fn for_request(config: &ApplicationConfig, assertion_override: Option<&str>) -> Self {
		match assertion_override {
			Some(assertion) => Self::Assertion(ClientAssertion::new(assertion)),
			None => config.credential.clone(),
		}
	}

	/// Resolves the credential into wire-ready material, invoking the callback if needed.
	pub async fn resolve(&self, context: ClientAssertionContext) -> Result<ResolvedCredential> {
		match self {
			Self::Secret(secret) => Ok(ResolvedCredential::Secret(secret.clone())),
			Self::Assertion(assertion) => Ok(ResolvedCredential::Assertion(assertion.clone())),
			Self::AssertionCallback(provider) => {
				let token = provider
					.assertion(context)
					.await
					.map_err(|source| AuthErrorKind::ClientAssertion { source })?;

				if token.token.is_blank() {
					return Err(AuthErrorKind::ClientAssertion {
						source: "Assertion callback returned an empty assertion.".into(),
					}
					.into());
				}

				Ok(ResolvedCredential::Assertion(ClientAssertion::new(token.token.expose())))
			},
		}
	}
}
impl Debug for ClientCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Secret(_) => f.write_str("ClientCredential::Secret(<redacted>)"),
			Self::Assertion(_) => f.write_str("ClientCredential::Assertion(<redacted>)"),
			Self::AssertionCallback(_) => f.write_str("ClientCredential::AssertionCallback(..)"),
		}
	}
}

/// Credential material ready to be written into a token request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedCredential {
	/// Sent as `client_secret`.
	Secret(TokenSecret),
	/// Sent as `client_assertion` + `client_assertion_type`.
	Assertion(ClientAssertion),
}
impl ResolvedCredential {
	/// Form fields carrying the credential.
	pub fn form_fields(&self) -> Vec<(&'static str, String)> {
		match self {
			Self::Secret(secret) => vec![("client_secret", secret.expose().to_owned())],
			Self::Assertion(assertion) => vec![
				("client_assertion", assertion.assertion().to_owned()),
				("client_assertion_type", assertion.assertion_type().to_owned()),
			],
		}
	}
}
