//! Error taxonomy shared by the dispatch layer, grant clients, and configuration builders.
//!
//! Only [`AuthError`] carries a correlation-id slot. Configuration and request validation
//! failures are detected locally before any grant client exists, so they surface untouched.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, IdentifierError, ScopeValidationError},
	config::{ApplicationConfigError, AuthorityError},
	grant::GrantType,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used by caller-supplied capabilities (providers, callbacks, transports).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by every public dispatch operation.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; never retried.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Request failed shape validation for its grant.
	#[error(transparent)]
	InvalidRequest(#[from] RequestError),
	/// Failure raised while a grant client or the app token provider was acquiring a token.
	#[error(transparent)]
	Auth(#[from] AuthError),
}
impl Error {
	/// Returns the correlation id stamped on the error, if it carries one.
	pub fn correlation_id(&self) -> Option<&CorrelationId> {
		match self {
			Self::Auth(err) => err.correlation_id.as_ref(),
			_ => None,
		}
	}

	/// Overwrites the correlation id when the error exposes a slot for it.
	///
	/// Returns `false` for errors without a slot, leaving them unmodified.
	pub fn set_correlation_id(&mut self, correlation_id: CorrelationId) -> bool {
		match self {
			Self::Auth(err) => {
				err.correlation_id = Some(correlation_id);

				true
			},
			_ => false,
		}
	}

	/// Returns the authentication failure kind, if this is an [`Error::Auth`].
	pub fn auth_kind(&self) -> Option<&AuthErrorKind> {
		match self {
			Self::Auth(err) => Some(&err.kind),
			_ => None,
		}
	}
}
impl From<AuthErrorKind> for Error {
	fn from(kind: AuthErrorKind) -> Self {
		Self::Auth(kind.into())
	}
}
impl From<TransientError> for Error {
	fn from(e: TransientError) -> Self {
		AuthErrorKind::from(e).into()
	}
}
impl From<TransportError> for Error {
	fn from(e: TransportError) -> Self {
		AuthErrorKind::from(e).into()
	}
}
impl From<ResponseError> for Error {
	fn from(e: ResponseError) -> Self {
		AuthErrorKind::from(e).into()
	}
}

/// Configuration failures detected before any I/O.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The authority names a tenant alias, which cannot scope the requested grant.
	#[error(
		"Authority `{authority}` uses the tenant alias `{tenant}`, which cannot scope {grant} tokens; configure a concrete tenant id."
	)]
	MissingTenantId {
		/// Configured authority URL.
		authority: String,
		/// Alias found in the tenant segment.
		tenant: String,
		/// Grant that rejected the alias.
		grant: GrantType,
	},
	/// Application configuration failed validation.
	#[error(transparent)]
	Application(#[from] ApplicationConfigError),
	/// Authority could not produce a usable endpoint.
	#[error(transparent)]
	Authority(#[from] AuthorityError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// An app token provider was already registered on this client.
	#[error("An app token provider is already registered.")]
	AppTokenProviderAlreadySet,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Request shape violations, detected before a grant client is constructed.
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// A scope entry is empty or contains whitespace.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] ScopeValidationError),
	/// No usable scope remains for a grant that needs one.
	#[error("The {grant} grant requires at least one resource scope.")]
	EmptyScopes {
		/// Grant that rejected the request.
		grant: GrantType,
	},
	/// A required field is missing or blank.
	#[error("The {grant} grant requires a non-empty `{field}`.")]
	MissingField {
		/// Grant that rejected the request.
		grant: GrantType,
		/// Name of the missing field.
		field: &'static str,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirectUri {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Caller-supplied correlation id is malformed.
	#[error("Correlation id is invalid.")]
	InvalidCorrelationId(#[from] IdentifierError),
}

/// Failure raised during token acquisition, tagged with the request correlation id.
#[derive(Debug, ThisError)]
#[error("{kind}")]
pub struct AuthError {
	/// What went wrong.
	pub kind: AuthErrorKind,
	/// Correlation id of the request that failed.
	pub correlation_id: Option<CorrelationId>,
}
impl AuthError {
	/// Creates an error that already carries a correlation id.
	pub fn with_correlation_id(kind: AuthErrorKind, correlation_id: CorrelationId) -> Self {
		Self { kind, correlation_id: Some(correlation_id) }
	}
}
impl From<AuthErrorKind> for AuthError {
	fn from(kind: AuthErrorKind) -> Self {
		Self { kind, correlation_id: None }
	}
}

/// Classified token-acquisition failures.
#[derive(Debug, ThisError)]
pub enum AuthErrorKind {
	/// Provider rejected the grant (bad code, refresh token, assertion, or password).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or client-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or client-supplied reason string.
		reason: String,
	},
	/// Requested scopes exceed what the client may obtain.
	#[error("Token lacks the required scopes: {reason}.")]
	InsufficientScope {
		/// Provider- or client-supplied reason string.
		reason: String,
	},
	/// The user must interact with the identity provider (consent, MFA, sign-in).
	#[error("User interaction is required: {reason}.")]
	InteractionRequired {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Temporary upstream failure.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token response violated the protocol.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// The registered app token provider failed.
	#[error("App token provider failed.")]
	AppTokenProvider {
		/// Provider failure.
		#[source]
		source: BoxError,
	},
	/// The client assertion callback failed.
	#[error("Client assertion callback failed.")]
	ClientAssertion {
		/// Callback failure.
		#[source]
		source: BoxError,
	},
}

/// Temporary failure variants.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Token payloads that cannot be turned into an authentication result.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ResponseError {
	/// No access token was issued.
	#[error("Token response is missing an access token.")]
	MissingAccessToken,
	/// Token response omitted `expires_in`.
	#[error("Token response is missing expires_in.")]
	MissingExpiresIn,
	/// Token lifetime must be positive.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token lifetime is too large to represent.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
