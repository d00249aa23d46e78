//! Default grant clients that talk to an OAuth 2.0 token endpoint.
//!
//! [`TokenEndpointFactory`] implements [`GrantClientFactory`] for every grant. Authorization
//! code, refresh token, client credentials, and password requests go through an [`oauth2`]
//! client with request-body client authentication. On-behalf-of uses the JWT bearer grant,
//! which [`oauth2`] does not model, so it posts its own form and parses the response with the
//! same rules. Every request carries the `client-request-id` header, and failures are
//! classified into an [`AuthErrorKind`].

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthorizationCode, Client, ClientSecret, EndpointNotSet,
	EndpointSet, ErrorResponse, ExtraTokenFields, HttpClientError, HttpRequest, HttpResponse,
	PkceCodeVerifier, RedirectUrl, RefreshToken, RequestTokenError, ResourceOwnerPassword,
	ResourceOwnerUsername, Scope, StandardRevocableToken, StandardTokenResponse, TokenResponse,
	TokenUrl,
	basic::{BasicRevocationErrorResponse, BasicTokenIntrospectionResponse, BasicTokenType},
	http::{
		HeaderValue, Method, StatusCode,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{AuthenticationResult, ClientId, CorrelationId, ScopeSet, TokenSource},
	config::ApplicationConfig,
	credential::{ClientAssertionContext, ResolvedCredential},
	error::{AuthError, AuthErrorKind, ConfigError, ResponseError, TransientError},
	grant::{
		AuthorizationCodeGrant, ClientCredentialGrant, GrantClient, GrantClientFactory, GrantFuture,
		GrantParameters, GrantRequest, GrantType, OnBehalfOfGrant, RefreshTokenGrant,
		UsernamePasswordGrant,
	},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};
#[cfg(feature = "reqwest")] use crate::{error::TransportError, http::ReqwestHttpClient};

/// Header carrying the request correlation id.
pub const CLIENT_REQUEST_ID_HEADER: &str = "client-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

type EndpointClient = Client<
	EndpointErrorResponse,
	EndpointTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type EndpointTokenResponse = StandardTokenResponse<EndpointTokenFields, BasicTokenType>;
type EndpointRequestError<E> = RequestTokenError<HttpClientError<E>, EndpointErrorResponse>;

#[cfg(feature = "reqwest")]
/// Token-endpoint factory specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenEndpointFactory =
	TokenEndpointFactory<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an [`Error`].
	fn map_transport_error(
		&self,
		grant: GrantType,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		grant: GrantType,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(grant, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(meta, message),
			_ => map_unknown_transport_error(meta),
		}
	}
}

/// Builds [`TokenEndpointClient`]s that share one transport and error mapper.
pub struct TokenEndpointFactory<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> TokenEndpointFactory<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a factory that reuses the caller-provided transport + mapper pair.
	pub fn new(http_client: impl Into<Arc<C>>, error_mapper: impl Into<Arc<M>>) -> Self {
		Self { http_client: http_client.into(), error_mapper: error_mapper.into() }
	}

	fn client(&self, config: &ApplicationConfig) -> TokenEndpointClient<C, M> {
		TokenEndpointClient {
			client_id: config.client_id.clone(),
			token_endpoint: config.token_endpoint(),
			tenant_id: config.authority.tenant().to_owned(),
			http_client: self.http_client.clone(),
			error_mapper: self.error_mapper.clone(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl TokenEndpointFactory<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a factory over [`ReqwestHttpClient::new`], which never follows redirects.
	pub fn reqwest() -> Result<Self> {
		Ok(Self::new(ReqwestHttpClient::new()?, ReqwestTransportErrorMapper))
	}
}
impl<C, M> GrantClientFactory for TokenEndpointFactory<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn authorization_code_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<AuthorizationCodeGrant>>> {
		Ok(Box::new(self.client(config)))
	}

	fn refresh_token_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<RefreshTokenGrant>>> {
		Ok(Box::new(self.client(config)))
	}

	fn client_credential_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<ClientCredentialGrant>>> {
		Ok(Box::new(self.client(config)))
	}

	fn on_behalf_of_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<OnBehalfOfGrant>>> {
		Ok(Box::new(self.client(config)))
	}

	fn username_password_client(
		&self,
		config: &Arc<ApplicationConfig>,
	) -> Result<Box<dyn GrantClient<UsernamePasswordGrant>>> {
		Ok(Box::new(self.client(config)))
	}
}
impl<C, M> Debug for TokenEndpointFactory<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenEndpointFactory(..)")
	}
}

/// Grant client that posts one grant to the token endpoint.
pub struct TokenEndpointClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client_id: ClientId,
	token_endpoint: Url,
	tenant_id: String,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> TokenEndpointClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Token endpoint this client posts to.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	async fn redeem_code(&self, grant: AuthorizationCodeGrant) -> Result<AuthenticationResult> {
		let exchange = self.begin(&grant.parameters).await?;
		let redirect_uri = RedirectUrl::from_url(grant.redirect_uri.clone());
		let mut request = exchange
			.oauth_client
			.exchange_code(AuthorizationCode::new(grant.code.expose().to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_uri));

		if let Some(verifier) = &grant.code_verifier {
			request =
				request.set_pkce_verifier(PkceCodeVerifier::new(verifier.expose().to_owned()));
		}
		if !grant.parameters.scopes.is_empty() {
			request = request.add_extra_param("scope", grant.parameters.scopes.normalized());
		}
		for (name, value) in exchange.assertion_params() {
			request = request.add_extra_param(name, value);
		}

		let response = request.request_async(&exchange.handle).await;

		self.finish(GrantType::AuthorizationCode, &grant.parameters, &exchange.meta, response)
	}

	async fn redeem_refresh_token(&self, grant: RefreshTokenGrant) -> Result<AuthenticationResult> {
		let exchange = self.begin(&grant.parameters).await?;
		let refresh_token = RefreshToken::new(grant.refresh_token.expose().to_owned());
		let mut request = exchange
			.oauth_client
			.exchange_refresh_token(&refresh_token)
			.add_scopes(oauth_scopes(&grant.parameters.scopes));

		for (name, value) in exchange.assertion_params() {
			request = request.add_extra_param(name, value);
		}

		let response = request.request_async(&exchange.handle).await;

		self.finish(GrantType::RefreshToken, &grant.parameters, &exchange.meta, response)
	}

	async fn request_app_token(&self, grant: ClientCredentialGrant) -> Result<AuthenticationResult> {
		let exchange = self.begin(&grant.parameters).await?;
		let mut request = exchange
			.oauth_client
			.exchange_client_credentials()
			.add_scopes(oauth_scopes(&grant.parameters.scopes));

		for (name, value) in exchange.assertion_params() {
			request = request.add_extra_param(name, value);
		}

		let response = request.request_async(&exchange.handle).await;

		self.finish(GrantType::ClientCredentials, &grant.parameters, &exchange.meta, response)
	}

	async fn redeem_password(&self, grant: UsernamePasswordGrant) -> Result<AuthenticationResult> {
		let exchange = self.begin(&grant.parameters).await?;
		let username = ResourceOwnerUsername::new(grant.username.clone());
		let password = ResourceOwnerPassword::new(grant.password.expose().to_owned());
		let mut request = exchange
			.oauth_client
			.exchange_password(&username, &password)
			.add_scopes(oauth_scopes(&grant.parameters.scopes));

		for (name, value) in exchange.assertion_params() {
			request = request.add_extra_param(name, value);
		}

		let response = request.request_async(&exchange.handle).await;

		self.finish(GrantType::Password, &grant.parameters, &exchange.meta, response)
	}

	async fn redeem_on_behalf_of(&self, grant: OnBehalfOfGrant) -> Result<AuthenticationResult> {
		let exchange = self.begin(&grant.parameters).await?;
		let mut form = vec![
			("client_id", self.client_id.to_string()),
			("grant_type", GrantType::OnBehalfOf.as_str().to_owned()),
		];

		if !grant.parameters.scopes.is_empty() {
			form.push(("scope", grant.parameters.scopes.normalized()));
		}

		form.extend(grant.grant_fields());
		form.extend(exchange.credential.form_fields());

		let request = self.form_request(&form)?;
		let response = match exchange.handle.call(request).await {
			Ok(response) => parse_token_response(&response),
			Err(err) => Err(RequestTokenError::Request(err)),
		};

		self.finish(GrantType::OnBehalfOf, &grant.parameters, &exchange.meta, response)
	}

	/// Resolves the credential and binds a fresh metadata slot and correlation header.
	async fn begin(&self, parameters: &GrantParameters) -> Result<Exchange<C::Handle>> {
		let credential = parameters
			.credential
			.resolve(ClientAssertionContext::new(
				self.client_id.clone(),
				self.token_endpoint.clone(),
			))
			.await?;
		let correlation_id = HeaderValue::from_str(parameters.correlation_id.as_ref())
			.map_err(|e| ConfigError::from(oauth2::http::Error::from(e)))?;
		let meta = ResponseMetadataSlot::default();
		let handle =
			CorrelatedHandle { inner: self.http_client.with_metadata(meta.clone()), correlation_id };
		let mut oauth_client: EndpointClient =
			Client::new(oauth2::ClientId::new(self.client_id.to_string()))
				.set_token_uri(TokenUrl::from_url(self.token_endpoint.clone()))
				.set_auth_type(AuthType::RequestBody);

		if let ResolvedCredential::Secret(secret) = &credential {
			oauth_client =
				oauth_client.set_client_secret(ClientSecret::new(secret.expose().to_owned()));
		}

		Ok(Exchange { oauth_client, credential, handle, meta })
	}

	fn form_request(&self, form: &[(&'static str, String)]) -> Result<HttpRequest> {
		let body = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(form.iter().map(|(key, value)| (*key, value.as_str())))
			.finish();

		oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(self.token_endpoint.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, "application/json")
			.body(body.into_bytes())
			.map_err(|e| ConfigError::from(e).into())
	}

	fn finish(
		&self,
		grant: GrantType,
		parameters: &GrantParameters,
		meta: &ResponseMetadataSlot,
		response: Result<EndpointTokenResponse, EndpointRequestError<C::TransportError>>,
	) -> Result<AuthenticationResult> {
		let response = response.map_err(|err| {
			map_request_error(grant, meta.take().as_ref(), err, self.error_mapper.as_ref())
		})?;

		self.map_token_response(parameters, &response)
	}

	fn map_token_response(
		&self,
		parameters: &GrantParameters,
		response: &EndpointTokenResponse,
	) -> Result<AuthenticationResult> {
		let scopes = response
			.scopes()
			.and_then(|scopes| ScopeSet::new(scopes.iter().map(|scope| scope.as_str())).ok())
			.filter(|scopes| !scopes.is_empty())
			.unwrap_or_else(|| parameters.scopes.clone());
		let token_type = match response.token_type() {
			BasicTokenType::Bearer => "Bearer",
			other => other.as_ref(),
		};
		let extra = response.extra_fields();
		let mut builder = AuthenticationResult::builder(scopes, parameters.correlation_id.clone())
			.tenant_id(self.tenant_id.as_str())
			.access_token(response.access_token().secret())
			.token_type(token_type)
			.issued_at(OffsetDateTime::now_utc())
			.token_source(TokenSource::IdentityProvider);

		if let Some(expires_in) = response.expires_in() {
			let seconds = i64::try_from(expires_in.as_secs())
				.map_err(|_| ResponseError::ExpiresInOutOfRange)?;

			builder = builder.expires_in(seconds);
		}
		if let Some(refresh_in) = extra.refresh_in {
			builder = builder.refresh_in(refresh_in);
		}
		if let Some(token) = response.refresh_token() {
			builder = builder.refresh_token(token.secret());
		}
		if let Some(token) = &extra.id_token {
			builder = builder.id_token(token);
		}

		builder.build().map_err(Error::from)
	}
}
impl<C, M> GrantClient<AuthorizationCodeGrant> for TokenEndpointClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn acquire_token(&self, grant: AuthorizationCodeGrant) -> GrantFuture<'_> {
		Box::pin(self.redeem_code(grant))
	}
}
impl<C, M> GrantClient<RefreshTokenGrant> for TokenEndpointClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn acquire_token(&self, grant: RefreshTokenGrant) -> GrantFuture<'_> {
		Box::pin(self.redeem_refresh_token(grant))
	}
}
impl<C, M> GrantClient<ClientCredentialGrant> for TokenEndpointClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn acquire_token(&self, grant: ClientCredentialGrant) -> GrantFuture<'_> {
		Box::pin(self.request_app_token(grant))
	}
}
impl<C, M> GrantClient<OnBehalfOfGrant> for TokenEndpointClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn acquire_token(&self, grant: OnBehalfOfGrant) -> GrantFuture<'_> {
		Box::pin(self.redeem_on_behalf_of(grant))
	}
}
impl<C, M> GrantClient<UsernamePasswordGrant> for TokenEndpointClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn acquire_token(&self, grant: UsernamePasswordGrant) -> GrantFuture<'_> {
		Box::pin(self.redeem_password(grant))
	}
}

/// Per-request state: the configured [`oauth2`] client, resolved credential, and handle.
struct Exchange<H> {
	oauth_client: EndpointClient,
	credential: ResolvedCredential,
	handle: CorrelatedHandle<H>,
	meta: ResponseMetadataSlot,
}
impl<H> Exchange<H> {
	/// Assertion fields; secrets are written by the [`oauth2`] client itself.
	fn assertion_params(&self) -> Vec<(&'static str, String)> {
		match &self.credential {
			ResolvedCredential::Secret(_) => Vec::new(),
			assertion @ ResolvedCredential::Assertion(_) => assertion.form_fields(),
		}
	}
}

/// Transport handle that stamps `client-request-id` on every request it sends.
struct CorrelatedHandle<H> {
	inner: H,
	correlation_id: HeaderValue,
}
impl<'c, H> AsyncHttpClient<'c> for CorrelatedHandle<H>
where
	H: AsyncHttpClient<'c>,
{
	type Error = H::Error;
	type Future = H::Future;

	fn call(&'c self, mut request: HttpRequest) -> Self::Future {
		request.headers_mut().insert(CLIENT_REQUEST_ID_HEADER, self.correlation_id.clone());

		self.inner.call(request)
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct EndpointTokenFields {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	id_token: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_in: Option<i64>,
}
impl ExtraTokenFields for EndpointTokenFields {}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct EndpointErrorResponse {
	error: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	error_description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	correlation_id: Option<String>,
}
impl Display for EndpointErrorResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.error_description {
			Some(description) => write!(f, "{}: {description}", self.error),
			None => f.write_str(&self.error),
		}
	}
}
impl ErrorResponse for EndpointErrorResponse {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ErrorClass {
	InvalidGrant,
	InvalidClient,
	InsufficientScope,
	InteractionRequired,
	Transient,
}

fn oauth_scopes(scopes: &ScopeSet) -> impl Iterator<Item = Scope> + '_ {
	scopes.iter().map(|scope| Scope::new(scope.to_owned()))
}

/// Applies the status and body rules of the [`oauth2`] client to a raw response.
fn parse_token_response<E>(
	response: &HttpResponse,
) -> Result<EndpointTokenResponse, EndpointRequestError<E>>
where
	E: 'static + StdError,
{
	let body = response.body().as_slice();

	if response.status() != StatusCode::OK {
		if body.is_empty() {
			return Err(RequestTokenError::Other("server returned empty error response".into()));
		}

		return Err(match deserialize_json::<EndpointErrorResponse>(body) {
			Ok(error) => RequestTokenError::ServerResponse(error),
			Err(source) => RequestTokenError::Parse(source, body.to_vec()),
		});
	}

	deserialize_json(body).map_err(|source| RequestTokenError::Parse(source, body.to_vec()))
}

fn deserialize_json<T>(body: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(body))
}

fn map_request_error<E, M>(
	grant: GrantType,
	meta: Option<&ResponseMetadata>,
	err: EndpointRequestError<E>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	match err {
		RequestTokenError::ServerResponse(body) => map_error_response(Some(body), meta),
		RequestTokenError::Request(error) => mapper.map_transport_error(grant, meta, error),
		RequestTokenError::Parse(_, _) | RequestTokenError::Other(_) if is_error_status(meta) =>
			map_error_response(None, meta),
		RequestTokenError::Parse(source, _) =>
			TransientError::TokenResponseParse { source, status: meta_status(meta) }.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

/// Classifies a non-success response by its OAuth error code, then by status.
fn map_error_response(
	body: Option<EndpointErrorResponse>,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let status = meta_status(meta);
	let class = body
		.as_ref()
		.and_then(|body| classify_oauth_error(&body.error))
		.or_else(|| status.map(classify_status))
		.unwrap_or(ErrorClass::Transient);
	let reason = match &body {
		Some(EndpointErrorResponse { error_description: Some(description), .. }) =>
			description.clone(),
		Some(body) => body.error.clone(),
		None => status.map_or_else(|| "empty response".into(), |status| format!("HTTP {status}")),
	};
	let kind = match class {
		ErrorClass::InvalidGrant => AuthErrorKind::InvalidGrant { reason },
		ErrorClass::InvalidClient => AuthErrorKind::InvalidClient { reason },
		ErrorClass::InsufficientScope => AuthErrorKind::InsufficientScope { reason },
		ErrorClass::InteractionRequired => AuthErrorKind::InteractionRequired { reason },
		ErrorClass::Transient => TransientError::TokenEndpoint {
			message: reason,
			status,
			retry_after: meta_retry_after(meta),
		}
		.into(),
	};
	let correlation_id =
		body.and_then(|body| body.correlation_id).and_then(|id| CorrelationId::new(id).ok());

	Error::Auth(AuthError { kind, correlation_id })
}

fn classify_oauth_error(error: &str) -> Option<ErrorClass> {
	let is_any = |codes: &[&str]| codes.iter().any(|code| error.eq_ignore_ascii_case(code));

	if is_any(&["invalid_grant", "access_denied"]) {
		Some(ErrorClass::InvalidGrant)
	} else if is_any(&["invalid_client", "unauthorized_client"]) {
		Some(ErrorClass::InvalidClient)
	} else if is_any(&["invalid_scope", "insufficient_scope"]) {
		Some(ErrorClass::InsufficientScope)
	} else if is_any(&["interaction_required", "consent_required", "login_required"]) {
		Some(ErrorClass::InteractionRequired)
	} else if is_any(&["temporarily_unavailable", "server_error"]) {
		Some(ErrorClass::Transient)
	} else {
		None
	}
}

fn classify_status(status: u16) -> ErrorClass {
	match status {
		400 | 404 | 410 => ErrorClass::InvalidGrant,
		401 => ErrorClass::InvalidClient,
		403 => ErrorClass::InsufficientScope,
		_ => ErrorClass::Transient,
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(
	grant: GrantType,
	meta: Option<&ResponseMetadata>,
	err: ReqwestError,
) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::TokenEndpoint {
			message: format!("Request timed out while calling the token endpoint for {grant}"),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(meta: Option<&ResponseMetadata>, message: impl Display) -> Error {
	TransientError::TokenEndpoint {
		message: format!("HTTP client error occurred while calling the token endpoint: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error(meta: Option<&ResponseMetadata>) -> Error {
	TransientError::TokenEndpoint {
		message: "HTTP client error occurred while calling the token endpoint".into(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn is_error_status(meta: Option<&ResponseMetadata>) -> bool {
	meta_status(meta).is_some_and(|status| !(200..300).contains(&status))
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
