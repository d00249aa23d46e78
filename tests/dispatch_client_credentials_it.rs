mod common;

// std
use std::sync::{Arc, Mutex};
// crates.io
use time::Duration;
// self
use common::*;
use oauth2_confidential::{
	auth::TokenSource,
	config::ApplicationConfig,
	error::{AuthErrorKind, BoxError, ConfigError, Error, RequestError},
	ext::{AppTokenProviderParameters, AppTokenProviderResult},
	flows::{ClientCredentialRequest, ConfidentialClient},
	grant::GrantType,
};

fn client(authority: &str) -> (ConfidentialClient, RecordingFactory) {
	let factory = RecordingFactory::default();
	let client =
		ConfidentialClient::with_factory(secret_config(authority), Arc::new(factory.clone()));

	(client, factory)
}

#[tokio::test]
async fn alias_tenants_fail_without_building_a_grant_client() {
	for authority in [
		"https://login.example.com/common",
		"https://login.example.com/organizations",
		"https://login.example.com/Consumers",
	] {
		let (client, factory) = client(authority);
		let err = client
			.acquire_token_by_client_credential(ClientCredentialRequest::new([RESOURCE_DEFAULT]))
			.await
			.expect_err("Alias tenants must be rejected for client credentials.");

		match err {
			Error::Config(ConfigError::MissingTenantId { grant, .. }) =>
				assert_eq!(grant, GrantType::ClientCredentials),
			other => panic!("Expected MissingTenantId, got {other:?}."),
		}

		assert_eq!(factory.recorder.constructions(), 0);
		assert_eq!(client.metrics().failures(), 1);
		assert_eq!(client.metrics().enrichments(), 0);
	}
}

#[tokio::test]
async fn alias_tenants_fail_for_assertion_configured_apps() {
	let factory = RecordingFactory::default();
	let config = ApplicationConfig::builder("app-id")
		.authority("https://login.example.com/common")
		.client_assertion("signed.jwt")
		.build()
		.expect("Assertion-based config should build.");
	let client = ConfidentialClient::with_factory(config, Arc::new(factory.clone()));
	let err = client
		.acquire_token_by_client_credential(ClientCredentialRequest::new([RESOURCE_DEFAULT]))
		.await
		.expect_err("Alias tenants must be rejected whatever the credential.");

	match err {
		Error::Config(ConfigError::MissingTenantId { grant, .. }) =>
			assert_eq!(grant, GrantType::ClientCredentials),
		other => panic!("Expected MissingTenantId, got {other:?}."),
	}

	assert_eq!(client.metrics().enrichments(), 0);
	assert_eq!(factory.recorder.constructions(), 0);
}

#[tokio::test]
async fn oidc_scopes_are_stripped_before_the_grant_client_runs() {
	let (client, factory) = client(AUTHORITY);
	let result = client
		.acquire_token_by_client_credential(
			ClientCredentialRequest::new(["openid", "offline_access", RESOURCE_DEFAULT])
				.with_skip_cache(true),
		)
		.await
		.expect("Client credentials should succeed through the stub client.");

	assert_eq!(result.access_token.expose(), "stub-client_credentials");
	assert_eq!(result.token_source, TokenSource::IdentityProvider);

	let grant = factory.recorder.last_grant();

	assert_eq!(grant.grant, GrantType::ClientCredentials);
	assert_eq!(grant.scopes, vec![RESOURCE_DEFAULT.to_owned()]);
	assert_eq!(grant.credential, "secret");
	assert!(grant.skip_cache);
	assert_eq!(grant.correlation_id, result.correlation_id);
	assert_eq!(factory.recorder.constructions(), 1);
}

#[tokio::test]
async fn oidc_only_scopes_are_rejected() {
	let (client, factory) = client(AUTHORITY);
	let err = client
		.acquire_token_by_client_credential(ClientCredentialRequest::new(["openid", "profile"]))
		.await
		.expect_err("OIDC-only scopes leave nothing to request.");

	assert!(matches!(
		err,
		Error::InvalidRequest(RequestError::EmptyScopes { grant: GrantType::ClientCredentials })
	));
	assert_eq!(factory.recorder.constructions(), 0);
}

#[tokio::test]
async fn request_assertion_replaces_the_configured_secret() {
	let (client, factory) = client(AUTHORITY);

	client
		.acquire_token_by_client_credential(
			ClientCredentialRequest::new([RESOURCE_DEFAULT]).with_client_assertion("signed.jwt"),
		)
		.await
		.expect("Client credentials with an assertion override should succeed.");

	assert_eq!(factory.recorder.last_grant().credential, "assertion");
}

#[tokio::test]
async fn app_token_provider_answers_instead_of_the_grant_client() {
	let (client, factory) = client(AUTHORITY);
	let seen = Arc::new(Mutex::new(Vec::<AppTokenProviderParameters>::new()));
	let provider_seen = seen.clone();

	client
		.set_app_token_provider(move |parameters: AppTokenProviderParameters| {
			let seen = provider_seen.clone();

			async move {
				seen.lock().expect("Provider log lock should not be poisoned.").push(parameters);

				Ok::<_, BoxError>(AppTokenProviderResult::new("hook-token", 3600))
			}
		})
		.expect("First provider registration should succeed.");

	assert!(client.has_app_token_provider());

	let result = client
		.acquire_token_by_client_credential(
			ClientCredentialRequest::new(["openid", RESOURCE_DEFAULT])
				.with_correlation_id("corr-hook"),
		)
		.await
		.expect("App token provider should answer.");

	assert_eq!(result.access_token.expose(), "hook-token");
	assert_eq!(result.token_source, TokenSource::AppTokenProvider);
	assert_eq!(result.tenant_id, "contoso");
	assert_eq!(result.correlation_id.as_ref(), "corr-hook");
	assert_eq!(factory.recorder.constructions(), 0);
	assert_eq!(client.metrics().app_token_provider_calls(), 1);

	let seen = seen.lock().expect("Provider log lock should not be poisoned.");

	assert_eq!(seen.len(), 1);
	assert_eq!(seen[0].tenant_id, "contoso");
	assert_eq!(seen[0].correlation_id.as_ref(), "corr-hook");
	assert_eq!(seen[0].scopes.iter().collect::<Vec<_>>(), vec![RESOURCE_DEFAULT]);
}

#[tokio::test]
async fn app_token_provider_lifetimes_are_anchored_at_issue_time() {
	let (client, factory) = client(AUTHORITY);

	client
		.set_app_token_provider(|_: AppTokenProviderParameters| async {
			let result = AppTokenProviderResult::new("hook-token", 3601).with_refresh_in(1801);

			Ok::<_, BoxError>(result)
		})
		.expect("Provider registration should succeed.");

	let result = client
		.acquire_token_by_client_credential(ClientCredentialRequest::new([RESOURCE_DEFAULT]))
		.await
		.expect("App token provider should answer.");
	let refresh_on = result.refresh_on.expect("Provider refresh hint must be kept.");

	assert_eq!(result.token_source, TokenSource::AppTokenProvider);
	assert_eq!(result.expires_on - result.issued_at, Duration::seconds(3601));
	assert_eq!(refresh_on - result.issued_at, Duration::seconds(1801));
	assert_eq!(factory.recorder.constructions(), 0);
}

#[tokio::test]
async fn app_token_provider_can_only_be_registered_once() {
	let (client, _) = client(AUTHORITY);
	let provider = |_: AppTokenProviderParameters| async {
		Ok::<_, BoxError>(AppTokenProviderResult::new("hook-token", 3600))
	};

	client.set_app_token_provider(provider).expect("First registration should succeed.");

	let err = client
		.set_app_token_provider(provider)
		.expect_err("Second registration must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::AppTokenProviderAlreadySet)));
}

#[tokio::test]
async fn app_token_provider_failures_carry_the_request_correlation_id() {
	let (client, factory) = client(AUTHORITY);

	client
		.set_app_token_provider(|_: AppTokenProviderParameters| async {
			Err::<AppTokenProviderResult, BoxError>("vault unavailable".into())
		})
		.expect("Provider registration should succeed.");

	let err = client
		.acquire_token_by_client_credential(
			ClientCredentialRequest::new([RESOURCE_DEFAULT]).with_correlation_id("corr-vault"),
		)
		.await
		.expect_err("Provider failure must surface.");

	assert!(matches!(err.auth_kind(), Some(AuthErrorKind::AppTokenProvider { .. })));
	assert_eq!(err.correlation_id().map(ToString::to_string).as_deref(), Some("corr-vault"));
	assert_eq!(factory.recorder.constructions(), 0);
	assert_eq!(client.metrics().enrichments(), 1);
}

#[tokio::test]
async fn alias_check_runs_before_the_app_token_provider() {
	let (client, _) = client("https://login.example.com/organizations");

	client
		.set_app_token_provider(|_: AppTokenProviderParameters| async {
			Ok::<_, BoxError>(AppTokenProviderResult::new("hook-token", 3600))
		})
		.expect("Provider registration should succeed.");

	let err = client
		.acquire_token_by_client_credential(ClientCredentialRequest::new([RESOURCE_DEFAULT]))
		.await
		.expect_err("Alias tenants must be rejected even with a provider.");

	assert!(matches!(err, Error::Config(ConfigError::MissingTenantId { .. })));
	assert_eq!(client.metrics().app_token_provider_calls(), 0);
}
