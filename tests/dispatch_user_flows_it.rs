mod common;

// std
use std::sync::Arc;
// self
use common::*;
use oauth2_confidential::{
	error::{AuthErrorKind, Error, RequestError},
	flows::{
		AuthorizationCodeRequest, ConfidentialClient, OnBehalfOfRequest, RefreshTokenRequest,
		UsernamePasswordRequest,
	},
	grant::GrantType,
};

const OIDC_MERGED: [&str; 4] = ["offline_access", "openid", "profile", "user.read"];

fn client_with(factory: &RecordingFactory) -> ConfidentialClient {
	ConfidentialClient::with_factory(
		secret_config("https://login.example.com/common"),
		Arc::new(factory.clone()),
	)
}

#[tokio::test]
async fn every_user_flow_merges_oidc_defaults_and_reaches_its_grant_client() {
	let factory = RecordingFactory::default();
	let client = client_with(&factory);

	client
		.acquire_token_by_code(
			AuthorizationCodeRequest::new("code-1", "https://app.example.com/callback", [
				"user.read",
			])
			.with_code_verifier("verifier-1"),
		)
		.await
		.expect("Authorization code should succeed on an alias tenant.");
	client
		.acquire_token_by_refresh_token(RefreshTokenRequest::new("refresh-1", ["user.read"]))
		.await
		.expect("Refresh should succeed.");
	client
		.acquire_token_on_behalf_of(OnBehalfOfRequest::new("incoming.jwt", ["user.read"]))
		.await
		.expect("On-behalf-of should succeed.");
	client
		.acquire_token_by_username_password(UsernamePasswordRequest::new("alice", "hunter2", [
			"user.read",
		]))
		.await
		.expect("Username/password should succeed.");

	let grants = factory.recorder.grants();

	assert_eq!(
		grants.iter().map(|grant| grant.grant).collect::<Vec<_>>(),
		vec![
			GrantType::AuthorizationCode,
			GrantType::RefreshToken,
			GrantType::OnBehalfOf,
			GrantType::Password,
		]
	);

	for grant in &grants {
		assert_eq!(grant.scopes, OIDC_MERGED.map(str::to_owned).to_vec());
		assert_eq!(grant.credential, "secret");
	}

	assert_eq!(grants[0].fields, vec![
		("code", "code-1".to_owned()),
		("redirect_uri", "https://app.example.com/callback".to_owned()),
		("code_verifier", "verifier-1".to_owned()),
	]);
	assert_eq!(grants[1].fields, vec![("refresh_token", "refresh-1".to_owned())]);
	assert_eq!(grants[2].fields, vec![
		("assertion", "incoming.jwt".to_owned()),
		("requested_token_use", "on_behalf_of".to_owned()),
	]);
	assert_eq!(grants[3].fields, vec![
		("username", "alice".to_owned()),
		("password", "hunter2".to_owned()),
	]);
	assert_eq!(factory.recorder.constructions(), 4);
	assert_eq!(client.metrics().attempts(), 4);
	assert_eq!(client.metrics().successes(), 4);
}

#[tokio::test]
async fn validation_failures_never_construct_a_grant_client() {
	let factory = RecordingFactory::default();
	let client = client_with(&factory);
	let blank_code = client
		.acquire_token_by_code(AuthorizationCodeRequest::new(
			" ",
			"https://app.example.com/callback",
			["user.read"],
		))
		.await
		.expect_err("Blank codes must be rejected.");
	let bad_redirect = client
		.acquire_token_by_code(AuthorizationCodeRequest::new("code-1", "not a url", ["user.read"]))
		.await
		.expect_err("Unparseable redirect URIs must be rejected.");
	let bad_scope = client
		.acquire_token_by_refresh_token(RefreshTokenRequest::new("refresh-1", ["user read"]))
		.await
		.expect_err("Scopes with whitespace must be rejected.");
	let bad_correlation = client
		.acquire_token_on_behalf_of(
			OnBehalfOfRequest::new("incoming.jwt", ["user.read"]).with_correlation_id("has space"),
		)
		.await
		.expect_err("Malformed correlation ids must be rejected.");

	assert!(matches!(
		blank_code,
		Error::InvalidRequest(RequestError::MissingField { field: "code", .. })
	));
	assert!(matches!(bad_redirect, Error::InvalidRequest(RequestError::InvalidRedirectUri { .. })));
	assert!(matches!(bad_scope, Error::InvalidRequest(RequestError::InvalidScope(_))));
	assert!(matches!(bad_correlation, Error::InvalidRequest(RequestError::InvalidCorrelationId(_))));

	for err in [&blank_code, &bad_redirect, &bad_scope, &bad_correlation] {
		assert!(err.correlation_id().is_none());
	}

	assert_eq!(factory.recorder.constructions(), 0);
	assert_eq!(client.metrics().failures(), 4);
	assert_eq!(client.metrics().enrichments(), 0);
}

#[tokio::test]
async fn auth_errors_are_stamped_with_the_request_correlation_id() {
	let factory = RecordingFactory::with_behavior(StubBehavior::Reject {
		server_correlation_id: Some("server-side-id"),
	});
	let client = client_with(&factory);
	let err = client
		.acquire_token_by_refresh_token(
			RefreshTokenRequest::new("refresh-1", ["user.read"]).with_correlation_id("corr-caller"),
		)
		.await
		.expect_err("Stub rejection must surface.");

	assert!(matches!(err.auth_kind(), Some(AuthErrorKind::InvalidGrant { .. })));
	assert_eq!(err.correlation_id().map(ToString::to_string).as_deref(), Some("corr-caller"));
	assert_eq!(client.metrics().enrichments(), 1);
}

#[tokio::test]
async fn generated_correlation_ids_match_what_the_grant_client_saw() {
	let factory = RecordingFactory::with_behavior(StubBehavior::Reject {
		server_correlation_id: None,
	});
	let client = client_with(&factory);
	let err = client
		.acquire_token_by_username_password(UsernamePasswordRequest::new("alice", "hunter2", [
			"user.read",
		]))
		.await
		.expect_err("Stub rejection must surface.");
	let stamped = err.correlation_id().cloned().expect("Auth errors must carry a correlation id.");

	assert_eq!(stamped, factory.recorder.last_grant().correlation_id);
}

#[tokio::test]
async fn skip_cache_is_forwarded_to_the_grant_client() {
	let factory = RecordingFactory::default();
	let client = client_with(&factory);

	client
		.acquire_token_on_behalf_of(
			OnBehalfOfRequest::new("incoming.jwt", ["user.read"]).with_skip_cache(true),
		)
		.await
		.expect("On-behalf-of should succeed.");

	assert!(factory.recorder.last_grant().skip_cache);
}
