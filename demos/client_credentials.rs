//! Acquires an app-only token twice: once from a mock token endpoint and once from a registered
//! app token provider that short-circuits the network.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_confidential::{
	config::ApplicationConfig,
	error::BoxError,
	ext::{AppTokenProviderParameters, AppTokenProviderResult},
	flows::{ClientCredentialRequest, ConfidentialClient},
	http::ReqwestHttpClient,
	oauth::{ReqwestTokenEndpointFactory, ReqwestTransportErrorMapper},
	reqwest::Client as ReqwestClient,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/contoso/oauth2/v2.0/token")
				.form_urlencoded_tuple("grant_type", "client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let config = ApplicationConfig::builder("demo-client")
		.authority(server.url("/contoso"))
		.client_secret("super-secret")
		.build()?;
	// The mock server presents a self-signed certificate.
	let http_client = ReqwestHttpClient::from_builder(
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true),
	)?;
	let factory = ReqwestTokenEndpointFactory::new(http_client, ReqwestTransportErrorMapper);
	let client = ConfidentialClient::with_factory(config, Arc::new(factory));
	let request = ClientCredentialRequest::new(["https://graph.example.com/.default"]);
	let from_endpoint = client.acquire_token_by_client_credential(request.clone()).await?;

	println!(
		"Token endpoint issued {} (correlation id {}).",
		from_endpoint.access_token.expose(),
		from_endpoint.correlation_id
	);

	token_mock.assert_async().await;

	client.set_app_token_provider(|parameters: AppTokenProviderParameters| async move {
		Ok::<_, BoxError>(AppTokenProviderResult::new(
			format!("vault-token-for-{}", parameters.tenant_id),
			4 * 60 * 60,
		))
	})?;

	let from_provider = client.acquire_token_by_client_credential(request).await?;

	println!(
		"App token provider issued {} (refresh on {:?}).",
		from_provider.access_token.expose(),
		from_provider.refresh_on
	);
	println!("Dispatch metrics: {:?}.", client.metrics());

	Ok(())
}
