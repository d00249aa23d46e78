//! Authority parsing and tenant validation.
//!
//! An authority is an HTTPS URL whose first path segment names the tenant, e.g.
//! `https://login.example.com/contoso`. Alias tenants (`common`, `organizations`,
//! `consumers`) name a class of tenants and therefore cannot scope app-only tokens.

// self
use crate::{_prelude::*, error::ConfigError, grant::GrantType};

/// Tenant aliases that do not identify one concrete tenant.
pub const TENANT_ALIASES: [&str; 3] = ["common", "organizations", "consumers"];

const TOKEN_ENDPOINT_PATH: [&str; 3] = ["oauth2", "v2.0", "token"];

/// Errors raised while parsing an authority.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum AuthorityError {
	/// Authority is not a URL.
	#[error("Authority `{authority}` is not a valid URL.")]
	Parse {
		/// Raw authority string.
		authority: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Authority must use HTTPS (loopback hosts excepted).
	#[error("Authority must use HTTPS: {url}.")]
	InsecureScheme {
		/// Offending URL.
		url: String,
	},
	/// Authority has no tenant path segment.
	#[error("Authority `{url}` does not name a tenant.")]
	MissingTenant {
		/// Offending URL.
		url: String,
	},
}

/// Parsed authority: issuer URL plus its tenant segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Authority {
	url: Url,
	tenant: String,
}
impl Authority {
	/// Parses and validates an authority string.
	pub fn parse(raw: &str) -> Result<Self, AuthorityError> {
		let url = Url::parse(raw)
			.map_err(|source| AuthorityError::Parse { authority: raw.to_owned(), source })?;

		if !is_secure(&url) {
			return Err(AuthorityError::InsecureScheme { url: url.to_string() });
		}

		let tenant = url
			.path_segments()
			.and_then(|mut segments| segments.next())
			.filter(|segment| !segment.is_empty())
			.map(str::to_owned)
			.ok_or_else(|| AuthorityError::MissingTenant { url: url.to_string() })?;

		Ok(Self { url, tenant })
	}

	/// Authority URL as configured.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Tenant segment of the authority.
	pub fn tenant(&self) -> &str {
		&self.tenant
	}

	/// Returns `true` when the tenant segment is one of [`TENANT_ALIASES`].
	pub fn is_tenant_alias(&self) -> bool {
		TENANT_ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(&self.tenant))
	}

	/// Checks that the authority can scope tokens for `grant`.
	///
	/// Only the client credentials grant needs a concrete tenant; every other grant accepts
	/// any parsed authority.
	pub fn validate_for(&self, grant: GrantType) -> Result<(), ConfigError> {
		if grant == GrantType::ClientCredentials && self.is_tenant_alias() {
			return Err(ConfigError::MissingTenantId {
				authority: self.url.to_string(),
				tenant: self.tenant.clone(),
				grant,
			});
		}

		Ok(())
	}

	/// Token endpoint derived from the authority (`{authority}/oauth2/v2.0/token`).
	pub fn token_endpoint(&self) -> Url {
		let mut url = self.url.clone();

		url.set_query(None);
		url.set_fragment(None);

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().extend(TOKEN_ENDPOINT_PATH);
		}

		url
	}
}
impl Display for Authority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.url.as_str())
	}
}
impl FromStr for Authority {
	type Err = AuthorityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl TryFrom<String> for Authority {
	type Error = AuthorityError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}
impl From<Authority> for String {
	fn from(value: Authority) -> Self {
		value.url.into()
	}
}

/// Accepts `https` URLs, plus `http` on loopback hosts for local development and tests.
pub(crate) fn is_secure(url: &Url) -> bool {
	match url.scheme() {
		"https" => true,
		"http" => is_loopback(url),
		_ => false,
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	}
}
