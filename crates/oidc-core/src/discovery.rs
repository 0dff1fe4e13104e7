//! OpenID Connect discovery.
//!
//! Builds the `/.well-known/openid-configuration` document from the provider
//! configuration. The JWKS document is produced by
//! [`TokenCodec::jwks`](crate::token::TokenCodec::jwks).
//!
//! # References
//!
//! - [OpenID Connect Discovery 1.0](https://openid.net/specs/openid-connect-discovery-1_0.html)

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

/// OpenID provider metadata.
///
/// # Example Response
///
/// ```json
/// {
///   "issuer": "https://id.example.com",
///   "authorization_endpoint": "https://id.example.com/authorize",
///   "token_endpoint": "https://id.example.com/token",
///   "jwks_uri": "https://id.example.com/jwks",
///   "response_types_supported": ["code"],
///   "subject_types_supported": ["public"],
///   "id_token_signing_alg_values_supported": ["RS256"],
///   "scopes_supported": ["openid", "profile", "email"],
///   "grant_types_supported": ["authorization_code", "refresh_token", "client_credentials"],
///   "token_endpoint_auth_methods_supported": ["client_secret_basic", "client_secret_post", "none"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer identifier. Matches the `iss` claim of ID tokens.
    pub issuer: String,

    /// URL of the authorization endpoint.
    pub authorization_endpoint: String,

    /// URL of the token endpoint.
    pub token_endpoint: String,

    /// URL of the JSON Web Key Set.
    pub jwks_uri: String,

    /// URL of the UserInfo endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// Supported response types.
    pub response_types_supported: Vec<String>,

    /// Supported subject identifier types.
    pub subject_types_supported: Vec<String>,

    /// Supported ID token signing algorithms.
    pub id_token_signing_alg_values_supported: Vec<String>,

    /// Supported OAuth scopes.
    pub scopes_supported: Vec<String>,

    /// Supported grant types.
    pub grant_types_supported: Vec<String>,

    /// Supported token endpoint authentication methods.
    pub token_endpoint_auth_methods_supported: Vec<String>,

    /// Claims the provider may supply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_supported: Option<Vec<String>>,
}

/// Builds the discovery document for `config`.
#[must_use]
pub fn openid_configuration(config: &ProviderConfig) -> ProviderMetadata {
    let discovery = &config.discovery;

    ProviderMetadata {
        issuer: config.issuer.clone(),
        authorization_endpoint: config.authorization_endpoint(),
        token_endpoint: config.token_endpoint(),
        jwks_uri: config.jwks_uri(),
        userinfo_endpoint: config.userinfo_endpoint.clone(),
        response_types_supported: vec!["code".to_string()],
        subject_types_supported: vec!["public".to_string()],
        id_token_signing_alg_values_supported: vec!["RS256".to_string()],
        scopes_supported: discovery.scopes_supported.clone(),
        grant_types_supported: discovery.grant_types_supported.clone(),
        token_endpoint_auth_methods_supported: discovery
            .token_endpoint_auth_methods_supported
            .clone(),
        claims_supported: discovery.claims_supported.clone(),
    }
}
