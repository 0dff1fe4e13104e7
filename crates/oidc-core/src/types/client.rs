//! OAuth 2.0 client registration types.
//!
//! Clients are immutable once registered: the store refuses to overwrite an
//! existing `client_id`, and none of the endpoints mutate a client.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
///
/// Defines the token endpoint flows a client is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow.
    AuthorizationCode,
    /// Client Credentials flow (confidential clients only).
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Every grant type this server implements.
    pub const ALL: [GrantType; 3] = [
        Self::AuthorizationCode,
        Self::RefreshToken,
        Self::ClientCredentials,
    ];

    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parses a grant_type parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|grant| grant.as_str() == value)
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Token Endpoint Auth Method
// =============================================================================

/// How a client authenticates at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// `Authorization: Basic` header.
    ClientSecretBasic,
    /// `client_id` and `client_secret` form parameters.
    ClientSecretPost,
    /// Public client, no secret.
    None,
}

impl TokenEndpointAuthMethod {
    /// Every supported authentication method.
    pub const ALL: [TokenEndpointAuthMethod; 3] = [
        Self::ClientSecretBasic,
        Self::ClientSecretPost,
        Self::None,
    ];

    /// Returns the registered method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
            Self::None => "none",
        }
    }

    /// Parses a registered method name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str() == value)
    }
}

impl std::fmt::Display for TokenEndpointAuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

fn default_grant_types() -> Vec<GrantType> {
    vec![GrantType::AuthorizationCode, GrantType::RefreshToken]
}

fn default_response_types() -> Vec<String> {
    vec!["code".to_string()]
}

/// A registered OAuth 2.0 client.
///
/// # Example (JSON)
///
/// ```json
/// {
///   "client_id": "my-app",
///   "client_secret": "s3cr3t",
///   "redirect_uris": ["https://app.example.com/callback"],
///   "scopes": ["openid", "profile"]
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier. Assigned on registration when empty.
    #[serde(default)]
    pub client_id: String,

    /// Shared secret for confidential clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Redirect URIs, matched by exact string comparison.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Grant types this client may use at the token endpoint.
    #[serde(default = "default_grant_types")]
    pub grant_types: Vec<GrantType>,

    /// Response types this client may request at the authorization endpoint.
    #[serde(default = "default_response_types")]
    pub response_types: Vec<String>,

    /// Scopes this client may request. An empty list allows none.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Token endpoint authentication method. Filled in on registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_method: Option<TokenEndpointAuthMethod>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("redirect_uris", &self.redirect_uris)
            .field("grant_types", &self.grant_types)
            .field("response_types", &self.response_types)
            .field("scopes", &self.scopes)
            .field("token_endpoint_auth_method", &self.token_endpoint_auth_method)
            .finish()
    }
}

impl Client {
    /// Creates a client with the default grant and response types.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uris: Vec::new(),
            grant_types: default_grant_types(),
            response_types: default_response_types(),
            scopes: Vec::new(),
            token_endpoint_auth_method: None,
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Adds a redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uris.push(uri.into());
        self
    }

    /// Replaces the allowed grant types.
    #[must_use]
    pub fn with_grant_types(mut self, grant_types: impl IntoIterator<Item = GrantType>) -> Self {
        self.grant_types = grant_types.into_iter().collect();
        self
    }

    /// Replaces the allowed scopes.
    #[must_use]
    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the token endpoint authentication method.
    #[must_use]
    pub fn with_auth_method(mut self, method: TokenEndpointAuthMethod) -> Self {
        self.token_endpoint_auth_method = Some(method);
        self
    }

    /// Fills in the authentication method when it was omitted:
    /// `client_secret_basic` with a secret, `none` without.
    pub fn apply_defaults(&mut self) {
        if self.token_endpoint_auth_method.is_none() {
            self.token_endpoint_auth_method = Some(if self.client_secret.is_some() {
                TokenEndpointAuthMethod::ClientSecretBasic
            } else {
                TokenEndpointAuthMethod::None
            });
        }
    }

    /// Returns the effective token endpoint authentication method.
    #[must_use]
    pub fn auth_method(&self) -> TokenEndpointAuthMethod {
        match self.token_endpoint_auth_method {
            Some(method) => method,
            None if self.client_secret.is_some() => TokenEndpointAuthMethod::ClientSecretBasic,
            None => TokenEndpointAuthMethod::None,
        }
    }

    /// Returns `true` for clients without a secret.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.client_secret.is_none()
    }

    /// Validates the client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration is inconsistent.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        match (self.auth_method(), &self.client_secret) {
            (TokenEndpointAuthMethod::None, Some(_)) => {
                return Err(ClientValidationError::UnexpectedSecret);
            }
            (TokenEndpointAuthMethod::None, None) => {}
            (_, None) => return Err(ClientValidationError::MissingSecret),
            (_, Some(secret)) if secret.is_empty() => {
                return Err(ClientValidationError::MissingSecret);
            }
            (_, Some(_)) => {}
        }

        // Public clients cannot use client_credentials
        if self.is_public() && self.grant_types.contains(&GrantType::ClientCredentials) {
            return Err(ClientValidationError::PublicClientCredentials);
        }

        // Authorization code flow requires redirect URIs
        if self.grant_types.contains(&GrantType::AuthorizationCode) && self.redirect_uris.is_empty()
        {
            return Err(ClientValidationError::NoRedirectUris);
        }

        for uri in &self.redirect_uris {
            let parsed = url::Url::parse(uri)
                .map_err(|_| ClientValidationError::InvalidRedirectUri(uri.clone()))?;
            if parsed.fragment().is_some() || parsed.cannot_be_a_base() {
                return Err(ClientValidationError::InvalidRedirectUri(uri.clone()));
            }
        }

        Ok(())
    }

    /// Checks if the given redirect URI is registered for this client.
    ///
    /// Exact string comparison only: no prefix, normalization or wildcard
    /// matching.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Checks if a response type is allowed for this client.
    #[must_use]
    pub fn is_response_type_allowed(&self, response_type: &str) -> bool {
        self.response_types.iter().any(|allowed| allowed == response_type)
    }

    /// Checks if a single scope is allowed for this client.
    #[must_use]
    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        self.scopes.iter().any(|allowed| allowed == scope)
    }

    /// Checks if every requested scope is allowed for this client.
    #[must_use]
    pub fn are_scopes_allowed(&self, scopes: &[String]) -> bool {
        scopes.iter().all(|scope| self.is_scope_allowed(scope))
    }

    /// Checks if a grant type is allowed for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }

    /// Checks a presented secret against the registered one.
    ///
    /// Both values are hashed first so the comparison time does not depend on
    /// the position of the first differing byte of the secret.
    #[must_use]
    pub fn verify_secret(&self, presented: &str) -> bool {
        match &self.client_secret {
            Some(secret) => {
                Sha256::digest(secret.as_bytes()) == Sha256::digest(presented.as_bytes())
            }
            None => false,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// At least one grant type is required.
    #[error("At least one grant type is required")]
    NoGrantTypes,

    /// Public clients cannot use client_credentials grant.
    #[error("Public clients cannot use client_credentials grant")]
    PublicClientCredentials,

    /// Authorization code flow requires redirect URIs.
    #[error("Authorization code flow requires redirect URIs")]
    NoRedirectUris,

    /// A redirect URI is not an absolute URL without fragment.
    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    /// Secret-based authentication requires a client secret.
    #[error("Confidential clients require a client secret")]
    MissingSecret,

    /// Clients registered with `none` must not carry a secret.
    #[error("Clients using token_endpoint_auth_method 'none' cannot have a secret")]
    UnexpectedSecret,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_confidential_client() -> Client {
        Client::new("test-confidential")
            .with_secret("s3cr3t")
            .with_redirect_uri("https://example.com/callback")
            .with_scopes(["openid", "profile"])
    }

    fn make_valid_public_client() -> Client {
        Client::new("test-public").with_redirect_uri("https://example.com/callback")
    }

    #[test]
    fn test_grant_type_serialization() {
        assert_eq!(
            serde_json::to_string(&GrantType::AuthorizationCode).unwrap(),
            "\"authorization_code\""
        );
        assert_eq!(GrantType::parse("client_credentials"), Some(GrantType::ClientCredentials));
        assert_eq!(GrantType::parse("password"), None);
        assert_eq!(GrantType::RefreshToken.to_string(), "refresh_token");
    }

    #[test]
    fn test_auth_method_parse() {
        assert_eq!(
            TokenEndpointAuthMethod::parse("client_secret_post"),
            Some(TokenEndpointAuthMethod::ClientSecretPost)
        );
        assert_eq!(TokenEndpointAuthMethod::parse("private_key_jwt"), None);
    }

    #[test]
    fn test_valid_clients() {
        assert!(make_valid_confidential_client().validate().is_ok());
        assert!(make_valid_public_client().validate().is_ok());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let client: Client = serde_json::from_str(
            r#"{"client_id":"c","redirect_uris":["https://a/cb"]}"#,
        )
        .unwrap();

        assert_eq!(
            client.grant_types,
            vec![GrantType::AuthorizationCode, GrantType::RefreshToken]
        );
        assert_eq!(client.response_types, vec!["code".to_string()]);
        assert!(client.scopes.is_empty());
        assert_eq!(client.auth_method(), TokenEndpointAuthMethod::None);
    }

    #[test]
    fn test_apply_defaults() {
        let mut client = make_valid_confidential_client();
        client.apply_defaults();
        assert_eq!(
            client.token_endpoint_auth_method,
            Some(TokenEndpointAuthMethod::ClientSecretBasic)
        );

        let mut client = make_valid_public_client();
        client.apply_defaults();
        assert_eq!(client.token_endpoint_auth_method, Some(TokenEndpointAuthMethod::None));
    }

    #[test]
    fn test_validation_rules() {
        let client = make_valid_confidential_client().with_grant_types([]);
        assert!(matches!(client.validate(), Err(ClientValidationError::NoGrantTypes)));

        let client = Client::new("");
        assert!(matches!(client.validate(), Err(ClientValidationError::EmptyClientId)));

        let client = make_valid_public_client()
            .with_grant_types([GrantType::AuthorizationCode, GrantType::ClientCredentials]);
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::PublicClientCredentials)
        ));

        let client = Client::new("no-redirect").with_secret("x");
        assert!(matches!(client.validate(), Err(ClientValidationError::NoRedirectUris)));

        let client = Client::new("machine")
            .with_secret("x")
            .with_grant_types([GrantType::ClientCredentials]);
        assert!(client.validate().is_ok());

        let client = make_valid_public_client()
            .with_auth_method(TokenEndpointAuthMethod::ClientSecretPost);
        assert!(matches!(client.validate(), Err(ClientValidationError::MissingSecret)));

        let client =
            make_valid_confidential_client().with_auth_method(TokenEndpointAuthMethod::None);
        assert!(matches!(client.validate(), Err(ClientValidationError::UnexpectedSecret)));
    }

    #[test]
    fn test_redirect_uri_validation() {
        let client = Client::new("c").with_redirect_uri("/relative/callback");
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::InvalidRedirectUri(_))
        ));

        let client = Client::new("c").with_redirect_uri("https://app/cb#frag");
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::InvalidRedirectUri(_))
        ));
    }

    #[test]
    fn test_redirect_uri_exact_match() {
        let client = make_valid_public_client();
        assert!(client.is_redirect_uri_allowed("https://example.com/callback"));
        assert!(!client.is_redirect_uri_allowed("https://example.com/callback/"));
        assert!(!client.is_redirect_uri_allowed("https://example.com/callback?x=1"));
        assert!(!client.is_redirect_uri_allowed("https://example.com/call"));
        assert!(!client.is_redirect_uri_allowed("HTTPS://EXAMPLE.COM/callback"));
    }

    #[test]
    fn test_scope_checks() {
        let client = make_valid_confidential_client();
        assert!(client.are_scopes_allowed(&["openid".to_string()]));
        assert!(client.are_scopes_allowed(&[]));
        assert!(!client.are_scopes_allowed(&["openid".to_string(), "admin".to_string()]));

        let client = make_valid_public_client();
        assert!(!client.is_scope_allowed("openid"));
    }

    #[test]
    fn test_verify_secret() {
        let client = make_valid_confidential_client();
        assert!(client.verify_secret("s3cr3t"));
        assert!(!client.verify_secret("s3cr3t "));
        assert!(!client.verify_secret(""));
        assert!(!make_valid_public_client().verify_secret(""));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", make_valid_confidential_client());
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("test-confidential"));
    }
}
