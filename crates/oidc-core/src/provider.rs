//! Provider facade.
//!
//! [`Provider`] is what a host application talks to. It validates the
//! configuration once, loads or generates the signing key, fills in
//! in-memory stores for anything not injected, and exposes the endpoint
//! operations.
//!
//! # Usage
//!
//! ```ignore
//! use oidc_core::prelude::*;
//!
//! let provider = Provider::builder(ProviderConfig::new("https://id.example.com"))
//!     .with_claims_provider(Arc::new(my_claims))
//!     .build()?;
//!
//! let client = provider
//!     .register_client(Client::new("my-app").with_redirect_uri("https://app/cb"))
//!     .await?;
//!
//! let request = provider.parse_authorization_request(&query).await?;
//! let redirect = provider.authorize(&request, "user-42").await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::AuthResult;
use crate::config::{ConfigError, ProviderConfig};
use crate::discovery::{ProviderMetadata, openid_configuration};
use crate::error::AuthError;
use crate::identity::{ClaimsProvider, CredentialValidator, NoClaims};
use crate::oauth::authorize::{AuthorizationErrorCode, AuthorizationRequest, AuthorizationResponse};
use crate::oauth::service::{AuthorizationConfig, AuthorizationService};
use crate::oauth::token::TokenResponse;
use crate::storage::{
    AuthorizationCodeStore, ClientStore, MemoryClientStore, MemoryCodeStore, MemoryTokenStore,
    TokenStore,
};
use crate::token::codec::TokenCodec;
use crate::token::jwt::{IdTokenClaims, Jwks, SigningKeyPair};
use crate::token::service::{TokenConfig, TokenService};
use crate::types::{AccessToken, Client, now_millis};

/// OAuth 2.0 / OpenID Connect provider.
pub struct Provider {
    config: ProviderConfig,
    codec: Arc<TokenCodec>,
    clients: Arc<dyn ClientStore>,
    tokens: Arc<dyn TokenStore>,
    credentials: Option<Arc<dyn CredentialValidator>>,
    authorization: AuthorizationService,
    token: TokenService,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("issuer", &self.config.issuer)
            .field("kid", &self.codec.current_kid())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Provider`].
pub struct ProviderBuilder {
    config: ProviderConfig,
    signing_key: Option<SigningKeyPair>,
    clients: Option<Arc<dyn ClientStore>>,
    codes: Option<Arc<dyn AuthorizationCodeStore>>,
    tokens: Option<Arc<dyn TokenStore>>,
    claims: Option<Arc<dyn ClaimsProvider>>,
    credentials: Option<Arc<dyn CredentialValidator>>,
}

impl ProviderBuilder {
    /// Creates a builder for `config`.
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            signing_key: None,
            clients: None,
            codes: None,
            tokens: None,
            claims: None,
            credentials: None,
        }
    }

    /// Uses an existing signing key instead of the configured or generated one.
    #[must_use]
    pub fn with_signing_key(mut self, key: SigningKeyPair) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Sets the client store. Default: [`MemoryClientStore`].
    #[must_use]
    pub fn with_client_store(mut self, store: Arc<dyn ClientStore>) -> Self {
        self.clients = Some(store);
        self
    }

    /// Sets the authorization code store. Default: [`MemoryCodeStore`].
    #[must_use]
    pub fn with_code_store(mut self, store: Arc<dyn AuthorizationCodeStore>) -> Self {
        self.codes = Some(store);
        self
    }

    /// Sets the token store. Default: [`MemoryTokenStore`].
    #[must_use]
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(store);
        self
    }

    /// Sets the ID token claims source. Default: [`NoClaims`].
    #[must_use]
    pub fn with_claims_provider(mut self, claims: Arc<dyn ClaimsProvider>) -> Self {
        self.claims = Some(claims);
        self
    }

    /// Sets the end-user credential validator used by
    /// [`Provider::authenticate_user`].
    #[must_use]
    pub fn with_credential_validator(mut self, validator: Arc<dyn CredentialValidator>) -> Self {
        self.credentials = Some(validator);
        self
    }

    /// Validates the configuration and builds the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the signing key
    /// cannot be loaded or generated.
    pub fn build(self) -> Result<Provider, ConfigError> {
        // 1. Validate configuration before constructing anything
        self.config.validate()?;

        // 2. Signing key: injected, imported from PEM, or generated
        let signing_key = match (self.signing_key, &self.config.signing.private_key_pem) {
            (Some(key), _) => key,
            (None, Some(pem)) => {
                let kid = self
                    .config
                    .signing
                    .key_id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                SigningKeyPair::from_pem(kid, pem)?
            }
            (None, None) => SigningKeyPair::generate_rsa(self.config.signing.key_bits)?,
        };

        // 3. Lifetimes
        let access_token_lifetime =
            to_time_duration("access_token_lifetime", self.config.access_token_lifetime)?;
        let id_token_lifetime =
            to_time_duration("id_token_lifetime", self.config.id_token_lifetime)?;
        let code_lifetime = to_time_duration(
            "authorization_code_lifetime",
            self.config.authorization_code_lifetime,
        )?;

        // 4. Wire components
        let codec = Arc::new(TokenCodec::new(
            signing_key,
            self.config.issuer.clone(),
            id_token_lifetime,
        ));

        let clients: Arc<dyn ClientStore> = self
            .clients
            .unwrap_or_else(|| Arc::new(MemoryClientStore::new()));
        let codes: Arc<dyn AuthorizationCodeStore> =
            self.codes.unwrap_or_else(|| Arc::new(MemoryCodeStore::new()));
        let tokens: Arc<dyn TokenStore> = self
            .tokens
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let claims: Arc<dyn ClaimsProvider> = self.claims.unwrap_or_else(|| Arc::new(NoClaims));

        let authorization = AuthorizationService::new(
            clients.clone(),
            codes.clone(),
            AuthorizationConfig::default().with_code_lifetime(code_lifetime),
        );
        let token = TokenService::new(
            clients.clone(),
            codes,
            tokens.clone(),
            claims,
            codec.clone(),
            TokenConfig::default().with_access_token_lifetime(access_token_lifetime),
        );

        tracing::info!(
            issuer = %self.config.issuer,
            kid = %codec.current_kid(),
            "OIDC provider initialized"
        );

        Ok(Provider {
            config: self.config,
            codec,
            clients,
            tokens,
            credentials: self.credentials,
            authorization,
            token,
        })
    }
}

fn to_time_duration(
    field: &str,
    value: std::time::Duration,
) -> Result<time::Duration, ConfigError> {
    time::Duration::try_from(value)
        .map_err(|_| ConfigError::InvalidValue(format!("{field} is out of range")))
}

impl Provider {
    /// Creates a builder for `config`.
    #[must_use]
    pub fn builder(config: ProviderConfig) -> ProviderBuilder {
        ProviderBuilder::new(config)
    }

    /// Returns the validated configuration.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns the issuer identifier.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    // =========================================================================
    // Authorization endpoint
    // =========================================================================

    /// Validates an authorization request.
    ///
    /// # Errors
    ///
    /// See [`AuthorizationService::parse_request`].
    pub async fn parse_authorization_request(
        &self,
        params: &HashMap<String, String>,
    ) -> AuthResult<AuthorizationRequest> {
        self.authorization.parse_request(params).await
    }

    /// Approves a validated request on behalf of `user_id` and returns the
    /// redirect carrying the authorization code.
    ///
    /// # Errors
    ///
    /// See [`AuthorizationService::approve`].
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        user_id: &str,
    ) -> AuthResult<AuthorizationResponse> {
        self.authorization.approve(request, user_id).await
    }

    /// Returns the `access_denied` redirect for a refused request.
    #[must_use]
    pub fn deny(
        &self,
        request: &AuthorizationRequest,
        description: Option<&str>,
    ) -> AuthorizationResponse {
        self.authorization
            .deny(request, AuthorizationErrorCode::AccessDenied, description)
    }

    /// Returns the error redirect for a failed authorization request, or
    /// `None` when the error must not be redirected.
    ///
    /// # Errors
    ///
    /// Returns an error if the client lookup fails.
    pub async fn error_redirect(
        &self,
        params: &HashMap<String, String>,
        error: &AuthError,
    ) -> AuthResult<Option<AuthorizationResponse>> {
        self.authorization.error_response(params, error).await
    }

    // =========================================================================
    // Token endpoint
    // =========================================================================

    /// Handles a token request.
    ///
    /// # Arguments
    ///
    /// * `params` - Decoded form parameters
    /// * `authorization_header` - Raw `Authorization` header value, if any
    ///
    /// # Errors
    ///
    /// See [`TokenService::handle_request`].
    pub async fn token(
        &self,
        params: &HashMap<String, String>,
        authorization_header: Option<&str>,
    ) -> AuthResult<TokenResponse> {
        self.token.handle(params, authorization_header).await
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Returns the OpenID provider metadata.
    #[must_use]
    pub fn openid_configuration(&self) -> ProviderMetadata {
        openid_configuration(&self.config)
    }

    /// Returns the JWKS document with the current public key.
    #[must_use]
    pub fn jwks(&self) -> Jwks {
        self.codec.jwks()
    }

    // =========================================================================
    // Clients, tokens and users
    // =========================================================================

    /// Registers a client, assigning a `client_id` when none is given.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the client is invalid or the `client_id` is
    /// already taken.
    pub async fn register_client(&self, client: Client) -> AuthResult<Client> {
        self.clients.register(client).await
    }

    /// Verifies an ID token issued by this provider for `audience`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the signature, issuer, audience or
    /// expiry check fails.
    pub fn verify_id_token(&self, token: &str, audience: &str) -> AuthResult<IdTokenClaims> {
        Ok(self.codec.verify_id_token(token, audience)?)
    }

    /// Looks up an access token for a resource server.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the token is unknown or expired.
    pub async fn lookup_access_token(&self, token: &str) -> AuthResult<AccessToken> {
        let access = self
            .tokens
            .get_access_token(token)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("access token is invalid"))?;

        if access.is_expired_at(now_millis()) {
            return Err(AuthError::invalid_grant("access token has expired"));
        }

        Ok(access)
    }

    /// Checks end-user credentials with the configured validator and returns
    /// the user id.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` if the credentials are rejected and
    /// `Configuration` if no validator was configured.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> AuthResult<String> {
        let validator = self
            .credentials
            .as_ref()
            .ok_or_else(|| AuthError::configuration("no credential validator configured"))?;

        match validator.validate(username, password).await? {
            Some(user_id) => Ok(user_id),
            None => {
                tracing::warn!("End-user authentication failed");
                Err(AuthError::access_denied("invalid username or password"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::jwt::test_key_pair;
    use async_trait::async_trait;
    use std::time::Duration;

    const ISSUER: &str = "https://id.example.com";

    struct OneUser;

    #[async_trait]
    impl CredentialValidator for OneUser {
        async fn validate(&self, username: &str, password: &str) -> AuthResult<Option<String>> {
            Ok((username == "alice" && password == "wonderland").then(|| "user-1".to_string()))
        }
    }

    fn provider() -> Provider {
        Provider::builder(ProviderConfig::new(ISSUER))
            .with_signing_key(test_key_pair())
            .with_credential_validator(Arc::new(OneUser))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let err = Provider::builder(ProviderConfig::default())
            .with_signing_key(test_key_pair())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));

        let mut config = ProviderConfig::new(ISSUER);
        config.access_token_lifetime = Duration::ZERO;
        let err = Provider::builder(config)
            .with_signing_key(test_key_pair())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_build_rejects_bad_pem() {
        let mut config = ProviderConfig::new(ISSUER);
        config.signing.private_key_pem = Some("not a key".to_string());
        let err = Provider::builder(config).build().unwrap_err();
        assert!(matches!(err, ConfigError::Signing(_)));
    }

    #[test]
    fn test_discovery_and_jwks() {
        let provider = provider();
        let metadata = provider.openid_configuration();
        assert_eq!(metadata.issuer, ISSUER);
        assert_eq!(metadata.jwks_uri, "https://id.example.com/jwks");

        let jwks = provider.jwks();
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].kid, test_key_pair().kid);
    }

    #[tokio::test]
    async fn test_register_client_assigns_id() {
        let provider = provider();
        let client = provider
            .register_client(Client::new("").with_redirect_uri("https://app/cb"))
            .await
            .unwrap();
        assert!(uuid::Uuid::parse_str(&client.client_id).is_ok());
    }

    #[tokio::test]
    async fn test_deny_uses_access_denied() {
        let provider = provider();
        provider
            .register_client(Client::new("app").with_redirect_uri("https://app/cb"))
            .await
            .unwrap();

        let params: HashMap<String, String> = [
            ("response_type", "code"),
            ("client_id", "app"),
            ("redirect_uri", "https://app/cb"),
            ("state", "s1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let request = provider.parse_authorization_request(&params).await.unwrap();

        let response = provider.deny(&request, None);
        assert_eq!(
            response.to_redirect_url(),
            "https://app/cb?error=access_denied&state=s1"
        );
    }

    #[tokio::test]
    async fn test_lookup_access_token() {
        let provider = provider();
        let err = provider.lookup_access_token("missing").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));

        provider
            .tokens
            .save_access_token(AccessToken {
                token: "old".to_string(),
                subject: "svc".to_string(),
                client_id: "svc".to_string(),
                scope: vec![],
                expires_at: now_millis() - 1,
            })
            .await
            .unwrap();
        let err = provider.lookup_access_token("old").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_user() {
        let provider = provider();
        assert_eq!(
            provider.authenticate_user("alice", "wonderland").await.unwrap(),
            "user-1"
        );

        let err = provider
            .authenticate_user("alice", "guess")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccessDenied { .. }));

        let bare = Provider::builder(ProviderConfig::new(ISSUER))
            .with_signing_key(test_key_pair())
            .build()
            .unwrap();
        let err = bare.authenticate_user("alice", "wonderland").await.unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }
}
