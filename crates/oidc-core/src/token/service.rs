//! Token service for the OAuth 2.0 token endpoint.
//!
//! This module provides the token service that handles:
//!
//! - Client authentication
//! - Authorization code exchange
//! - Refresh token exchange
//! - Client credentials grant
//!
//! # Usage
//!
//! ```ignore
//! use oidc_core::token::{TokenService, TokenConfig};
//!
//! let service = TokenService::new(clients, codes, tokens, claims, codec, TokenConfig::default());
//!
//! let response = service.handle(&form_params, authorization_header).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::error::AuthError;
use crate::identity::ClaimsProvider;
use crate::oauth::client_auth::authenticate_client;
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::storage::{AuthorizationCodeStore, ClientStore, TokenStore};
use crate::token::codec::TokenCodec;
use crate::types::{
    AccessToken, Client, GrantType, RefreshToken, format_scope, parse_scope, unix_millis,
};

/// Token service for generating and managing OAuth tokens.
pub struct TokenService {
    /// Client storage, used for client authentication.
    clients: Arc<dyn ClientStore>,

    /// Authorization code storage.
    codes: Arc<dyn AuthorizationCodeStore>,

    /// Access and refresh token storage.
    tokens: Arc<dyn TokenStore>,

    /// Source of ID token claims.
    claims: Arc<dyn ClaimsProvider>,

    /// Token minting and ID token signing.
    codec: Arc<TokenCodec>,

    /// Service configuration.
    config: TokenConfig,
}

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access token lifetime, reported as `expires_in`.
    pub access_token_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::hours(1),
        }
    }
}

impl TokenConfig {
    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStore>,
        codes: Arc<dyn AuthorizationCodeStore>,
        tokens: Arc<dyn TokenStore>,
        claims: Arc<dyn ClaimsProvider>,
        codec: Arc<TokenCodec>,
        config: TokenConfig,
    ) -> Self {
        Self {
            clients,
            codes,
            tokens,
            claims,
            codec,
            config,
        }
    }

    /// Handles a token request given as decoded form parameters.
    ///
    /// # Errors
    ///
    /// See [`handle_request`](Self::handle_request).
    pub async fn handle(
        &self,
        params: &HashMap<String, String>,
        authorization_header: Option<&str>,
    ) -> AuthResult<TokenResponse> {
        self.handle_request(&TokenRequest::from_params(params), authorization_header)
            .await
    }

    /// Handles a token request.
    ///
    /// Authenticates the client, dispatches on `grant_type` and checks the
    /// response shape before returning it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `grant_type` is missing (`Validation`)
    /// - Client authentication fails
    /// - The grant type is not supported (`UnsupportedGrantType`)
    /// - The grant handler rejects the request
    pub async fn handle_request(
        &self,
        request: &TokenRequest,
        authorization_header: Option<&str>,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate request shape
        if request.grant_type.is_empty() {
            return Err(AuthError::missing_parameter("grant_type"));
        }

        // 2. Authenticate the client
        let client =
            authenticate_client(request, authorization_header, self.clients.as_ref()).await?;

        // 3. Dispatch by grant type
        let grant_type = GrantType::parse(&request.grant_type)
            .ok_or_else(|| AuthError::unsupported_grant_type(&request.grant_type))?;

        let response = match grant_type {
            GrantType::AuthorizationCode => self.exchange_code(request, &client).await?,
            GrantType::RefreshToken => self.refresh(request, &client).await?,
            GrantType::ClientCredentials => self.client_credentials(request, &client).await?,
        };

        // 4. Never hand out a malformed response
        response.validate()?;

        tracing::debug!(
            client_id = %client.client_id,
            grant_type = %grant_type,
            "Token issued"
        );

        Ok(response)
    }

    /// Exchanges an authorization code for access, refresh and ID tokens.
    ///
    /// The code is consumed before any other check, so a rejected exchange
    /// still burns it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `code` is missing (`Validation`)
    /// - The code is unknown or already used (`InvalidGrant`)
    /// - The code is expired (`InvalidGrant`)
    /// - The code was issued to a different client (`InvalidGrant`)
    /// - `redirect_uri` was supplied and differs from the code's (`InvalidGrant`)
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate required parameters
        let code_value = request
            .code
            .as_deref()
            .ok_or_else(|| AuthError::missing_parameter("code"))?;

        // 2. Consume the code (single use)
        let code = self.codes.delete(code_value).await?.ok_or_else(|| {
            tracing::warn!(
                client_id = %client.client_id,
                reason = "unknown_or_used",
                "Authorization code exchange rejected"
            );
            AuthError::invalid_grant("authorization code is invalid or has already been used")
        })?;

        // 3. Validate the code binding
        if code.is_expired_at(unix_millis(OffsetDateTime::now_utc())) {
            tracing::warn!(
                client_id = %client.client_id,
                reason = "expired",
                "Authorization code exchange rejected"
            );
            return Err(AuthError::invalid_grant("authorization code has expired"));
        }

        if code.client_id != client.client_id {
            tracing::warn!(
                client_id = %client.client_id,
                code_client_id = %code.client_id,
                reason = "client_mismatch",
                "Authorization code exchange rejected"
            );
            return Err(AuthError::invalid_grant(
                "authorization code was issued to another client",
            ));
        }

        if let Some(redirect_uri) = request.redirect_uri.as_deref() {
            if redirect_uri != code.redirect_uri {
                tracing::warn!(
                    client_id = %client.client_id,
                    reason = "redirect_uri_mismatch",
                    "Authorization code exchange rejected"
                );
                return Err(AuthError::invalid_grant("redirect_uri does not match"));
            }
        }

        // 4. Issue tokens
        let access_token = self
            .issue_access_token(&code.user_id, &client.client_id, code.scope.clone())
            .await?;

        let refresh_token = TokenCodec::new_opaque_token();
        self.tokens
            .save_refresh_token(RefreshToken {
                token: refresh_token.clone(),
                user_id: code.user_id.clone(),
                client_id: client.client_id.clone(),
                scope: code.scope.clone(),
            })
            .await?;

        let claims = self.claims.claims(&code.user_id, &code.scope).await?;
        let id_token = self.codec.issue_id_token(
            &code.user_id,
            &client.client_id,
            &claims,
            code.nonce.as_deref(),
            code.auth_time,
        )?;

        Ok(TokenResponse::new(access_token, self.expires_in())
            .with_id_token(id_token)
            .with_refresh_token(refresh_token)
            .with_scope(format_scope(&code.scope)))
    }

    /// Issues a new access token from a refresh token.
    ///
    /// The requested scope may only narrow the original grant. The refresh
    /// token itself is left in place and no ID token is issued.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `refresh_token` is missing (`Validation`)
    /// - The token is unknown or belongs to another client (`InvalidGrant`)
    /// - The requested scope exceeds the original grant (`InvalidScope`)
    pub async fn refresh(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let token_value = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::missing_parameter("refresh_token"))?;

        let stored = self
            .tokens
            .get_refresh_token(token_value)
            .await?
            .filter(|token| token.client_id == client.client_id)
            .ok_or_else(|| {
                tracing::warn!(
                    client_id = %client.client_id,
                    "Refresh token rejected"
                );
                AuthError::invalid_grant("refresh token is invalid")
            })?;

        let requested = request.scope.as_deref().map(parse_scope).unwrap_or_default();
        let scope = if requested.is_empty() {
            stored.scope.clone()
        } else {
            if !requested.iter().all(|s| stored.scope.contains(s)) {
                return Err(AuthError::invalid_scope(
                    format_scope(&requested),
                    format_scope(&stored.scope),
                ));
            }
            requested
        };

        let access_token = self
            .issue_access_token(&stored.user_id, &client.client_id, scope.clone())
            .await?;

        Ok(TokenResponse::new(access_token, self.expires_in()).with_scope(format_scope(&scope)))
    }

    /// Issues an access token to the client itself.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client is not registered for this grant (`UnauthorizedClient`)
    /// - A requested scope is not allowed for the client (`InvalidScope`)
    pub async fn client_credentials(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        if !client.is_grant_type_allowed(GrantType::ClientCredentials) {
            return Err(AuthError::unauthorized_client(
                &client.client_id,
                GrantType::ClientCredentials.as_str(),
            ));
        }

        let requested = request.scope.as_deref().map(parse_scope).unwrap_or_default();
        let scope = if requested.is_empty() {
            client.scopes.clone()
        } else {
            if !client.are_scopes_allowed(&requested) {
                return Err(AuthError::invalid_scope(
                    format_scope(&requested),
                    format_scope(&client.scopes),
                ));
            }
            requested
        };

        let access_token = self
            .issue_access_token(&client.client_id, &client.client_id, scope.clone())
            .await?;

        Ok(TokenResponse::new(access_token, self.expires_in()).with_scope(format_scope(&scope)))
    }

    async fn issue_access_token(
        &self,
        subject: &str,
        client_id: &str,
        scope: Vec<String>,
    ) -> AuthResult<String> {
        let token = TokenCodec::new_bearer_token();
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(self.config.access_token_lifetime)
            .map(unix_millis)
            .ok_or_else(|| AuthError::internal("access token lifetime is out of range"))?;

        self.tokens
            .save_access_token(AccessToken {
                token: token.clone(),
                subject: subject.to_string(),
                client_id: client_id.to_string(),
                scope,
                expires_at,
            })
            .await?;

        Ok(token)
    }

    fn expires_in(&self) -> u64 {
        u64::try_from(self.config.access_token_lifetime.whole_seconds()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticClaims;
    use crate::storage::{MemoryClientStore, MemoryCodeStore, MemoryTokenStore};
    use crate::token::jwt::test_key_pair;
    use crate::types::{AuthorizationCode, now_millis};
    use serde_json::json;

    const ISSUER: &str = "https://id.example.com";
    const REDIRECT: &str = "https://app.example.com/callback";

    struct Fixture {
        service: TokenService,
        codes: Arc<MemoryCodeStore>,
        tokens: Arc<MemoryTokenStore>,
        codec: Arc<TokenCodec>,
    }

    async fn fixture() -> Fixture {
        fixture_with(TokenConfig::default()).await
    }

    async fn fixture_with(config: TokenConfig) -> Fixture {
        let clients = Arc::new(MemoryClientStore::new());
        clients
            .register(
                Client::new("web")
                    .with_secret("web-secret")
                    .with_redirect_uri(REDIRECT)
                    .with_scopes(["openid", "profile", "email"]),
            )
            .await
            .unwrap();
        clients
            .register(
                Client::new("spa")
                    .with_redirect_uri("https://spa.example.com/cb")
                    .with_scopes(["openid"]),
            )
            .await
            .unwrap();
        clients
            .register(
                Client::new("worker")
                    .with_secret("worker-secret")
                    .with_grant_types([GrantType::ClientCredentials])
                    .with_scopes(["reports.read", "reports.write"]),
            )
            .await
            .unwrap();
        clients
            .register(
                Client::new("bare")
                    .with_secret("bare-secret")
                    .with_grant_types([GrantType::ClientCredentials]),
            )
            .await
            .unwrap();

        let codes = Arc::new(MemoryCodeStore::new());
        let tokens = Arc::new(MemoryTokenStore::new());
        let claims = Arc::new(StaticClaims::new().with_claim(
            "alice",
            "email",
            json!("alice@example.com"),
        ));
        let codec = Arc::new(TokenCodec::new(test_key_pair(), ISSUER, Duration::hours(1)));

        let service = TokenService::new(
            clients,
            codes.clone(),
            tokens.clone(),
            claims,
            codec.clone(),
            config,
        );

        Fixture {
            service,
            codes,
            tokens,
            codec,
        }
    }

    async fn seed_code(f: &Fixture, client_id: &str, expires_at: i64) -> String {
        let code = TokenCodec::new_opaque_token();
        f.codes
            .save(AuthorizationCode {
                code: code.clone(),
                user_id: "alice".to_string(),
                client_id: client_id.to_string(),
                redirect_uri: REDIRECT.to_string(),
                scope: vec!["openid".to_string(), "profile".to_string()],
                nonce: Some("n-0S6".to_string()),
                expires_at,
                auth_time: Some(1_700_000_000),
            })
            .await
            .unwrap();
        code
    }

    fn code_request(code: &str) -> TokenRequest {
        TokenRequest {
            grant_type: "authorization_code".to_string(),
            code: Some(code.to_string()),
            redirect_uri: Some(REDIRECT.to_string()),
            client_id: Some("web".to_string()),
            client_secret: Some("web-secret".to_string()),
            ..TokenRequest::default()
        }
    }

    fn later() -> i64 {
        now_millis() + 60_000
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let f = fixture().await;
        let code = seed_code(&f, "web", later()).await;

        let response = f
            .service
            .handle_request(&code_request(&code), None)
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
        assert_eq!(response.scope.as_deref(), Some("openid profile"));
        assert!(response.refresh_token.is_some());

        let claims = f
            .codec
            .verify_id_token(response.id_token.as_deref().unwrap(), "web")
            .unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.nonce.as_deref(), Some("n-0S6"));
        assert_eq!(claims.auth_time, Some(1_700_000_000));
        assert_eq!(claims.extra["email"], "alice@example.com");

        let access = f
            .tokens
            .get_access_token(&response.access_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(access.subject, "alice");
        assert_eq!(access.client_id, "web");
        assert_eq!(f.tokens.refresh_token_count(), 1);
        assert!(f.codes.is_empty());
    }

    #[tokio::test]
    async fn test_exchange_code_is_single_use() {
        let f = fixture().await;
        let code = seed_code(&f, "web", later()).await;

        f.service
            .handle_request(&code_request(&code), None)
            .await
            .unwrap();
        let err = f
            .service
            .handle_request(&code_request(&code), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn test_exchange_expired_code() {
        let f = fixture().await;
        let code = seed_code(&f, "web", now_millis() - 1).await;

        let err = f
            .service
            .handle_request(&code_request(&code), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
        assert!(f.codes.is_empty());
        assert_eq!(f.tokens.access_token_count(), 0);
    }

    #[tokio::test]
    async fn test_exchange_code_of_other_client_burns_it() {
        let f = fixture().await;
        let code = seed_code(&f, "web", later()).await;

        let mut request = code_request(&code);
        request.client_id = Some("spa".to_string());
        request.client_secret = None;
        let err = f.service.handle_request(&request, None).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));

        // The rightful client cannot use it afterwards either.
        let err = f
            .service
            .handle_request(&code_request(&code), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn test_exchange_redirect_uri_mismatch() {
        let f = fixture().await;
        let code = seed_code(&f, "web", later()).await;

        let mut request = code_request(&code);
        request.redirect_uri = Some("https://app.example.com/callback/".to_string());
        let err = f.service.handle_request(&request, None).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn test_exchange_without_redirect_uri() {
        let f = fixture().await;
        let code = seed_code(&f, "web", later()).await;

        let mut request = code_request(&code);
        request.redirect_uri = None;
        assert!(f.service.handle_request(&request, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_exchange_missing_code() {
        let f = fixture().await;
        let mut request = code_request("unused");
        request.code = None;
        let err = f.service.handle_request(&request, None).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_missing_and_unsupported_grant_type() {
        let f = fixture().await;
        let mut request = code_request("x");
        request.grant_type = String::new();
        let err = f.service.handle_request(&request, None).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { .. }));

        request.grant_type = "password".to_string();
        let err = f.service.handle_request(&request, None).await.unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedGrantType { .. }));
    }

    #[tokio::test]
    async fn test_client_authentication_runs_first() {
        let f = fixture().await;
        let code = seed_code(&f, "web", later()).await;

        let mut request = code_request(&code);
        request.client_secret = Some("wrong".to_string());
        let err = f.service.handle_request(&request, None).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClientCredentials { .. }));

        // Failed authentication leaves the code untouched.
        assert_eq!(f.codes.len(), 1);
    }

    async fn refresh_token_for_web(f: &Fixture) -> String {
        let code = seed_code(f, "web", later()).await;
        f.service
            .handle_request(&code_request(&code), None)
            .await
            .unwrap()
            .refresh_token
            .unwrap()
    }

    fn refresh_request(token: &str, scope: Option<&str>) -> TokenRequest {
        TokenRequest {
            grant_type: "refresh_token".to_string(),
            refresh_token: Some(token.to_string()),
            client_id: Some("web".to_string()),
            client_secret: Some("web-secret".to_string()),
            scope: scope.map(str::to_string),
            ..TokenRequest::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_keeps_original_scope() {
        let f = fixture().await;
        let token = refresh_token_for_web(&f).await;

        let response = f
            .service
            .handle_request(&refresh_request(&token, None), None)
            .await
            .unwrap();
        assert_eq!(response.scope.as_deref(), Some("openid profile"));
        assert!(response.id_token.is_none());
        assert!(response.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_narrows_scope() {
        let f = fixture().await;
        let token = refresh_token_for_web(&f).await;

        let response = f
            .service
            .handle_request(&refresh_request(&token, Some("profile")), None)
            .await
            .unwrap();
        assert_eq!(response.scope.as_deref(), Some("profile"));

        let access = f
            .tokens
            .get_access_token(&response.access_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(access.scope, vec!["profile"]);

        // The refresh token is not rotated.
        assert!(
            f.service
                .handle_request(&refresh_request(&token, None), None)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_refresh_cannot_widen_scope() {
        let f = fixture().await;
        let token = refresh_token_for_web(&f).await;

        // "email" is allowed for the client but was not part of the grant.
        let err = f
            .service
            .handle_request(&refresh_request(&token, Some("openid email")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidScope { .. }));
    }

    #[tokio::test]
    async fn test_refresh_rejects_unknown_and_foreign_tokens() {
        let f = fixture().await;
        let err = f
            .service
            .handle_request(&refresh_request("nope", None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));

        let token = refresh_token_for_web(&f).await;
        let mut request = refresh_request(&token, None);
        request.client_id = Some("spa".to_string());
        request.client_secret = None;
        let err = f.service.handle_request(&request, None).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    fn client_credentials_request(client: &str, secret: &str, scope: Option<&str>) -> TokenRequest {
        TokenRequest {
            grant_type: "client_credentials".to_string(),
            client_id: Some(client.to_string()),
            client_secret: Some(secret.to_string()),
            scope: scope.map(str::to_string),
            ..TokenRequest::default()
        }
    }

    #[tokio::test]
    async fn test_client_credentials_default_scope() {
        let f = fixture().await;
        let response = f
            .service
            .handle_request(
                &client_credentials_request("worker", "worker-secret", None),
                None,
            )
            .await
            .unwrap();

        assert_eq!(response.scope.as_deref(), Some("reports.read reports.write"));
        assert!(response.id_token.is_none());
        assert!(response.refresh_token.is_none());

        let access = f
            .tokens
            .get_access_token(&response.access_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(access.subject, "worker");
        assert_eq!(access.client_id, "worker");
    }

    #[tokio::test]
    async fn test_client_credentials_scope_subset() {
        let f = fixture().await;
        let response = f
            .service
            .handle_request(
                &client_credentials_request("worker", "worker-secret", Some("reports.read")),
                None,
            )
            .await
            .unwrap();
        assert_eq!(response.scope.as_deref(), Some("reports.read"));

        let err = f
            .service
            .handle_request(
                &client_credentials_request("worker", "worker-secret", Some("reports.delete")),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidScope { .. }));
    }

    #[tokio::test]
    async fn test_empty_scope_is_left_out_of_response() {
        let f = fixture().await;
        let response = f
            .service
            .handle_request(&client_credentials_request("bare", "bare-secret", None), None)
            .await
            .unwrap();
        assert!(response.scope.is_none());

        let code = TokenCodec::new_opaque_token();
        f.codes
            .save(AuthorizationCode {
                code: code.clone(),
                user_id: "alice".to_string(),
                client_id: "web".to_string(),
                redirect_uri: REDIRECT.to_string(),
                scope: Vec::new(),
                nonce: None,
                expires_at: later(),
                auth_time: None,
            })
            .await
            .unwrap();
        let response = f
            .service
            .handle_request(&code_request(&code), None)
            .await
            .unwrap();
        assert!(response.scope.is_none());
        assert!(response.id_token.is_some());
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_fails_without_issuing() {
        let f =
            fixture_with(TokenConfig::default().with_access_token_lifetime(Duration::MAX)).await;
        let err = f
            .service
            .handle_request(
                &client_credentials_request("worker", "worker-secret", None),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal { .. }));
        assert_eq!(f.tokens.access_token_count(), 0);
    }

    #[tokio::test]
    async fn test_client_credentials_requires_grant() {
        let f = fixture().await;
        let err = f
            .service
            .handle_request(&client_credentials_request("web", "web-secret", None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnauthorizedClient { .. }));
        assert_eq!(f.tokens.access_token_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_from_form_params() {
        let f = fixture().await;
        let params: HashMap<String, String> = [
            ("grant_type", "client_credentials"),
            ("scope", "reports.write"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let header = format!(
            "Basic {}",
            base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                "worker:worker-secret"
            )
        );
        let response = f.service.handle(&params, Some(&header)).await.unwrap();
        assert_eq!(response.scope.as_deref(), Some("reports.write"));
    }
}
