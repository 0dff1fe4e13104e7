//! Token endpoint request and response types.
//!
//! # Supported Grant Types
//!
//! - `authorization_code` - Exchange authorization code for tokens
//! - `refresh_token` - Obtain a new access token
//! - `client_credentials` - Machine-to-machine authentication

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

/// Token request parameters.
///
/// Different fields are required depending on the `grant_type`:
///
/// - `authorization_code`: code, (optional) redirect_uri
/// - `refresh_token`: refresh_token, (optional) scope
/// - `client_credentials`: (optional) scope
///
/// Client credentials travel either in the `Authorization` header (not in
/// this struct) or as `client_id` / `client_secret`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type.
    #[serde(default)]
    pub grant_type: String,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (must match the one the code was issued for).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Client ID (for public clients or client_secret_post).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Requested scope (space-separated).
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("redirect_uri", &self.redirect_uri)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl TokenRequest {
    /// Builds a request from decoded form parameters.
    ///
    /// Empty values are treated as absent.
    #[must_use]
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |name: &str| params.get(name).filter(|v| !v.is_empty()).cloned();

        Self {
            grant_type: get("grant_type").unwrap_or_default(),
            code: get("code"),
            redirect_uri: get("redirect_uri"),
            refresh_token: get("refresh_token"),
            client_id: get("client_id"),
            client_secret: get("client_secret"),
            scope: get("scope"),
        }
    }
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "q2Zc6w...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "id_token": "eyJhbG...",
///   "refresh_token": "tGzv3J...",
///   "scope": "openid profile"
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The opaque access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Signed ID token (authorization_code grant only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Refresh token (authorization_code grant only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Granted scope (space-separated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("id_token", &self.id_token.is_some())
            .field("refresh_token", &self.refresh_token.is_some())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl TokenResponse {
    /// Creates a new Bearer token response.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            id_token: None,
            refresh_token: None,
            scope: None,
        }
    }

    /// Sets the ID token.
    #[must_use]
    pub fn with_id_token(mut self, token: String) -> Self {
        self.id_token = Some(token);
        self
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }

    /// Sets the granted scope. An empty scope leaves the field out.
    #[must_use]
    pub fn with_scope(mut self, scope: String) -> Self {
        self.scope = (!scope.is_empty()).then_some(scope);
        self
    }

    /// Checks the response shape before it leaves the token endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the access token is empty, the token type is not
    /// `Bearer`, `expires_in` is zero, or the ID token is not a three-part
    /// compact JWS.
    pub fn validate(&self) -> AuthResult<()> {
        if self.access_token.is_empty() {
            return Err(AuthError::internal("token response has an empty access_token"));
        }

        if self.token_type != "Bearer" {
            return Err(AuthError::internal(format!(
                "token response has token_type '{}'",
                self.token_type
            )));
        }

        if self.expires_in == 0 {
            return Err(AuthError::internal("token response has expires_in = 0"));
        }

        if let Some(id_token) = &self.id_token {
            let segments: Vec<&str> = id_token.split('.').collect();
            if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
                return Err(AuthError::internal("token response has a malformed id_token"));
            }
        }

        if matches!(&self.refresh_token, Some(token) if token.is_empty()) {
            return Err(AuthError::internal("token response has an empty refresh_token"));
        }

        Ok(())
    }
}
