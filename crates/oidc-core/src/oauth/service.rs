//! OAuth authorization service.
//!
//! Validates authorization requests against the registered client and turns
//! the end user's decision into a redirect back to the client.
//!
//! # Security Requirements
//!
//! - Redirect URIs must exactly match a registered URI
//! - Errors are only redirected once the client and redirect URI are known
//!   to be valid
//! - Authorization codes are 256-bit random values
//! - Codes expire after a configurable time (default 10 minutes)
//!
//! # Usage
//!
//! ```ignore
//! use oidc_core::oauth::{AuthorizationService, AuthorizationConfig};
//!
//! let service = AuthorizationService::new(clients, codes, AuthorizationConfig::default());
//!
//! let request = service.parse_request(&query_params).await?;
//! let response = service.approve(&request, "user-42").await?;
//! let location = response.to_redirect_url();
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::authorize::{
    AuthorizationErrorCode, AuthorizationRequest, AuthorizationResponse,
};
use crate::storage::{AuthorizationCodeStore, ClientStore};
use crate::token::codec::TokenCodec;
use crate::types::{AuthorizationCode, format_scope, parse_scope, unix_millis};

/// Response type supported by [`AuthorizationService::approve`].
pub const RESPONSE_TYPE_CODE: &str = "code";

/// Authorization service for handling OAuth 2.0 authorization requests.
pub struct AuthorizationService {
    /// Client storage for looking up registered clients.
    clients: Arc<dyn ClientStore>,

    /// Code storage for persisting issued authorization codes.
    codes: Arc<dyn AuthorizationCodeStore>,

    /// Service configuration.
    config: AuthorizationConfig,
}

/// Configuration for the authorization service.
#[derive(Debug, Clone)]
pub struct AuthorizationConfig {
    /// Authorization code lifetime.
    /// Default: 10 minutes (RFC 6749 Section 4.1.2).
    pub code_lifetime: Duration,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            code_lifetime: Duration::minutes(10),
        }
    }
}

impl AuthorizationConfig {
    /// Creates a new configuration with custom code lifetime.
    #[must_use]
    pub fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.code_lifetime = lifetime;
        self
    }
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn required<'a>(params: &'a HashMap<String, String>, name: &str) -> AuthResult<&'a str> {
    param(params, name).ok_or_else(|| AuthError::missing_parameter(name))
}

impl AuthorizationService {
    /// Creates a new authorization service.
    ///
    /// # Arguments
    ///
    /// * `clients` - Storage for looking up registered clients
    /// * `codes` - Storage for issued authorization codes
    /// * `config` - Service configuration
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStore>,
        codes: Arc<dyn AuthorizationCodeStore>,
        config: AuthorizationConfig,
    ) -> Self {
        Self {
            clients,
            codes,
            config,
        }
    }

    /// Validates an authorization request.
    ///
    /// Has no side effects.
    ///
    /// # Errors
    ///
    /// Checks run in this order and stop at the first failure:
    /// - A required parameter is missing or `max_age` is not a number (`Validation`)
    /// - Client is not registered (`UnknownClient`)
    /// - Redirect URI is not registered for the client (`InvalidRedirectUri`)
    /// - Response type is not allowed for the client (`UnsupportedResponseType`)
    /// - A requested scope is not allowed for the client (`InvalidScope`)
    pub async fn parse_request(
        &self,
        params: &HashMap<String, String>,
    ) -> AuthResult<AuthorizationRequest> {
        // 1. Shape-validate parameters
        let response_type = required(params, "response_type")?;
        let client_id = required(params, "client_id")?;
        let redirect_uri = required(params, "redirect_uri")?;

        let max_age = param(params, "max_age")
            .map(|value| {
                value
                    .parse::<u64>()
                    .map_err(|_| AuthError::validation("max_age", "must be a non-negative integer"))
            })
            .transpose()?;

        // 2. Look up the client
        let client = self
            .clients
            .get(client_id)
            .await?
            .ok_or_else(|| AuthError::unknown_client(client_id))?;

        // 3. Exact redirect URI match
        if !client.is_redirect_uri_allowed(redirect_uri) {
            tracing::warn!(
                client_id = %client_id,
                redirect_uri = %redirect_uri,
                "Authorization request with unregistered redirect URI"
            );
            return Err(AuthError::invalid_redirect_uri(client_id, redirect_uri));
        }

        // 4. Response type
        if !client.is_response_type_allowed(response_type) {
            return Err(AuthError::unsupported_response_type(response_type));
        }

        // 5. Scope
        let scope = param(params, "scope").map(parse_scope).unwrap_or_default();
        if !client.are_scopes_allowed(&scope) {
            return Err(AuthError::invalid_scope(
                format_scope(&scope),
                format_scope(&client.scopes),
            ));
        }

        Ok(AuthorizationRequest {
            response_type: response_type.to_string(),
            client_id: client_id.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scope,
            state: param(params, "state").map(str::to_string),
            nonce: param(params, "nonce").map(str::to_string),
            prompt: param(params, "prompt").map(str::to_string),
            max_age,
            ui_locales: param(params, "ui_locales").map(str::to_string),
        })
    }

    /// Issues an authorization code for an approved request.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `response_type` is not "code" (`UnsupportedResponseType`)
    /// - `user_id` is empty (`Validation`)
    /// - The code cannot be stored
    ///
    /// # Security
    ///
    /// Never log the authorization code or state parameter.
    pub async fn approve(
        &self,
        request: &AuthorizationRequest,
        user_id: &str,
    ) -> AuthResult<AuthorizationResponse> {
        // 1. Only the code flow is implemented
        if request.response_type != RESPONSE_TYPE_CODE {
            return Err(AuthError::unsupported_response_type(&request.response_type));
        }

        if user_id.is_empty() {
            return Err(AuthError::validation("user_id", "approving user is required"));
        }

        // 2. Mint and persist the code
        let now = OffsetDateTime::now_utc();
        let expires_at = now
            .checked_add(self.config.code_lifetime)
            .map(unix_millis)
            .ok_or_else(|| AuthError::internal("authorization code lifetime is out of range"))?;
        let code = AuthorizationCode {
            code: TokenCodec::new_opaque_token(),
            user_id: user_id.to_string(),
            client_id: request.client_id.clone(),
            redirect_uri: request.redirect_uri.clone(),
            scope: request.scope.clone(),
            nonce: request.nonce.clone(),
            expires_at,
            auth_time: Some(now.unix_timestamp()),
        };
        let value = code.code.clone();

        self.codes.save(code).await?;

        tracing::info!(
            client_id = %request.client_id,
            user_id = %user_id,
            scope = %format_scope(&request.scope),
            "Authorization approved"
        );

        // 3. Redirect back with the code
        Ok(AuthorizationResponse::code(
            &request.redirect_uri,
            value,
            request.state.as_deref(),
        ))
    }

    /// Builds the redirect for a request the end user (or host) refused.
    #[must_use]
    pub fn deny(
        &self,
        request: &AuthorizationRequest,
        error: AuthorizationErrorCode,
        description: Option<&str>,
    ) -> AuthorizationResponse {
        tracing::info!(
            client_id = %request.client_id,
            error = %error,
            "Authorization denied"
        );

        AuthorizationResponse::error(
            &request.redirect_uri,
            error,
            description,
            request.state.as_deref(),
        )
    }

    /// Turns an authorization failure into a redirect, when that is safe.
    ///
    /// Returns `None` if the error must be shown to the user instead: the
    /// error is not redirectable, the client is unknown, or the redirect URI
    /// is not registered for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the client lookup fails.
    pub async fn error_response(
        &self,
        params: &HashMap<String, String>,
        error: &AuthError,
    ) -> AuthResult<Option<AuthorizationResponse>> {
        if !error.is_redirectable() {
            return Ok(None);
        }

        let (Some(client_id), Some(redirect_uri)) =
            (param(params, "client_id"), param(params, "redirect_uri"))
        else {
            return Ok(None);
        };

        let Some(client) = self.clients.get(client_id).await? else {
            return Ok(None);
        };
        if !client.is_redirect_uri_allowed(redirect_uri) {
            return Ok(None);
        }

        // Server-side details stay out of the redirect.
        let description = (!error.is_server_error()).then(|| error.to_string());

        Ok(Some(AuthorizationResponse::error(
            redirect_uri,
            AuthorizationErrorCode::from_error(error),
            description.as_deref(),
            param(params, "state"),
        )))
    }
}
