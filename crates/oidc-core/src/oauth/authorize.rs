//! Authorization endpoint types.
//!
//! # OAuth 2.0 Authorization Code Flow
//!
//! 1. Client redirects the user agent to the authorization endpoint
//! 2. The host authenticates the user and asks for a decision
//! 3. The provider redirects back with a `code` (or an `error`)
//! 4. Client exchanges the code at the token endpoint
//!
//! The types here describe step 1 after validation and the redirect of
//! step 3.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;

/// A validated authorization request.
///
/// Produced by [`parse_request`](crate::oauth::AuthorizationService::parse_request)
/// once the client, redirect URI, response type and scope have been checked.
///
/// # Example
///
/// ```ignore
/// GET /authorize?
///   response_type=code
///   &client_id=my-app
///   &redirect_uri=https://app.example.com/callback
///   &scope=openid profile
///   &state=abc123xyz
///   &nonce=n-0S6_WzA2Mj
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Requested response type, `code` for this flow.
    pub response_type: String,

    /// Client identifier issued during registration.
    pub client_id: String,

    /// Redirect URI, exactly as registered for the client.
    pub redirect_uri: String,

    /// Requested scope tokens, in request order.
    #[serde(default)]
    pub scope: Vec<String>,

    /// Opaque client state, echoed on the redirect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// OpenID Connect nonce, echoed in the ID token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// OpenID Connect `prompt` hint for the host's login page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Maximum authentication age in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,

    /// Preferred UI languages (space-separated BCP47 tags).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_locales: Option<String>,
}

/// Redirect back to the client: a target URI plus ordered query parameters.
///
/// # Example
///
/// ```ignore
/// HTTP/1.1 302 Found
/// Location: https://app.example.com/callback?
///   code=SplxlOBeZQQYbYS6WxSbIA
///   &state=abc123xyz
/// ```
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationResponse {
    /// Registered redirect URI.
    pub redirect_uri: String,

    /// Query parameters to append.
    pub params: Vec<(String, String)>,
}

impl fmt::Debug for AuthorizationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.params.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("AuthorizationResponse")
            .field("redirect_uri", &self.redirect_uri)
            .field("params", &names)
            .finish()
    }
}

impl AuthorizationResponse {
    /// Creates a successful response carrying `code` and `state`.
    #[must_use]
    pub fn code(
        redirect_uri: impl Into<String>,
        code: impl Into<String>,
        state: Option<&str>,
    ) -> Self {
        let mut params = vec![("code".to_string(), code.into())];
        if let Some(state) = state {
            params.push(("state".to_string(), state.to_string()));
        }

        Self {
            redirect_uri: redirect_uri.into(),
            params,
        }
    }

    /// Creates an error response carrying `error`, `error_description` and
    /// `state`.
    #[must_use]
    pub fn error(
        redirect_uri: impl Into<String>,
        error: AuthorizationErrorCode,
        description: Option<&str>,
        state: Option<&str>,
    ) -> Self {
        let mut params = vec![("error".to_string(), error.as_str().to_string())];
        if let Some(description) = description {
            params.push(("error_description".to_string(), description.to_string()));
        }
        if let Some(state) = state {
            params.push(("state".to_string(), state.to_string()));
        }

        Self {
            redirect_uri: redirect_uri.into(),
            params,
        }
    }

    /// Returns the value of a query parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if this response reports an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.param("error").is_some()
    }

    /// Builds the `Location` URL for this response.
    #[must_use]
    pub fn to_redirect_url(&self) -> String {
        build_redirect_url(self)
    }
}

/// Appends the response parameters to the redirect URI as a URL-encoded
/// query string.
///
/// Uses `?` when the registered URI has no query and `&` when it does. The
/// registered URI itself is not re-parsed or normalized.
#[must_use]
pub fn build_redirect_url(response: &AuthorizationResponse) -> String {
    if response.params.is_empty() {
        return response.redirect_uri.clone();
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(response.params.iter())
        .finish();

    let uri = &response.redirect_uri;
    let separator = match uri.find('?') {
        None => "?",
        Some(_) if uri.ends_with('?') || uri.ends_with('&') => "",
        Some(_) => "&",
    };

    format!("{uri}{separator}{query}")
}

/// OAuth 2.0 authorization error codes.
///
/// These error codes are defined in RFC 6749 Section 4.1.2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationErrorCode {
    /// The request is missing a required parameter, includes an invalid
    /// parameter value, or is otherwise malformed.
    InvalidRequest,

    /// The client is not authorized to request an authorization code
    /// using this method.
    UnauthorizedClient,

    /// The resource owner or authorization server denied the request.
    #[default]
    AccessDenied,

    /// The authorization server does not support obtaining an authorization
    /// code using this method.
    UnsupportedResponseType,

    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,

    /// The authorization server encountered an unexpected condition.
    ServerError,

    /// The authorization server is temporarily unable to handle the request.
    TemporarilyUnavailable,
}

impl AuthorizationErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
        }
    }

    /// Maps an authorization endpoint failure to its redirect error code.
    #[must_use]
    pub fn from_error(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidScope { .. } => Self::InvalidScope,
            AuthError::UnsupportedResponseType { .. } => Self::UnsupportedResponseType,
            AuthError::AccessDenied { .. } => Self::AccessDenied,
            AuthError::UnauthorizedClient { .. } => Self::UnauthorizedClient,
            _ if err.is_server_error() => Self::ServerError,
            _ => Self::InvalidRequest,
        }
    }
}

impl fmt::Display for AuthorizationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
