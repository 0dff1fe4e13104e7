//! Authorization server error types.
//!
//! Every failure raised by the authorization and token endpoints is an
//! [`AuthError`]. Variants carry enough context (offending field, client id,
//! requested vs. allowed values) for an HTTP layer to produce the matching
//! OAuth 2.0 `error` / `error_description` pair and status code.

use serde::Serialize;

use crate::token::jwt::JwtError;

/// Errors that can occur while processing authorization and token requests.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request is malformed: a required parameter is missing or a value
    /// cannot be parsed.
    #[error("Invalid request: {field}: {message}")]
    Validation {
        /// Name of the offending parameter.
        field: String,
        /// Description of what is wrong with it.
        message: String,
    },

    /// No client is registered under the given identifier.
    #[error("Unknown client: {client_id}")]
    UnknownClient {
        /// The client identifier that was looked up.
        client_id: String,
    },

    /// The redirect URI is not registered for the client.
    #[error("Redirect URI '{redirect_uri}' is not registered for client {client_id}")]
    InvalidRedirectUri {
        /// The client the request was made for.
        client_id: String,
        /// The redirect URI supplied in the request.
        redirect_uri: String,
    },

    /// The response type is not supported or not allowed for the client.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The rejected response type.
        response_type: String,
    },

    /// The requested scope exceeds what is allowed.
    #[error("Invalid scope: requested '{requested}', allowed '{allowed}'")]
    InvalidScope {
        /// Space-separated requested scope.
        requested: String,
        /// Space-separated scope the request was checked against.
        allowed: String,
    },

    /// The client secret is missing or does not match.
    #[error("Invalid client credentials for {client_id}: {message}")]
    InvalidClientCredentials {
        /// The client that failed authentication.
        client_id: String,
        /// Description of the failure.
        message: String,
    },

    /// No client identifier was supplied at the token endpoint.
    #[error("Missing client_id")]
    MissingClientId,

    /// The authorization code or refresh token is invalid, expired, consumed,
    /// or bound to another client or redirect URI.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// The client is not registered for the requested grant type.
    #[error("Client {client_id} is not authorized for the {grant_type} grant")]
    UnauthorizedClient {
        /// The client that made the request.
        client_id: String,
        /// The grant type it is not registered for.
        grant_type: String,
    },

    /// The grant type is not supported by this server.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The resource owner denied the request or could not be authenticated.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// Signing or verifying a token failed.
    #[error(transparent)]
    Token(#[from] JwtError),

    /// An error occurred while storing or retrieving data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The provider is misconfigured.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Validation` error for a missing required parameter.
    #[must_use]
    pub fn missing_parameter(field: impl Into<String>) -> Self {
        Self::validation(field, "required parameter is missing")
    }

    /// Creates a new `UnknownClient` error.
    #[must_use]
    pub fn unknown_client(client_id: impl Into<String>) -> Self {
        Self::UnknownClient {
            client_id: client_id.into(),
        }
    }

    /// Creates a new `InvalidRedirectUri` error.
    #[must_use]
    pub fn invalid_redirect_uri(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self::InvalidRedirectUri {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(requested: impl Into<String>, allowed: impl Into<String>) -> Self {
        Self::InvalidScope {
            requested: requested.into(),
            allowed: allowed.into(),
        }
    }

    /// Creates a new `InvalidClientCredentials` error.
    #[must_use]
    pub fn invalid_client_credentials(
        client_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidClientCredentials {
            client_id: client_id.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `UnauthorizedClient` error.
    #[must_use]
    pub fn unauthorized_client(
        client_id: impl Into<String>,
        grant_type: impl Into<String>,
    ) -> Self {
        Self::UnauthorizedClient {
            client_id: client_id.into(),
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => true,
            Self::Token(err) => !err.is_validation_error(),
            _ => false,
        }
    }

    /// Returns `true` if the error may be reported by redirecting the user
    /// agent back to the client.
    ///
    /// Errors raised before the client and its redirect URI are established
    /// must be shown to the user instead.
    #[must_use]
    pub fn is_redirectable(&self) -> bool {
        match self {
            Self::UnknownClient { .. } | Self::InvalidRedirectUri { .. } => false,
            Self::Validation { field, .. } => {
                !matches!(field.as_str(), "client_id" | "redirect_uri")
            }
            _ => true,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "invalid_request",
            Self::UnknownClient { .. } => "invalid_client",
            Self::InvalidRedirectUri { .. } => "invalid_request",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::InvalidClientCredentials { .. } => "invalid_client",
            Self::MissingClientId => "invalid_client",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::AccessDenied { .. } => "access_denied",
            Self::Token(err) if err.is_validation_error() => "invalid_token",
            Self::Token(_) => "server_error",
            Self::Storage { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }

    /// Returns the HTTP status code an endpoint should answer with.
    ///
    /// Follows RFC 6749 Section 5.2: `invalid_client` is 401, other request
    /// errors are 400, and `access_denied` is 403.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownClient { .. }
            | Self::InvalidClientCredentials { .. }
            | Self::MissingClientId => 401,
            Self::AccessDenied { .. } => 403,
            Self::Token(err) if err.is_validation_error() => 401,
            _ if self.is_server_error() => 500,
            _ => 400,
        }
    }

    /// Builds the JSON error body for this error.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        let error_description = if self.is_server_error() {
            // Internal details stay in the logs.
            None
        } else {
            Some(self.to_string())
        };

        ErrorResponse {
            error: self.oauth_error_code().to_string(),
            error_description,
        }
    }
}

/// OAuth 2.0 error response body.
///
/// # Example
///
/// ```json
/// {
///   "error": "invalid_grant",
///   "error_description": "Invalid grant: authorization code expired"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// OAuth 2.0 error code.
    pub error: String,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}
