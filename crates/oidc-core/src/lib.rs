//! # oidc-core
//!
//! OAuth 2.0 / OpenID Connect authorization server core.
//!
//! This crate provides:
//! - Authorization code flow with exact redirect URI matching
//! - Token endpoint with `authorization_code`, `refresh_token` and
//!   `client_credentials` grants
//! - RS256 ID tokens and the matching JWKS document
//! - OpenID Connect discovery metadata
//! - Pluggable storage with in-memory reference stores
//!
//! ## Overview
//!
//! HTTP routing, login pages and user databases stay with the host. The host
//! passes decoded request parameters in and gets redirects, token responses
//! or structured errors back. [`AuthError::to_response`] and
//! [`AuthError::status_code`] give the OAuth error body and status.
//!
//! ## Modules
//!
//! - [`config`] - Provider configuration
//! - [`provider`] - The [`Provider`] facade
//! - [`oauth`] - Authorization endpoint and client authentication
//! - [`token`] - Signing keys, ID tokens and the token endpoint
//! - [`discovery`] - OpenID provider metadata
//! - [`storage`] - Storage traits and in-memory stores
//! - [`identity`] - Claims and credential capabilities supplied by the host
//! - [`types`] - Clients, codes and tokens

pub mod config;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod oauth;
pub mod provider;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{ConfigError, ProviderConfig};
pub use discovery::ProviderMetadata;
pub use error::{AuthError, ErrorResponse};
pub use identity::{ClaimsProvider, CredentialValidator};
pub use oauth::{AuthorizationRequest, AuthorizationResponse, TokenRequest, TokenResponse};
pub use provider::{Provider, ProviderBuilder};
pub use storage::{AuthorizationCodeStore, ClientStore, TokenStore};
pub use token::{IdTokenClaims, Jwks, JwtError, SigningKeyPair};
pub use types::{Claims, Client, ClientValidationError, GrantType};

/// Type alias for authorization server results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use oidc_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{ConfigError, ProviderConfig};
    pub use crate::error::AuthError;
    pub use crate::identity::{ClaimsProvider, CredentialValidator, NoClaims, StaticClaims};
    pub use crate::oauth::{
        AuthorizationErrorCode, AuthorizationRequest, AuthorizationResponse, TokenRequest,
        TokenResponse,
    };
    pub use crate::provider::{Provider, ProviderBuilder};
    pub use crate::storage::{
        AuthorizationCodeStore, ClientStore, MemoryClientStore, MemoryCodeStore,
        MemoryTokenStore, TokenStore,
    };
    pub use crate::token::{IdTokenClaims, Jwks, JwtError, SigningKeyPair};
    pub use crate::types::{Claims, Client, GrantType, TokenEndpointAuthMethod};
}
