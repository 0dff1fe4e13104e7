//! OAuth 2.0 authorization and token endpoint logic.
//!
//! This module contains the protocol side of the authorization code flow:
//!
//! - [`authorize`] - Authorization request and redirect types
//! - [`service`] - Authorization request validation and code issuance
//! - [`client_auth`] - Client authentication at the token endpoint
//! - [`token`] - Token request and response types
//!
//! Grant handling itself lives in [`crate::token::service`].

pub mod authorize;
pub mod client_auth;
pub mod service;
pub mod token;

pub use authorize::{
    AuthorizationErrorCode, AuthorizationRequest, AuthorizationResponse, build_redirect_url,
};
pub use client_auth::{authenticate_client, parse_basic_auth};
pub use service::{AuthorizationConfig, AuthorizationService};
pub use token::{TokenRequest, TokenResponse};
