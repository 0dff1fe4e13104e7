//! Token minting, signing and the token endpoint.
//!
//! - [`jwt`] - Signing keys, JWKS and ID token claims
//! - [`codec`] - Random credentials and ID token signing/verification
//! - [`service`] - Grant handling for the token endpoint

pub mod codec;
pub mod jwt;
pub mod service;

pub use codec::TokenCodec;
pub use jwt::{IdTokenClaims, Jwk, Jwks, JwtError, SigningKeyPair};
pub use service::{TokenConfig, TokenService};
