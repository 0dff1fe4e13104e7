//! Domain types shared by the authorization and token endpoints.
//!
//! - [`Client`] - registered OAuth 2.0 client
//! - [`GrantType`] / [`TokenEndpointAuthMethod`] - client capabilities
//! - [`AuthorizationCode`] - single-use code issued on approval
//! - [`AccessToken`] / [`RefreshToken`] - issued credentials
//! - [`Claims`] - identity claims merged into ID tokens

pub mod authorization_code;
pub mod client;
pub mod token;

pub use authorization_code::AuthorizationCode;
pub use client::{Client, ClientValidationError, GrantType, TokenEndpointAuthMethod};
pub use token::{AccessToken, RefreshToken};

use time::OffsetDateTime;

/// Identity claims for a `(user, scope)` pair, as produced by a
/// [`ClaimsProvider`](crate::identity::ClaimsProvider).
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Splits a space-delimited `scope` parameter into its tokens.
#[must_use]
pub fn parse_scope(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

/// Joins scope tokens back into a `scope` parameter value.
#[must_use]
pub fn format_scope(scope: &[String]) -> String {
    scope.join(" ")
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    unix_millis(OffsetDateTime::now_utc())
}
