//! Client authentication for the token endpoint.
//!
//! # Authentication Priority
//!
//! When both are present, HTTP Basic credentials win over body parameters:
//! 1. `Authorization: Basic base64(client_id:client_secret)`
//! 2. `client_id` (+ `client_secret`) form parameters
//!
//! A client registered with a secret must present it. Public clients only
//! identify themselves.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::token::TokenRequest;
use crate::storage::ClientStore;
use crate::types::Client;

/// Authenticates the client making a token request.
///
/// # Arguments
///
/// * `request` - The token request (body parameters)
/// * `authorization_header` - Raw `Authorization` header value, if any
/// * `clients` - Storage for looking up clients
///
/// # Errors
///
/// - `MissingClientId` if no client identification is present
/// - `UnknownClient` if the client is not registered
/// - `InvalidClientCredentials` if the secret is missing or wrong, the Basic
///   header is malformed, or Basic and body name different clients
pub async fn authenticate_client(
    request: &TokenRequest,
    authorization_header: Option<&str>,
    clients: &dyn ClientStore,
) -> AuthResult<Client> {
    // 1. Try HTTP Basic Auth first
    if let Some(header) = authorization_header.filter(|h| is_basic_scheme(h)) {
        let Some((client_id, client_secret)) = parse_basic_auth(header) else {
            tracing::warn!("Malformed Basic authorization header at token endpoint");
            return Err(AuthError::invalid_client_credentials(
                "",
                "malformed Basic authorization header",
            ));
        };

        if let Some(body_client_id) = request.client_id.as_deref() {
            if body_client_id != client_id {
                tracing::warn!(
                    basic_client_id = %client_id,
                    body_client_id = %body_client_id,
                    "Client identity mismatch between Basic header and body"
                );
                return Err(AuthError::invalid_client_credentials(
                    client_id,
                    "client_id in body does not match Basic credentials",
                ));
            }
        }

        return authenticate(&client_id, Some(client_secret.as_str()), clients).await;
    }

    // 2. Fall back to body parameters
    let client_id = request
        .client_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(AuthError::MissingClientId)?;

    authenticate(client_id, request.client_secret.as_deref(), clients).await
}

async fn authenticate(
    client_id: &str,
    presented_secret: Option<&str>,
    clients: &dyn ClientStore,
) -> AuthResult<Client> {
    let client = clients.get(client_id).await?.ok_or_else(|| {
        tracing::warn!(client_id = %client_id, "Token request from unknown client");
        AuthError::unknown_client(client_id)
    })?;

    if client.is_public() {
        return Ok(client);
    }

    match presented_secret {
        Some(secret) if client.verify_secret(secret) => Ok(client),
        Some(_) => {
            tracing::warn!(client_id = %client_id, "Client authentication failed: invalid secret");
            Err(AuthError::invalid_client_credentials(client_id, "invalid client secret"))
        }
        None => {
            tracing::warn!(client_id = %client_id, "Client authentication failed: missing secret");
            Err(AuthError::invalid_client_credentials(client_id, "client secret required"))
        }
    }
}

fn is_basic_scheme(header_value: &str) -> bool {
    header_value
        .trim_start()
        .get(..6)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("basic "))
}

/// Parses an HTTP Basic `Authorization` header value into
/// `(client_id, client_secret)`.
///
/// The auth scheme is matched case-insensitively. Returns `None` if the
/// header is not Basic, not valid base64, not UTF-8, or lacks a colon.
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    let header_value = header_value.trim();

    // Must start with "Basic "
    if !is_basic_scheme(header_value) {
        return None;
    }

    let encoded = header_value[6..].trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    // Split on first colon (secret may contain colons)
    let (client_id, client_secret) = credentials.split_once(':')?;

    Some((client_id.to_string(), client_secret.to_string()))
}
