//! End-user identity capabilities supplied by the host.
//!
//! The provider never sees passwords or user records. It asks a
//! [`CredentialValidator`] whether a login is valid and a [`ClaimsProvider`]
//! what to put in an ID token.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Claims;

/// Produces identity claims for a user and granted scope.
#[async_trait]
pub trait ClaimsProvider: Send + Sync {
    /// Returns the claims for `user_id` under `scope`.
    ///
    /// Reserved registered claims (`iss`, `sub`, `aud`, `exp`, `iat`,
    /// `nonce`, `auth_time`) in the result are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the user's claims cannot be loaded.
    async fn claims(&self, user_id: &str, scope: &[String]) -> AuthResult<Claims>;
}

/// Verifies end-user credentials.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// Returns the user ID on success, `None` if the credentials are wrong.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing user directory is unavailable.
    async fn validate(&self, username: &str, password: &str) -> AuthResult<Option<String>>;
}

/// Claims provider that adds nothing beyond the registered claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClaims;

#[async_trait]
impl ClaimsProvider for NoClaims {
    async fn claims(&self, _user_id: &str, _scope: &[String]) -> AuthResult<Claims> {
        Ok(Claims::new())
    }
}

/// Claims provider backed by a fixed per-user map.
///
/// Useful for tests and small deployments. Claims are returned regardless
/// of scope.
#[derive(Debug, Clone, Default)]
pub struct StaticClaims {
    users: HashMap<String, Claims>,
}

impl StaticClaims {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one claim for a user.
    #[must_use]
    pub fn with_claim(
        mut self,
        user_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.users
            .entry(user_id.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl ClaimsProvider for StaticClaims {
    async fn claims(&self, user_id: &str, _scope: &[String]) -> AuthResult<Claims> {
        Ok(self.users.get(user_id).cloned().unwrap_or_default())
    }
}
