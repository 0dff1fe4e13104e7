//! In-memory reference stores.
//!
//! Each store wraps a [`DashMap`], so every read-modify-write runs under the
//! shard lock of its key. Codes are consumed with `DashMap::remove`, which
//! hands the entry to exactly one caller. Nothing expires on its own: expiry
//! is checked by the endpoints at use time.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::{AuthorizationCodeStore, ClientStore, TokenStore};
use crate::types::{AccessToken, AuthorizationCode, Client, RefreshToken};

// =============================================================================
// Clients
// =============================================================================

/// In-memory [`ClientStore`].
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    clients: DashMap<String, Client>,
}

impl MemoryClientStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no clients are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn get(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, client: Client) -> AuthResult<()> {
        match self.clients.entry(client.client_id.clone()) {
            Entry::Occupied(entry) => Err(AuthError::validation(
                "client_id",
                format!("client '{}' is already registered", entry.key()),
            )),
            Entry::Vacant(entry) => {
                entry.insert(client);
                Ok(())
            }
        }
    }

    async fn delete(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.remove(client_id).map(|(_, client)| client))
    }
}

// =============================================================================
// Authorization Codes
// =============================================================================

/// In-memory [`AuthorizationCodeStore`].
#[derive(Debug, Default)]
pub struct MemoryCodeStore {
    codes: DashMap<String, AuthorizationCode>,
}

impl MemoryCodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of outstanding codes, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if there are no outstanding codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[async_trait]
impl AuthorizationCodeStore for MemoryCodeStore {
    async fn save(&self, code: AuthorizationCode) -> AuthResult<()> {
        match self.codes.entry(code.code.clone()) {
            Entry::Occupied(_) => Err(AuthError::internal("authorization code collision")),
            Entry::Vacant(entry) => {
                entry.insert(code);
                Ok(())
            }
        }
    }

    async fn get(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.get(code).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.remove(code).map(|(_, code)| code))
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// In-memory [`TokenStore`].
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    access_tokens: DashMap<String, AccessToken>,
    refresh_tokens: DashMap<String, RefreshToken>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored access tokens.
    #[must_use]
    pub fn access_token_count(&self) -> usize {
        self.access_tokens.len()
    }

    /// Returns the number of stored refresh tokens.
    #[must_use]
    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.len()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save_access_token(&self, token: AccessToken) -> AuthResult<()> {
        self.access_tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn get_access_token(&self, token: &str) -> AuthResult<Option<AccessToken>> {
        Ok(self.access_tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn delete_access_token(&self, token: &str) -> AuthResult<Option<AccessToken>> {
        Ok(self.access_tokens.remove(token).map(|(_, token)| token))
    }

    async fn save_refresh_token(&self, token: RefreshToken) -> AuthResult<()> {
        self.refresh_tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.refresh_tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn delete_refresh_token(&self, token: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.refresh_tokens.remove(token).map(|(_, token)| token))
    }
}
