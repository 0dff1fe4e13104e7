//! Access and refresh token storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{AccessToken, RefreshToken};

/// Storage operations for issued tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Stores an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn save_access_token(&self, token: AccessToken) -> AuthResult<()>;

    /// Finds an access token by value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get_access_token(&self, token: &str) -> AuthResult<Option<AccessToken>>;

    /// Removes an access token, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_access_token(&self, token: &str) -> AuthResult<Option<AccessToken>>;

    /// Stores a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn save_refresh_token(&self, token: RefreshToken) -> AuthResult<()>;

    /// Finds a refresh token by value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get_refresh_token(&self, token: &str) -> AuthResult<Option<RefreshToken>>;

    /// Removes a refresh token, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_refresh_token(&self, token: &str) -> AuthResult<Option<RefreshToken>>;
}
