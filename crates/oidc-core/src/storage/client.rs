//! Client storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::Client;

/// Storage operations for OAuth 2.0 clients.
///
/// # Example
///
/// ```ignore
/// use oidc_core::storage::ClientStore;
///
/// async fn example(store: &impl ClientStore) -> oidc_core::AuthResult<()> {
///     if let Some(client) = store.get("my-app").await? {
///         println!("Found client: {}", client.client_id);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Finds a client by its client_id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Stores a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if a client with the same client_id already exists
    /// (clients are immutable once issued) or the storage operation fails.
    async fn save(&self, client: Client) -> AuthResult<()>;

    /// Removes a client, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Registers a client.
    ///
    /// Assigns a random UUID `client_id` when the caller left it empty, fills
    /// in the default authentication method, validates the registration and
    /// saves it.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if the registration is invalid or the
    /// client_id is taken.
    async fn register(&self, mut client: Client) -> AuthResult<Client> {
        if client.client_id.is_empty() {
            client.client_id = uuid::Uuid::new_v4().to_string();
        }
        client.apply_defaults();
        client
            .validate()
            .map_err(|e| AuthError::validation("client", e.to_string()))?;

        self.save(client.clone()).await?;

        tracing::info!(
            client_id = %client.client_id,
            auth_method = %client.auth_method(),
            "Client registered"
        );

        Ok(client)
    }
}
