//! Authorization code storage trait.
//!
//! # Security Considerations
//!
//! - Never log authorization codes
//! - `delete` must be atomic: two concurrent calls for the same code may
//!   return the record at most once

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage operations for authorization codes.
#[async_trait]
pub trait AuthorizationCodeStore: Send + Sync {
    /// Stores a newly issued code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code already exists or the storage operation
    /// fails.
    async fn save(&self, code: AuthorizationCode) -> AuthResult<()>;

    /// Reads a code without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Atomically removes a code and returns it.
    ///
    /// This is the consume step of the code exchange: of any number of
    /// concurrent calls for the same code, at most one receives `Some`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;
}
