//! Access and refresh token records.
//!
//! Both are opaque bearer strings; the records below are what a
//! [`TokenStore`](crate::storage::TokenStore) keeps behind them.

use serde::{Deserialize, Serialize};

/// An issued access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque bearer value (store key).
    pub token: String,

    /// End user the token acts for, or the client itself for
    /// `client_credentials`.
    pub subject: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Granted scope.
    pub scope: Vec<String>,

    /// Expiry (Unix epoch milliseconds).
    pub expires_at: i64,
}

impl AccessToken {
    /// Returns `true` if the token has expired at `now_ms`.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("subject", &self.subject)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// An issued refresh token.
///
/// Refresh tokens carry no expiry of their own and are not rotated on use;
/// a host that needs either removes them from the store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Opaque token value (store key).
    pub token: String,

    /// End user the grant belongs to.
    pub user_id: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Scope of the original grant. Refreshes may narrow it, never widen it.
    pub scope: Vec<String>,
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshToken")
            .field("user_id", &self.user_id)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
