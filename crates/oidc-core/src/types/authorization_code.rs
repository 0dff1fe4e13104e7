//! Authorization code issued when the end user approves a request.

use serde::{Deserialize, Serialize};

/// A pending authorization code.
///
/// Codes are single use: the token endpoint removes the record from the
/// store in the same step that reads it, so a second exchange always finds
/// nothing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// Opaque random code value (store key).
    pub code: String,

    /// End user who approved the request.
    pub user_id: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Redirect URI the code was delivered to.
    pub redirect_uri: String,

    /// Granted scope, in request order.
    pub scope: Vec<String>,

    /// Nonce from the authorization request, echoed in the ID token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// When the code stops being exchangeable (Unix epoch milliseconds).
    pub expires_at: i64,

    /// When the end user approved the request (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,
}

impl std::fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCode")
            .field("user_id", &self.user_id)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl AuthorizationCode {
    /// Returns `true` if the code has expired at `now_ms`.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }
}
