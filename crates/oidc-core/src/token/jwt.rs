//! JWT signing keys, ID token claims and JWKS types.
//!
//! ID tokens are signed with RS256. A provider holds exactly one
//! [`SigningKeyPair`]; it is either generated at startup or imported from a
//! PEM document so that key rotation can be driven externally.
//!
//! ## Example
//!
//! ```ignore
//! use oidc_core::token::jwt::SigningKeyPair;
//!
//! let key_pair = SigningKeyPair::generate()?;
//! let jwks = key_pair.to_jwks();
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::types::Claims;

/// Default RSA modulus size in bits.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest RSA modulus accepted for signing keys.
pub const MIN_KEY_BITS: usize = 2048;

/// The only signing algorithm issued and accepted for ID tokens.
pub const ID_TOKEN_ALGORITHM: Algorithm = Algorithm::RS256;

/// Claims the provider sets itself. Caller supplied claims with these names
/// are dropped.
pub const RESERVED_CLAIMS: &[&str] = &["iss", "sub", "aud", "exp", "iat", "nonce", "auth_time"];

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// The token signature does not verify against the provider key.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The `iss` claim does not name this provider.
    #[error("Issuer mismatch: expected '{expected}', got '{actual}'")]
    IssuerMismatch {
        /// The configured issuer.
        expected: String,
        /// The issuer found in the token.
        actual: String,
    },

    /// The expected audience is not listed in the `aud` claim.
    #[error("Audience mismatch: expected '{expected}' in {actual:?}")]
    AudienceMismatch {
        /// The audience the caller expected.
        expected: String,
        /// The audiences found in the token.
        actual: Vec<String>,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token is not a well-formed JWT.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of what could not be parsed.
        message: String,
    },

    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to generate a cryptographic key.
    #[error("Key generation error: {message}")]
    KeyGeneration {
        /// Description of the key generation error.
        message: String,
    },

    /// Invalid key format or data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `KeyGeneration` error.
    #[must_use]
    pub fn key_generation_error(message: impl Into<String>) -> Self {
        Self::KeyGeneration {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Returns `true` if the token itself was rejected (as opposed to a
    /// failure on the provider side).
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature
                | Self::IssuerMismatch { .. }
                | Self::AudienceMismatch { .. }
                | Self::Expired
                | Self::Malformed { .. }
        )
    }

    /// Returns `true` if this is a key-related error.
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::KeyGeneration { .. } | Self::InvalidKey { .. })
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            // A token signed with another algorithm never verifies against our key.
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::InvalidRsaKey(_)
            | ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidKeyFormat => Self::invalid_key(err.to_string()),
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// ID token claims for OpenID Connect.
///
/// Registered claims are typed fields; everything the claims provider adds
/// lives in [`extra`](Self::extra) and is flattened into the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdTokenClaims {
    /// Issuer (provider URL).
    pub iss: String,

    /// Subject (user ID).
    pub sub: String,

    /// Audience (client IDs).
    #[serde(deserialize_with = "deserialize_audience")]
    pub aud: Vec<String>,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Nonce from the authorization request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Time the end user authenticated (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,

    /// Additional identity claims.
    #[serde(flatten)]
    pub extra: Claims,
}

/// `aud` may be a single string or an array (OIDC Core 2).
fn deserialize_audience<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Audience {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Audience::deserialize(deserializer)? {
        Audience::One(aud) => vec![aud],
        Audience::Many(aud) => aud,
    })
}

/// Returns a copy of `claims` without the [`RESERVED_CLAIMS`].
#[must_use]
pub fn strip_reserved_claims(claims: &Claims) -> Claims {
    claims
        .iter()
        .filter(|(name, _)| !RESERVED_CLAIMS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

// ============================================================================
// JWKS Types
// ============================================================================

/// JSON Web Key Set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwks {
    /// The keys in this set.
    pub keys: Vec<Jwk>,
}

/// JSON Web Key (RSA public key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwk {
    /// Key type, always "RSA".
    pub kty: String,

    /// Key ID.
    pub kid: String,

    /// Key use ("sig" for signing).
    #[serde(rename = "use")]
    pub use_: String,

    /// Algorithm.
    pub alg: String,

    /// RSA modulus (base64url encoded).
    pub n: String,

    /// RSA exponent (base64url encoded).
    pub e: String,
}

// ============================================================================
// Signing Key Pair
// ============================================================================

/// An RSA signing key pair.
///
/// The private half is only reachable through [`encoding_key`](Self::encoding_key)
/// and never serialized.
#[derive(Clone)]
pub struct SigningKeyPair {
    /// Key ID, published as `kid` in token headers and the JWKS.
    pub kid: String,

    /// Encoding key (private key) for signing.
    encoding_key: EncodingKey,

    /// Decoding key (public key) for verification.
    decoding_key: DecodingKey,

    /// RSA modulus, big endian.
    n: Vec<u8>,

    /// RSA public exponent, big endian.
    e: Vec<u8>,

    /// When the key was created or imported.
    pub created_at: OffsetDateTime,
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("kid", &self.kid)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl SigningKeyPair {
    /// Generates a new 2048-bit RSA key pair with a random key ID.
    ///
    /// # Errors
    /// Returns an error if key generation fails.
    pub fn generate() -> Result<Self, JwtError> {
        Self::generate_rsa(DEFAULT_KEY_BITS)
    }

    /// Generates a new RSA key pair with the given modulus size.
    ///
    /// # Errors
    /// Returns an error if `bits` is below [`MIN_KEY_BITS`] or generation fails.
    pub fn generate_rsa(bits: usize) -> Result<Self, JwtError> {
        if bits < MIN_KEY_BITS {
            return Err(JwtError::invalid_key(format!(
                "RSA keys must be at least {MIN_KEY_BITS} bits, got {bits}"
            )));
        }

        let private_key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;

        Self::from_private_key(uuid::Uuid::new_v4().to_string(), &private_key)
    }

    /// Loads a key pair from a PEM-encoded RSA private key.
    ///
    /// Both PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`)
    /// documents are accepted.
    ///
    /// # Errors
    /// Returns an error if the PEM data is not an RSA private key or the key
    /// is shorter than [`MIN_KEY_BITS`].
    pub fn from_pem(kid: impl Into<String>, private_pem: &str) -> Result<Self, JwtError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_pem))
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;

        let bits = private_key.size() * 8;
        if bits < MIN_KEY_BITS {
            return Err(JwtError::invalid_key(format!(
                "RSA keys must be at least {MIN_KEY_BITS} bits, got {bits}"
            )));
        }

        Self::from_private_key(kid.into(), &private_key)
    }

    fn from_private_key(kid: String, private_key: &RsaPrivateKey) -> Result<Self, JwtError> {
        let public_key = private_key.to_public_key();
        let n = public_key.n().to_bytes_be();
        let e = public_key.e().to_bytes_be();

        // jsonwebtoken only takes keys in PEM/DER form.
        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())?;

        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())?;

        Ok(Self {
            kid,
            encoding_key,
            decoding_key,
            n,
            e,
            created_at: OffsetDateTime::now_utc(),
        })
    }

    /// Returns the key used to sign tokens.
    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the key used to verify tokens.
    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Exports the public key as a JWK.
    #[must_use]
    pub fn to_jwk(&self) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: self.kid.clone(),
            use_: "sig".to_string(),
            alg: "RS256".to_string(),
            n: URL_SAFE_NO_PAD.encode(&self.n),
            e: URL_SAFE_NO_PAD.encode(&self.e),
        }
    }

    /// Exports the public key as a single-key JWKS.
    #[must_use]
    pub fn to_jwks(&self) -> Jwks {
        Jwks {
            keys: vec![self.to_jwk()],
        }
    }
}

// ============================================================================
// Test Support
// ============================================================================

/// One RSA key shared by every unit test; generation is slow in debug builds.
#[cfg(test)]
pub(crate) fn test_key_pair() -> SigningKeyPair {
    use std::sync::LazyLock;

    static KEY: LazyLock<SigningKeyPair> =
        LazyLock::new(|| SigningKeyPair::generate().expect("test key generation"));

    KEY.clone()
}
