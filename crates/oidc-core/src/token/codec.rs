//! Token minting and ID token signing.
//!
//! [`TokenCodec`] is the only component that touches the signing key. It
//! produces opaque random strings for codes and tokens, signs ID tokens with
//! RS256 and verifies them again for relying parties that call back into the
//! provider.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Header, Validation, decode, encode};
use rand::RngCore;
use rand::rngs::OsRng;
use time::{Duration, OffsetDateTime};

use crate::token::jwt::{
    ID_TOKEN_ALGORITHM, IdTokenClaims, JwtError, Jwks, SigningKeyPair, strip_reserved_claims,
};
use crate::types::Claims;

/// Entropy of generated tokens and codes, in bytes.
const TOKEN_BYTES: usize = 32;

/// Signs and verifies ID tokens and generates opaque credentials.
///
/// This type is cheap to share behind an `Arc` and is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    signing_key: SigningKeyPair,
    issuer: String,
    id_token_ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec for `issuer`.
    ///
    /// # Arguments
    /// * `signing_key` - The key pair used for signing and verification
    /// * `issuer` - Value of the `iss` claim
    /// * `id_token_ttl` - Lifetime of issued ID tokens
    #[must_use]
    pub fn new(
        signing_key: SigningKeyPair,
        issuer: impl Into<String>,
        id_token_ttl: Duration,
    ) -> Self {
        Self {
            signing_key,
            issuer: issuer.into(),
            id_token_ttl,
        }
    }

    /// Returns the issuer identifier.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the current signing key ID.
    #[must_use]
    pub fn current_kid(&self) -> &str {
        &self.signing_key.kid
    }

    /// Generates an access token value (256 bits of OS randomness).
    #[must_use]
    pub fn new_bearer_token() -> String {
        random_token()
    }

    /// Generates a refresh token or authorization code value.
    #[must_use]
    pub fn new_opaque_token() -> String {
        random_token()
    }

    /// Issues a signed ID token.
    ///
    /// The payload carries `iss`, `sub`, `aud = [audience]`, `iat` and
    /// `exp = iat + ttl`, plus `nonce` and `auth_time` when given. Caller
    /// claims are merged in, except those named in
    /// [`RESERVED_CLAIMS`](crate::token::jwt::RESERVED_CLAIMS).
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue_id_token(
        &self,
        subject: &str,
        audience: &str,
        claims: &Claims,
        nonce: Option<&str>,
        auth_time: Option<i64>,
    ) -> Result<String, JwtError> {
        let iat = OffsetDateTime::now_utc().unix_timestamp();

        let claims = IdTokenClaims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            aud: vec![audience.to_string()],
            iat,
            exp: iat.saturating_add(self.id_token_ttl.whole_seconds()),
            nonce: nonce.map(str::to_string),
            auth_time,
            extra: strip_reserved_claims(claims),
        };

        let mut header = Header::new(ID_TOKEN_ALGORITHM);
        header.kid = Some(self.signing_key.kid.clone());

        encode(&header, &claims, self.signing_key.encoding_key())
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Verifies an ID token issued by this codec.
    ///
    /// The signature is checked first, then `iss`, `aud` and `exp`. Every
    /// check is mandatory.
    ///
    /// # Errors
    /// - `InvalidSignature` if the token was not signed with this key
    /// - `IssuerMismatch` if `iss` is not this provider
    /// - `AudienceMismatch` if `expected_audience` is not in `aud`
    /// - `Expired` if `exp` is not in the future
    /// - `Malformed` if the token cannot be parsed
    pub fn verify_id_token(
        &self,
        token: &str,
        expected_audience: &str,
    ) -> Result<IdTokenClaims, JwtError> {
        let mut validation = Validation::new(ID_TOKEN_ALGORITHM);
        // Claims are checked below so each failure keeps its own error.
        validation.validate_exp = false;
        validation.validate_aud = false;

        let claims = decode::<IdTokenClaims>(token, self.signing_key.decoding_key(), &validation)?
            .claims;

        if claims.iss != self.issuer {
            return Err(JwtError::IssuerMismatch {
                expected: self.issuer.clone(),
                actual: claims.iss,
            });
        }

        if !claims.aud.iter().any(|aud| aud == expected_audience) {
            return Err(JwtError::AudienceMismatch {
                expected: expected_audience.to_string(),
                actual: claims.aud,
            });
        }

        if claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    /// Returns the JWKS containing the public key.
    #[must_use]
    pub fn jwks(&self) -> Jwks {
        self.signing_key.to_jwks()
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
