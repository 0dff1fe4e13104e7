//! Provider configuration.
//!
//! Configuration is plain data: it can be built in code, deserialized with
//! serde, or loaded from TOML via [`ProviderConfig::from_toml_str`].
//! [`ProviderConfig::validate`] runs once when the provider is built, so a
//! bad issuer or lifetime fails at startup instead of on the first request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::token::jwt::{DEFAULT_KEY_BITS, JwtError, MIN_KEY_BITS};
use crate::types::{GrantType, TokenEndpointAuthMethod};

/// Shortest accepted token or code lifetime. `expires_in` and `exp` have
/// whole-second resolution.
pub const MIN_LIFETIME: Duration = Duration::from_secs(1);

/// Longest accepted token or code lifetime.
pub const MAX_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Root provider configuration.
///
/// # Example (TOML)
///
/// ```toml
/// issuer = "https://id.example.com"
/// access_token_lifetime = "1h"
/// authorization_code_lifetime = "10m"
///
/// [signing]
/// key_bits = 2048
///
/// [discovery]
/// scopes_supported = ["openid", "profile", "email"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Issuer identifier, used as the ID token `iss` claim and as the base
    /// for endpoint URLs that are not configured explicitly.
    pub issuer: String,

    /// Authorization endpoint URL. Defaults to `<issuer>/authorize`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    /// Token endpoint URL. Defaults to `<issuer>/token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// JWKS document URL. Defaults to `<issuer>/jwks`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,

    /// UserInfo endpoint URL, advertised in discovery when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// Access token lifetime.
    /// Default: 1 hour
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// ID token lifetime.
    /// Default: 1 hour
    #[serde(with = "humantime_serde")]
    pub id_token_lifetime: Duration,

    /// Authorization code lifetime.
    /// Default: 10 minutes
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Token signing configuration.
    pub signing: SigningConfig,

    /// Values advertised in the discovery document.
    pub discovery: DiscoveryConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            authorization_endpoint: None,
            token_endpoint: None,
            jwks_uri: None,
            userinfo_endpoint: None,
            access_token_lifetime: Duration::from_secs(3600),
            id_token_lifetime: Duration::from_secs(3600),
            authorization_code_lifetime: Duration::from_secs(600),
            signing: SigningConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

/// Token signing configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// RSA modulus size used when a key is generated.
    /// Default: 2048
    pub key_bits: usize,

    /// Key ID for an imported key. Generated keys get a random UUID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// PEM-encoded RSA private key (PKCS#8 or PKCS#1). A key is generated at
    /// startup when absent.
    #[serde(skip_serializing)]
    pub private_key_pem: Option<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
            key_id: None,
            private_key_pem: None,
        }
    }
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("key_bits", &self.key_bits)
            .field("key_id", &self.key_id)
            .field("private_key_pem", &self.private_key_pem.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Feature lists published in the discovery document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Scopes advertised as `scopes_supported`.
    pub scopes_supported: Vec<String>,

    /// Grant types advertised as `grant_types_supported`.
    pub grant_types_supported: Vec<String>,

    /// Client authentication methods advertised as
    /// `token_endpoint_auth_methods_supported`.
    pub token_endpoint_auth_methods_supported: Vec<String>,

    /// Claims advertised as `claims_supported`. Omitted when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_supported: Option<Vec<String>>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            scopes_supported: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
            grant_types_supported: GrantType::ALL
                .iter()
                .map(|grant| grant.as_str().to_string())
                .collect(),
            token_endpoint_auth_methods_supported: TokenEndpointAuthMethod::ALL
                .iter()
                .map(|method| method.as_str().to_string())
                .collect(),
            claims_supported: None,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The signing key could not be generated or loaded.
    #[error("Signing key error: {0}")]
    Signing(#[from] JwtError),

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl ProviderConfig {
    /// Creates a configuration with default lifetimes for `issuer`.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ..Self::default()
        }
    }

    /// Parses a TOML document.
    ///
    /// The result is not validated; [`validate`](Self::validate) runs when
    /// the provider is built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is not valid TOML or does
    /// not match the configuration schema.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        toml::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Returns the authorization endpoint URL.
    #[must_use]
    pub fn authorization_endpoint(&self) -> String {
        self.endpoint(self.authorization_endpoint.as_deref(), "authorize")
    }

    /// Returns the token endpoint URL.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        self.endpoint(self.token_endpoint.as_deref(), "token")
    }

    /// Returns the JWKS document URL.
    #[must_use]
    pub fn jwks_uri(&self) -> String {
        self.endpoint(self.jwks_uri.as_deref(), "jwks")
    }

    fn endpoint(&self, configured: Option<&str>, path: &str) -> String {
        match configured {
            Some(url) => url.to_string(),
            None => format!("{}/{}", self.issuer.trim_end_matches('/'), path),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the issuer is empty, and
    /// `ConfigError::InvalidValue` if:
    /// - The issuer is not an absolute http(s) URL without query or fragment
    /// - A configured endpoint is not an absolute URL
    /// - A lifetime is shorter than 1 second or longer than 365 days
    /// - The signing key size is below 2048 bits
    /// - An unsupported grant type or auth method is advertised
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate issuer URL
        if self.issuer.is_empty() {
            return Err(ConfigError::Missing("issuer".to_string()));
        }

        let issuer = url::Url::parse(&self.issuer).map_err(|e| {
            ConfigError::InvalidValue(format!("issuer '{}' is not a URL: {}", self.issuer, e))
        })?;
        if !matches!(issuer.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(format!(
                "issuer '{}' must use http or https",
                self.issuer
            )));
        }
        if issuer.query().is_some() || issuer.fragment().is_some() {
            return Err(ConfigError::InvalidValue(format!(
                "issuer '{}' must not have a query or fragment",
                self.issuer
            )));
        }

        // Validate endpoints
        for (name, value) in [
            ("authorization_endpoint", &self.authorization_endpoint),
            ("token_endpoint", &self.token_endpoint),
            ("jwks_uri", &self.jwks_uri),
            ("userinfo_endpoint", &self.userinfo_endpoint),
        ] {
            if let Some(value) = value {
                url::Url::parse(value).map_err(|e| {
                    ConfigError::InvalidValue(format!("{name} '{value}' is not a URL: {e}"))
                })?;
            }
        }

        // Validate lifetimes
        for (name, lifetime) in [
            ("access_token_lifetime", self.access_token_lifetime),
            ("id_token_lifetime", self.id_token_lifetime),
            ("authorization_code_lifetime", self.authorization_code_lifetime),
        ] {
            if lifetime < MIN_LIFETIME {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be at least 1s, got {lifetime:?}"
                )));
            }
            if lifetime > MAX_LIFETIME {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be at most 365 days, got {lifetime:?}"
                )));
            }
        }

        // Validate signing key size
        if self.signing.key_bits < MIN_KEY_BITS {
            return Err(ConfigError::InvalidValue(format!(
                "signing.key_bits must be at least {MIN_KEY_BITS}, got {}",
                self.signing.key_bits
            )));
        }

        // Validate grant types
        for grant in &self.discovery.grant_types_supported {
            if GrantType::parse(grant).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid grant type: '{grant}'. Must be authorization_code, \
                     client_credentials, or refresh_token"
                )));
            }
        }

        // Validate auth methods
        for method in &self.discovery.token_endpoint_auth_methods_supported {
            if TokenEndpointAuthMethod::parse(method).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid token endpoint auth method: '{method}'. Must be \
                     client_secret_basic, client_secret_post, or none"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProviderConfig {
        ProviderConfig::new("https://id.example.com")
    }

    #[test]
    fn test_default_config() {
        let config = ProviderConfig::default();
        assert!(config.issuer.is_empty());
        assert_eq!(config.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.id_token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.authorization_code_lifetime, Duration::from_secs(600));
        assert_eq!(config.signing.key_bits, 2048);
        assert_eq!(
            config.discovery.grant_types_supported,
            vec!["authorization_code", "refresh_token", "client_credentials"]
        );
    }

    #[test]
    fn test_missing_issuer_fails_validation() {
        let err = ProviderConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("issuer"));
    }

    #[test]
    fn test_issuer_validation() {
        assert!(valid_config().validate().is_ok());

        for issuer in [
            "not a url",
            "ftp://id.example.com",
            "https://id.example.com?tenant=a",
            "https://id.example.com#x",
        ] {
            let err = ProviderConfig::new(issuer).validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(_)), "{issuer}");
        }
    }

    #[test]
    fn test_default_endpoints() {
        let config = ProviderConfig::new("https://id.example.com/");
        assert_eq!(config.authorization_endpoint(), "https://id.example.com/authorize");
        assert_eq!(config.token_endpoint(), "https://id.example.com/token");
        assert_eq!(config.jwks_uri(), "https://id.example.com/jwks");

        let mut config = valid_config();
        config.token_endpoint = Some("https://api.example.com/oauth/token".to_string());
        assert_eq!(config.token_endpoint(), "https://api.example.com/oauth/token");
    }

    #[test]
    fn test_invalid_endpoint_fails_validation() {
        let mut config = valid_config();
        config.jwks_uri = Some("/jwks".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jwks_uri"));
    }

    #[test]
    fn test_zero_lifetime_fails_validation() {
        let mut config = valid_config();
        config.authorization_code_lifetime = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("authorization_code_lifetime"));
    }

    #[test]
    fn test_sub_second_lifetime_fails_validation() {
        let mut config = valid_config();
        config.access_token_lifetime = Duration::from_millis(500);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("access_token_lifetime"));

        let mut config = valid_config();
        config.id_token_lifetime = Duration::from_millis(999);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("id_token_lifetime"));

        let mut config = valid_config();
        config.access_token_lifetime = MIN_LIFETIME;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_oversized_lifetime_fails_validation() {
        let config = ProviderConfig::from_toml_str(
            r#"
            issuer = "https://id.example.com"
            access_token_lifetime = "100000years"
            "#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("access_token_lifetime"));

        let mut config = valid_config();
        config.authorization_code_lifetime = MAX_LIFETIME + Duration::from_secs(1);
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.id_token_lifetime = MAX_LIFETIME;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_key_fails_validation() {
        let mut config = valid_config();
        config.signing.key_bits = 1024;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_unknown_grant_type_fails_validation() {
        let mut config = valid_config();
        config.discovery.grant_types_supported.push("password".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("password"));

        let mut config = valid_config();
        config
            .discovery
            .token_endpoint_auth_methods_supported
            .push("private_key_jwt".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let config = ProviderConfig::from_toml_str(
            r#"
            issuer = "https://id.example.com"
            access_token_lifetime = "15m"
            id_token_lifetime = "5m"

            [signing]
            key_id = "2024-01"

            [discovery]
            scopes_supported = ["openid", "offline_access"]
            claims_supported = ["sub", "email"]
            "#,
        )
        .unwrap();

        assert_eq!(config.issuer, "https://id.example.com");
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.id_token_lifetime, Duration::from_secs(300));
        assert_eq!(config.authorization_code_lifetime, Duration::from_secs(600));
        assert_eq!(config.signing.key_id.as_deref(), Some("2024-01"));
        assert_eq!(config.signing.key_bits, 2048);
        assert_eq!(config.discovery.scopes_supported, vec!["openid", "offline_access"]);
        assert_eq!(
            config.discovery.claims_supported,
            Some(vec!["sub".to_string(), "email".to_string()])
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str_rejects_bad_duration() {
        let err = ProviderConfig::from_toml_str(
            r#"
            issuer = "https://id.example.com"
            access_token_lifetime = "forever"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
