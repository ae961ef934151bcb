//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `CMS_API_BASE_URL` - Content API base URL (e.g., https://content.example.com)
//! - `IDENTITY_API_BASE_URL` - Managed identity provider base URL
//! - `IDENTITY_API_KEY` - Identity provider API key
//! - `PAYMENT_KEY_ID` - Payment gateway public key id (embedded in the widget)
//! - `PAYMENT_FUNCTIONS_BASE_URL` - Base URL of the order/verification functions
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CMS_DATASET` - Content dataset name (default: production)
//! - `CMS_API_VERSION` - Content API version (default: 2026-01-01)
//! - `CMS_READ_TOKEN` - Content API read token (public datasets need none)
//! - `CMS_IMAGE_BASE_URL` - Image CDN base (default: derived from the API base)
//! - `IDENTITY_OAUTH_CLIENT_ID` - OAuth client id for social sign-in
//! - `IDENTITY_OAUTH_AUTH_URL` - OAuth authorization endpoint
//! - `PAYMENT_CHECKOUT_SCRIPT_URL` - Hosted widget script URL
//! - `PAYMENT_TRUST_GATEWAY_ON_VERIFY_FAILURE` - Complete checkout even when
//!   server-side verification fails (default: true; see `checkout` module docs)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Headless CMS configuration
    pub cms: CmsConfig,
    /// Managed identity provider configuration
    pub identity: IdentityConfig,
    /// Payment gateway configuration
    pub payments: PaymentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Headless CMS configuration.
///
/// Implements `Debug` manually to redact the read token.
#[derive(Clone)]
pub struct CmsConfig {
    /// Content API base URL
    pub api_base_url: String,
    /// Dataset name (e.g., production)
    pub dataset: String,
    /// Content API version date
    pub api_version: String,
    /// Read token for private datasets (public datasets need none)
    pub read_token: Option<SecretString>,
    /// Image CDN base URL
    pub image_base_url: String,
}

impl std::fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsConfig")
            .field("api_base_url", &self.api_base_url)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field(
                "read_token",
                &self.read_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("image_base_url", &self.image_base_url)
            .finish()
    }
}

/// Managed identity provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Provider REST API base URL
    pub api_base_url: String,
    /// Provider API key
    pub api_key: SecretString,
    /// OAuth client id for social sign-in (optional)
    pub oauth_client_id: Option<String>,
    /// OAuth authorization endpoint (optional)
    pub oauth_auth_url: Option<String>,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"[REDACTED]")
            .field("oauth_client_id", &self.oauth_client_id)
            .field("oauth_auth_url", &self.oauth_auth_url)
            .finish()
    }
}

/// Payment gateway configuration.
///
/// The gateway's hosted widget runs in the browser with the public key id;
/// order creation and verification go through external serverless functions.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Gateway public key id (safe to embed in the checkout page)
    pub key_id: String,
    /// Base URL of the order-creation/verification functions
    pub functions_base_url: String,
    /// Hosted widget script URL
    pub checkout_script_url: String,
    /// Complete checkout even when server-side verification fails.
    ///
    /// The gateway has already captured the payment by the time verification
    /// runs, so the default is to trust the widget callback and reconcile
    /// unverified payments out of band.
    pub trust_gateway_on_verify_failure: bool,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let cms = CmsConfig::from_env()?;
        let identity = IdentityConfig::from_env()?;
        let payments = PaymentConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            cms,
            identity,
            payments,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CmsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = get_required_env("CMS_API_BASE_URL")?;
        let dataset = get_env_or_default("CMS_DATASET", "production");
        let image_base_url = std::env::var("CMS_IMAGE_BASE_URL")
            .unwrap_or_else(|_| format!("{api_base_url}/images/{dataset}"));

        Ok(Self {
            api_base_url,
            dataset,
            api_version: get_env_or_default("CMS_API_VERSION", "2026-01-01"),
            read_token: get_optional_secret("CMS_READ_TOKEN")?,
            image_base_url,
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: get_required_env("IDENTITY_API_BASE_URL")?,
            api_key: get_validated_secret("IDENTITY_API_KEY")?,
            oauth_client_id: get_optional_env("IDENTITY_OAUTH_CLIENT_ID"),
            oauth_auth_url: get_optional_env("IDENTITY_OAUTH_AUTH_URL"),
        })
    }
}

impl PaymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let trust_raw = get_env_or_default("PAYMENT_TRUST_GATEWAY_ON_VERIFY_FAILURE", "true");
        let trust_gateway_on_verify_failure = trust_raw.parse::<bool>().map_err(|e| {
            ConfigError::InvalidEnvVar(
                "PAYMENT_TRUST_GATEWAY_ON_VERIFY_FAILURE".to_string(),
                e.to_string(),
            )
        })?;

        Ok(Self {
            key_id: get_required_env("PAYMENT_KEY_ID")?,
            functions_base_url: get_required_env("PAYMENT_FUNCTIONS_BASE_URL")?,
            checkout_script_url: get_env_or_default(
                "PAYMENT_CHECKOUT_SCRIPT_URL",
                "https://checkout.razorpay.com/v1/checkout.js",
            ),
            trust_gateway_on_verify_failure,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., STOREFRONT_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Load and validate an optional secret from environment.
fn get_optional_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => {
            validate_secret_strength(&value, key)?;
            Ok(Some(SecretString::from(value)))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            cms: CmsConfig {
                api_base_url: "https://content.test".to_string(),
                dataset: "production".to_string(),
                api_version: "2026-01-01".to_string(),
                read_token: Some(SecretString::from("tok_9f8e7d6c5b4a")),
                image_base_url: "https://content.test/images/production".to_string(),
            },
            identity: IdentityConfig {
                api_base_url: "https://identity.test".to_string(),
                api_key: SecretString::from("key_9f8e7d6c5b4a"),
                oauth_client_id: Some("client_id_value".to_string()),
                oauth_auth_url: Some("https://identity.test/oauth2/auth".to_string()),
            },
            payments: PaymentConfig {
                key_id: "rzp_test_4a5b6c7d".to_string(),
                functions_base_url: "https://functions.test".to_string(),
                checkout_script_url: "https://checkout.razorpay.com/v1/checkout.js".to_string(),
                trust_gateway_on_verify_failure: true,
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_cms_config_debug_redacts_token() {
        let config = test_config();
        let debug_output = format!("{:?}", config.cms);

        assert!(debug_output.contains("https://content.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tok_9f8e7d6c5b4a"));
    }

    #[test]
    fn test_identity_config_debug_redacts_api_key() {
        let config = test_config();
        let debug_output = format!("{:?}", config.identity);

        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("key_9f8e7d6c5b4a"));
    }
}
