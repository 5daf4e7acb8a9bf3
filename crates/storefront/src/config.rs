//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the session store
//!   (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., bien-miches.myshopify.com)
//! - `SHOPIFY_STOREFRONT_PUBLIC_TOKEN` - Storefront API public access token
//! - `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` - Storefront API private access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SHOPIFY_STOREFRONT_ENDPOINT` - Full GraphQL endpoint override
//! - `KLAVIYO_COMPANY_ID` - Klaviyo public company id (onsite script)
//! - `KLAVIYO_FORM_ID` - Embedded launch sign-up form id
//! - `KLAVIYO_API_KEY` / `KLAVIYO_LIST_ID` - Server-side list subscription
//! - `LAUNCH_STARTS_AT` / `LAUNCH_ENDS_AT` - Launch event window (RFC 3339)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_LAUNCH_STARTS_AT: &str = "2023-09-16T17:00:00-07:00";
const DEFAULT_LAUNCH_ENDS_AT: &str = "2023-09-16T20:00:00-07:00";

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
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Klaviyo sign-up configuration
    pub klaviyo: KlaviyoConfig,
    /// Launch party window shown on the landing page
    pub launch: LaunchConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., bien-miches.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Storefront API public access token (safe to expose in browser)
    pub storefront_public_token: String,
    /// Storefront API private access token (server-side only)
    pub storefront_private_token: SecretString,
    /// Endpoint override; `None` derives it from store and version
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_public_token", &self.storefront_public_token)
            .field("storefront_private_token", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// The GraphQL endpoint requests are posted to.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}/api/{}/graphql.json",
                self.store, self.api_version
            )
        })
    }
}

/// Klaviyo configuration for the launch sign-up.
///
/// The company id is public (it is embedded in the onsite script). The API
/// key is private and redacted from `Debug`.
#[derive(Clone, Default)]
pub struct KlaviyoConfig {
    /// Public company id for `klaviyo.js`
    pub company_id: Option<String>,
    /// Embedded form id rendered on the landing page
    pub form_id: Option<String>,
    /// Private API key for server-side subscriptions
    pub api_key: Option<SecretString>,
    /// List new subscribers are added to
    pub list_id: Option<String>,
}

impl std::fmt::Debug for KlaviyoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoConfig")
            .field("company_id", &self.company_id)
            .field("form_id", &self.form_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("list_id", &self.list_id)
            .finish()
    }
}

impl KlaviyoConfig {
    /// API key and list id, when both are configured.
    #[must_use]
    pub fn subscription(&self) -> Option<(&SecretString, &str)> {
        Some((self.api_key.as_ref()?, self.list_id.as_deref()?))
    }
}

/// Launch event window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Offset of `LAUNCH_STARTS_AT`, used for the advertised local time.
    pub utc_offset: FixedOffset,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        // The defaults are valid RFC 3339 literals.
        let parse = |s: &str| DateTime::parse_from_rfc3339(s).unwrap_or_default();
        let starts_at = parse(DEFAULT_LAUNCH_STARTS_AT);
        Self {
            starts_at: starts_at.with_timezone(&Utc),
            ends_at: parse(DEFAULT_LAUNCH_ENDS_AT).with_timezone(&Utc),
            utc_offset: *starts_at.offset(),
        }
    }
}

impl LaunchConfig {
    /// Start of the event as advertised, e.g. `SAT, 9/16/23 @ 5pm`.
    #[must_use]
    pub fn date_line(&self) -> String {
        let local = self.starts_at.with_timezone(&self.utc_offset);
        let time = if local.minute() == 0 {
            local.format("%-I%P")
        } else {
            local.format("%-I:%M%P")
        };
        format!(
            "{}, {} @ {time}",
            local.format("%a").to_string().to_uppercase(),
            local.format("%-m/%-d/%y"),
        )
    }
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
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let shopify = ShopifyStorefrontConfig::from_env()?;
        let klaviyo = KlaviyoConfig::from_env()?;
        let launch = LaunchConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            shopify,
            klaviyo,
            launch,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (session cookies get `Secure`).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Configuration for a local storefront talking to `shopify_endpoint`.
    ///
    /// Used by tests that run against a fake Storefront API. Klaviyo and
    /// Sentry are disabled and the launch window uses its defaults.
    #[must_use]
    pub fn local(base_url: &str, shopify_endpoint: &str) -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/bien_miches_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: base_url.trim_end_matches('/').to_string(),
            shopify: ShopifyStorefrontConfig {
                store: "bien-miches.myshopify.com".to_string(),
                api_version: "2026-01".to_string(),
                storefront_public_token: "local-public-token".to_string(),
                storefront_private_token: SecretString::from("local-private-token"),
                endpoint: Some(shopify_endpoint.to_string()),
            },
            klaviyo: KlaviyoConfig::default(),
            launch: LaunchConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl ShopifyStorefrontConfig {
    /// Load the Shopify settings on their own (used by `bm-cli verify`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or the private
    /// token fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2026-01"),
            storefront_public_token: get_required_env("SHOPIFY_STOREFRONT_PUBLIC_TOKEN")?,
            storefront_private_token: get_validated_secret("SHOPIFY_STOREFRONT_PRIVATE_TOKEN")?,
            endpoint: get_optional_env("SHOPIFY_STOREFRONT_ENDPOINT"),
        })
    }
}

impl KlaviyoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = match get_optional_env("KLAVIYO_API_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "KLAVIYO_API_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self {
            company_id: get_optional_env("KLAVIYO_COMPANY_ID"),
            form_id: get_optional_env("KLAVIYO_FORM_ID"),
            api_key,
            list_id: get_optional_env("KLAVIYO_LIST_ID"),
        })
    }
}

impl LaunchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let starts_at = get_datetime("LAUNCH_STARTS_AT", DEFAULT_LAUNCH_STARTS_AT)?;
        let ends_at = get_datetime("LAUNCH_ENDS_AT", DEFAULT_LAUNCH_ENDS_AT)?;
        let utc_offset = *starts_at.offset();
        let (starts_at, ends_at) = (starts_at.with_timezone(&Utc), ends_at.with_timezone(&Utc));
        if ends_at < starts_at {
            return Err(ConfigError::InvalidEnvVar(
                "LAUNCH_ENDS_AT".to_string(),
                "must not be before LAUNCH_STARTS_AT".to_string(),
            ));
        }
        Ok(Self {
            starts_at,
            ends_at,
            utc_offset,
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
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` naming `primary_key` when neither is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    parse_rate(&raw).ok_or_else(|| {
        ConfigError::InvalidEnvVar(key.to_string(), format!("expected 0.0..=1.0, got {raw}"))
    })
}

fn parse_rate(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|rate| (0.0..=1.0).contains(rate))
}

/// Parse an RFC 3339 timestamp, falling back to `default`.
fn get_datetime(key: &str, default: &str) -> Result<DateTime<FixedOffset>, ConfigError> {
    let raw = get_env_or_default(key, default);
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shopify_config() -> ShopifyStorefrontConfig {
        ShopifyStorefrontConfig {
            store: "bien-miches.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            storefront_public_token: "public_token_value".to_string(),
            storefront_private_token: SecretString::from("super_secret_private_token"),
            endpoint: None,
        }
    }

    fn config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            shopify: shopify_config(),
            klaviyo: KlaviyoConfig::default(),
            launch: LaunchConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-api-key-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!config("http://localhost:3000").is_secure());
        assert!(config("https://bienmiches.com").is_secure());
    }

    #[test]
    fn test_graphql_endpoint() {
        let mut shopify = shopify_config();
        assert_eq!(
            shopify.graphql_endpoint(),
            "https://bien-miches.myshopify.com/api/2026-01/graphql.json"
        );
        shopify.endpoint = Some("http://127.0.0.1:9999/graphql".to_string());
        assert_eq!(shopify.graphql_endpoint(), "http://127.0.0.1:9999/graphql");
    }

    #[test]
    fn test_launch_defaults() {
        let launch = LaunchConfig::default();
        assert_eq!(launch.starts_at.to_rfc3339(), "2023-09-17T00:00:00+00:00");
        assert_eq!(launch.ends_at.to_rfc3339(), "2023-09-17T03:00:00+00:00");
        assert_eq!(launch.date_line(), "SAT, 9/16/23 @ 5pm");
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("0.25"), Some(0.25));
        assert_eq!(parse_rate("1.5"), None);
        assert_eq!(parse_rate("abc"), None);
    }

    #[test]
    fn test_klaviyo_subscription_requires_key_and_list() {
        let mut klaviyo = KlaviyoConfig {
            api_key: Some(SecretString::from("pk_live_9f8e7d6c5b4a")),
            ..KlaviyoConfig::default()
        };
        assert!(klaviyo.subscription().is_none());
        klaviyo.list_id = Some("XyZ123".to_string());
        assert_eq!(klaviyo.subscription().map(|(_, list)| list), Some("XyZ123"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", shopify_config());
        assert!(debug_output.contains("bien-miches.myshopify.com"));
        assert!(debug_output.contains("public_token_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_private_token"));

        let klaviyo = KlaviyoConfig {
            api_key: Some(SecretString::from("pk_live_hidden_value")),
            ..KlaviyoConfig::default()
        };
        assert!(!format!("{klaviyo:?}").contains("pk_live_hidden_value"));
    }
}
