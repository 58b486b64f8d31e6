//! Widget configuration loaded from environment variables.
//!
//! Every setting has a default, so an empty environment yields a working
//! configuration pointed at a backend on `127.0.0.1:3000`.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPCART_API_BASE_URL` - Backend origin (default: `http://127.0.0.1:3000/`)
//! - `SHOPCART_STORAGE_KEY` - Key the cart is persisted under (default: `cart`)
//! - `SHOPCART_CURRENCY_SYMBOL` - Price prefix (default: `Rs`)
//! - `SHOPCART_NOTIFICATION_SECS` - Lifetime of "added to cart" notices (default: 3)
//! - `SHOPCART_STORAGE_DIR` - Directory for the file-backed store
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/";
const DEFAULT_STORAGE_KEY: &str = "cart";
const DEFAULT_CURRENCY_SYMBOL: &str = "Rs";
const DEFAULT_NOTIFICATION_SECS: u64 = 3;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Widget configuration.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Backend origin; `/api/products` and `/api/orders` are resolved against it
    pub api_base_url: Url,
    /// Key holding the serialized cart
    pub storage_key: String,
    /// Symbol prefixed to displayed prices
    pub currency_symbol: String,
    /// How long a notification stays visible
    pub notification_ttl: Duration,
    /// Directory for the file-backed key-value store, if one is used
    pub storage_dir: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            notification_ttl: Duration::from_secs(DEFAULT_NOTIFICATION_SECS),
            storage_dir: None,
            sentry_dsn: None,
        }
    }
}

impl WidgetConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = match non_empty(lookup("SHOPCART_API_BASE_URL")) {
            Some(raw) => parse_base_url(&raw)?,
            None => defaults.api_base_url,
        };

        let notification_ttl = match non_empty(lookup("SHOPCART_NOTIFICATION_SECS")) {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPCART_NOTIFICATION_SECS".to_string(), e.to_string())
                })?,
            None => defaults.notification_ttl,
        };

        Ok(Self {
            api_base_url,
            storage_key: non_empty(lookup("SHOPCART_STORAGE_KEY")).unwrap_or(defaults.storage_key),
            currency_symbol: lookup("SHOPCART_CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            notification_ttl,
            storage_dir: non_empty(lookup("SHOPCART_STORAGE_DIR")).map(PathBuf::from),
            sentry_dsn: non_empty(lookup("SENTRY_DSN")),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_api_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default base URL is valid")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a base URL, making sure relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("SHOPCART_API_BASE_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("{raw} is not an http(s) origin")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = WidgetConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.storage_key, "cart");
        assert_eq!(config.currency_symbol, "Rs");
        assert_eq!(config.notification_ttl, Duration::from_secs(3));
        assert!(config.storage_dir.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = WidgetConfig::from_lookup(lookup(&[
            ("SHOPCART_API_BASE_URL", "https://shop.example/store"),
            ("SHOPCART_STORAGE_KEY", "basket"),
            ("SHOPCART_CURRENCY_SYMBOL", "₹"),
            ("SHOPCART_NOTIFICATION_SECS", "5"),
            ("SHOPCART_STORAGE_DIR", "/tmp/shopcart"),
        ]))
        .unwrap();

        // Trailing slash added so "api/products" joins under /store/
        assert_eq!(config.api_base_url.as_str(), "https://shop.example/store/");
        assert_eq!(config.storage_key, "basket");
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.notification_ttl, Duration::from_secs(5));
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/shopcart")));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config =
            WidgetConfig::from_lookup(lookup(&[("SHOPCART_STORAGE_KEY", "  "), ("SENTRY_DSN", "")]))
                .unwrap();
        assert_eq!(config.storage_key, "cart");
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = WidgetConfig::from_lookup(lookup(&[("SHOPCART_API_BASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SHOPCART_API_BASE_URL"));

        assert!(WidgetConfig::from_lookup(lookup(&[("SHOPCART_API_BASE_URL", "ftp://x/")])).is_err());
        assert!(WidgetConfig::from_lookup(lookup(&[("SHOPCART_NOTIFICATION_SECS", "soon")])).is_err());
    }
}
