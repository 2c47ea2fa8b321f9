//! Telephony Controller configuration.
//!
//! Configuration is loaded from environment variables. Platform credentials
//! are optional at start-up: a controller without credentials still boots and
//! serves requests, but every platform operation fails with `NotConfigured`
//! until the endpoint, key, and secret are all present.
//! The API secret is redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default worker-pool capacity for platform calls.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Default per-call deadline for platform operations in seconds.
pub const DEFAULT_CALL_DEADLINE_SECONDS: u64 = 30;

/// Telephony Controller configuration.
///
/// Loaded from environment variables with sensible defaults. The platform
/// API secret is held as a `SecretString` so Debug output never leaks it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telephony platform endpoint (e.g. "https://rtc.example.com").
    /// Empty when unconfigured.
    pub platform_url: String,

    /// Platform API key. Empty when unconfigured.
    pub api_key: String,

    /// Platform API secret. Empty when unconfigured; redacted in Debug.
    pub api_secret: SecretString,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Worker-pool capacity for concurrent platform calls (default: 4).
    pub pool_size: usize,

    /// Per-call deadline for platform operations (default: 30s).
    pub call_deadline: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid worker pool configuration: {0}")]
    InvalidPoolSize(String),

    #[error("Invalid call deadline configuration: {0}")]
    InvalidCallDeadline(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let platform_url = vars.get("PLATFORM_URL").cloned().unwrap_or_default();
        let api_key = vars.get("PLATFORM_API_KEY").cloned().unwrap_or_default();
        let api_secret = SecretString::from(
            vars.get("PLATFORM_API_SECRET")
                .cloned()
                .unwrap_or_default(),
        );

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        // Parse pool size with validation
        let pool_size = if let Some(value_str) = vars.get("PLATFORM_POOL_SIZE") {
            let value: usize = value_str.parse().map_err(|e| {
                ConfigError::InvalidPoolSize(format!(
                    "PLATFORM_POOL_SIZE must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidPoolSize(
                    "PLATFORM_POOL_SIZE must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_POOL_SIZE
        };

        // Parse call deadline with validation
        let call_deadline_seconds =
            if let Some(value_str) = vars.get("PLATFORM_CALL_DEADLINE_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidCallDeadline(format!(
                        "PLATFORM_CALL_DEADLINE_SECONDS must be a valid positive integer, \
                         got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidCallDeadline(
                        "PLATFORM_CALL_DEADLINE_SECONDS must be greater than 0".to_string(),
                    ));
                }

                value
            } else {
                DEFAULT_CALL_DEADLINE_SECONDS
            };

        Ok(Config {
            platform_url,
            api_key,
            api_secret,
            bind_address,
            pool_size,
            call_deadline: Duration::from_secs(call_deadline_seconds),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (
                "PLATFORM_URL".to_string(),
                "https://rtc.example.com".to_string(),
            ),
            ("PLATFORM_API_KEY".to_string(), "APIkey123".to_string()),
            ("PLATFORM_API_SECRET".to_string(), "s3cret".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let vars = base_vars();

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.platform_url, "https://rtc.example.com");
        assert_eq!(config.api_key, "APIkey123");
        assert_eq!(config.api_secret.expose_secret(), "s3cret");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(
            config.call_deadline,
            Duration::from_secs(DEFAULT_CALL_DEADLINE_SECONDS)
        );
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert("PLATFORM_POOL_SIZE".to_string(), "8".to_string());
        vars.insert(
            "PLATFORM_CALL_DEADLINE_SECONDS".to_string(),
            "10".to_string(),
        );

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.call_deadline, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_credentials_do_not_fail_load() {
        let vars = HashMap::new();

        let config = Config::from_vars(&vars).expect("Config should load without credentials");

        assert!(config.platform_url.is_empty());
        assert!(config.api_key.is_empty());
        assert!(config.api_secret.expose_secret().is_empty());
    }

    #[test]
    fn test_pool_size_rejects_zero() {
        let mut vars = base_vars();
        vars.insert("PLATFORM_POOL_SIZE".to_string(), "0".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidPoolSize(msg)) if msg.contains("must be greater than 0"))
        );
    }

    #[test]
    fn test_pool_size_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert("PLATFORM_POOL_SIZE".to_string(), "four".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidPoolSize(msg)) if msg.contains("must be a valid positive integer"))
        );
    }

    #[test]
    fn test_call_deadline_rejects_zero() {
        let mut vars = base_vars();
        vars.insert(
            "PLATFORM_CALL_DEADLINE_SECONDS".to_string(),
            "0".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidCallDeadline(msg)) if msg.contains("must be greater than 0"))
        );
    }

    #[test]
    fn test_call_deadline_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert(
            "PLATFORM_CALL_DEADLINE_SECONDS".to_string(),
            "thirty".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidCallDeadline(msg)) if msg.contains("must be a valid positive integer"))
        );
    }

    #[test]
    fn test_debug_redacts_api_secret() {
        let vars = base_vars();
        let config = Config::from_vars(&vars).expect("Config should load successfully");

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("s3cret"));
    }
}
