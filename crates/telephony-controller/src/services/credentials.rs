//! Platform credential gate.
//!
//! Credentials are loaded once at start-up and never mutated. Every public
//! service operation calls [`Credentials::ensure_configured`] before doing
//! anything else, which guarantees that no network call is attempted while
//! any of the three fields is missing.

use crate::config::Config;
use crate::errors::TelephonyError;
use common::secret::{ExposeSecret, SecretString};

/// Read-only platform credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Platform endpoint URL.
    pub endpoint: String,

    /// Platform API key.
    pub api_key: String,

    /// Platform API secret; redacted in Debug.
    pub api_secret: SecretString,
}

impl Credentials {
    /// Extract credentials from service configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.platform_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    /// Whether all three credential fields are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
            && !self.api_key.is_empty()
            && !self.api_secret.expose_secret().is_empty()
    }

    /// Fail with `NotConfigured` when any credential field is missing.
    pub fn ensure_configured(&self) -> Result<(), TelephonyError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(TelephonyError::NotConfigured)
        }
    }
}
