//! Access-token minting for the telephony platform API.
//!
//! The platform authenticates requests with a short-lived HS256 JWT signed by
//! the configured API secret, with the API key as issuer. Tokens are minted
//! per request, never cached, so a leaked token has a small blast radius.
//!
//! # Usage
//!
//! ```rust
//! use common::secret::SecretString;
//! use common::token::AccessToken;
//!
//! let secret = SecretString::from("platform-secret");
//! let token = AccessToken::new("APIkey123", &secret)
//!     .with_identity("telephony-controller")
//!     .mint()
//!     .unwrap();
//! # let _ = token;
//! ```

use crate::secret::{ExposeSecret, SecretString};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default access-token lifetime (10 minutes).
///
/// Long enough to cover any single platform call including queueing delay,
/// short enough that stolen tokens expire quickly.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(600);

/// Maximum allowed access-token lifetime (1 hour).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Errors that can occur while minting an access token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Requested TTL outside the allowed range.
    #[error("Invalid token TTL: {0}")]
    InvalidTtl(String),

    /// JWT encoding failed.
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Claims carried by a platform access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformClaims {
    /// Issuer: the platform API key.
    pub iss: String,

    /// Not-before timestamp (unix seconds).
    pub nbf: i64,

    /// Expiry timestamp (unix seconds).
    pub exp: i64,

    /// Caller identity, shown in platform audit logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Grants administrative access to SIP and room resources.
    pub admin: bool,
}

/// Builder for platform access tokens.
pub struct AccessToken<'a> {
    api_key: &'a str,
    api_secret: &'a SecretString,
    identity: Option<String>,
    ttl: Duration,
}

impl<'a> AccessToken<'a> {
    /// Start building a token for the given API key/secret pair.
    #[must_use]
    pub fn new(api_key: &'a str, api_secret: &'a SecretString) -> Self {
        Self {
            api_key,
            api_secret,
            identity: None,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Set the `sub` claim identifying the caller.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Override the token lifetime. Validated in [`AccessToken::mint`].
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sign and serialize the token.
    ///
    /// # Errors
    ///
    /// - `TokenError::InvalidTtl` if the TTL is zero or exceeds [`MAX_TOKEN_TTL`]
    /// - `TokenError::Encoding` if JWT serialization fails
    pub fn mint(self) -> Result<String, TokenError> {
        if self.ttl.is_zero() {
            return Err(TokenError::InvalidTtl("TTL must be non-zero".to_string()));
        }
        if self.ttl > MAX_TOKEN_TTL {
            return Err(TokenError::InvalidTtl(format!(
                "TTL must not exceed {} seconds, got {}",
                MAX_TOKEN_TTL.as_secs(),
                self.ttl.as_secs()
            )));
        }

        let now = Utc::now().timestamp();
        let ttl_secs = i64::try_from(self.ttl.as_secs())
            .map_err(|_| TokenError::InvalidTtl("TTL does not fit in i64".to_string()))?;

        let claims = PlatformClaims {
            iss: self.api_key.to_string(),
            nbf: now,
            exp: now + ttl_secs,
            sub: self.identity,
            admin: true,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.api_secret.expose_secret().as_bytes()),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}
