//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate with
//! Trunkline-specific guidance. Use these types for all sensitive values:
//! platform API secrets, SIP trunk passwords, and bearer tokens.
//!
//! The key property is that `SecretString` implements `Debug` with redaction,
//! so any struct that derives `Debug` while holding a secret gets safe logging
//! behavior for free. Secrets are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct TrunkAuth {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let auth = TrunkAuth {
//!     username: "magnus-4821".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! // Safe: password renders as [REDACTED]
//! println!("{:?}", auth);
//!
//! // Access requires an explicit expose_secret() call
//! let password: &str = auth.password.expose_secret();
//! # let _ = password;
//! ```
//!
//! # Trunkline usage guidelines
//!
//! Use `SecretString` for:
//! - The platform API secret
//! - SIP trunk auth passwords
//! - Minted bearer tokens held longer than one request

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("hunter2");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("api-secret-123");
        assert_eq!(secret.expose_secret(), "api-secret-123");
    }

    #[test]
    fn test_struct_with_secret_is_safe() {
        #[allow(dead_code)]
        #[derive(Debug)]
        struct PlatformCredentials {
            api_key: String,
            api_secret: SecretString,
        }

        let creds = PlatformCredentials {
            api_key: "APIabc123".to_string(),
            api_secret: SecretString::from("super-secret"),
        };

        let debug_str = format!("{creds:?}");

        // Key should be visible
        assert!(debug_str.contains("APIabc123"));
        // Secret should be redacted
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super-secret"));
    }

    #[test]
    fn test_deserialize() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Credentials {
            username: String,
            password: SecretString,
        }

        let json = r#"{"username": "magnus", "password": "my-secret-value"}"#;
        let creds: Credentials = serde_json::from_str(json).expect("deserialize");

        assert_eq!(creds.password.expose_secret(), "my-secret-value");

        let debug = format!("{creds:?}");
        assert!(!debug.contains("my-secret-value"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_clone_works() {
        let secret = SecretString::from("cloneable");
        let cloned = secret.clone();
        assert_eq!(cloned.expose_secret(), "cloneable");
    }
}
