//! Common utilities and types shared across Trunkline components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for platform API access-token minting
pub mod token;

/// Module for common data types
pub mod types;
