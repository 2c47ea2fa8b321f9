//! Telephony Controller Service Library
//!
//! This library provides the core functionality for the Trunkline telephony
//! controller - an HTTP API responsible for:
//!
//! - Provisioning SIP trunks (inbound and outbound) on the telephony platform
//! - Managing dispatch rules that route inbound calls to named agents
//! - Orchestrating outbound calls (room, agent binding, SIP participant)
//!
//! # Architecture
//!
//! The controller follows the Handler -> Service -> Platform client pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> platform_client.rs
//! ```
//!
//! Every service operation first checks the credential gate, then executes
//! its platform calls on a bounded worker pool with a per-call deadline.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `models` - Request/response data models
//! - `routes` - Axum router setup
//! - `services` - Trunk provisioning, dispatch rules, outbound calls

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
