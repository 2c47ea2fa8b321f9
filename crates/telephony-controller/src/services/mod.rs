//! Business logic services.
//!
//! Each service owns one slice of the telephony surface and talks to the
//! platform through a [`platform_client::PlatformConnector`], gated by
//! [`credentials::Credentials`] and bounded by [`bridge::OperationBridge`].

pub mod bridge;
pub mod credentials;
pub mod dispatch;
pub mod outbound_call;
pub mod platform_client;
pub mod trunks;

pub use bridge::OperationBridge;
pub use credentials::Credentials;
pub use dispatch::DispatchRuleService;
pub use outbound_call::{OutboundCallParams, OutboundCallPlacement, OutboundCallService};
pub use trunks::{TrunkAuth, TrunkService, DEFAULT_SIP_PORT};
