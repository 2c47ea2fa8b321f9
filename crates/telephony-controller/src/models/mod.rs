//! Telephony Controller models.
//!
//! Request and response bodies for the HTTP surface. Services take typed
//! parameters; these types exist only at the axum boundary.

use crate::services::platform_client::{DispatchRuleInfo, TrunkInfo};
use crate::services::DEFAULT_SIP_PORT;
use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/telephony/trunks/inbound`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInboundTrunkRequest {
    /// Numbers routed to the trunk; must be non-empty.
    pub phone_numbers: Vec<String>,

    /// Requesting user, for correlation tags.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Owning organization, for correlation tags and naming.
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Request body for `POST /v1/telephony/trunks/outbound`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOutboundTrunkRequest {
    /// SIP auth username at the carrier.
    pub username: String,

    /// SIP auth password at the carrier.
    pub password: String,

    /// Carrier SIP domain.
    pub sip_domain: String,

    /// Caller-id numbers on the trunk; must be non-empty.
    pub phone_numbers: Vec<String>,

    /// Carrier SIP port.
    #[serde(default = "default_sip_port")]
    pub port: u16,

    /// Requesting user, for correlation tags.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Owning organization, for correlation tags and naming.
    #[serde(default)]
    pub organization_id: Option<String>,
}

fn default_sip_port() -> u16 {
    DEFAULT_SIP_PORT
}

/// Request body for `POST /v1/telephony/dispatch-rules`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDispatchRuleRequest {
    /// Agent dispatched into matched call rooms.
    pub agent_name: String,

    /// Trunks the rule applies to; empty means all trunks.
    #[serde(default)]
    pub trunk_ids: Vec<String>,

    /// Numbers the rule covers; drives naming and the room prefix.
    #[serde(default)]
    pub phone_numbers: Vec<String>,

    /// Requesting user, for rule metadata.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Owning organization, for rule metadata.
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Request body for `POST /v1/telephony/calls`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutboundCallRequest {
    /// Caller-id number.
    pub from_number: String,

    /// Number to dial.
    pub to_number: String,

    /// Outbound trunk to dial through.
    pub trunk_id: String,

    /// Agent placed in the call room.
    pub agent_name: String,

    /// Agent configuration, embedded in the room name.
    #[serde(default)]
    pub agent_config_id: Option<String>,

    /// Owning organization, handed to the agent as metadata.
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Response body for trunk list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct TrunkListResponse {
    /// Trunks in platform order.
    pub trunks: Vec<TrunkInfo>,
}

/// Response body for `GET /v1/telephony/dispatch-rules`.
#[derive(Debug, Clone, Serialize)]
pub struct RuleListResponse {
    /// Rules in platform order.
    pub rules: Vec<DispatchRuleInfo>,
}

/// Response body for `GET /v1/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process is serving.
    pub status: &'static str,

    /// Service name.
    pub service: &'static str,

    /// Crate version.
    pub version: &'static str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_trunk_request_defaults_port() {
        let request: CreateOutboundTrunkRequest = serde_json::from_str(
            r#"{
                "username": "magnus-4821",
                "password": "hunter2",
                "sip_domain": "sip.magnus.example",
                "phone_numbers": ["+15105550100"]
            }"#,
        )
        .unwrap();

        assert_eq!(request.port, 5060);
        assert!(request.user_id.is_none());
    }

    #[test]
    fn test_dispatch_rule_request_defaults_lists() {
        let request: CreateDispatchRuleRequest =
            serde_json::from_str(r#"{"agent_name": "support-bot"}"#).unwrap();

        assert!(request.trunk_ids.is_empty());
        assert!(request.phone_numbers.is_empty());
    }

    #[test]
    fn test_call_request_requires_core_fields() {
        let result = serde_json::from_str::<OutboundCallRequest>(
            r#"{"from_number": "+15105550100", "to_number": "+15105550199"}"#,
        );
        assert!(result.is_err());
    }
}
