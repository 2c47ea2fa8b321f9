//! Dispatch rule provisioning.
//!
//! A dispatch rule tells the platform how to route inbound calls on a set of
//! trunks: which agent to place in the session room, how the room is named,
//! and what metadata that agent receives. Rule naming and room-prefix
//! derivation are pure functions so their edge cases are unit-testable
//! without a platform.

use crate::errors::TelephonyError;
use crate::services::bridge::OperationBridge;
use crate::services::credentials::Credentials;
use crate::services::platform_client::{
    DispatchRuleInfo, DispatchRuleSpec, PlatformConnector, RoomAgentSpec,
};
use common::types::TenantContext;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Metadata stored on the rule itself, consumed by operators and audits.
#[derive(Debug, Serialize)]
struct RuleMetadata<'a> {
    user_id: &'a str,
    org_id: &'a str,
    agent: &'a str,
    phone_number: &'a str,
}

/// Metadata handed to the agent dispatched into a matched room.
#[derive(Debug, Serialize)]
struct RoomAgentMetadata<'a> {
    source: &'static str,
    agent: &'a str,
    user_id: &'a str,
    org_id: &'a str,
    phone_number: &'a str,
}

/// Dispatch rule provisioning service.
#[derive(Clone)]
pub struct DispatchRuleService {
    credentials: Credentials,
    connector: Arc<dyn PlatformConnector>,
    bridge: OperationBridge,
}

impl DispatchRuleService {
    /// Create a dispatch rule service over the given platform connector.
    #[must_use]
    pub fn new(
        credentials: Credentials,
        connector: Arc<dyn PlatformConnector>,
        bridge: OperationBridge,
    ) -> Self {
        Self {
            credentials,
            connector,
            bridge,
        }
    }

    /// Create a dispatch rule routing calls on `trunk_ids` to `agent_name`.
    ///
    /// An empty `trunk_ids` means the rule applies to every trunk. The
    /// `numbers` list only influences naming and the derived room prefix;
    /// trunk matching is the platform's concern.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` when platform credentials are missing
    /// - `InvalidInput` when `agent_name` is empty
    /// - `Remote`/`Timeout` from the platform call
    #[instrument(skip(self, tenant), fields(agent_name = %agent_name, trunk_count = trunk_ids.len()))]
    pub async fn create(
        &self,
        agent_name: String,
        trunk_ids: Vec<String>,
        numbers: Vec<String>,
        tenant: TenantContext,
    ) -> Result<DispatchRuleInfo, TelephonyError> {
        self.credentials.ensure_configured()?;
        if agent_name.is_empty() {
            return Err(TelephonyError::InvalidInput(
                "agent_name is required".to_string(),
            ));
        }

        let primary_number = numbers.first().map(String::as_str).unwrap_or("");
        let metadata = serde_json::to_string(&RuleMetadata {
            user_id: tenant.user_or_unknown(),
            org_id: tenant.org_or_unknown(),
            agent: &agent_name,
            phone_number: primary_number,
        })
        .map_err(|_| TelephonyError::Internal)?;
        let agent_metadata = serde_json::to_string(&RoomAgentMetadata {
            source: "inbound_call",
            agent: &agent_name,
            user_id: tenant.user_or_unknown(),
            org_id: tenant.org_or_unknown(),
            phone_number: primary_number,
        })
        .map_err(|_| TelephonyError::Internal)?;

        let spec = DispatchRuleSpec {
            name: rule_display_name(&agent_name, &numbers),
            room_prefix: room_prefix(&numbers),
            trunk_ids,
            metadata,
            attributes: rule_attributes(&tenant),
            room_agent: Some(RoomAgentSpec {
                agent_name: agent_name.clone(),
                metadata: agent_metadata,
            }),
        };

        let client = self.connector.connect()?;
        let rule = self
            .bridge
            .submit(async move { client.create_dispatch_rule(spec).await })
            .await?;

        info!(
            target: "tc.services.dispatch",
            rule_id = %rule.rule_id,
            agent_name = %agent_name,
            "Created dispatch rule"
        );

        Ok(rule)
    }

    /// List dispatch rules in platform order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<DispatchRuleInfo>, TelephonyError> {
        self.credentials.ensure_configured()?;
        let client = self.connector.connect()?;
        self.bridge
            .submit(async move { client.list_dispatch_rules().await })
            .await
    }

    /// Delete a dispatch rule by platform id.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the platform does not recognize the id
    #[instrument(skip(self), fields(rule_id = %rule_id))]
    pub async fn delete(&self, rule_id: &str) -> Result<(), TelephonyError> {
        self.credentials.ensure_configured()?;
        if rule_id.is_empty() {
            return Err(TelephonyError::InvalidInput(
                "rule_id is required".to_string(),
            ));
        }

        let client = self.connector.connect()?;
        let id = rule_id.to_string();
        self.bridge
            .submit(async move { client.delete_dispatch_rule(&id).await })
            .await?;

        info!(target: "tc.services.dispatch", rule_id = %rule_id, "Deleted dispatch rule");
        Ok(())
    }
}

/// Display name summarizing the agent and up to two covered numbers.
fn rule_display_name(agent_name: &str, numbers: &[String]) -> String {
    let summary = if numbers.is_empty() {
        "All".to_string()
    } else {
        let shown: Vec<&str> = numbers.iter().take(2).map(String::as_str).collect();
        let mut summary = shown.join(", ");
        if numbers.len() > 2 {
            summary.push_str(&format!(" +{} more", numbers.len() - 2));
        }
        summary
    };
    format!("Agent: {} -> {}", agent_name, summary)
}

/// Room-name prefix derived from the first covered number.
///
/// Formatting characters are stripped so the prefix stays a plain digit run.
/// Rules with no numbers share the `sip-unknown__` prefix; their rooms are
/// only distinguishable by the platform-appended suffix.
fn room_prefix(numbers: &[String]) -> String {
    let digits: String = numbers
        .first()
        .map(|n| {
            n.chars()
                .filter(|c| *c != '+' && *c != '-' && *c != ' ')
                .collect()
        })
        .unwrap_or_default();

    if digits.is_empty() {
        "sip-unknown__".to_string()
    } else {
        format!("sip-{}__", digits)
    }
}

/// Console-filterable attributes stamped on every rule.
fn rule_attributes(tenant: &TenantContext) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("call_type".to_string(), "inbound".to_string()),
        ("platform".to_string(), "trunkline".to_string()),
        ("user_id".to_string(), tenant.user_or_unknown().to_string()),
    ])
}
