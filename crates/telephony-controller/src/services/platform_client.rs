//! Telephony platform API client.
//!
//! Defines the capability surface this controller consumes from the
//! downstream real-time communications platform, an HTTP implementation of
//! it, and a spy mock for tests.
//!
//! Client handles are scoped per service operation: each operation asks the
//! [`PlatformConnector`] for a fresh handle at call start and drops it on
//! every exit path, keeping connection lifetime independent of the worker
//! pool deadline. The connector is injected at service construction so tests
//! can substitute the mock.

use crate::errors::TelephonyError;
use common::secret::SecretString;
use common::token::AccessToken;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Request timeout for platform calls in seconds.
const PLATFORM_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connect timeout in seconds.
const PLATFORM_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Identity stamped into minted access tokens.
const CLIENT_IDENTITY: &str = "telephony-controller";

// ============================================================================
// Wire types
// ============================================================================

/// Specification for a new inbound trunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundTrunkSpec {
    /// Display name shown in the platform console.
    pub name: String,

    /// Phone numbers routed to this trunk.
    pub numbers: Vec<String>,

    /// SIP headers attached to inbound calls, used for tenant correlation
    /// in downstream logs. Opaque to the platform.
    pub headers: BTreeMap<String, String>,
}

/// Specification for a new outbound trunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundTrunkSpec {
    /// Display name shown in the platform console.
    pub name: String,

    /// Carrier address, `host:port`.
    pub address: String,

    /// SIP auth username.
    pub auth_username: String,

    /// SIP auth password.
    pub auth_password: String,

    /// Caller-id numbers available on this trunk.
    pub numbers: Vec<String>,
}

/// A trunk as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrunkInfo {
    /// Platform-assigned trunk id.
    pub trunk_id: String,

    /// Display name.
    pub name: String,

    /// Phone numbers on the trunk.
    pub numbers: Vec<String>,

    /// Carrier address (outbound trunks only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Per-room agent configuration carried by a dispatch rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAgentSpec {
    /// Agent to dispatch into matched rooms.
    pub agent_name: String,

    /// JSON metadata handed to the dispatched agent.
    pub metadata: String,
}

/// Specification for a new dispatch rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRuleSpec {
    /// Display name.
    pub name: String,

    /// Room-name prefix for calls matched by this rule.
    pub room_prefix: String,

    /// Trunks this rule applies to; empty means all trunks.
    pub trunk_ids: Vec<String>,

    /// JSON metadata on the rule itself.
    pub metadata: String,

    /// Free-form attributes for filtering in the platform console.
    pub attributes: BTreeMap<String, String>,

    /// Agent configuration applied to rooms created by this rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_agent: Option<RoomAgentSpec>,
}

/// A dispatch rule as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRuleInfo {
    /// Platform-assigned rule id.
    pub rule_id: String,

    /// Display name.
    pub name: String,

    /// Trunks this rule applies to.
    pub trunk_ids: Vec<String>,

    /// Room-name prefix.
    pub room_prefix: String,
}

/// Specification for a new room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSpec {
    /// Room name; must be unique among live rooms.
    pub name: String,
}

/// A room as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    /// Room name.
    pub name: String,
}

/// Specification for binding an agent to a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBindingSpec {
    /// Agent to bind.
    pub agent_name: String,

    /// Room to bind into.
    pub room_name: String,

    /// JSON metadata handed to the agent; empty string when none.
    pub metadata: String,
}

/// Specification for attaching a SIP participant to a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSpec {
    /// Outbound trunk to dial through.
    pub trunk_id: String,

    /// Number to dial.
    pub call_to: String,

    /// Caller-id number.
    pub caller_number: String,

    /// Room the participant joins.
    pub room_name: String,

    /// Participant identity string.
    pub identity: String,

    /// Participant display name.
    pub display_name: String,

    /// Play a ring indication while the call is being established.
    pub ring: bool,
}

/// A SIP participant as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantInfo {
    /// Platform-assigned participant id.
    pub participant_id: String,
}

/// List envelope used by platform list endpoints.
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

// ============================================================================
// Capability trait
// ============================================================================

/// Capability surface consumed from the telephony platform.
///
/// One method per remote capability; implementations must not retry.
#[async_trait::async_trait]
pub trait PlatformApi: Send + Sync {
    async fn create_inbound_trunk(
        &self,
        spec: InboundTrunkSpec,
    ) -> Result<TrunkInfo, TelephonyError>;

    async fn create_outbound_trunk(
        &self,
        spec: OutboundTrunkSpec,
    ) -> Result<TrunkInfo, TelephonyError>;

    async fn list_inbound_trunks(&self) -> Result<Vec<TrunkInfo>, TelephonyError>;

    async fn list_outbound_trunks(&self) -> Result<Vec<TrunkInfo>, TelephonyError>;

    async fn delete_trunk(&self, trunk_id: &str) -> Result<(), TelephonyError>;

    async fn create_dispatch_rule(
        &self,
        spec: DispatchRuleSpec,
    ) -> Result<DispatchRuleInfo, TelephonyError>;

    async fn list_dispatch_rules(&self) -> Result<Vec<DispatchRuleInfo>, TelephonyError>;

    async fn delete_dispatch_rule(&self, rule_id: &str) -> Result<(), TelephonyError>;

    async fn create_room(&self, spec: RoomSpec) -> Result<RoomInfo, TelephonyError>;

    async fn create_agent_binding(&self, spec: AgentBindingSpec) -> Result<(), TelephonyError>;

    async fn create_call_participant(
        &self,
        spec: ParticipantSpec,
    ) -> Result<ParticipantInfo, TelephonyError>;
}

/// Factory for per-operation platform handles.
///
/// Service operations acquire one handle at call start and drop it on every
/// exit path. Injecting the connector (rather than a shared client) keeps
/// test doubles substitutable and removes hidden shared state.
pub trait PlatformConnector: Send + Sync {
    /// Acquire a fresh platform handle.
    fn connect(&self) -> Result<Arc<dyn PlatformApi>, TelephonyError>;
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Connector that builds a fresh HTTP client per operation.
pub struct HttpPlatformConnector {
    base_url: String,
    api_key: String,
    api_secret: SecretString,
}

impl HttpPlatformConnector {
    /// Create a connector for the given platform endpoint and credentials.
    #[must_use]
    pub fn new(base_url: String, api_key: String, api_secret: SecretString) -> Self {
        Self {
            base_url,
            api_key,
            api_secret,
        }
    }
}

impl PlatformConnector for HttpPlatformConnector {
    fn connect(&self) -> Result<Arc<dyn PlatformApi>, TelephonyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PLATFORM_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(PLATFORM_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "tc.services.platform", error = %e, "Failed to build HTTP client");
                TelephonyError::Internal
            })?;

        Ok(Arc::new(HttpPlatformClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
        }))
    }
}

/// HTTP client for the platform API.
///
/// Each request carries a freshly minted short-lived bearer token. Non-2xx
/// responses map to `NotFound` (404) or `Remote` with the response body
/// forwarded verbatim.
pub struct HttpPlatformClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: SecretString,
}

impl HttpPlatformClient {
    fn bearer_token(&self) -> Result<String, TelephonyError> {
        AccessToken::new(&self.api_key, &self.api_secret)
            .with_identity(CLIENT_IDENTITY)
            .mint()
            .map_err(|e| {
                error!(target: "tc.services.platform", error = %e, "Failed to mint access token");
                TelephonyError::Internal
            })
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TelephonyError> {
        let token = self.bearer_token()?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "tc.services.platform", error = %e, path = %path, "Platform request failed");
                TelephonyError::Remote(e.to_string())
            })?;

        Self::parse_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TelephonyError> {
        let token = self.bearer_token()?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| {
                warn!(target: "tc.services.platform", error = %e, path = %path, "Platform request failed");
                TelephonyError::Remote(e.to_string())
            })?;

        Self::parse_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), TelephonyError> {
        let token = self.bearer_token()?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| {
                warn!(target: "tc.services.platform", error = %e, path = %path, "Platform request failed");
                TelephonyError::Remote(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::fault_from(status, response).await)
        }
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TelephonyError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                error!(target: "tc.services.platform", error = %e, "Failed to parse platform response");
                TelephonyError::Internal
            })
        } else {
            Err(Self::fault_from(status, response).await)
        }
    }

    /// Map a non-2xx platform response to an error. The body is forwarded
    /// verbatim, never parsed for branching.
    async fn fault_from(status: reqwest::StatusCode, response: reqwest::Response) -> TelephonyError {
        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status.to_string()
        } else {
            body
        };

        if status == reqwest::StatusCode::NOT_FOUND {
            TelephonyError::NotFound(message)
        } else {
            TelephonyError::Remote(message)
        }
    }
}

#[async_trait::async_trait]
impl PlatformApi for HttpPlatformClient {
    async fn create_inbound_trunk(
        &self,
        spec: InboundTrunkSpec,
    ) -> Result<TrunkInfo, TelephonyError> {
        self.post_json("/v1/sip/inbound-trunks", &spec).await
    }

    async fn create_outbound_trunk(
        &self,
        spec: OutboundTrunkSpec,
    ) -> Result<TrunkInfo, TelephonyError> {
        self.post_json("/v1/sip/outbound-trunks", &spec).await
    }

    async fn list_inbound_trunks(&self) -> Result<Vec<TrunkInfo>, TelephonyError> {
        let list: ListResponse<TrunkInfo> = self.get_json("/v1/sip/inbound-trunks").await?;
        Ok(list.items)
    }

    async fn list_outbound_trunks(&self) -> Result<Vec<TrunkInfo>, TelephonyError> {
        let list: ListResponse<TrunkInfo> = self.get_json("/v1/sip/outbound-trunks").await?;
        Ok(list.items)
    }

    async fn delete_trunk(&self, trunk_id: &str) -> Result<(), TelephonyError> {
        self.delete(&format!("/v1/sip/trunks/{}", trunk_id)).await
    }

    async fn create_dispatch_rule(
        &self,
        spec: DispatchRuleSpec,
    ) -> Result<DispatchRuleInfo, TelephonyError> {
        self.post_json("/v1/sip/dispatch-rules", &spec).await
    }

    async fn list_dispatch_rules(&self) -> Result<Vec<DispatchRuleInfo>, TelephonyError> {
        let list: ListResponse<DispatchRuleInfo> = self.get_json("/v1/sip/dispatch-rules").await?;
        Ok(list.items)
    }

    async fn delete_dispatch_rule(&self, rule_id: &str) -> Result<(), TelephonyError> {
        self.delete(&format!("/v1/sip/dispatch-rules/{}", rule_id))
            .await
    }

    async fn create_room(&self, spec: RoomSpec) -> Result<RoomInfo, TelephonyError> {
        self.post_json("/v1/rooms", &spec).await
    }

    async fn create_agent_binding(&self, spec: AgentBindingSpec) -> Result<(), TelephonyError> {
        // The platform returns binding info; this controller has no use for it.
        let _: serde_json::Value = self.post_json("/v1/agent-bindings", &spec).await?;
        Ok(())
    }

    async fn create_call_participant(
        &self,
        spec: ParticipantSpec,
    ) -> Result<ParticipantInfo, TelephonyError> {
        self.post_json("/v1/sip/participants", &spec).await
    }
}

// ============================================================================
// Mock
// ============================================================================

/// Mock platform module for testing.
///
/// The mock is a spy: it records every invocation in order, so tests can
/// assert both behavior ("numbers round-trip") and absence of network calls
/// ("credential gate fired before any invocation").
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory platform double with call recording.
    #[derive(Default)]
    pub struct MockPlatform {
        /// Invoked operation names, in order.
        calls: Mutex<Vec<String>>,

        /// Operations configured to fail, with the fault message.
        failures: Mutex<BTreeMap<String, String>>,

        /// Optional latency applied to every operation.
        latency: Mutex<Option<Duration>>,

        /// Trunks provisioned through this mock.
        trunks: Mutex<Vec<TrunkInfo>>,

        /// Dispatch rules provisioned through this mock.
        rules: Mutex<Vec<DispatchRuleInfo>>,

        /// Rooms created through this mock (never implicitly deleted).
        rooms: Mutex<Vec<String>>,

        /// Number of operations that ran to completion.
        completions: AtomicUsize,

        /// Monotonic id counter.
        next_id: AtomicUsize,
    }

    impl MockPlatform {
        /// Create an empty mock.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Configure `operation` to fail with a platform fault message.
        pub fn fail_with(&self, operation: &str, message: &str) {
            if let Ok(mut failures) = self.failures.lock() {
                failures.insert(operation.to_string(), message.to_string());
            }
        }

        /// Apply `latency` to every subsequent operation.
        pub fn set_latency(&self, latency: Duration) {
            if let Ok(mut slot) = self.latency.lock() {
                *slot = Some(latency);
            }
        }

        /// Operation names recorded so far, in invocation order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        /// Total number of recorded invocations.
        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or(0)
        }

        /// Number of operations that ran to completion (as opposed to being
        /// abandoned by a timed-out caller).
        pub fn completions(&self) -> usize {
            self.completions.load(Ordering::SeqCst)
        }

        /// Names of rooms currently live on the mock platform.
        pub fn rooms(&self) -> Vec<String> {
            self.rooms.lock().map(|r| r.clone()).unwrap_or_default()
        }

        fn next_id(&self, prefix: &str) -> String {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            format!("{}-{}", prefix, n)
        }

        async fn begin(&self, operation: &str) -> Result<(), TelephonyError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(operation.to_string());
            }

            let latency = self.latency.lock().ok().and_then(|l| *l);
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }

            let failure = self
                .failures
                .lock()
                .ok()
                .and_then(|f| f.get(operation).cloned());
            if let Some(message) = failure {
                return Err(TelephonyError::Remote(message));
            }

            Ok(())
        }

        fn complete(&self) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl PlatformApi for MockPlatform {
        async fn create_inbound_trunk(
            &self,
            spec: InboundTrunkSpec,
        ) -> Result<TrunkInfo, TelephonyError> {
            self.begin("create_inbound_trunk").await?;
            let trunk = TrunkInfo {
                trunk_id: self.next_id("trunk"),
                name: spec.name,
                numbers: spec.numbers,
                address: None,
            };
            if let Ok(mut trunks) = self.trunks.lock() {
                trunks.push(trunk.clone());
            }
            self.complete();
            Ok(trunk)
        }

        async fn create_outbound_trunk(
            &self,
            spec: OutboundTrunkSpec,
        ) -> Result<TrunkInfo, TelephonyError> {
            self.begin("create_outbound_trunk").await?;
            let trunk = TrunkInfo {
                trunk_id: self.next_id("trunk"),
                name: spec.name,
                numbers: spec.numbers,
                address: Some(spec.address),
            };
            if let Ok(mut trunks) = self.trunks.lock() {
                trunks.push(trunk.clone());
            }
            self.complete();
            Ok(trunk)
        }

        async fn list_inbound_trunks(&self) -> Result<Vec<TrunkInfo>, TelephonyError> {
            self.begin("list_inbound_trunks").await?;
            let trunks = self
                .trunks
                .lock()
                .map(|t| t.iter().filter(|t| t.address.is_none()).cloned().collect())
                .unwrap_or_default();
            self.complete();
            Ok(trunks)
        }

        async fn list_outbound_trunks(&self) -> Result<Vec<TrunkInfo>, TelephonyError> {
            self.begin("list_outbound_trunks").await?;
            let trunks = self
                .trunks
                .lock()
                .map(|t| t.iter().filter(|t| t.address.is_some()).cloned().collect())
                .unwrap_or_default();
            self.complete();
            Ok(trunks)
        }

        async fn delete_trunk(&self, trunk_id: &str) -> Result<(), TelephonyError> {
            self.begin("delete_trunk").await?;
            let removed = self
                .trunks
                .lock()
                .map(|mut trunks| {
                    let before = trunks.len();
                    trunks.retain(|t| t.trunk_id != trunk_id);
                    trunks.len() < before
                })
                .unwrap_or(false);
            self.complete();
            if removed {
                Ok(())
            } else {
                Err(TelephonyError::NotFound(format!(
                    "trunk {} does not exist",
                    trunk_id
                )))
            }
        }

        async fn create_dispatch_rule(
            &self,
            spec: DispatchRuleSpec,
        ) -> Result<DispatchRuleInfo, TelephonyError> {
            self.begin("create_dispatch_rule").await?;
            let rule = DispatchRuleInfo {
                rule_id: self.next_id("rule"),
                name: spec.name,
                trunk_ids: spec.trunk_ids,
                room_prefix: spec.room_prefix,
            };
            if let Ok(mut rules) = self.rules.lock() {
                rules.push(rule.clone());
            }
            self.complete();
            Ok(rule)
        }

        async fn list_dispatch_rules(&self) -> Result<Vec<DispatchRuleInfo>, TelephonyError> {
            self.begin("list_dispatch_rules").await?;
            let rules = self.rules.lock().map(|r| r.clone()).unwrap_or_default();
            self.complete();
            Ok(rules)
        }

        async fn delete_dispatch_rule(&self, rule_id: &str) -> Result<(), TelephonyError> {
            self.begin("delete_dispatch_rule").await?;
            let removed = self
                .rules
                .lock()
                .map(|mut rules| {
                    let before = rules.len();
                    rules.retain(|r| r.rule_id != rule_id);
                    rules.len() < before
                })
                .unwrap_or(false);
            self.complete();
            if removed {
                Ok(())
            } else {
                Err(TelephonyError::NotFound(format!(
                    "dispatch rule {} does not exist",
                    rule_id
                )))
            }
        }

        async fn create_room(&self, spec: RoomSpec) -> Result<RoomInfo, TelephonyError> {
            self.begin("create_room").await?;
            if let Ok(mut rooms) = self.rooms.lock() {
                rooms.push(spec.name.clone());
            }
            self.complete();
            Ok(RoomInfo { name: spec.name })
        }

        async fn create_agent_binding(&self, spec: AgentBindingSpec) -> Result<(), TelephonyError> {
            self.begin("create_agent_binding").await?;
            let _ = spec;
            self.complete();
            Ok(())
        }

        async fn create_call_participant(
            &self,
            spec: ParticipantSpec,
        ) -> Result<ParticipantInfo, TelephonyError> {
            self.begin("create_call_participant").await?;
            let _ = spec;
            let info = ParticipantInfo {
                participant_id: self.next_id("participant"),
            };
            self.complete();
            Ok(info)
        }
    }

    /// Connector handing out a shared mock instance.
    pub struct MockConnector {
        platform: Arc<MockPlatform>,
    }

    impl MockConnector {
        /// Wrap a mock platform.
        #[must_use]
        pub fn new(platform: Arc<MockPlatform>) -> Self {
            Self { platform }
        }
    }

    impl PlatformConnector for MockConnector {
        fn connect(&self) -> Result<Arc<dyn PlatformApi>, TelephonyError> {
            Ok(self.platform.clone())
        }
    }
}
