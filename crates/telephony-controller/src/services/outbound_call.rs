//! Outbound call orchestration.
//!
//! Placing a call is a strictly sequential three-step workflow against the
//! platform: create the session room, bind the handling agent, attach the
//! dialed party as a SIP participant. There is no compensation: a failure
//! after room creation leaves the room (and any agent binding) in place, and
//! the error carries the failing step plus the room name so the caller can
//! reconcile.

use crate::errors::{CallStep, TelephonyError};
use crate::services::bridge::OperationBridge;
use crate::services::credentials::Credentials;
use crate::services::platform_client::{
    AgentBindingSpec, ParticipantSpec, PlatformConnector, RoomSpec,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Inputs for placing an outbound call.
#[derive(Debug, Clone)]
pub struct OutboundCallParams {
    /// Caller-id number presented to the dialed party.
    pub from_number: String,

    /// Number to dial.
    pub to_number: String,

    /// Outbound trunk to dial through.
    pub trunk_id: String,

    /// Agent placed in the session room.
    pub agent_name: String,

    /// Optional agent configuration, embedded in the room name.
    pub agent_config_id: Option<String>,

    /// Optional owning organization, handed to the agent as metadata.
    pub organization_id: Option<String>,
}

/// Result of a successfully placed call.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundCallPlacement {
    /// Session room holding the agent and the dialed party.
    pub room_name: String,

    /// Short correlation id for this call.
    pub call_id: String,

    /// Platform-assigned id of the SIP participant.
    pub participant_id: String,
}

/// Metadata handed to the agent bound into the call room.
#[derive(Debug, Serialize)]
struct CallAgentMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_config_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_id: Option<&'a str>,
}

/// Outbound call orchestration service.
#[derive(Clone)]
pub struct OutboundCallService {
    credentials: Credentials,
    connector: Arc<dyn PlatformConnector>,
    bridge: OperationBridge,
}

impl OutboundCallService {
    /// Create an outbound call service over the given platform connector.
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

    /// Place an outbound call.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` when platform credentials are missing
    /// - `InvalidInput` when any required field is empty; checked before any
    ///   network call
    /// - `CallSetup` when a workflow step fails; carries the failing step and
    ///   the room name once one exists
    #[instrument(skip(self, params), fields(trunk_id = %params.trunk_id, agent_name = %params.agent_name))]
    pub async fn place_call(
        &self,
        params: OutboundCallParams,
    ) -> Result<OutboundCallPlacement, TelephonyError> {
        self.credentials.ensure_configured()?;
        validate(&params)?;

        let call_id = new_call_id();
        let room_name = match params.agent_config_id.as_deref() {
            Some(config_id) => format!("outbound-{}-{}", call_id, config_id),
            None => format!("outbound-{}", call_id),
        };

        let client = self.connector.connect()?;

        // Step 1: session room.
        self.run_step(CallStep::CreateRoom, None, {
            let client = Arc::clone(&client);
            let name = room_name.clone();
            async move {
                client.create_room(RoomSpec { name }).await?;
                Ok(())
            }
        })
        .await?;

        // Step 2: agent binding. The empty-name skip is unreachable through
        // the public surface (agent_name is validated non-empty) but mirrors
        // the workflow's defined shape.
        if !params.agent_name.is_empty() {
            let metadata = agent_metadata(&params)?;
            self.run_step(CallStep::BindAgent, Some(&room_name), {
                let client = Arc::clone(&client);
                let spec = AgentBindingSpec {
                    agent_name: params.agent_name.clone(),
                    room_name: room_name.clone(),
                    metadata,
                };
                async move { client.create_agent_binding(spec).await }
            })
            .await?;
        }

        // Step 3: dial the remote party into the room.
        let participant_id = {
            let spec = ParticipantSpec {
                trunk_id: params.trunk_id.clone(),
                call_to: params.to_number.clone(),
                caller_number: params.from_number.clone(),
                room_name: room_name.clone(),
                identity: format!("caller-{}", call_id),
                display_name: format!("Outbound Call to {}", params.to_number),
                ring: true,
            };
            let client_for_step = Arc::clone(&client);
            let participant = self
                .bridge
                .submit(async move { client_for_step.create_call_participant(spec).await })
                .await
                .map_err(|source| {
                    step_failure(CallStep::AttachParticipant, Some(&room_name), source)
                })?;
            participant.participant_id
        };

        info!(
            target: "tc.services.calls",
            call_id = %call_id,
            room_name = %room_name,
            participant_id = %participant_id,
            "Placed outbound call"
        );

        Ok(OutboundCallPlacement {
            room_name,
            call_id,
            participant_id,
        })
    }

    async fn run_step<F>(
        &self,
        step: CallStep,
        room_name: Option<&str>,
        operation: F,
    ) -> Result<(), TelephonyError>
    where
        F: std::future::Future<Output = Result<(), TelephonyError>> + Send + 'static,
    {
        self.bridge
            .submit(operation)
            .await
            .map_err(|source| step_failure(step, room_name, source))
    }
}

/// Short correlation id: first 8 hex characters of a fresh UUID.
fn new_call_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn validate(params: &OutboundCallParams) -> Result<(), TelephonyError> {
    let missing = [
        ("from_number", &params.from_number),
        ("to_number", &params.to_number),
        ("trunk_id", &params.trunk_id),
        ("agent_name", &params.agent_name),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
    .collect::<Vec<_>>();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TelephonyError::InvalidInput(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

fn agent_metadata(params: &OutboundCallParams) -> Result<String, TelephonyError> {
    if params.agent_config_id.is_none() && params.organization_id.is_none() {
        return Ok(String::new());
    }
    serde_json::to_string(&CallAgentMetadata {
        agent_config_id: params.agent_config_id.as_deref(),
        organization_id: params.organization_id.as_deref(),
    })
    .map_err(|_| TelephonyError::Internal)
}

fn step_failure(
    step: CallStep,
    room_name: Option<&str>,
    source: TelephonyError,
) -> TelephonyError {
    TelephonyError::CallSetup {
        step,
        room_name: room_name.map(ToString::to_string),
        source: Box::new(source),
    }
}
