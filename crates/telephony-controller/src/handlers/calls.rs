//! Outbound call handler.
//!
//! `POST /v1/telephony/calls` runs the three-step call workflow. A 201 means
//! the dialed party was attached to a live room with the agent already bound;
//! any other outcome is an error, possibly with partial-state detail.

use crate::errors::TelephonyError;
use crate::models::OutboundCallRequest;
use crate::routes::AppState;
use crate::services::{OutboundCallParams, OutboundCallPlacement};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

/// Handler for `POST /v1/telephony/calls`.
pub async fn place_outbound_call(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OutboundCallRequest>,
) -> Result<(StatusCode, Json<OutboundCallPlacement>), TelephonyError> {
    info!(
        target: "tc.handlers.calls",
        trunk_id = %request.trunk_id,
        agent_name = %request.agent_name,
        "Outbound call requested"
    );

    let placement = state
        .calls
        .place_call(OutboundCallParams {
            from_number: request.from_number,
            to_number: request.to_number,
            trunk_id: request.trunk_id,
            agent_name: request.agent_name,
            agent_config_id: request.agent_config_id,
            organization_id: request.organization_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(placement)))
}
