//! Dispatch rule handlers.
//!
//! Implements dispatch rule endpoints:
//!
//! - `GET  /v1/telephony/dispatch-rules` - List dispatch rules
//! - `POST /v1/telephony/dispatch-rules` - Create dispatch rule
//! - `DELETE /v1/telephony/dispatch-rules/{rule_id}` - Delete a rule

use crate::errors::TelephonyError;
use crate::models::{CreateDispatchRuleRequest, RuleListResponse};
use crate::routes::AppState;
use crate::services::platform_client::DispatchRuleInfo;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::types::TenantContext;
use std::sync::Arc;
use tracing::info;

/// Handler for `POST /v1/telephony/dispatch-rules`.
pub async fn create_dispatch_rule(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDispatchRuleRequest>,
) -> Result<(StatusCode, Json<DispatchRuleInfo>), TelephonyError> {
    info!(
        target: "tc.handlers.dispatch",
        agent_name = %request.agent_name,
        trunk_count = request.trunk_ids.len(),
        "Dispatch rule creation requested"
    );

    let tenant = TenantContext::new(request.user_id, request.organization_id);
    let rule = state
        .dispatch
        .create(
            request.agent_name,
            request.trunk_ids,
            request.phone_numbers,
            tenant,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

/// Handler for `GET /v1/telephony/dispatch-rules`.
pub async fn list_dispatch_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RuleListResponse>, TelephonyError> {
    let rules = state.dispatch.list().await?;
    Ok(Json(RuleListResponse { rules }))
}

/// Handler for `DELETE /v1/telephony/dispatch-rules/{rule_id}`.
pub async fn delete_dispatch_rule(
    State(state): State<Arc<AppState>>,
    Path(rule_id): Path<String>,
) -> Result<StatusCode, TelephonyError> {
    state.dispatch.delete(&rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
