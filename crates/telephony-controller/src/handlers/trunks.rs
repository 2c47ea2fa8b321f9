//! Trunk handlers.
//!
//! Implements trunk endpoints:
//!
//! - `GET  /v1/telephony/trunks/inbound` - List inbound trunks
//! - `POST /v1/telephony/trunks/inbound` - Create inbound trunk
//! - `GET  /v1/telephony/trunks/outbound` - List outbound trunks
//! - `POST /v1/telephony/trunks/outbound` - Create outbound trunk
//! - `DELETE /v1/telephony/trunks/{trunk_id}` - Delete a trunk

use crate::errors::TelephonyError;
use crate::models::{CreateInboundTrunkRequest, CreateOutboundTrunkRequest, TrunkListResponse};
use crate::routes::AppState;
use crate::services::platform_client::TrunkInfo;
use crate::services::TrunkAuth;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::secret::SecretString;
use common::types::TenantContext;
use std::sync::Arc;
use tracing::info;

/// Handler for `POST /v1/telephony/trunks/inbound`.
pub async fn create_inbound_trunk(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateInboundTrunkRequest>,
) -> Result<(StatusCode, Json<TrunkInfo>), TelephonyError> {
    info!(
        target: "tc.handlers.trunks",
        number_count = request.phone_numbers.len(),
        "Inbound trunk creation requested"
    );

    let tenant = TenantContext::new(request.user_id, request.organization_id);
    let trunk = state
        .trunks
        .create_inbound(request.phone_numbers, tenant)
        .await?;

    Ok((StatusCode::CREATED, Json(trunk)))
}

/// Handler for `GET /v1/telephony/trunks/inbound`.
pub async fn list_inbound_trunks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TrunkListResponse>, TelephonyError> {
    let trunks = state.trunks.list_inbound().await?;
    Ok(Json(TrunkListResponse { trunks }))
}

/// Handler for `POST /v1/telephony/trunks/outbound`.
pub async fn create_outbound_trunk(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOutboundTrunkRequest>,
) -> Result<(StatusCode, Json<TrunkInfo>), TelephonyError> {
    info!(
        target: "tc.handlers.trunks",
        sip_domain = %request.sip_domain,
        number_count = request.phone_numbers.len(),
        "Outbound trunk creation requested"
    );

    let auth = TrunkAuth {
        username: request.username,
        password: SecretString::from(request.password),
    };
    let tenant = TenantContext::new(request.user_id, request.organization_id);
    let trunk = state
        .trunks
        .create_outbound(
            auth,
            request.sip_domain,
            request.phone_numbers,
            request.port,
            tenant,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(trunk)))
}

/// Handler for `GET /v1/telephony/trunks/outbound`.
pub async fn list_outbound_trunks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TrunkListResponse>, TelephonyError> {
    let trunks = state.trunks.list_outbound().await?;
    Ok(Json(TrunkListResponse { trunks }))
}

/// Handler for `DELETE /v1/telephony/trunks/{trunk_id}`.
pub async fn delete_trunk(
    State(state): State<Arc<AppState>>,
    Path(trunk_id): Path<String>,
) -> Result<StatusCode, TelephonyError> {
    state.trunks.delete(&trunk_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
