//! Health check handler.
//!
//! `/v1/health` is a liveness probe: it answers while the process is serving
//! and checks no dependencies. Platform reachability is not part of health;
//! an unconfigured or unreachable platform surfaces per-request instead.

use crate::models::HealthResponse;
use axum::Json;

/// Handler for `GET /v1/health`.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "telephony-controller",
        version: env!("CARGO_PKG_VERSION"),
    })
}
