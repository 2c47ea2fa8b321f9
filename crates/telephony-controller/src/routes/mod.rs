//! HTTP routes for the Telephony Controller.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::services::platform_client::PlatformConnector;
use crate::services::{
    Credentials, DispatchRuleService, OperationBridge, OutboundCallService, TrunkService,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Outer request timeout; longer than the platform deadline so the worker
/// pool, not the HTTP layer, decides timeouts for platform work.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Trunk provisioning service.
    pub trunks: TrunkService,

    /// Dispatch rule service.
    pub dispatch: DispatchRuleService,

    /// Outbound call service.
    pub calls: OutboundCallService,
}

impl AppState {
    /// Build application state over a platform connector.
    ///
    /// All services share one [`OperationBridge`] so the platform concurrency
    /// bound is global, not per-service.
    #[must_use]
    pub fn new(config: Config, connector: Arc<dyn PlatformConnector>) -> Self {
        let credentials = Credentials::from_config(&config);
        let bridge = OperationBridge::new(config.pool_size, config.call_deadline);

        Self {
            trunks: TrunkService::new(
                credentials.clone(),
                Arc::clone(&connector),
                bridge.clone(),
            ),
            dispatch: DispatchRuleService::new(
                credentials.clone(),
                Arc::clone(&connector),
                bridge.clone(),
            ),
            calls: OutboundCallService::new(credentials, connector, bridge),
            config,
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/v1/health` - Liveness probe
/// - `/v1/telephony/trunks/{inbound,outbound}` - Trunk list/create
/// - `/v1/telephony/trunks/:trunk_id` - Trunk delete
/// - `/v1/telephony/dispatch-rules` - Rule list/create
/// - `/v1/telephony/dispatch-rules/:rule_id` - Rule delete
/// - `/v1/telephony/calls` - Outbound call workflow
/// - TraceLayer for request logging
/// - 60 second request timeout
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health_check))
        .route(
            "/v1/telephony/trunks/inbound",
            get(handlers::list_inbound_trunks).post(handlers::create_inbound_trunk),
        )
        .route(
            "/v1/telephony/trunks/outbound",
            get(handlers::list_outbound_trunks).post(handlers::create_outbound_trunk),
        )
        .route(
            "/v1/telephony/trunks/:trunk_id",
            delete(handlers::delete_trunk),
        )
        .route(
            "/v1/telephony/dispatch-rules",
            get(handlers::list_dispatch_rules).post(handlers::create_dispatch_rule),
        )
        .route(
            "/v1/telephony/dispatch-rules/:rule_id",
            delete(handlers::delete_dispatch_rule),
        )
        .route("/v1/telephony/calls", post(handlers::place_outbound_call))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
}
