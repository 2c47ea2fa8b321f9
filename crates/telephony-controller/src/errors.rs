//! Telephony Controller error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse`
//! impl. Platform fault messages are forwarded to clients verbatim (they are
//! operator-facing, not end-user-facing); they are never parsed for control
//! decisions. Multi-step call setup failures additionally carry the failing
//! step and any resource ids already created so a caller can reconcile
//! manually - the orchestrator performs no rollback.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Steps of the outbound call workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStep {
    /// Create the session room.
    CreateRoom,
    /// Bind the handling agent to the room.
    BindAgent,
    /// Attach the dialed party as a SIP participant.
    AttachParticipant,
}

impl fmt::Display for CallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallStep::CreateRoom => "create_room",
            CallStep::BindAgent => "bind_agent",
            CallStep::AttachParticipant => "attach_participant",
        };
        f.write_str(name)
    }
}

/// Telephony Controller error type.
///
/// Maps to HTTP status codes:
/// - InvalidInput: 400 Bad Request
/// - NotFound: 404 Not Found
/// - Internal: 500 Internal Server Error
/// - Remote: 502 Bad Gateway
/// - NotConfigured: 503 Service Unavailable
/// - Timeout: 504 Gateway Timeout
/// - CallSetup: status of the wrapped source error
#[derive(Debug, Error)]
pub enum TelephonyError {
    /// Platform credentials are absent; no network call was attempted.
    #[error("Platform credentials not configured")]
    NotConfigured,

    /// Caller data violates a stated precondition.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The platform returned a fault; message forwarded verbatim.
    #[error("Platform error: {0}")]
    Remote(String),

    /// The per-call deadline elapsed. The in-flight platform operation is
    /// not cancelled and may still complete.
    #[error("Platform call deadline exceeded")]
    Timeout,

    /// The platform reported an unknown resource id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected internal failure (client build, serialization).
    #[error("Internal error")]
    Internal,

    /// An outbound call workflow step failed. Resources created by earlier
    /// steps are left in place.
    #[error("Call setup failed at step {step}: {source}")]
    CallSetup {
        /// The step at which the fault occurred.
        step: CallStep,
        /// Room created before the fault, if any.
        room_name: Option<String>,
        /// The underlying fault.
        #[source]
        source: Box<TelephonyError>,
    },
}

impl TelephonyError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            TelephonyError::InvalidInput(_) => 400,
            TelephonyError::NotFound(_) => 404,
            TelephonyError::Internal => 500,
            TelephonyError::Remote(_) => 502,
            TelephonyError::NotConfigured => 503,
            TelephonyError::Timeout => 504,
            TelephonyError::CallSetup { source, .. } => source.status_code(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            TelephonyError::NotConfigured => "NOT_CONFIGURED",
            TelephonyError::InvalidInput(_) => "INVALID_INPUT",
            TelephonyError::Remote(_) => "PLATFORM_ERROR",
            TelephonyError::Timeout => "TIMEOUT",
            TelephonyError::NotFound(_) => "NOT_FOUND",
            TelephonyError::Internal => "INTERNAL_ERROR",
            TelephonyError::CallSetup { source, .. } => source.code(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<CallSetupDetail>,
}

/// Partial-state detail attached to call setup failures.
#[derive(Serialize)]
struct CallSetupDetail {
    step: CallStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_name: Option<String>,
}

impl IntoResponse for TelephonyError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self {
            TelephonyError::Remote(message) => {
                tracing::warn!(target: "tc.errors", error = %message, "Platform fault");
            }
            TelephonyError::Timeout => {
                tracing::warn!(target: "tc.errors", "Platform call deadline exceeded");
            }
            TelephonyError::Internal => {
                tracing::error!(target: "tc.errors", "Internal error");
            }
            TelephonyError::CallSetup {
                step,
                room_name,
                source,
            } => {
                tracing::warn!(
                    target: "tc.errors",
                    step = %step,
                    room_name = room_name.as_deref(),
                    error = %source,
                    "Call setup failed"
                );
            }
            _ => {}
        }

        let detail = match &self {
            TelephonyError::CallSetup {
                step, room_name, ..
            } => Some(CallSetupDetail {
                step: *step,
                room_name: room_name.clone(),
            }),
            _ => None,
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                detail,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    // Helper function to read the response body as JSON
    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_not_configured() {
        let error = TelephonyError::NotConfigured;
        assert_eq!(format!("{}", error), "Platform credentials not configured");
    }

    #[test]
    fn test_display_invalid_input() {
        let error = TelephonyError::InvalidInput("phone_numbers must not be empty".to_string());
        assert_eq!(
            format!("{}", error),
            "Invalid input: phone_numbers must not be empty"
        );
    }

    #[test]
    fn test_display_remote() {
        let error = TelephonyError::Remote("trunk quota exceeded".to_string());
        assert_eq!(format!("{}", error), "Platform error: trunk quota exceeded");
    }

    #[test]
    fn test_display_call_setup() {
        let error = TelephonyError::CallSetup {
            step: CallStep::AttachParticipant,
            room_name: Some("outbound-1a2b3c4d".to_string()),
            source: Box::new(TelephonyError::Remote("no such trunk".to_string())),
        };
        assert_eq!(
            format!("{}", error),
            "Call setup failed at step attach_participant: Platform error: no such trunk"
        );
    }

    #[test]
    fn test_step_display_names() {
        assert_eq!(CallStep::CreateRoom.to_string(), "create_room");
        assert_eq!(CallStep::BindAgent.to_string(), "bind_agent");
        assert_eq!(
            CallStep::AttachParticipant.to_string(),
            "attach_participant"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TelephonyError::NotConfigured.status_code(), 503);
        assert_eq!(
            TelephonyError::InvalidInput("x".to_string()).status_code(),
            400
        );
        assert_eq!(TelephonyError::Remote("x".to_string()).status_code(), 502);
        assert_eq!(TelephonyError::Timeout.status_code(), 504);
        assert_eq!(TelephonyError::NotFound("x".to_string()).status_code(), 404);
        assert_eq!(TelephonyError::Internal.status_code(), 500);
    }

    #[test]
    fn test_call_setup_status_follows_source() {
        let error = TelephonyError::CallSetup {
            step: CallStep::CreateRoom,
            room_name: None,
            source: Box::new(TelephonyError::Timeout),
        };
        assert_eq!(error.status_code(), 504);
    }

    #[tokio::test]
    async fn test_into_response_invalid_input() {
        let error = TelephonyError::InvalidInput("trunk_id required".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "INVALID_INPUT");
        assert_eq!(
            body_json["error"]["message"],
            "Invalid input: trunk_id required"
        );
        assert!(body_json["error"].get("detail").is_none());
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let error = TelephonyError::NotFound("trunk ST_404".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_into_response_not_configured() {
        let error = TelephonyError::NotConfigured;
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_into_response_timeout() {
        let error = TelephonyError::Timeout;
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "TIMEOUT");
    }

    #[tokio::test]
    async fn test_into_response_call_setup_carries_detail() {
        let error = TelephonyError::CallSetup {
            step: CallStep::AttachParticipant,
            room_name: Some("outbound-1a2b3c4d".to_string()),
            source: Box::new(TelephonyError::Remote("no such trunk".to_string())),
        };
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "PLATFORM_ERROR");
        assert_eq!(body_json["error"]["detail"]["step"], "attach_participant");
        assert_eq!(
            body_json["error"]["detail"]["room_name"],
            "outbound-1a2b3c4d"
        );
    }
}
