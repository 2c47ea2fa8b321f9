//! HTTP platform client tests against a wiremock server.
//!
//! Covers the request shape (bearer token, paths), success parsing, and the
//! fault mapping (404 vs everything else, bodies forwarded verbatim).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use common::secret::SecretString;
use std::sync::Arc;
use telephony_controller::errors::TelephonyError;
use telephony_controller::services::platform_client::{
    HttpPlatformConnector, InboundTrunkSpec, PlatformApi, PlatformConnector, RoomSpec,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Arc<dyn PlatformApi> {
    HttpPlatformConnector::new(
        server.uri(),
        "APIkey123".to_string(),
        SecretString::from("s3cret"),
    )
    .connect()
    .expect("connector should build a client")
}

fn inbound_spec() -> InboundTrunkSpec {
    InboundTrunkSpec {
        name: "Inbound Trunk".to_string(),
        numbers: vec!["+15105550100".to_string()],
        headers: Default::default(),
    }
}

#[tokio::test]
async fn test_create_inbound_trunk_sends_bearer_token() -> Result<(), anyhow::Error> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sip/inbound-trunks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "trunk_id": "ST_1234",
            "name": "Inbound Trunk",
            "numbers": ["+15105550100"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let trunk = client.create_inbound_trunk(inbound_spec()).await?;
    assert_eq!(trunk.trunk_id, "ST_1234");

    // Each request carries a freshly minted JWT in the Authorization header.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let auth = requests
        .first()
        .and_then(|r| r.headers.get("authorization"))
        .expect("authorization header should be present")
        .to_str()?;
    assert!(auth.starts_with("Bearer "));
    // HS256 JWTs are three dot-separated segments.
    assert_eq!(auth.trim_start_matches("Bearer ").split('.').count(), 3);

    Ok(())
}

#[tokio::test]
async fn test_list_parses_items_envelope() -> Result<(), anyhow::Error> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sip/outbound-trunks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {
                    "trunk_id": "ST_1",
                    "name": "Org 9f8e7d6c Outbound",
                    "numbers": ["+15105550100"],
                    "address": "sip.magnus.example:5060"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let trunks = client.list_outbound_trunks().await?;
    assert_eq!(trunks.len(), 1);
    let address = trunks.first().and_then(|t| t.address.as_deref());
    assert_eq!(address, Some("sip.magnus.example:5060"));

    Ok(())
}

#[tokio::test]
async fn test_list_with_empty_body_defaults_to_no_items() -> Result<(), anyhow::Error> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sip/inbound-trunks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let trunks = client.list_inbound_trunks().await?;
    assert!(trunks.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_error_body_forwarded_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/rooms"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string("twirp error: room quota exceeded"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .create_room(RoomSpec {
            name: "outbound-1a2b3c4d".to_string(),
        })
        .await;

    assert!(
        matches!(result, Err(TelephonyError::Remote(msg)) if msg == "twirp error: room quota exceeded")
    );
}

#[tokio::test]
async fn test_404_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/sip/trunks/ST_404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("trunk ST_404 does not exist"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.delete_trunk("ST_404").await;

    assert!(
        matches!(result, Err(TelephonyError::NotFound(msg)) if msg == "trunk ST_404 does not exist")
    );
}

#[tokio::test]
async fn test_delete_success_returns_unit() -> Result<(), anyhow::Error> {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/sip/dispatch-rules/rule-1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_dispatch_rule("rule-1").await?;

    Ok(())
}
