//! SIP trunk provisioning.
//!
//! Creates, lists, and deletes inbound and outbound trunks on the telephony
//! platform. The platform holds the authoritative copy of every trunk; this
//! service keeps no local state. Trunks are stamped with tenant-correlation
//! headers so downstream call logs can be attributed without a lookup.

use crate::errors::TelephonyError;
use crate::services::bridge::OperationBridge;
use crate::services::credentials::Credentials;
use crate::services::platform_client::{
    InboundTrunkSpec, OutboundTrunkSpec, PlatformConnector, TrunkInfo,
};
use common::secret::{ExposeSecret, SecretString};
use common::types::TenantContext;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Default SIP signaling port.
pub const DEFAULT_SIP_PORT: u16 = 5060;

/// SIP auth credentials for an outbound trunk.
#[derive(Debug, Clone)]
pub struct TrunkAuth {
    /// Carrier-side username.
    pub username: String,

    /// Carrier-side password; redacted in Debug.
    pub password: SecretString,
}

/// Trunk provisioning service.
#[derive(Clone)]
pub struct TrunkService {
    credentials: Credentials,
    connector: Arc<dyn PlatformConnector>,
    bridge: OperationBridge,
}

impl TrunkService {
    /// Create a trunk service over the given platform connector.
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

    /// Create an inbound trunk for receiving calls to `numbers`.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` when platform credentials are missing
    /// - `InvalidInput` when `numbers` is empty
    /// - `Remote`/`Timeout` from the platform call
    #[instrument(skip(self, tenant), fields(number_count = numbers.len()))]
    pub async fn create_inbound(
        &self,
        numbers: Vec<String>,
        tenant: TenantContext,
    ) -> Result<TrunkInfo, TelephonyError> {
        self.credentials.ensure_configured()?;
        if numbers.is_empty() {
            return Err(TelephonyError::InvalidInput(
                "at least one phone number is required".to_string(),
            ));
        }

        let spec = InboundTrunkSpec {
            name: inbound_trunk_name(&tenant),
            numbers,
            headers: correlation_headers(&tenant),
        };

        let client = self.connector.connect()?;
        let trunk = self
            .bridge
            .submit(async move { client.create_inbound_trunk(spec).await })
            .await?;

        info!(
            target: "tc.services.trunks",
            trunk_id = %trunk.trunk_id,
            org_id = %tenant.org_or_unknown(),
            "Created inbound trunk"
        );

        Ok(trunk)
    }

    /// Create an outbound trunk for dialing through a carrier.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` when platform credentials are missing
    /// - `InvalidInput` when `numbers` is empty
    /// - `Remote`/`Timeout` from the platform call
    #[instrument(skip(self, auth, tenant), fields(sip_domain = %sip_domain, number_count = numbers.len()))]
    pub async fn create_outbound(
        &self,
        auth: TrunkAuth,
        sip_domain: String,
        numbers: Vec<String>,
        port: u16,
        tenant: TenantContext,
    ) -> Result<TrunkInfo, TelephonyError> {
        self.credentials.ensure_configured()?;
        if numbers.is_empty() {
            return Err(TelephonyError::InvalidInput(
                "at least one phone number is required".to_string(),
            ));
        }

        let spec = OutboundTrunkSpec {
            name: outbound_trunk_name(&tenant),
            address: format!("{}:{}", sip_domain, port),
            auth_username: auth.username,
            auth_password: auth.password.expose_secret().to_string(),
            numbers,
        };

        let client = self.connector.connect()?;
        let trunk = self
            .bridge
            .submit(async move { client.create_outbound_trunk(spec).await })
            .await?;

        info!(
            target: "tc.services.trunks",
            trunk_id = %trunk.trunk_id,
            org_id = %tenant.org_or_unknown(),
            "Created outbound trunk"
        );

        Ok(trunk)
    }

    /// List inbound trunks in platform order.
    #[instrument(skip(self))]
    pub async fn list_inbound(&self) -> Result<Vec<TrunkInfo>, TelephonyError> {
        self.credentials.ensure_configured()?;
        let client = self.connector.connect()?;
        self.bridge
            .submit(async move { client.list_inbound_trunks().await })
            .await
    }

    /// List outbound trunks in platform order.
    #[instrument(skip(self))]
    pub async fn list_outbound(&self) -> Result<Vec<TrunkInfo>, TelephonyError> {
        self.credentials.ensure_configured()?;
        let client = self.connector.connect()?;
        self.bridge
            .submit(async move { client.list_outbound_trunks().await })
            .await
    }

    /// Delete a trunk by platform id.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the platform does not recognize the id
    #[instrument(skip(self), fields(trunk_id = %trunk_id))]
    pub async fn delete(&self, trunk_id: &str) -> Result<(), TelephonyError> {
        self.credentials.ensure_configured()?;
        if trunk_id.is_empty() {
            return Err(TelephonyError::InvalidInput(
                "trunk_id is required".to_string(),
            ));
        }

        let client = self.connector.connect()?;
        let id = trunk_id.to_string();
        self.bridge
            .submit(async move { client.delete_trunk(&id).await })
            .await?;

        info!(target: "tc.services.trunks", trunk_id = %trunk_id, "Deleted trunk");
        Ok(())
    }
}

/// Display name for an inbound trunk.
fn inbound_trunk_name(tenant: &TenantContext) -> String {
    match tenant.org_short() {
        Some(org) => format!("Org {} Inbound", org),
        None => "Inbound Trunk".to_string(),
    }
}

/// Display name for an outbound trunk.
fn outbound_trunk_name(tenant: &TenantContext) -> String {
    match tenant.org_short() {
        Some(org) => format!("Org {} Outbound", org),
        None => "Outbound Trunk".to_string(),
    }
}

/// Tenant-correlation headers stamped onto inbound trunks. Tag values are
/// opaque to the platform and are not validated here.
fn correlation_headers(tenant: &TenantContext) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("X-Platform".to_string(), "trunkline".to_string()),
        ("X-User-ID".to_string(), tenant.user_or_unknown().to_string()),
        ("X-Org-ID".to_string(), tenant.org_or_unknown().to_string()),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::services::platform_client::mock::{MockConnector, MockPlatform};

    fn configured_credentials() -> Credentials {
        Credentials {
            endpoint: "https://rtc.example.com".to_string(),
            api_key: "APIkey".to_string(),
            api_secret: SecretString::from("secret"),
        }
    }

    fn unconfigured_credentials() -> Credentials {
        Credentials {
            endpoint: String::new(),
            api_key: "APIkey".to_string(),
            api_secret: SecretString::from("secret"),
        }
    }

    fn service(credentials: Credentials, platform: &Arc<MockPlatform>) -> TrunkService {
        TrunkService::new(
            credentials,
            Arc::new(MockConnector::new(Arc::clone(platform))),
            OperationBridge::with_defaults(),
        )
    }

    fn auth() -> TrunkAuth {
        TrunkAuth {
            username: "magnus-4821".to_string(),
            password: SecretString::from("hunter2"),
        }
    }

    #[tokio::test]
    async fn test_create_inbound_round_trips_numbers() {
        let platform = MockPlatform::new();
        let svc = service(configured_credentials(), &platform);

        let mut numbers = vec![
            "+15105550100".to_string(),
            "+15105550101".to_string(),
            "+15105550102".to_string(),
        ];
        let trunk = svc
            .create_inbound(numbers.clone(), TenantContext::default())
            .await
            .unwrap();

        // Order-insensitive equality with the input set.
        let mut returned = trunk.numbers.clone();
        returned.sort();
        numbers.sort();
        assert_eq!(returned, numbers);
        assert!(!trunk.trunk_id.is_empty());
    }

    #[tokio::test]
    async fn test_create_inbound_rejects_empty_numbers() {
        let platform = MockPlatform::new();
        let svc = service(configured_credentials(), &platform);

        let result = svc.create_inbound(Vec::new(), TenantContext::default()).await;

        assert!(matches!(result, Err(TelephonyError::InvalidInput(_))));
        assert_eq!(platform.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_outbound_builds_address_from_domain_and_port() {
        let platform = MockPlatform::new();
        let svc = service(configured_credentials(), &platform);

        let trunk = svc
            .create_outbound(
                auth(),
                "sip.magnus.example".to_string(),
                vec!["+15105550100".to_string()],
                DEFAULT_SIP_PORT,
                TenantContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(trunk.address.as_deref(), Some("sip.magnus.example:5060"));
    }

    #[tokio::test]
    async fn test_create_outbound_rejects_empty_numbers() {
        let platform = MockPlatform::new();
        let svc = service(configured_credentials(), &platform);

        let result = svc
            .create_outbound(
                auth(),
                "sip.magnus.example".to_string(),
                Vec::new(),
                DEFAULT_SIP_PORT,
                TenantContext::default(),
            )
            .await;

        assert!(matches!(result, Err(TelephonyError::InvalidInput(_))));
        assert_eq!(platform.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_credentials_block_every_operation() {
        let platform = MockPlatform::new();
        let svc = service(unconfigured_credentials(), &platform);

        let create = svc
            .create_inbound(vec!["+15105550100".to_string()], TenantContext::default())
            .await;
        assert!(matches!(create, Err(TelephonyError::NotConfigured)));

        assert!(matches!(
            svc.list_inbound().await,
            Err(TelephonyError::NotConfigured)
        ));
        assert!(matches!(
            svc.list_outbound().await,
            Err(TelephonyError::NotConfigured)
        ));
        assert!(matches!(
            svc.delete("trunk-1").await,
            Err(TelephonyError::NotConfigured)
        ));

        // The gate fired before any network attempt.
        assert_eq!(platform.call_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_trunk_maps_to_not_found() {
        let platform = MockPlatform::new();
        let svc = service(configured_credentials(), &platform);

        let result = svc.delete("trunk-404").await;
        assert!(matches!(result, Err(TelephonyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_provisioned_trunk_succeeds() {
        let platform = MockPlatform::new();
        let svc = service(configured_credentials(), &platform);

        let trunk = svc
            .create_inbound(vec!["+15105550100".to_string()], TenantContext::default())
            .await
            .unwrap();

        svc.delete(&trunk.trunk_id).await.unwrap();
        assert!(svc.list_inbound().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_fault_message_forwarded_verbatim() {
        let platform = MockPlatform::new();
        platform.fail_with("create_inbound_trunk", "twirp error: trunk quota exceeded");
        let svc = service(configured_credentials(), &platform);

        let result = svc
            .create_inbound(vec!["+15105550100".to_string()], TenantContext::default())
            .await;

        assert!(
            matches!(result, Err(TelephonyError::Remote(msg)) if msg == "twirp error: trunk quota exceeded")
        );
    }

    #[test]
    fn test_trunk_names_embed_org_prefix() {
        let tenant = TenantContext::new(None, Some("9f8e7d6c-5b4a".to_string()));
        assert_eq!(inbound_trunk_name(&tenant), "Org 9f8e7d6c Inbound");
        assert_eq!(outbound_trunk_name(&tenant), "Org 9f8e7d6c Outbound");

        let anonymous = TenantContext::default();
        assert_eq!(inbound_trunk_name(&anonymous), "Inbound Trunk");
        assert_eq!(outbound_trunk_name(&anonymous), "Outbound Trunk");
    }

    #[test]
    fn test_correlation_headers_use_sentinels() {
        let headers = correlation_headers(&TenantContext::default());
        assert_eq!(headers.get("X-User-ID").map(String::as_str), Some("unknown"));
        assert_eq!(headers.get("X-Org-ID").map(String::as_str), Some("unknown"));
        assert_eq!(
            headers.get("X-Platform").map(String::as_str),
            Some("trunkline")
        );
    }
}
