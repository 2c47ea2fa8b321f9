//! Common data types for Trunkline components.

use serde::{Deserialize, Serialize};

/// Sentinel used where tenant fields are absent but the platform expects a value.
pub const UNKNOWN_TENANT: &str = "unknown";

/// Tenant correlation context attached to provisioned resources.
///
/// Both fields are optional: unattributed resources are stamped with the
/// `"unknown"` sentinel at the platform boundary so downstream log
/// correlation never sees empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    /// User that requested the resource.
    pub user_id: Option<String>,

    /// Organization that owns the resource.
    pub organization_id: Option<String>,
}

impl TenantContext {
    /// Create a context from optional user and organization ids.
    #[must_use]
    pub fn new(user_id: Option<String>, organization_id: Option<String>) -> Self {
        Self {
            user_id,
            organization_id,
        }
    }

    /// User id, or the `"unknown"` sentinel.
    #[must_use]
    pub fn user_or_unknown(&self) -> &str {
        self.user_id.as_deref().unwrap_or(UNKNOWN_TENANT)
    }

    /// Organization id, or the `"unknown"` sentinel.
    #[must_use]
    pub fn org_or_unknown(&self) -> &str {
        self.organization_id.as_deref().unwrap_or(UNKNOWN_TENANT)
    }

    /// First 8 characters of the organization id, used in display names.
    ///
    /// Returns the whole id when it is shorter than 8 characters.
    #[must_use]
    pub fn org_short(&self) -> Option<&str> {
        self.organization_id
            .as_deref()
            .map(|org| org.get(..8).unwrap_or(org))
    }
}
