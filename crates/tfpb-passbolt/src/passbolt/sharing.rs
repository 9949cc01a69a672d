//! Sharing for Passbolt resources.
//!
//! Endpoints:
//! - `PUT  /share/resource/{id}.json`          : update resource permissions
//! - `POST /share/simulate/resource/{id}.json` : dry-run, reports users gaining access

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::types::*;
use log::{debug, info};

/// Access request object kinds accepted in permission changes.
pub mod aro {
    pub const USER: &str = "User";
    pub const GROUP: &str = "Group";
}

/// Sharing API operations.
pub struct PassboltSharing;

impl PassboltSharing {
    /// Share a resource with users/groups.
    pub async fn share_resource(
        client: &PassboltApiClient,
        resource_id: &str,
        request: &ShareRequest,
    ) -> Result<(), PassboltError> {
        info!(
            "Sharing resource {} with {} permission changes and {} secrets",
            resource_id,
            request.permissions.len(),
            request.secrets.as_ref().map_or(0, |s| s.len())
        );
        let _: ApiResponse<serde_json::Value> = client
            .put(&format!("/share/resource/{}.json", resource_id), request)
            .await?;
        info!("Resource {} shared successfully", resource_id);
        Ok(())
    }

    /// Simulate sharing changes for a resource (to determine needed secrets).
    pub async fn simulate_share_resource(
        client: &PassboltApiClient,
        resource_id: &str,
        request: &ShareRequest,
    ) -> Result<ShareSimulateResult, PassboltError> {
        debug!("Simulating share for resource {}", resource_id);
        let resp: ApiResponse<ShareSimulateResult> = client
            .post(
                &format!("/share/simulate/resource/{}.json", resource_id),
                request,
            )
            .await?;
        Ok(resp.body)
    }

    /// A new permission entry for `aro_foreign_key`.
    pub fn build_permission(
        aro_type: &str,
        aro_foreign_key: &str,
        permission_type: i32,
    ) -> PermissionChange {
        PermissionChange {
            aro: aro_type.to_string(),
            aro_foreign_key: aro_foreign_key.to_string(),
            permission_type,
            is_new: true,
        }
    }

    /// Build a read-only permission entry.
    pub fn build_read_permission(aro_type: &str, aro_foreign_key: &str) -> PermissionChange {
        Self::build_permission(aro_type, aro_foreign_key, permission_types::READ)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
