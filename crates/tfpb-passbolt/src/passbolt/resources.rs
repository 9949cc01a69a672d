//! Resource (password entry) CRUD operations for Passbolt.
//!
//! Endpoints:
//! - `GET  /resources.json`          : list resources
//! - `POST /resources.json`          : create a resource
//! - `GET  /resources/{id}.json`     : get a resource
//! - `DELETE /resources/{id}.json`   : soft-delete a resource
//! - `GET  /resource-types.json`     : list resource types

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::types::*;
use log::{debug, info};

/// Resource API operations.
pub struct PassboltResources;

impl PassboltResources {
    /// List every resource visible to the session.
    pub async fn list(client: &PassboltApiClient) -> Result<Vec<Resource>, PassboltError> {
        let resp: ApiResponse<Vec<Resource>> = client.get("/resources.json").await?;
        debug!("Listed {} resources", resp.body.len());
        Ok(resp.body)
    }

    /// Get a single resource by ID.
    pub async fn get(
        client: &PassboltApiClient,
        resource_id: &str,
    ) -> Result<Resource, PassboltError> {
        let resp: ApiResponse<Resource> = client
            .get(&format!("/resources/{}.json", resource_id))
            .await?;
        Ok(resp.body)
    }

    /// Create a new resource.
    pub async fn create(
        client: &PassboltApiClient,
        request: &CreateResourceRequest,
    ) -> Result<Resource, PassboltError> {
        info!("Creating resource: {}", request.name);
        let resp: ApiResponse<Resource> = client.post("/resources.json", request).await?;
        info!("Created resource {}", resp.body.id);
        Ok(resp.body)
    }

    /// Delete a resource.
    pub async fn delete(
        client: &PassboltApiClient,
        resource_id: &str,
    ) -> Result<(), PassboltError> {
        info!("Deleting resource {}", resource_id);
        client
            .delete_void(&format!("/resources/{}.json", resource_id))
            .await
    }

    /// List all resource types.
    pub async fn list_types(
        client: &PassboltApiClient,
    ) -> Result<Vec<ResourceType>, PassboltError> {
        let resp: ApiResponse<Vec<ResourceType>> = client.get("/resource-types.json").await?;
        Ok(resp.body)
    }

    /// Pick the type used for new entries: `password-string` when the server
    /// offers it, otherwise `password-and-description`.
    pub fn preferred_type(types: &[ResourceType]) -> Option<&ResourceType> {
        let by_slug = |slug: &str| types.iter().find(|t| t.slug == slug);
        by_slug(resource_type_slugs::PASSWORD_STRING)
            .or_else(|| by_slug(resource_type_slugs::PASSWORD_AND_DESCRIPTION))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
