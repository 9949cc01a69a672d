//! Folder CRUD operations for Passbolt.
//!
//! Endpoints:
//! - `GET  /folders.json`        : list folders
//! - `POST /folders.json`        : create a folder
//! - `GET  /folders/{id}.json`   : get a single folder
//! - `DELETE /folders/{id}.json` : delete a folder

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::types::*;
use log::{debug, info};

/// Folder API operations.
pub struct PassboltFolders;

impl PassboltFolders {
    /// List every folder visible to the session.
    pub async fn list(client: &PassboltApiClient) -> Result<Vec<Folder>, PassboltError> {
        let resp: ApiResponse<Vec<Folder>> = client.get("/folders.json").await?;
        debug!("Listed {} folders", resp.body.len());
        Ok(resp.body)
    }

    /// Get a single folder by ID.
    pub async fn get(client: &PassboltApiClient, folder_id: &str) -> Result<Folder, PassboltError> {
        let resp: ApiResponse<Folder> = client
            .get(&format!("/folders/{}.json", folder_id))
            .await?;
        Ok(resp.body)
    }

    /// Create a new folder.
    pub async fn create(
        client: &PassboltApiClient,
        request: &CreateFolderRequest,
    ) -> Result<Folder, PassboltError> {
        info!("Creating folder: {}", request.name);
        let resp: ApiResponse<Folder> = client.post("/folders.json", request).await?;
        info!("Created folder {}", resp.body.id);
        Ok(resp.body)
    }

    /// Delete a folder. Contents move up to the parent.
    pub async fn delete(client: &PassboltApiClient, folder_id: &str) -> Result<(), PassboltError> {
        info!("Deleting folder {}", folder_id);
        client
            .delete_void(&format!("/folders/{}.json", folder_id))
            .await
    }
}

// ── Tests ───────────────────────────────────────────────────────────
