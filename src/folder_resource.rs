//! `passbolt_folder` resource.
//!
//! The parent folder is referenced by name. Any change to the name or the
//! parent recreates the folder under a new id; folders are never modified in
//! place.

use crate::resolver::{resolve_id, ResolveError};
use crate::resource::{error_diagnostics, remote_error, ManagedResource, StateResponse};
use crate::validation::{require_non_empty, VALIDATION_SUMMARY};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tfpb_core::{Attribute, DefaultValue, Diagnostics, Schema, Value};
use tfpb_passbolt::{FolderEntry, NewFolder, PassboltApi};
use tracing::{debug, info, warn};

pub const TYPE_NAME: &str = "passbolt_folder";

/// Plan and state of a folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderModel {
    pub id: Value<String>,
    pub name: String,
    pub personal: Value<bool>,
    /// Name of the parent folder, null at the root.
    pub folder_parent: Value<String>,
}

pub struct FolderResource {
    api: Arc<dyn PassboltApi>,
}

impl FolderResource {
    pub fn new(api: Arc<dyn PassboltApi>) -> Self {
        Self { api }
    }

    /// Id of the configured parent, `None` when the folder sits at the root.
    async fn parent_id(&self, folder_parent: &Value<String>) -> Result<Option<String>, Diagnostics> {
        let Some(name) = folder_parent.known() else {
            return Ok(None);
        };
        let folders = self
            .api
            .list_folders()
            .await
            .map_err(|e| error_diagnostics("Cannot get folders", e.to_string()))?;
        match resolve_id(&folders, name) {
            Ok(id) => Ok(Some(id)),
            Err(ResolveError::NotFound { name, .. }) => Err(error_diagnostics(
                VALIDATION_SUMMARY,
                format!("Parent folder '{}' not found", name),
            )),
        }
    }

    fn validate(plan: &FolderModel) -> Result<(), Diagnostics> {
        require_non_empty(&[("Name", plan.name.as_str())]).map_err(|e| e.to_diagnostics())
    }
}

pub fn schema() -> Schema {
    Schema::new("A Passbolt folder")
        .attribute(
            "id",
            Attribute::string()
                .computed()
                .description("The unique identifier of the folder"),
        )
        .attribute(
            "name",
            Attribute::string()
                .required()
                .description("The name of the folder"),
        )
        .attribute(
            "personal",
            Attribute::bool()
                .optional()
                .computed()
                .default_value(DefaultValue::Bool(false))
                .description("Whether the folder is personal"),
        )
        .attribute(
            "folder_parent",
            Attribute::string()
                .optional()
                .description("The name of the parent folder"),
        )
}

#[async_trait]
impl ManagedResource for FolderResource {
    type Model = FolderModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, plan: FolderModel) -> StateResponse<FolderModel> {
        if let Err(diags) = Self::validate(&plan) {
            return StateResponse::failed(None, diags);
        }
        let folder_parent_id = match self.parent_id(&plan.folder_parent).await {
            Ok(id) => id,
            Err(diags) => return StateResponse::failed(None, diags),
        };

        let created = match self
            .api
            .create_folder(&NewFolder {
                name: plan.name.clone(),
                folder_parent_id,
            })
            .await
        {
            Ok(folder) => folder,
            Err(e) => {
                return StateResponse::failed(
                    None,
                    remote_error(
                        "Error creating folder",
                        "Could not create folder, unexpected error: ",
                        e,
                    ),
                )
            }
        };
        info!(folder_id = %created.id, name = %created.name, "folder created");

        StateResponse::ok(FolderModel {
            id: Value::Known(created.id),
            personal: Value::Known(created.personal),
            ..plan
        })
    }

    async fn read(&self, state: FolderModel) -> StateResponse<FolderModel> {
        let id = state.id.value_str().to_string();
        let folder = match self.api.get_folder(&id).await {
            Ok(folder) => folder,
            Err(e) if e.is_not_found() => {
                info!(folder_id = %id, "folder no longer exists, removing from state");
                return StateResponse::removed();
            }
            Err(e) => {
                return StateResponse::failed(
                    Some(state),
                    remote_error(
                        "Error reading folder",
                        "Could not read folder, unexpected error: ",
                        e,
                    ),
                )
            }
        };
        debug!(folder_id = %id, "folder read");

        let folder_parent = match &folder.folder_parent_id {
            None => Value::Null,
            Some(parent_id) => match self.api.get_folder(parent_id).await {
                Ok(parent) => Value::Known(parent.name),
                Err(e) => {
                    debug!(folder_id = %id, parent_id = %parent_id, error = %e, "parent lookup failed, keeping prior value");
                    state.folder_parent.clone()
                }
            },
        };

        StateResponse::ok(FolderModel {
            id: Value::Known(folder.id),
            name: folder.name,
            personal: Value::Known(folder.personal),
            folder_parent,
        })
    }

    async fn update(&self, plan: FolderModel, state: FolderModel) -> StateResponse<FolderModel> {
        if let Err(diags) = Self::validate(&plan) {
            return StateResponse::failed(Some(state), diags);
        }
        let old_id = state.id.value_str().to_string();
        let current: FolderEntry = match self.api.get_folder(&old_id).await {
            Ok(folder) => folder,
            Err(e) => {
                return StateResponse::failed(
                    Some(state),
                    remote_error(
                        "Error reading current folder",
                        "Could not read current folder, unexpected error: ",
                        e,
                    ),
                )
            }
        };

        let needs_recreation = plan.name != current.name
            || plan.folder_parent.value_str() != state.folder_parent.value_str();
        if !needs_recreation {
            return StateResponse::ok(FolderModel {
                id: state.id,
                personal: state.personal,
                ..plan
            });
        }

        // Resolve before deleting so a bad parent leaves the folder alone.
        let folder_parent_id = match self.parent_id(&plan.folder_parent).await {
            Ok(id) => id,
            Err(diags) => return StateResponse::failed(Some(state), diags),
        };

        if let Err(e) = self.api.delete_folder(&old_id).await {
            return StateResponse::failed(
                Some(state),
                remote_error(
                    "Error deleting old folder",
                    "Could not delete old folder, unexpected error: ",
                    e,
                ),
            );
        }

        match self
            .api
            .create_folder(&NewFolder {
                name: plan.name.clone(),
                folder_parent_id,
            })
            .await
        {
            Ok(created) => {
                info!(old_id = %old_id, folder_id = %created.id, "folder recreated");
                StateResponse::ok(FolderModel {
                    id: Value::Known(created.id),
                    personal: Value::Known(created.personal),
                    ..plan
                })
            }
            Err(e) => {
                warn!(old_id = %old_id, error = %e, "folder deleted but not recreated");
                StateResponse::failed(
                    None,
                    error_diagnostics(
                        "Cannot recreate folder",
                        format!(
                            "Folder {} was deleted but could not be recreated: {}",
                            old_id, e
                        ),
                    ),
                )
            }
        }
    }

    async fn delete(&self, state: FolderModel) -> Diagnostics {
        let id = state.id.value_str();
        match self.api.delete_folder(id).await {
            Ok(()) => {
                info!(folder_id = %id, "folder deleted");
                Diagnostics::new()
            }
            Err(e) => remote_error(
                "Error deleting folder",
                "Could not delete folder, unexpected error: ",
                e,
            ),
        }
    }
}
