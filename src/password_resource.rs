//! `passbolt_password` resource.
//!
//! A password entry lives in an optional parent folder and can be shared
//! read-only with one group when it is created. The secret itself is
//! write-only: reads never return it, so the state keeps whatever was last
//! applied.
//!
//! Any change recreates the entry under a new id. A `share_group` change on
//! its own does not, since the share is only issued at creation.

use crate::resolver::{resolve_id, resolve_name, ResolveError};
use crate::resource::{error_diagnostics, remote_error, ManagedResource, StateResponse};
use crate::validation::{require_http_uri, require_non_empty, VALIDATION_SUMMARY};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tfpb_core::{Attribute, Diagnostics, Schema, Value};
use tfpb_passbolt::{
    permission_types, Aro, NewResource, PassboltApi, ResourceEntry, ShareOperation,
};
use tracing::{debug, info, warn};

pub const TYPE_NAME: &str = "passbolt_password";

/// Plan and state of a password entry.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordModel {
    pub id: Value<String>,
    pub name: String,
    pub description: Value<String>,
    pub username: String,
    pub uri: String,
    pub password: String,
    pub folder_parent: Value<String>,
    pub share_group: Value<String>,
}

impl fmt::Debug for PasswordModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordModel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("username", &self.username)
            .field("uri", &self.uri)
            .field("password", &"<redacted>")
            .field("folder_parent", &self.folder_parent)
            .field("share_group", &self.share_group)
            .finish()
    }
}

impl PasswordModel {
    fn validate(&self) -> Result<(), Diagnostics> {
        require_non_empty(&[
            ("Name", self.name.as_str()),
            ("Username", self.username.as_str()),
            ("URI", self.uri.as_str()),
            ("Password", self.password.as_str()),
        ])
        .and_then(|_| require_http_uri(&self.uri))
        .map_err(|e| e.to_diagnostics())
    }

    /// Whether applying `self` over `prior` needs a new entry.
    ///
    /// Name, description, username and uri are compared with the live entry;
    /// the password and parent folder with the recorded state.
    fn differs_from(&self, current: &ResourceEntry, prior: &PasswordModel) -> bool {
        self.name != current.name
            || self.description.value_str() != current.description
            || self.username != current.username
            || self.uri != current.uri
            || self.password != prior.password
            || self.folder_parent.value_str() != prior.folder_parent.value_str()
    }
}

pub struct PasswordResource {
    api: Arc<dyn PassboltApi>,
}

impl PasswordResource {
    pub fn new(api: Arc<dyn PassboltApi>) -> Self {
        Self { api }
    }

    async fn folder_id(&self, folder_parent: &Value<String>) -> Result<Option<String>, Diagnostics> {
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
                format!("Folder '{}' not found", name),
            )),
        }
    }

    /// Grant the named group read access. An unknown group is skipped.
    async fn share_with_group(&self, resource_id: &str, group: &str) -> Result<(), Diagnostics> {
        let groups = self
            .api
            .list_groups()
            .await
            .map_err(|e| error_diagnostics("Cannot get groups", e.to_string()))?;
        let group_id = match resolve_id(&groups, group) {
            Ok(id) => id,
            Err(e) => {
                warn!(resource_id = %resource_id, error = %e, "share skipped");
                return Ok(());
            }
        };
        let operations = [ShareOperation {
            permission_type: permission_types::READ,
            aro: Aro::Group,
            aro_id: group_id.clone(),
        }];
        self.api
            .share_resource(resource_id, &operations)
            .await
            .map_err(|e| error_diagnostics("Cannot share resource", e.to_string()))?;
        info!(resource_id = %resource_id, group_id = %group_id, "resource shared with group");
        Ok(())
    }

    /// Share after creation; errors are returned alongside the new state so
    /// the created entry stays tracked.
    async fn finish_create(&self, model: PasswordModel) -> StateResponse<PasswordModel> {
        let group = match model.share_group.known() {
            Some(group) => group.clone(),
            None => return StateResponse::ok(model),
        };
        match self.share_with_group(model.id.value_str(), &group).await {
            Ok(()) => StateResponse::ok(model),
            Err(diags) => StateResponse::failed(Some(model), diags),
        }
    }

    fn new_resource(plan: &PasswordModel, folder_parent_id: Option<String>) -> NewResource {
        NewResource {
            name: plan.name.clone(),
            username: plan.username.clone(),
            uri: plan.uri.clone(),
            password: plan.password.clone(),
            description: plan.description.known().cloned(),
            folder_parent_id,
        }
    }
}

pub fn schema() -> Schema {
    Schema::new("A Passbolt password entry")
        .attribute(
            "id",
            Attribute::string()
                .computed()
                .description("The unique identifier of the password resource"),
        )
        .attribute(
            "name",
            Attribute::string()
                .required()
                .description("The name of the password resource"),
        )
        .attribute(
            "description",
            Attribute::string()
                .optional()
                .description("The description of the password resource"),
        )
        .attribute(
            "username",
            Attribute::string()
                .required()
                .description("The username for the password resource"),
        )
        .attribute(
            "uri",
            Attribute::string()
                .required()
                .description("The URI for the password resource"),
        )
        .attribute(
            "password",
            Attribute::string()
                .required()
                .sensitive()
                .description("The password for the resource"),
        )
        .attribute(
            "folder_parent",
            Attribute::string()
                .optional()
                .description("The name of the parent folder"),
        )
        .attribute(
            "share_group",
            Attribute::string()
                .optional()
                .description("The name of the group to share the resource with"),
        )
}

#[async_trait]
impl ManagedResource for PasswordResource {
    type Model = PasswordModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, plan: PasswordModel) -> StateResponse<PasswordModel> {
        if let Err(diags) = plan.validate() {
            return StateResponse::failed(None, diags);
        }
        let folder_parent_id = match self.folder_id(&plan.folder_parent).await {
            Ok(id) => id,
            Err(diags) => return StateResponse::failed(None, diags),
        };

        let id = match self
            .api
            .create_resource(&Self::new_resource(&plan, folder_parent_id))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                return StateResponse::failed(
                    None,
                    error_diagnostics("Cannot create resource", e.to_string()),
                )
            }
        };
        info!(resource_id = %id, name = %plan.name, "password created");

        self.finish_create(PasswordModel {
            id: Value::Known(id),
            ..plan
        })
        .await
    }

    async fn read(&self, state: PasswordModel) -> StateResponse<PasswordModel> {
        let id = state.id.value_str().to_string();
        let entry = match self.api.get_resource(&id).await {
            Ok(entry) => entry,
            Err(e) if e.is_not_found() => {
                info!(resource_id = %id, "password no longer exists, removing from state");
                return StateResponse::removed();
            }
            Err(e) => {
                return StateResponse::failed(
                    Some(state),
                    remote_error(
                        "Error reading password",
                        "Could not read password, unexpected error: ",
                        e,
                    ),
                )
            }
        };
        debug!(resource_id = %id, "password read");

        let folder_parent = match &entry.folder_parent_id {
            None => Value::Null,
            Some(parent_id) => match self.api.list_folders().await {
                Ok(folders) => match resolve_name(&folders, parent_id) {
                    Some(name) => Value::string(name),
                    None => state.folder_parent.clone(),
                },
                Err(e) => {
                    debug!(resource_id = %id, error = %e, "folder lookup failed, keeping prior value");
                    state.folder_parent.clone()
                }
            },
        };

        let description = if entry.description.is_empty() && state.description.is_null() {
            Value::Null
        } else {
            Value::Known(entry.description)
        };

        StateResponse::ok(PasswordModel {
            id: Value::Known(entry.id),
            name: entry.name,
            description,
            username: entry.username,
            uri: entry.uri,
            folder_parent,
            ..state
        })
    }

    async fn update(&self, plan: PasswordModel, state: PasswordModel) -> StateResponse<PasswordModel> {
        if let Err(diags) = plan.validate() {
            return StateResponse::failed(Some(state), diags);
        }
        let old_id = state.id.value_str().to_string();
        let current = match self.api.get_resource(&old_id).await {
            Ok(entry) => entry,
            Err(e) => {
                return StateResponse::failed(
                    Some(state),
                    remote_error(
                        "Error reading current resource",
                        "Could not read current resource, unexpected error: ",
                        e,
                    ),
                )
            }
        };

        if !plan.differs_from(&current, &state) {
            return StateResponse::ok(PasswordModel {
                id: state.id,
                ..plan
            });
        }

        // Resolve before deleting so a bad folder leaves the entry alone.
        let folder_parent_id = match self.folder_id(&plan.folder_parent).await {
            Ok(id) => id,
            Err(diags) => return StateResponse::failed(Some(state), diags),
        };

        if let Err(e) = self.api.delete_resource(&old_id).await {
            return StateResponse::failed(
                Some(state),
                remote_error(
                    "Error deleting old resource",
                    "Could not delete old resource, unexpected error: ",
                    e,
                ),
            );
        }

        let new_id = match self
            .api
            .create_resource(&Self::new_resource(&plan, folder_parent_id))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(old_id = %old_id, error = %e, "password deleted but not recreated");
                return StateResponse::failed(
                    None,
                    error_diagnostics(
                        "Cannot recreate resource",
                        format!(
                            "Resource {} was deleted but could not be recreated: {}",
                            old_id, e
                        ),
                    ),
                );
            }
        };
        info!(old_id = %old_id, resource_id = %new_id, "password recreated");

        self.finish_create(PasswordModel {
            id: Value::Known(new_id),
            ..plan
        })
        .await
    }

    async fn delete(&self, state: PasswordModel) -> Diagnostics {
        let id = state.id.value_str();
        match self.api.delete_resource(id).await {
            Ok(()) => {
                info!(resource_id = %id, "password deleted");
                Diagnostics::new()
            }
            Err(e) => remote_error(
                "Error deleting password",
                "Could not delete password, unexpected error: ",
                e,
            ),
        }
    }
}
