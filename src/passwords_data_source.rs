//! `passbolt_passwords` data source: every password entry the session can
//! see, with parent folders given by name.

use crate::resource::{remote_error, DataSource, StateResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tfpb_core::{Attribute, Schema, Value};
use tfpb_passbolt::{PassboltApi, ResourceEntry};
use tracing::debug;

pub const TYPE_NAME: &str = "passbolt_passwords";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub username: String,
    pub uri: String,
    /// Null when the entry is at the root or its folder is not visible.
    pub folder_parent: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordsModel {
    pub passwords: Vec<PasswordItem>,
}

pub struct PasswordsDataSource {
    api: Arc<dyn PassboltApi>,
}

impl PasswordsDataSource {
    pub fn new(api: Arc<dyn PassboltApi>) -> Self {
        Self { api }
    }
}

fn item(entry: ResourceEntry, folder_names: &HashMap<String, String>) -> PasswordItem {
    let folder_parent = entry
        .folder_parent_id
        .as_ref()
        .and_then(|id| folder_names.get(id))
        .cloned()
        .into();
    PasswordItem {
        id: entry.id,
        name: entry.name,
        description: entry.description,
        username: entry.username,
        uri: entry.uri,
        folder_parent,
    }
}

pub fn schema() -> Schema {
    let string = |text: &str| Attribute::string().computed().description(text);
    Schema::new("All Passbolt password entries visible to the provider").attribute(
        "passwords",
        Attribute::list_nested([
            ("id", string("The unique identifier of the password resource")),
            ("name", string("The name of the password resource")),
            ("description", string("The description of the password resource")),
            ("username", string("The username for the password resource")),
            ("uri", string("The URI for the password resource")),
            ("folder_parent", string("The name of the parent folder")),
        ])
        .computed()
        .description("List of password resources"),
    )
}

#[async_trait]
impl DataSource for PasswordsDataSource {
    type Model = PasswordsModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn read(&self) -> StateResponse<PasswordsModel> {
        let resources = match self.api.list_resources().await {
            Ok(resources) => resources,
            Err(e) => {
                return StateResponse::failed(
                    None,
                    remote_error(
                        "Error reading passwords",
                        "Could not read passwords, unexpected error: ",
                        e,
                    ),
                )
            }
        };
        let folders = match self.api.list_folders().await {
            Ok(folders) => folders,
            Err(e) => {
                return StateResponse::failed(
                    None,
                    remote_error(
                        "Error reading folders",
                        "Could not read folders, unexpected error: ",
                        e,
                    ),
                )
            }
        };
        debug!(resources = resources.len(), folders = folders.len(), "listing passwords");

        let folder_names: HashMap<String, String> =
            folders.into_iter().map(|f| (f.id, f.name)).collect();
        StateResponse::ok(PasswordsModel {
            passwords: resources
                .into_iter()
                .map(|entry| item(entry, &folder_names))
                .collect(),
        })
    }
}
