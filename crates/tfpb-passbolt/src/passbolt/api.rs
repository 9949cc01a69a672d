//! The Passbolt operations the provider adapters depend on.
//!
//! Adapters only see [`PassboltApi`] and [`Connector`], so tests can swap the
//! HTTP-backed session for an in-memory fake or a mock.

use crate::passbolt::types::PassboltError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A folder as the adapters see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    pub folder_parent_id: Option<String>,
    pub personal: bool,
}

/// Folder creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFolder {
    pub name: String,
    pub folder_parent_id: Option<String>,
}

/// A password entry's non-secret fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub id: String,
    pub name: String,
    pub username: String,
    pub uri: String,
    pub description: String,
    pub folder_parent_id: Option<String>,
}

/// Password entry creation payload.
#[derive(Clone, PartialEq, Eq)]
pub struct NewResource {
    pub name: String,
    pub username: String,
    pub uri: String,
    pub password: String,
    pub description: Option<String>,
    pub folder_parent_id: Option<String>,
}

impl fmt::Debug for NewResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewResource")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("uri", &self.uri)
            .field("password", &"<redacted>")
            .field("description", &self.description)
            .field("folder_parent_id", &self.folder_parent_id)
            .finish()
    }
}

/// A group permissions can be granted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub id: String,
    pub name: String,
}

/// Who a share grant targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aro {
    User,
    Group,
}

impl Aro {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aro::User => crate::passbolt::sharing::aro::USER,
            Aro::Group => crate::passbolt::sharing::aro::GROUP,
        }
    }
}

/// One permission grant on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareOperation {
    pub permission_type: i32,
    pub aro: Aro,
    pub aro_id: String,
}

/// An authenticated Passbolt session.
///
/// Implementations are fully set up before they are handed out and are
/// only ever used through shared references afterwards.
#[async_trait]
pub trait PassboltApi: Send + Sync {
    async fn list_folders(&self) -> Result<Vec<FolderEntry>, PassboltError>;

    async fn get_folder(&self, id: &str) -> Result<FolderEntry, PassboltError>;

    async fn create_folder(&self, folder: &NewFolder) -> Result<FolderEntry, PassboltError>;

    async fn delete_folder(&self, id: &str) -> Result<(), PassboltError>;

    async fn list_resources(&self) -> Result<Vec<ResourceEntry>, PassboltError>;

    async fn get_resource(&self, id: &str) -> Result<ResourceEntry, PassboltError>;

    /// Create the entry with its encrypted secret; returns the new id.
    async fn create_resource(&self, resource: &NewResource) -> Result<String, PassboltError>;

    async fn delete_resource(&self, id: &str) -> Result<(), PassboltError>;

    async fn list_groups(&self) -> Result<Vec<GroupEntry>, PassboltError>;

    async fn share_resource(
        &self,
        resource_id: &str,
        operations: &[ShareOperation],
    ) -> Result<(), PassboltError>;
}

/// Resolved provider credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub private_key: String,
    pub passphrase: String,
    pub verify_tls: bool,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("private_key", &"<redacted>")
            .field("passphrase", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Builds an authenticated session from credentials.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn PassboltApi>, PassboltError>;
}

// ── Tests ───────────────────────────────────────────────────────────
