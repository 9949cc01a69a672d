//! Authenticated Passbolt session.
//!
//! `PassboltService` owns the logged-in API client and the user's keyring and
//! implements [`PassboltApi`] on top of the endpoint wrappers.
//! `HttpConnector` builds one from credentials.

use crate::passbolt::api::*;
use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::auth::PassboltAuth;
use crate::passbolt::crypto::{check_private_key_armor, KeyringLoader, OpenPgp};
use crate::passbolt::folders::PassboltFolders;
use crate::passbolt::resources::PassboltResources;
use crate::passbolt::secrets::PassboltSecrets;
use crate::passbolt::sharing::PassboltSharing;
use crate::passbolt::types::*;
use crate::passbolt::users_groups::{PassboltGroups, PassboltUsers};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// A logged-in Passbolt session.
pub struct PassboltService {
    /// API client carrying the session cookies.
    client: PassboltApiClient,
    /// The user's unlocked keyring.
    pgp: Arc<dyn OpenPgp>,
}

impl PassboltService {
    /// Wrap an already authenticated client.
    pub fn new(client: PassboltApiClient, pgp: Arc<dyn OpenPgp>) -> Result<Self, PassboltError> {
        if !client.is_authenticated() {
            return Err(PassboltError::session_expired(
                "Client must be logged in before use",
            ));
        }
        Ok(Self { client, pgp })
    }

    /// Log in with `pgp` and wrap the resulting session.
    pub async fn login(
        mut client: PassboltApiClient,
        pgp: Arc<dyn OpenPgp>,
    ) -> Result<Self, PassboltError> {
        PassboltAuth::login(&mut client, pgp.as_ref()).await?;
        Self::new(client, pgp)
    }

    pub fn client(&self) -> &PassboltApiClient {
        &self.client
    }

    /// The logged-in user's id.
    pub fn user_id(&self) -> Option<&str> {
        self.client.session().user_id.as_deref()
    }

    // ── Conversions ─────────────────────────────────────────────────

    fn folder_entry(folder: Folder) -> FolderEntry {
        FolderEntry {
            id: folder.id,
            name: folder.name.unwrap_or_default(),
            folder_parent_id: folder.folder_parent_id.filter(|p| !p.is_empty()),
            personal: folder.personal.unwrap_or(false),
        }
    }

    /// Plaintext fields come from the v4 columns, or from the encrypted v5
    /// metadata when the server only returns that.
    fn resource_entry(&self, resource: Resource) -> Result<ResourceEntry, PassboltError> {
        let folder_parent_id = resource.folder_parent_id.filter(|p| !p.is_empty());

        if let (None, Some(armored)) = (&resource.name, &resource.metadata) {
            let plaintext = self.pgp.decrypt(armored)?;
            let meta: ResourceMetadata = serde_json::from_str(&plaintext).map_err(|e| {
                PassboltError::parse(format!(
                    "Failed to parse metadata of resource {}: {}",
                    resource.id, e
                ))
            })?;
            let uri = meta.uris.into_iter().next().or(meta.uri);
            return Ok(ResourceEntry {
                id: resource.id,
                name: meta.name,
                username: meta.username.unwrap_or_default(),
                uri: uri.unwrap_or_default(),
                description: meta.description.unwrap_or_default(),
                folder_parent_id,
            });
        }

        Ok(ResourceEntry {
            id: resource.id,
            name: resource.name.unwrap_or_default(),
            username: resource.username.unwrap_or_default(),
            uri: resource.uri.unwrap_or_default(),
            description: resource.description.unwrap_or_default(),
            folder_parent_id,
        })
    }

    /// Ids of the resource types that keep the description in the secret.
    async fn secret_description_types(&self) -> Result<HashSet<String>, PassboltError> {
        let types = PassboltResources::list_types(&self.client).await?;
        Ok(types
            .into_iter()
            .filter(|t| t.slug == resource_type_slugs::PASSWORD_AND_DESCRIPTION)
            .map(|t| t.id)
            .collect())
    }

    /// Convert `resource`, reading the description from its secret when the
    /// type stores it there and no plaintext copy was returned.
    async fn describe(
        &self,
        resource: Resource,
        secret_types: &HashSet<String>,
    ) -> Result<ResourceEntry, PassboltError> {
        let in_secret = secret_types.contains(&resource.resource_type_id);
        let mut entry = self.resource_entry(resource)?;
        if in_secret && entry.description.is_empty() {
            let secret = PassboltSecrets::get(&self.client, &entry.id).await?;
            let decrypted = PassboltSecrets::decrypt(self.pgp.as_ref(), &secret)?;
            if let Some(description) = decrypted.description {
                entry.description = description;
            }
        }
        Ok(entry)
    }

    /// Encrypted copies of the resource's secret for users who gain access.
    async fn secrets_for_new_users(
        &self,
        resource_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<ShareSecret>, PassboltError> {
        let own = PassboltSecrets::get(&self.client, resource_id).await?;
        let plaintext = self.pgp.decrypt(&own.data)?;

        let mut secrets = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            let key = PassboltUsers::public_key(&self.client, user_id).await?;
            secrets.push(ShareSecret {
                user_id: user_id.clone(),
                resource_id: resource_id.to_string(),
                data: self.pgp.encrypt_for(&key, &plaintext)?,
            });
        }
        Ok(secrets)
    }
}

#[async_trait]
impl PassboltApi for PassboltService {
    async fn list_folders(&self) -> Result<Vec<FolderEntry>, PassboltError> {
        let folders = PassboltFolders::list(&self.client).await?;
        Ok(folders.into_iter().map(Self::folder_entry).collect())
    }

    async fn get_folder(&self, id: &str) -> Result<FolderEntry, PassboltError> {
        PassboltFolders::get(&self.client, id)
            .await
            .map(Self::folder_entry)
    }

    async fn create_folder(&self, folder: &NewFolder) -> Result<FolderEntry, PassboltError> {
        let request = CreateFolderRequest {
            name: folder.name.clone(),
            folder_parent_id: folder.folder_parent_id.clone(),
        };
        PassboltFolders::create(&self.client, &request)
            .await
            .map(Self::folder_entry)
    }

    async fn delete_folder(&self, id: &str) -> Result<(), PassboltError> {
        PassboltFolders::delete(&self.client, id).await
    }

    /// Entries whose metadata or secret cannot be decrypted or parsed are
    /// logged and left out; transport errors fail the listing.
    async fn list_resources(&self) -> Result<Vec<ResourceEntry>, PassboltError> {
        let resources: Vec<Resource> = PassboltResources::list(&self.client)
            .await?
            .into_iter()
            .filter(|r| !r.deleted)
            .collect();
        let secret_types = if resources.iter().any(|r| r.description.is_none()) {
            self.secret_description_types().await?
        } else {
            HashSet::new()
        };

        let mut entries = Vec::with_capacity(resources.len());
        for resource in resources {
            let id = resource.id.clone();
            match self.describe(resource, &secret_types).await {
                Ok(entry) => entries.push(entry),
                Err(e) if is_undecodable(&e) => {
                    warn!("Skipping resource {}: {}", id, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(entries)
    }

    async fn get_resource(&self, id: &str) -> Result<ResourceEntry, PassboltError> {
        let resource = PassboltResources::get(&self.client, id).await?;
        if resource.deleted {
            return Err(PassboltError::not_found(format!("Resource {} is deleted", id)));
        }
        let secret_types = if resource.description.is_none() {
            self.secret_description_types().await?
        } else {
            HashSet::new()
        };
        self.describe(resource, &secret_types).await
    }

    async fn create_resource(&self, resource: &NewResource) -> Result<String, PassboltError> {
        let types = PassboltResources::list_types(&self.client).await?;
        let resource_type = PassboltResources::preferred_type(&types).ok_or_else(|| {
            PassboltError::api("Server offers no password resource type")
        })?;
        debug!("Using resource type {}", resource_type.slug);

        // password-string keeps the description in clear; the JSON type
        // moves it into the encrypted secret.
        let plain_description = if resource_type.slug == resource_type_slugs::PASSWORD_STRING {
            resource.description.clone()
        } else {
            None
        };
        let secret = PassboltSecrets::build_secret_data(
            &resource_type.slug,
            &resource.password,
            resource.description.as_deref(),
        )?;
        let encrypted = self.pgp.encrypt_for(&self.pgp.public_key(), &secret)?;

        let request = CreateResourceRequest {
            name: resource.name.clone(),
            username: Some(resource.username.clone()),
            uri: Some(resource.uri.clone()),
            description: plain_description,
            resource_type_id: Some(resource_type.id.clone()),
            folder_parent_id: resource.folder_parent_id.clone(),
            secrets: vec![SecretData { data: encrypted }],
        };
        let created = PassboltResources::create(&self.client, &request).await?;
        Ok(created.id)
    }

    async fn delete_resource(&self, id: &str) -> Result<(), PassboltError> {
        PassboltResources::delete(&self.client, id).await
    }

    async fn list_groups(&self) -> Result<Vec<GroupEntry>, PassboltError> {
        let groups = PassboltGroups::list(&self.client).await?;
        Ok(groups
            .into_iter()
            .filter(|g| !g.deleted)
            .map(|g| GroupEntry {
                id: g.id,
                name: g.name,
            })
            .collect())
    }

    async fn share_resource(
        &self,
        resource_id: &str,
        operations: &[ShareOperation],
    ) -> Result<(), PassboltError> {
        let permissions: Vec<PermissionChange> = operations
            .iter()
            .map(|op| PassboltSharing::build_permission(op.aro.as_str(), &op.aro_id, op.permission_type))
            .collect();
        let mut request = ShareRequest {
            permissions,
            secrets: None,
        };

        let simulated =
            PassboltSharing::simulate_share_resource(&self.client, resource_id, &request).await?;
        let added: Vec<String> = simulated
            .changes
            .added
            .into_iter()
            .map(|u| u.user.id)
            .collect();
        if !added.is_empty() {
            debug!("Share adds {} users to resource {}", added.len(), resource_id);
            request.secrets = Some(self.secrets_for_new_users(resource_id, &added).await?);
        }

        PassboltSharing::share_resource(&self.client, resource_id, &request).await
    }
}

/// Errors local to one entry's payload rather than to the session.
fn is_undecodable(err: &PassboltError) -> bool {
    matches!(
        err.kind,
        PassboltErrorKind::CryptoError | PassboltErrorKind::ParseError
    )
}

// ── Connector ───────────────────────────────────────────────────────

/// Connects to a live Passbolt server over HTTP.
pub struct HttpConnector<L: KeyringLoader> {
    loader: L,
}

impl<L: KeyringLoader> HttpConnector<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl<L: KeyringLoader> Connector for HttpConnector<L> {
    async fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn PassboltApi>, PassboltError> {
        check_private_key_armor(&credentials.private_key)?;
        let pgp = self
            .loader
            .load(&credentials.private_key, &credentials.passphrase)?;

        let config = PassboltConfig {
            server_url: credentials.base_url.clone(),
            verify_tls: credentials.verify_tls,
            request_timeout_secs: credentials.request_timeout_secs,
        };
        let client = PassboltApiClient::from_config(&config)?;
        info!("Logging in to {}", client.base_url());

        let service = PassboltService::login(client, pgp).await?;
        Ok(Arc::new(service))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
