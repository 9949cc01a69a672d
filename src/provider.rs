//! Provider bootstrap.
//!
//! `configure` turns the provider block into credentials, opens one session
//! through the [`Connector`] and hands that session to every adapter. The
//! session is never replaced for the life of the provider.

use crate::config::{config_diagnostics, Environment, ProviderConfig};
use crate::config::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_VERIFY_TLS};
use crate::folder_resource::{self, FolderResource};
use crate::password_resource::{self, PasswordResource};
use crate::passwords_data_source::{self, PasswordsDataSource};
use crate::resource::error_diagnostics;
use std::collections::BTreeMap;
use std::sync::Arc;
use tfpb_core::{Attribute, DefaultValue, Diagnostics, Schema};
use tfpb_passbolt::{Connector, PassboltApi, PassboltError, PassboltErrorKind};
use tracing::{error, info};

pub const PROVIDER_TYPE_NAME: &str = "passbolt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub type_name: &'static str,
    pub version: String,
}

/// The configured session, shared by all adapters.
#[derive(Clone)]
pub struct ProviderData {
    api: Arc<dyn PassboltApi>,
}

impl ProviderData {
    pub fn new(api: Arc<dyn PassboltApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> Arc<dyn PassboltApi> {
        Arc::clone(&self.api)
    }

    pub fn folder_resource(&self) -> FolderResource {
        FolderResource::new(self.api())
    }

    pub fn password_resource(&self) -> PasswordResource {
        PasswordResource::new(self.api())
    }

    pub fn passwords_data_source(&self) -> PasswordsDataSource {
        PasswordsDataSource::new(self.api())
    }
}

pub struct ConfigureResponse {
    /// `None` whenever `diagnostics` carries an error.
    pub data: Option<ProviderData>,
    pub diagnostics: Diagnostics,
}

impl ConfigureResponse {
    fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            data: None,
            diagnostics,
        }
    }
}

pub struct PassboltProvider<C: Connector> {
    version: String,
    connector: C,
}

impl<C: Connector> PassboltProvider<C> {
    pub fn new(version: impl Into<String>, connector: C) -> Self {
        Self {
            version: version.into(),
            connector,
        }
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME,
            version: self.version.clone(),
        }
    }

    pub fn schema(&self) -> Schema {
        Schema::new("Manage Passbolt folders and password entries")
            .attribute(
                "base_url",
                Attribute::string()
                    .required()
                    .description("The base URL of the Passbolt server"),
            )
            .attribute(
                "private_key",
                Attribute::string()
                    .required()
                    .sensitive()
                    .description("The armored OpenPGP private key of the Passbolt user"),
            )
            .attribute(
                "passphrase",
                Attribute::string()
                    .required()
                    .sensitive()
                    .description("The passphrase protecting the private key"),
            )
            .attribute(
                "verify_tls",
                Attribute::bool()
                    .optional()
                    .computed()
                    .default_value(DefaultValue::Bool(DEFAULT_VERIFY_TLS))
                    .description("Whether to verify the server's TLS certificate"),
            )
            .attribute(
                "request_timeout_secs",
                Attribute::number()
                    .optional()
                    .computed()
                    .default_value(DefaultValue::Number(DEFAULT_REQUEST_TIMEOUT_SECS))
                    .description("Timeout in seconds for each request to the server"),
            )
    }

    pub fn resource_schemas(&self) -> BTreeMap<&'static str, Schema> {
        BTreeMap::from([
            (folder_resource::TYPE_NAME, folder_resource::schema()),
            (password_resource::TYPE_NAME, password_resource::schema()),
        ])
    }

    pub fn data_source_schemas(&self) -> BTreeMap<&'static str, Schema> {
        BTreeMap::from([(passwords_data_source::TYPE_NAME, passwords_data_source::schema())])
    }

    /// Resolve the block, then connect and log in.
    ///
    /// Configuration problems are all reported together and no connection is
    /// attempted.
    pub async fn configure<E: Environment + ?Sized>(
        &self,
        config: &ProviderConfig,
        env: &E,
    ) -> ConfigureResponse {
        let credentials = match config.resolve(env) {
            Ok(credentials) => credentials,
            Err(errors) => return ConfigureResponse::failed(config_diagnostics(&errors)),
        };

        match self.connector.connect(&credentials).await {
            Ok(api) => {
                info!(base_url = %credentials.base_url, "connected to Passbolt");
                ConfigureResponse {
                    data: Some(ProviderData::new(api)),
                    diagnostics: Diagnostics::new(),
                }
            }
            Err(e) => {
                error!(base_url = %credentials.base_url, error = %e, "configuration failed");
                ConfigureResponse::failed(connect_diagnostics(&e))
            }
        }
    }
}

/// Client construction problems and login problems get distinct summaries.
fn connect_diagnostics(err: &PassboltError) -> Diagnostics {
    match err.kind {
        PassboltErrorKind::InvalidConfig | PassboltErrorKind::CryptoError => error_diagnostics(
            "Unable to create Passbolt API client",
            format!("Cannot create the Passbolt API client: {}", err),
        ),
        _ => error_diagnostics(
            "Unable to login to Passbolt",
            format!("Cannot login to Passbolt: {}", err),
        ),
    }
}
