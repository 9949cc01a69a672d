//! Passbolt provider for an infrastructure-as-code host.
//!
//! [`provider::PassboltProvider`] publishes the provider schema, resolves the
//! provider block into credentials and opens one authenticated session. The
//! session is shared by every adapter:
//!
//! - `passbolt_folder` ([`folder_resource::FolderResource`])
//! - `passbolt_password` ([`password_resource::PasswordResource`])
//! - `passbolt_passwords` ([`passwords_data_source::PasswordsDataSource`])
//!
//! Folder and group references are names, resolved to ids on every call by
//! [`resolver`].

pub mod config;
pub mod folder_resource;
pub mod logging;
pub mod password_resource;
pub mod passwords_data_source;
pub mod provider;
pub mod resolver;
pub mod resource;
pub mod validation;

pub use config::{ConfigError, ConfigField, Environment, ProcessEnv, ProviderConfig};
pub use folder_resource::{FolderModel, FolderResource};
pub use password_resource::{PasswordModel, PasswordResource};
pub use passwords_data_source::{PasswordItem, PasswordsDataSource, PasswordsModel};
pub use provider::{ConfigureResponse, PassboltProvider, ProviderData, ProviderMetadata};
pub use resource::{DataSource, ManagedResource, StateResponse};
