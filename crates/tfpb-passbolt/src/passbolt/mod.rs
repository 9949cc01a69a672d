//! Passbolt client: sub-modules.
//!
//! Provides the pieces a provider needs to talk to a Passbolt server:
//! - REST API client with cookie session and CSRF handling
//! - GPGAuth login
//! - Folder, resource, secret, user and group endpoints
//! - Resource sharing with per-user secret re-encryption
//! - The `PassboltApi` / `Connector` seams consumed by the adapters

pub mod api;
pub mod api_client;
pub mod auth;
pub mod crypto;
pub mod folders;
pub mod resources;
pub mod secrets;
pub mod service;
pub mod sharing;
pub mod types;
pub mod users_groups;

// Re-export top-level items for convenience.
pub use api::*;
pub use crypto::{KeyringLoader, OpenPgp};
pub use service::{HttpConnector, PassboltService};
pub use types::*;
