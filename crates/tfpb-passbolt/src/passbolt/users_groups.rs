//! Users and groups for Passbolt.
//!
//! Endpoints:
//! - `GET /users/me.json`    : the logged-in user
//! - `GET /users/{id}.json`  : a user with their public key
//! - `GET /groups.json`      : list groups

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::types::*;
use log::debug;

// ── Users ───────────────────────────────────────────────────────────

/// User API operations.
pub struct PassboltUsers;

impl PassboltUsers {
    /// Get a single user by ID, including their GPG key.
    pub async fn get(client: &PassboltApiClient, user_id: &str) -> Result<User, PassboltError> {
        let resp: ApiResponse<User> = client
            .get_with_params(
                &format!("/users/{}.json", user_id),
                &[("contain[gpgkey]", "1")],
            )
            .await?;
        Ok(resp.body)
    }

    /// Get the currently authenticated user.
    pub async fn get_me(client: &PassboltApiClient) -> Result<User, PassboltError> {
        let resp: ApiResponse<User> = client.get("/users/me.json").await?;
        Ok(resp.body)
    }

    /// Armored public key of `user_id`.
    pub async fn public_key(
        client: &PassboltApiClient,
        user_id: &str,
    ) -> Result<String, PassboltError> {
        let user = Self::get(client, user_id).await?;
        user.gpgkey
            .map(|k| k.armored_key)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PassboltError::crypto(format!("User {} has no public key", user_id)))
    }
}

// ── Groups ──────────────────────────────────────────────────────────

/// Group API operations.
pub struct PassboltGroups;

impl PassboltGroups {
    /// List every group visible to the session.
    pub async fn list(client: &PassboltApiClient) -> Result<Vec<Group>, PassboltError> {
        let resp: ApiResponse<Vec<Group>> = client.get("/groups.json").await?;
        debug!("Listed {} groups", resp.body.len());
        Ok(resp.body)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
