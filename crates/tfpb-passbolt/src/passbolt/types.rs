//! Wire models and the shared error type.
//!
//! Field names follow the Passbolt JSON API. Fields the client never reads
//! are left out; serde skips them on input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassboltErrorKind {
    /// GPGAuth rejected, or the server failed its own verification.
    AuthFailed,
    /// 401.
    SessionExpired,
    MfaRequired,
    /// 404.
    NotFound,
    /// 403 without an MFA challenge.
    Forbidden,
    /// 400, usually a server-side validation failure.
    BadRequest,
    NetworkError,
    /// Any status without a dedicated kind.
    ApiError,
    ParseError,
    /// Key loading, decryption or encryption.
    CryptoError,
    InvalidConfig,
    RateLimited,
    Conflict,
    /// 5xx.
    ServerError,
}

/// Error returned by every Passbolt call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassboltError {
    pub kind: PassboltErrorKind,
    pub message: String,
}

impl fmt::Display for PassboltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PassboltError {}

macro_rules! error_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        impl PassboltError {
            $(
                pub fn $name(msg: impl Into<String>) -> Self {
                    Self { kind: PassboltErrorKind::$kind, message: msg.into() }
                }
            )*
        }
    };
}

error_constructors! {
    auth_failed => AuthFailed,
    session_expired => SessionExpired,
    mfa_required => MfaRequired,
    not_found => NotFound,
    forbidden => Forbidden,
    bad_request => BadRequest,
    network => NetworkError,
    api => ApiError,
    parse => ParseError,
    crypto => CryptoError,
    invalid_config => InvalidConfig,
    rate_limited => RateLimited,
    conflict => Conflict,
    server => ServerError,
}

impl PassboltError {
    pub fn is_not_found(&self) -> bool {
        self.kind == PassboltErrorKind::NotFound
    }
}

// ── Client configuration and session ────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassboltConfig {
    /// e.g. `https://passbolt.example.com`; a path prefix is allowed.
    pub server_url: String,
    pub verify_tls: bool,
    pub request_timeout_secs: u64,
}

impl Default for PassboltConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            verify_tls: true,
            request_timeout_secs: 30,
        }
    }
}

/// What a completed GPGAuth login leaves behind. Not changed afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub authenticated: bool,
    pub user_id: Option<String>,
    /// Sent back as `X-CSRF-Token` on every authenticated call.
    pub csrf_token: Option<String>,
    pub server_fingerprint: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

/// `{header, body}` envelope around every JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub header: ApiResponseHeader,
    pub body: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponseHeader {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: u16,
}

// ── Resources and secrets ───────────────────────────────────────────

/// A password entry as listed by the server.
///
/// Servers on the v4 format send plaintext `name`/`username`/`uri`/
/// `description`; v5 servers send them encrypted in `metadata` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub resource_type_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal: Option<bool>,
}

/// `POST /resources.json` body. The secret is already encrypted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_parent_id: Option<String>,
    pub secrets: Vec<SecretData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretData {
    pub data: String,
}

/// Decrypted v5 `metadata`. Newer servers send `uris` instead of `uri`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub uris: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceType {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

/// Resource types new entries can be written as, in order of preference.
pub mod resource_type_slugs {
    /// Secret is the bare password.
    pub const PASSWORD_STRING: &str = "password-string";
    /// Secret is `{"password": .., "description": ..}`.
    pub const PASSWORD_AND_DESCRIPTION: &str = "password-and-description";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub user_id: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedSecret {
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Folders, users, groups ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub folder_parent_id: Option<String>,
    #[serde(default)]
    pub personal: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub gpgkey: Option<GpgKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpgKey {
    pub armored_key: String,
    #[serde(default)]
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
}

// ── Sharing ─────────────────────────────────────────────────────────

/// Passbolt permission levels.
pub mod permission_types {
    pub const READ: i32 = 1;
    pub const UPDATE: i32 = 7;
    pub const OWNER: i32 = 15;
}

/// `PUT /share/resource/{id}.json` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRequest {
    pub permissions: Vec<PermissionChange>,
    /// Secrets encrypted for users who gain access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Vec<ShareSecret>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionChange {
    pub aro: String,
    pub aro_foreign_key: String,
    #[serde(rename = "type")]
    pub permission_type: i32,
    pub is_new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareSecret {
    pub user_id: String,
    pub resource_id: String,
    pub data: String,
}

/// Result of `POST /share/simulate/resource/{id}.json`: which users a
/// share would add or remove.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareSimulateResult {
    #[serde(default)]
    pub changes: ShareSimulateChanges,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareSimulateChanges {
    #[serde(default)]
    pub added: Vec<SimulatedUser>,
    #[serde(default)]
    pub removed: Vec<SimulatedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedUser {
    #[serde(rename = "User")]
    pub user: SimulatedUserRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedUserRef {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_kind() {
        let err = PassboltError::not_found("/resources/x.json does not exist");
        assert_eq!(err.to_string(), "NotFound: /resources/x.json does not exist");
        assert!(err.is_not_found());
        assert!(!PassboltError::server("x").is_not_found());
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(PassboltError::crypto("k").kind, PassboltErrorKind::CryptoError);
        assert_eq!(PassboltError::network("n").kind, PassboltErrorKind::NetworkError);
        assert_eq!(PassboltError::invalid_config("c").kind, PassboltErrorKind::InvalidConfig);
    }

    #[test]
    fn envelope_ignores_unknown_header_fields() {
        let json = r#"{
            "header": {"id": "hdr", "status": "success", "servertime": 1700000000,
                       "message": "OK", "url": "/folders.json", "code": 200},
            "body": [{"id": "f1", "name": "Infra", "created": "2024-01-01T00:00:00+00:00"}]
        }"#;
        let resp: ApiResponse<Vec<Folder>> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.header.code, 200);
        assert_eq!(resp.body[0].name.as_deref(), Some("Infra"));
        assert!(resp.body[0].folder_parent_id.is_none());
    }

    #[test]
    fn v5_resource_has_no_plaintext_fields() {
        let json = r#"{"id": "r1", "metadata": "-----BEGIN PGP MESSAGE-----", "resource_type_id": "t1"}"#;
        let res: Resource = serde_json::from_str(json).unwrap();
        assert!(res.name.is_none());
        assert!(res.metadata.is_some());
        assert!(!res.deleted);
    }

    #[test]
    fn metadata_with_uris_list() {
        let json = r#"{
            "object_type": "PASSBOLT_RESOURCE_METADATA",
            "name": "db",
            "username": "admin",
            "uris": ["https://db.example.com"]
        }"#;
        let meta: ResourceMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.uris, vec!["https://db.example.com".to_string()]);
        assert!(meta.uri.is_none());
        assert!(meta.description.is_none());
    }

    #[test]
    fn create_request_omits_missing_fields() {
        let req = CreateFolderRequest {
            name: "Infra".into(),
            folder_parent_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Infra"}));
    }

    #[test]
    fn share_request_uses_type_key() {
        let req = ShareRequest {
            permissions: vec![PermissionChange {
                aro: "Group".into(),
                aro_foreign_key: "g1".into(),
                permission_type: permission_types::READ,
                is_new: true,
            }],
            secrets: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["permissions"][0]["type"], 1);
        assert!(json.get("secrets").is_none());
    }

    #[test]
    fn simulate_result_lists_added_users() {
        let json = r#"{"changes": {"added": [{"User": {"id": "u1"}}, {"User": {"id": "u2"}}], "removed": []}}"#;
        let sim: ShareSimulateResult = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = sim.changes.added.iter().map(|u| u.user.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }
}
