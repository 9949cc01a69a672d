//! GPGAuth login for Passbolt.
//!
//! ## Flow
//! 1. `GET /auth/verify.json`: retrieve the server's PGP public key
//! 2. `POST /auth/verify.json`: verify server identity (encrypt a challenge with the server key)
//! 3. `POST /auth/login.json`: login (decrypt the server's challenge with the user key)
//! 4. `GET /users/me.json`: cookie session established, pick up the CSRF token

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::crypto::{generate_challenge, verify_challenge_format, OpenPgp};
use crate::passbolt::types::*;
use crate::passbolt::users_groups::PassboltUsers;
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::Response;

const HEADER_VERIFY_RESPONSE: &str = "X-GPGAuth-Verify-Response";
const HEADER_USER_AUTH_TOKEN: &str = "X-GPGAuth-User-Auth-Token";
const HEADER_AUTHENTICATED: &str = "X-GPGAuth-Authenticated";

/// Server verify response body.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServerVerifyBody {
    pub fingerprint: String,
    pub keydata: String,
}

/// GPGAuth login stages.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GpgAuthLoginPayload {
    pub data: GpgAuthData,
}

/// GPGAuth data envelope.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GpgAuthData {
    pub gpg_auth: GpgAuthFields,
}

/// GPGAuth field variants.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GpgAuthFields {
    /// Fingerprint of user's key (always required).
    pub keyid: String,
    /// Encrypted challenge token (for server-verify step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_verify_token: Option<String>,
    /// Decrypted server challenge (for the second login stage).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token_result: Option<String>,
}

impl GpgAuthLoginPayload {
    fn new(keyid: String) -> Self {
        Self {
            data: GpgAuthData {
                gpg_auth: GpgAuthFields {
                    keyid,
                    server_verify_token: None,
                    user_token_result: None,
                },
            },
        }
    }
}

/// Passbolt authenticator.
pub struct PassboltAuth;

impl PassboltAuth {
    /// Step 1: Get the server's public PGP key.
    pub async fn get_server_key(
        client: &PassboltApiClient,
    ) -> Result<ServerVerifyBody, PassboltError> {
        debug!("Fetching server public key from /auth/verify.json");
        let resp: ApiResponse<ServerVerifyBody> =
            client.get_unauthenticated("/auth/verify.json").await?;
        debug!("Server key fingerprint: {}", resp.body.fingerprint);
        Ok(resp.body)
    }

    /// Step 2: Verify the server's identity.
    ///
    /// Encrypt a challenge token with the server's public key and send it.
    /// The server decrypts it and echoes it back in a response header.
    pub async fn verify_server(
        client: &PassboltApiClient,
        pgp: &dyn OpenPgp,
        server_key: &ServerVerifyBody,
    ) -> Result<(), PassboltError> {
        let challenge = generate_challenge();
        let encrypted = pgp.encrypt_for(&server_key.keydata, &challenge)?;

        let mut payload = GpgAuthLoginPayload::new(pgp.fingerprint());
        payload.data.gpg_auth.server_verify_token = Some(encrypted);

        let response = client
            .post_unauthenticated_raw("/auth/verify.json", &payload)
            .await?;

        match header_value(&response, HEADER_VERIFY_RESPONSE) {
            Some(returned) if returned == challenge => {
                info!("Server identity verified via GPGAuth");
                Ok(())
            }
            Some(_) => {
                warn!("Server returned mismatched challenge token");
                Err(PassboltError::auth_failed(
                    "Server identity verification failed: challenge mismatch",
                ))
            }
            None => Err(PassboltError::auth_failed(format!(
                "Server identity verification failed: no {} header (status {})",
                HEADER_VERIFY_RESPONSE,
                response.status().as_u16()
            ))),
        }
    }

    /// Step 3: Login.
    ///
    /// The server sends a challenge encrypted for our key; we decrypt it and
    /// send it back. Session cookies land in the client's cookie jar.
    pub async fn gpg_auth_login(
        client: &mut PassboltApiClient,
        pgp: &dyn OpenPgp,
        server_key: &ServerVerifyBody,
    ) -> Result<SessionState, PassboltError> {
        // Stage 1: request a challenge.
        let payload = GpgAuthLoginPayload::new(pgp.fingerprint());
        let response = client
            .post_unauthenticated_raw("/auth/login.json", &payload)
            .await?;

        let encrypted_token = header_value(&response, HEADER_USER_AUTH_TOKEN)
            .map(|raw| unescape_token(&raw))
            .unwrap_or_default();
        if encrypted_token.is_empty() {
            return Err(PassboltError::auth_failed(format!(
                "No {} in server response (status {}); is the key registered?",
                HEADER_USER_AUTH_TOKEN,
                response.status().as_u16()
            )));
        }

        // Stage 2: decrypt and return it.
        let decrypted_token = pgp.decrypt(&encrypted_token)?;
        if !verify_challenge_format(&decrypted_token) {
            return Err(PassboltError::auth_failed(
                "Server challenge has an unexpected format",
            ));
        }

        let mut login_payload = GpgAuthLoginPayload::new(pgp.fingerprint());
        login_payload.data.gpg_auth.user_token_result = Some(decrypted_token);

        let login_response = client
            .post_unauthenticated_raw("/auth/login.json", &login_payload)
            .await?;

        if !login_response.status().is_success() {
            return Err(PassboltError::auth_failed(format!(
                "GPGAuth login failed with status {}",
                login_response.status().as_u16()
            )));
        }
        if let Some(flag) = header_value(&login_response, HEADER_AUTHENTICATED) {
            if flag != "true" {
                return Err(PassboltError::auth_failed("GPGAuth login was not accepted"));
            }
        }

        // Step 4: the first authenticated GET sets the CSRF cookie.
        let me = PassboltUsers::get_me(client).await?;
        let session = SessionState {
            authenticated: true,
            user_id: Some(me.id.clone()),
            csrf_token: client.csrf_token_from_cookies(),
            server_fingerprint: Some(server_key.fingerprint.clone()),
            logged_in_at: Some(Utc::now()),
        };
        if session.csrf_token.is_none() {
            warn!("No CSRF token cookie after login; mutating requests may be rejected");
        }

        client.set_session(session.clone());
        info!("GPGAuth login successful for user {}", me.id);
        Ok(session)
    }

    /// Run the whole GPGAuth sequence on a fresh client.
    pub async fn login(
        client: &mut PassboltApiClient,
        pgp: &dyn OpenPgp,
    ) -> Result<SessionState, PassboltError> {
        let server_key = Self::get_server_key(client).await?;
        Self::verify_server(client, pgp, &server_key).await?;
        Self::gpg_auth_login(client, pgp, &server_key).await
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Undo the URL encoding Passbolt applies to the armored token header.
fn unescape_token(raw: &str) -> String {
    let decoded: String = url::form_urlencoded::parse(format!("t={}", raw).as_bytes())
        .map(|(_, v)| v.into_owned())
        .next()
        .unwrap_or_default();
    decoded.replace("\\ ", " ")
}

// ── Tests ───────────────────────────────────────────────────────────
