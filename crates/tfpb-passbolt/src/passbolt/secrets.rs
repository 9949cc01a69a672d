//! Secret retrieval and decryption for Passbolt.
//!
//! Endpoints:
//! - `GET /secrets/resource/{resourceId}.json` : get encrypted secret for a resource

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::crypto::OpenPgp;
use crate::passbolt::types::*;
use log::debug;

/// Secret API operations.
pub struct PassboltSecrets;

impl PassboltSecrets {
    /// Get the encrypted secret for a resource.
    pub async fn get(
        client: &PassboltApiClient,
        resource_id: &str,
    ) -> Result<Secret, PassboltError> {
        debug!("Fetching secret for resource {}", resource_id);
        let resp: ApiResponse<Secret> = client
            .get(&format!("/secrets/resource/{}.json", resource_id))
            .await?;
        Ok(resp.body)
    }

    /// Decrypt an encrypted secret with the user's keyring.
    pub fn decrypt(pgp: &dyn OpenPgp, secret: &Secret) -> Result<DecryptedSecret, PassboltError> {
        let plaintext = pgp.decrypt(&secret.data)?;
        Ok(Self::parse_plaintext(plaintext))
    }

    /// The plaintext is either a bare password (`password-string`) or a JSON
    /// object with password and description.
    pub fn parse_plaintext(plaintext: String) -> DecryptedSecret {
        match serde_json::from_str::<DecryptedSecret>(&plaintext) {
            Ok(parsed) => parsed,
            Err(_) => DecryptedSecret {
                password: plaintext,
                description: None,
            },
        }
    }

    /// Build the plaintext stored for a resource of type `slug`.
    pub fn build_secret_data(
        slug: &str,
        password: &str,
        description: Option<&str>,
    ) -> Result<String, PassboltError> {
        if slug == resource_type_slugs::PASSWORD_STRING {
            return Ok(password.to_string());
        }
        let secret = DecryptedSecret {
            password: password.to_string(),
            description: description.map(String::from),
        };
        serde_json::to_string(&secret)
            .map_err(|e| PassboltError::parse(format!("Failed to serialize secret: {}", e)))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
