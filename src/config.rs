//! Provider configuration.
//!
//! The host hands over the provider block as [`ProviderConfig`]. Each
//! connection field falls back to an environment variable when the block
//! leaves it null; an explicit value, even an empty one, always wins.
//! Problems are reported per field and stop configuration before any
//! connection attempt.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tfpb_core::{AttributePath, Diagnostics, Value};
use tfpb_passbolt::Credentials;
use url::Url;

pub const ENV_BASE_URL: &str = "PASSBOLT_BASE_URL";
pub const ENV_PRIVATE_KEY: &str = "PASSBOLT_PRIVATE_KEY";
pub const ENV_PASSPHRASE: &str = "PASSBOLT_PASSPHRASE";

pub const DEFAULT_VERIFY_TLS: bool = true;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The provider block as received from the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub base_url: Value<String>,
    pub private_key: Value<String>,
    pub passphrase: Value<String>,
    pub verify_tls: Value<bool>,
    pub request_timeout_secs: Value<u64>,
}

/// Source of fallback values.
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A connection field with an environment fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    BaseUrl,
    PrivateKey,
    Passphrase,
}

impl ConfigField {
    pub const ALL: [ConfigField; 3] = [
        ConfigField::BaseUrl,
        ConfigField::PrivateKey,
        ConfigField::Passphrase,
    ];

    /// Attribute name in the provider block.
    pub fn attribute(&self) -> &'static str {
        match self {
            ConfigField::BaseUrl => "base_url",
            ConfigField::PrivateKey => "private_key",
            ConfigField::Passphrase => "passphrase",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigField::BaseUrl => ENV_BASE_URL,
            ConfigField::PrivateKey => ENV_PRIVATE_KEY,
            ConfigField::Passphrase => ENV_PASSPHRASE,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ConfigField::BaseUrl => "Base URL",
            ConfigField::PrivateKey => "Private Key",
            ConfigField::Passphrase => "Passphrase",
        }
    }

    fn value<'a>(&self, config: &'a ProviderConfig) -> &'a Value<String> {
        match self {
            ConfigField::BaseUrl => &config.base_url,
            ConfigField::PrivateKey => &config.private_key,
            ConfigField::Passphrase => &config.passphrase,
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigField::BaseUrl => "base URL",
            ConfigField::PrivateKey => "private key",
            ConfigField::Passphrase => "passphrase",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "The provider cannot create the Passbolt API client as there is an unknown configuration value for the Passbolt {}. \
         Either target apply the source of the value first, or set the value statically in the configuration.",
        .0
    )]
    Unknown(ConfigField),

    #[error(
        "The provider cannot create the Passbolt API client as there is a missing or empty value for the Passbolt {}. \
         Set the {} value in the configuration or use the {} environment variable. \
         If either is already set, ensure the value is not empty.",
        .0,
        .0.attribute(),
        .0.env_var()
    )]
    Missing(ConfigField),

    #[error("The Passbolt base URL must be an absolute http or https URL, got '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

impl ConfigError {
    /// Attribute the error is attached to.
    pub fn attribute(&self) -> &'static str {
        match self {
            ConfigError::Unknown(field) | ConfigError::Missing(field) => field.attribute(),
            ConfigError::InvalidBaseUrl { .. } => ConfigField::BaseUrl.attribute(),
            ConfigError::ZeroTimeout => "request_timeout_secs",
        }
    }

    pub fn summary(&self) -> String {
        match self {
            ConfigError::Unknown(field) => format!("Unknown Passbolt {}", field.title()),
            ConfigError::Missing(field) => format!("Missing Passbolt {}", field.title()),
            ConfigError::InvalidBaseUrl { .. } => "Invalid Passbolt Base URL".to_string(),
            ConfigError::ZeroTimeout => "Invalid Request Timeout".to_string(),
        }
    }
}

/// One attribute diagnostic per error.
pub fn config_diagnostics(errors: &[ConfigError]) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for err in errors {
        diags.add_attribute_error(
            AttributePath::root(err.attribute()),
            err.summary(),
            err.to_string(),
        );
    }
    diags
}

impl ProviderConfig {
    /// Resolve the block against `env` into connection credentials.
    ///
    /// Unknown values are reported first; only a block without unknowns is
    /// checked for missing values.
    pub fn resolve<E: Environment + ?Sized>(&self, env: &E) -> Result<Credentials, Vec<ConfigError>> {
        let unknown: Vec<ConfigError> = ConfigField::ALL
            .iter()
            .filter(|f| f.value(self).is_unknown())
            .map(|f| ConfigError::Unknown(*f))
            .collect();
        if !unknown.is_empty() {
            return Err(unknown);
        }

        let mut errors = Vec::new();
        let base_url = self.resolve_field(ConfigField::BaseUrl, env, &mut errors);
        let private_key = self.resolve_field(ConfigField::PrivateKey, env, &mut errors);
        let passphrase = self.resolve_field(ConfigField::Passphrase, env, &mut errors);

        let request_timeout_secs = self
            .request_timeout_secs
            .known()
            .copied()
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            errors.push(ConfigError::ZeroTimeout);
        }

        if !base_url.is_empty() {
            if let Err(reason) = check_base_url(&base_url) {
                errors.push(ConfigError::InvalidBaseUrl {
                    url: base_url.clone(),
                    reason,
                });
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Credentials {
            base_url,
            private_key,
            passphrase,
            verify_tls: self.verify_tls.known().copied().unwrap_or(DEFAULT_VERIFY_TLS),
            request_timeout_secs,
        })
    }

    /// The configured value, or the environment's when the block leaves it
    /// null. An empty result is recorded as missing.
    fn resolve_field<E: Environment + ?Sized>(
        &self,
        field: ConfigField,
        env: &E,
        errors: &mut Vec<ConfigError>,
    ) -> String {
        let value = match field.value(self) {
            Value::Known(v) => v.clone(),
            _ => env.var(field.env_var()).unwrap_or_default(),
        };
        if value.is_empty() {
            errors.push(ConfigError::Missing(field));
        }
        value
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        "http" | "https" => Err("missing host".to_string()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
